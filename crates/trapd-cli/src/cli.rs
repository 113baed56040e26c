use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trapd",
    about = "SNMP trap receiver with MIB-based OID resolution",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Receive traps and emit resolved records until interrupted
    Run(RunArgs),
    /// Resolve OIDs against a MIB file
    Resolve(ResolveArgs),
    /// Show the symbols a MIB file defines
    Mib(MibArgs),
    /// Send an SNMPv2c trap
    Send(SendArgs),
    /// Print the default configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub mib: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub workers: Option<usize>,
    #[arg(long, conflicts_with = "unbounded")]
    pub queue_capacity: Option<usize>,
    #[arg(long)]
    pub unbounded: bool,
    /// Accept only these communities (repeatable)
    #[arg(long = "community")]
    pub communities: Vec<String>,
    /// Emit one JSON object per line on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[arg(long)]
    pub mib: PathBuf,
    #[arg(required = true)]
    pub oids: Vec<String>,
}

#[derive(Args)]
pub struct MibArgs {
    #[arg(long)]
    pub mib: PathBuf,
    /// List every indexed OID
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct SendArgs {
    #[arg(long)]
    pub target: SocketAddr,
    #[arg(long, default_value = "public")]
    pub community: String,
    #[arg(long)]
    pub trap_oid: String,
    /// `OID=VALUE`; VALUE may carry a type prefix such as `int:`, `oid:` or `ip:`
    #[arg(long = "var")]
    pub vars: Vec<String>,
    /// sysUpTime.0 in hundredths of a second
    #[arg(long, default_value = "0")]
    pub uptime: u32,
    #[arg(long, default_value = "1")]
    pub request_id: i32,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "trapd", "run", "--mib", "ACME-MIB.mib", "--bind", "127.0.0.1:1162",
            "--workers", "5", "--unbounded", "--community", "ops", "--json",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.workers, Some(5));
        assert!(args.unbounded);
        assert!(args.json);
        assert_eq!(args.communities, vec!["ops".to_string()]);
        assert_eq!(args.bind.unwrap().port(), 1162);
    }

    #[test]
    fn capacity_conflicts_with_unbounded() {
        let res = Cli::try_parse_from(["trapd", "run", "--queue-capacity", "10", "--unbounded"]);
        assert!(res.is_err());
    }

    #[test]
    fn resolve_requires_oids() {
        assert!(Cli::try_parse_from(["trapd", "resolve", "--mib", "x.mib"]).is_err());
        assert!(Cli::try_parse_from(["trapd", "resolve", "--mib", "x.mib", "1.3.6.1"]).is_ok());
    }

    #[test]
    fn send_vars_repeat() {
        let cli = Cli::try_parse_from([
            "trapd", "-v", "send", "--target", "127.0.0.1:162", "--trap-oid", "1.3.6.1.4.1.9.9.1",
            "--var", "1.3.6.1.4.1.9.9.2.0=critical", "--var", "1.3.6.1.4.1.9.9.4.0=int:3",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Send(args) = cli.command else { panic!("expected send") };
        assert_eq!(args.vars.len(), 2);
        assert_eq!(args.community, "public");
    }
}
