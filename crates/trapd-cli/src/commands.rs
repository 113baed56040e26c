use std::net::UdpSocket;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use trapd_codec::{encode_v2c_trap, TrapBinding, TrapValue};
use trapd_mib::{MibLoader, MibSymbolIndex, OidResolver, Resolution, SymbolKind};
use trapd_receiver::{DaemonConfig, OutputFormat, TrapDaemon};
use trapd_types::oid::is_canonical;
use trapd_types::{SNMP_TRAP_OID, SYS_UPTIME_OID};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Mib(args) => cmd_mib(args),
        Command::Send(args) => cmd_send(args),
        Command::Config(_) => cmd_config(),
    }
}

/// Merge command-line flags over the file (or default) configuration.
fn build_config(args: &RunArgs) -> anyhow::Result<DaemonConfig> {
    let mut config = match &args.config {
        Some(path) => DaemonConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(mib) = &args.mib {
        config.mib_path = mib.clone();
    }
    if let Some(bind) = args.bind {
        config.receiver.bind_addr = bind;
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if args.unbounded {
        config.pipeline.queue_capacity = None;
    } else if let Some(capacity) = args.queue_capacity {
        config.pipeline.queue_capacity = Some(capacity);
    }
    if !args.communities.is_empty() {
        config.receiver.communities = args.communities.clone();
    }
    if args.json {
        config.output = OutputFormat::Json;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    runtime.block_on(async move {
        let mib_path = config.mib_path.clone();
        let daemon = TrapDaemon::start(config, CancellationToken::new())
            .await
            .with_context(|| format!("failed to start trap receiver (MIB: {})", mib_path.display()))?;
        eprintln!(
            "{} Listening for SNMP traps on {}...",
            "✓".green().bold(),
            daemon.local_addr().to_string().bold()
        );

        let report = daemon.run_until_shutdown().await?;
        eprintln!(
            "{} Stopped. {} datagrams, {} records, {} skipped, {} failed, {} malformed",
            "✓".green(),
            report.receiver.datagrams,
            report.pool.processed.to_string().bold(),
            report.pool.skipped,
            report.pool.failed,
            report.receiver.malformed,
        );
        Ok(())
    })
}

fn load_resolver(path: &std::path::Path) -> anyhow::Result<(trapd_mib::Mib, OidResolver)> {
    let mib = MibLoader::load(path)?;
    let index = MibSymbolIndex::build(&mib);
    Ok((mib, OidResolver::new(Arc::new(index))))
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let (_, resolver) = load_resolver(&args.mib)?;
    for oid in &args.oids {
        match resolver.explain(oid) {
            Resolution::Unresolved => {
                println!("{}  {}  {}", oid, "→".dimmed(), "unresolved".red());
            }
            resolution => {
                let name = resolution.name().unwrap_or_default();
                println!(
                    "{}  {}  {}  ({})",
                    oid,
                    "→".dimmed(),
                    name.green().bold(),
                    resolution.rule().dimmed()
                );
            }
        }
    }
    Ok(())
}

fn cmd_mib(args: MibArgs) -> anyhow::Result<()> {
    let (mib, resolver) = load_resolver(&args.mib)?;
    let index = resolver.index();
    let types = mib.symbols.iter().filter(|s| s.kind == SymbolKind::Type).count();
    let unresolved: Vec<_> = mib
        .symbols
        .iter()
        .filter(|s| s.oid.is_none() && s.kind != SymbolKind::Type)
        .collect();

    println!("Module {}", mib.module.yellow().bold());
    println!("  Symbols:    {}", mib.symbols.len().to_string().bold());
    println!("  Indexed:    {}", index.len().to_string().green());
    println!("  Types:      {}", types);
    if unresolved.is_empty() {
        println!("  Unresolved: {}", "0".green());
    } else {
        println!("  Unresolved: {}", unresolved.len().to_string().red());
        for symbol in &unresolved {
            println!("    {} {}", symbol.name.red(), format!("({})", symbol.kind).dimmed());
        }
    }

    if args.all {
        println!();
        for (oid, name) in index.sorted() {
            println!("  {:<40} {}", oid, name.cyan());
        }
    }
    Ok(())
}

/// Parse `OID=VALUE` into a typed binding.
fn parse_var(spec: &str) -> anyhow::Result<TrapBinding> {
    let Some((oid, value)) = spec.split_once('=') else {
        bail!("expected OID=VALUE, got {spec:?}");
    };
    let oid = oid.trim();
    if !is_canonical(oid) {
        bail!("invalid OID {oid:?}");
    }
    let value: TrapValue = value.parse()?;
    Ok(TrapBinding::new(oid, value))
}

fn trap_bindings(args: &SendArgs) -> anyhow::Result<Vec<TrapBinding>> {
    if !is_canonical(&args.trap_oid) {
        bail!("invalid trap OID {:?}", args.trap_oid);
    }
    let mut bindings = vec![
        TrapBinding::new(SYS_UPTIME_OID, TrapValue::TimeTicks(args.uptime)),
        TrapBinding::new(SNMP_TRAP_OID, TrapValue::ObjectIdentifier(args.trap_oid.clone())),
    ];
    for spec in &args.vars {
        bindings.push(parse_var(spec)?);
    }
    Ok(bindings)
}

fn cmd_send(args: SendArgs) -> anyhow::Result<()> {
    let bindings = trap_bindings(&args)?;
    let datagram = encode_v2c_trap(&args.community, args.request_id, &bindings)?;

    let local = if args.target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(local).context("binding local UDP socket")?;
    socket
        .send_to(&datagram, args.target)
        .with_context(|| format!("sending trap to {}", args.target))?;

    println!(
        "{} Sent trap {} to {} ({} bindings, {} bytes)",
        "✓".green().bold(),
        args.trap_oid.yellow(),
        args.target.to_string().bold(),
        bindings.len(),
        datagram.len()
    );
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    print!("{}", DaemonConfig::default().to_toml()?);
    Ok(())
}
