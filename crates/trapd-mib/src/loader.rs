//! Lenient SMIv1/SMIv2 MIB loader.
//!
//! This is not a full ASN.1 parser. It tokenizes the module body, picks out
//! the assignments that define OID values (plain `OBJECT IDENTIFIER`
//! assignments and the SMI macros), records type assignments without an
//! OID, and resolves every value against the SNMPv2-SMI roots and the
//! module's own definitions. Anything it cannot resolve is logged and left
//! unindexed rather than failing the load.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};
use trapd_types::oid::join_arcs;

use crate::builtins::builtin_roots;
use crate::error::{MibError, MibResult};
use crate::symbol::{Mib, MibSymbol, SymbolKind};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    text: String,
    line: u32,
}

/// One element of a `{ ... }` OID value.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Component {
    Name(String),
    Number(u32),
    /// `name(n)`; only the number matters for resolution.
    Named(u32),
}

#[derive(Clone, Debug)]
enum Value {
    Components(Vec<Component>),
    Trap { enterprise: String, specific: u32 },
    None,
}

#[derive(Clone, Debug)]
struct Assignment {
    name: String,
    kind: SymbolKind,
    value: Value,
    line: u32,
}

impl Value {
    fn try_resolve(&self, known: &HashMap<String, Vec<u32>>) -> Option<Vec<u32>> {
        match self {
            Self::Components(components) => {
                let (first, rest) = components.split_first()?;
                let mut arcs = match first {
                    Component::Name(parent) => known.get(parent)?.clone(),
                    Component::Number(n) | Component::Named(n) => vec![*n],
                };
                for component in rest {
                    match component {
                        Component::Number(n) | Component::Named(n) => arcs.push(*n),
                        Component::Name(_) => return None,
                    }
                }
                Some(arcs)
            }
            Self::Trap {
                enterprise,
                specific,
            } => {
                let mut arcs = known.get(enterprise)?.clone();
                arcs.push(0);
                arcs.push(*specific);
                Some(arcs)
            }
            Self::None => None,
        }
    }

    fn parent(&self) -> Option<&str> {
        match self {
            Self::Components(components) => match components.first() {
                Some(Component::Name(parent)) => Some(parent),
                _ => None,
            },
            Self::Trap { enterprise, .. } => Some(enterprise),
            Self::None => None,
        }
    }
}

/// Loads MIB modules from disk or text.
pub struct MibLoader;

impl MibLoader {
    /// Read and parse a MIB file.
    pub fn load(path: &Path) -> MibResult<Mib> {
        let text = std::fs::read_to_string(path).map_err(|source| MibError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mib = Self::parse(&text)?;
        info!(
            module = %mib.module,
            path = %path.display(),
            symbols = mib.symbols.len(),
            "MIB loaded"
        );
        Ok(mib)
    }

    /// Parse MIB text. Whitespace-only (or comment-only) input yields an
    /// empty MIB.
    pub fn parse(text: &str) -> MibResult<Mib> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Ok(Mib::default());
        }

        let header = tokens
            .iter()
            .position(|t| t.text == "DEFINITIONS")
            .filter(|pos| *pos > 0)
            .ok_or_else(|| MibError::Parse {
                line: tokens[0].line,
                message: "missing `<MODULE-NAME> DEFINITIONS` header".into(),
            })?;
        let module = tokens[header - 1].text.clone();
        let begin = tokens[header..]
            .iter()
            .position(|t| t.text == "BEGIN")
            .map(|p| p + header)
            .ok_or_else(|| MibError::Parse {
                line: tokens[header].line,
                message: format!("module {module} has no BEGIN"),
            })?;

        let assignments = collect_assignments(&tokens, begin + 1)?;
        let symbols = resolve(&module, assignments);
        debug!(module = %module, symbols = symbols.len(), "MIB parsed");
        Ok(Mib::new(module, symbols))
    }
}

fn tokenize(text: &str) -> MibResult<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1u32;
    let mut i = 0;

    let peek = |i: usize| chars.get(i).copied();

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // `--` comments run to end of line or to the next `--`.
        if c == '-' && peek(i + 1) == Some('-') {
            i += 2;
            while i < chars.len() && chars[i] != '\n' {
                if chars[i] == '-' && peek(i + 1) == Some('-') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }
        if c == '"' {
            let start = line;
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            if i >= chars.len() {
                return Err(MibError::Parse {
                    line: start,
                    message: "unterminated quoted string".into(),
                });
            }
            i += 1;
            tokens.push(Token {
                text: "\"\"".into(),
                line: start,
            });
            continue;
        }
        if c == ':' && peek(i + 1) == Some(':') && peek(i + 2) == Some('=') {
            tokens.push(Token {
                text: "::=".into(),
                line,
            });
            i += 3;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() {
                let ch = chars[i];
                let ident = ch.is_ascii_alphanumeric()
                    || ch == '_'
                    || (ch == '-' && peek(i + 1) != Some('-'));
                if !ident {
                    break;
                }
                i += 1;
            }
            tokens.push(Token {
                text: chars[start..i].iter().collect(),
                line,
            });
            continue;
        }
        tokens.push(Token {
            text: c.to_string(),
            line,
        });
        i += 1;
    }
    Ok(tokens)
}

fn is_value_name(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

fn is_type_name(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn text(tokens: &[Token], i: usize) -> Option<&str> {
    tokens.get(i).map(|t| t.text.as_str())
}

/// Index of the first token equal to `needle` at or after `from`.
fn find(tokens: &[Token], from: usize, needle: &str) -> Option<usize> {
    tokens[from.min(tokens.len())..]
        .iter()
        .position(|t| t.text == needle)
        .map(|p| p + from)
}

/// Parse `{ ... }` starting at `open`. Returns the components and the index
/// just past the closing brace.
fn parse_oid_value(tokens: &[Token], open: usize, owner: &str) -> MibResult<(Vec<Component>, usize)> {
    let line = tokens.get(open).map_or(0, |t| t.line);
    if text(tokens, open) != Some("{") {
        return Err(MibError::Parse {
            line,
            message: format!("expected `{{` to start the OID value of {owner}"),
        });
    }
    let mut components = Vec::new();
    let mut i = open + 1;
    loop {
        let Some(tok) = text(tokens, i) else {
            return Err(MibError::Parse {
                line,
                message: format!("unterminated OID value for {owner}"),
            });
        };
        match tok {
            "}" => return Ok((components, i + 1)),
            t if t.bytes().all(|b| b.is_ascii_digit()) => {
                components.push(Component::Number(parse_arc(t, tokens[i].line)?));
                i += 1;
            }
            t if text(tokens, i + 1) == Some("(") => {
                let n = text(tokens, i + 2).unwrap_or_default();
                if text(tokens, i + 3) != Some(")") {
                    return Err(MibError::Parse {
                        line: tokens[i].line,
                        message: format!("malformed named arc `{t}` in {owner}"),
                    });
                }
                components.push(Component::Named(parse_arc(n, tokens[i].line)?));
                i += 4;
            }
            t => {
                components.push(Component::Name(t.to_string()));
                i += 1;
            }
        }
    }
}

fn parse_arc(s: &str, line: u32) -> MibResult<u32> {
    s.parse().map_err(|_| MibError::Parse {
        line,
        message: format!("invalid OID arc `{s}`"),
    })
}

fn collect_assignments(tokens: &[Token], start: usize) -> MibResult<Vec<Assignment>> {
    let mut out = Vec::new();
    let mut i = start;

    while i < tokens.len() {
        let tok = tokens[i].text.as_str();
        let line = tokens[i].line;

        match tok {
            "END" => break,
            "IMPORTS" | "EXPORTS" => {
                i = find(tokens, i, ";").map_or(tokens.len(), |p| p + 1);
                continue;
            }
            _ => {}
        }

        if text(tokens, i + 1) == Some("MACRO") {
            i = find(tokens, i + 2, "END").map_or(tokens.len(), |p| p + 1);
            continue;
        }

        if is_value_name(tok) {
            let next = text(tokens, i + 1);
            if next == Some("OBJECT")
                && text(tokens, i + 2) == Some("IDENTIFIER")
                && text(tokens, i + 3) == Some("::=")
            {
                let (components, after) = parse_oid_value(tokens, i + 4, tok)?;
                out.push(Assignment {
                    name: tok.to_string(),
                    kind: SymbolKind::ObjectIdentifier,
                    value: Value::Components(components),
                    line,
                });
                i = after;
                continue;
            }

            if let Some(kind) = next.and_then(SymbolKind::from_macro) {
                let assign = find(tokens, i + 2, "::=").ok_or_else(|| MibError::Parse {
                    line,
                    message: format!("definition of {tok} has no `::=`"),
                })?;
                let (value, after) = if kind == SymbolKind::TrapType {
                    let enterprise = find(tokens, i + 2, "ENTERPRISE")
                        .filter(|p| *p < assign)
                        .and_then(|p| text(tokens, p + 1))
                        .ok_or_else(|| MibError::Parse {
                            line,
                            message: format!("TRAP-TYPE {tok} has no ENTERPRISE clause"),
                        })?;
                    let specific = text(tokens, assign + 1).ok_or_else(|| MibError::Parse {
                        line,
                        message: format!("TRAP-TYPE {tok} has no value"),
                    })?;
                    let specific = parse_arc(specific, tokens[assign].line)?;
                    (
                        Value::Trap {
                            enterprise: enterprise.to_string(),
                            specific,
                        },
                        assign + 2,
                    )
                } else {
                    let (components, after) = parse_oid_value(tokens, assign + 1, tok)?;
                    (Value::Components(components), after)
                };
                out.push(Assignment {
                    name: tok.to_string(),
                    kind,
                    value,
                    line,
                });
                i = after;
                continue;
            }
        } else if is_type_name(tok) && text(tokens, i + 1) == Some("::=") {
            out.push(Assignment {
                name: tok.to_string(),
                kind: SymbolKind::Type,
                value: Value::None,
                line,
            });
            i += 2;
            continue;
        }

        i += 1;
    }
    Ok(out)
}

/// Resolve every assignment to a numeric OID, iterating until no further
/// names can be bound (definitions may refer forward).
fn resolve(module: &str, assignments: Vec<Assignment>) -> Vec<MibSymbol> {
    let mut known = builtin_roots();
    let mut resolved: Vec<Option<Vec<u32>>> = vec![None; assignments.len()];

    loop {
        let mut progress = false;
        for (slot, assignment) in resolved.iter_mut().zip(&assignments) {
            if slot.is_some() {
                continue;
            }
            if let Some(arcs) = assignment.value.try_resolve(&known) {
                known.insert(assignment.name.clone(), arcs.clone());
                *slot = Some(arcs);
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    assignments
        .into_iter()
        .zip(resolved)
        .map(|(assignment, arcs)| {
            if arcs.is_none() && assignment.kind != SymbolKind::Type {
                warn!(
                    module,
                    symbol = %assignment.name,
                    line = assignment.line,
                    parent = assignment.value.parent().unwrap_or("-"),
                    "unresolved OID value; symbol will not be indexed"
                );
            }
            MibSymbol::new(assignment.name, arcs.map(|a| join_arcs(a)), assignment.kind)
        })
        .collect()
}
