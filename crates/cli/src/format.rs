//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): aligned tables and short sentences
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): bare versions, one per line

use std::path::PathBuf;

use serde::Serialize;
use strata_core::Version;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// One catalogue line of `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueRow {
    pub key: &'static str,
    pub version: Version,
    pub description: &'static str,
    pub minimum_supported: bool,
    pub binary: bool,
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Catalogue { entries: Vec<CatalogueRow> },
    Store { path: PathBuf, version: Version },
    Initialised { path: PathBuf, version: Version },
    Bumped { path: PathBuf, from: Version, to: Version },
    Parsed { version: Version },
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Raw => format_raw(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({ "error": err }))
            .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn format_json(output: &Output) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn format_raw(output: &Output) -> String {
    match output {
        Output::Catalogue { entries } => entries
            .iter()
            .map(|row| format!("{}\t{}", row.key, row.version))
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Store { version, .. }
        | Output::Initialised { version, .. }
        | Output::Parsed { version } => version.to_string(),
        Output::Bumped { to, .. } => to.to_string(),
    }
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Catalogue { entries } => {
            let width = entries.iter().map(|r| r.key.len()).max().unwrap_or(0);
            entries
                .iter()
                .map(|row| {
                    let mut line = format!(
                        "{:<width$}  {:<8}  {}",
                        row.key,
                        row.version.to_string(),
                        row.description,
                        width = width
                    );
                    if row.minimum_supported {
                        line.push_str("  (minimum supported)");
                    }
                    if row.binary {
                        line.push_str("  (binary)");
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Output::Store { path, version } => {
            format!("{}: store version {}", path.display(), version)
        }
        Output::Initialised { path, version } => {
            format!("{}: initialised at {}", path.display(), version)
        }
        Output::Bumped { path, from, to } if from == to => {
            format!("{}: already at {}", path.display(), to)
        }
        Output::Bumped { path, from, to } => {
            format!("{}: {} -> {}", path.display(), from, to)
        }
        Output::Parsed { version } => {
            format!(
                "{} (major {}, minor {}, patch {}, unstable {})",
                version,
                version.major(),
                version.minor(),
                version.patch(),
                version.unstable()
            )
        }
    }
}
