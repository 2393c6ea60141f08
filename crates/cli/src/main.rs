//! strata-versions: operator CLI for Strata cluster versions.
//!
//! - `list`: print the built-in catalogue
//! - `check DIR`: run the startup check against a store
//! - `init DIR`: stamp a fresh store with the binary version
//! - `bump DIR VERSION`: advance the recorded version
//! - `parse VERSION`: parse and re-render a version string
//!
//! Every failure prints to stderr and exits with status 1.

mod commands;
mod format;
mod parse;

use std::path::Path;
use std::process;

use strata_cluster::{
    bump_store_version, open_store, StoreConfig, StoreVersionMarker, VersionKey, VersionRegistry,
};
use strata_core::Version;
use tracing::Level;

use commands::build_cli;
use format::{format_error, format_output, CatalogueRow, Output, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let marker_file = matches
        .get_one::<String>("marker-file")
        .cloned()
        .unwrap_or_else(|| strata_cluster::DEFAULT_MARKER_FILE.to_string());
    let config = StoreConfig::default().with_marker_file(marker_file);

    let result = matches_to_action(&matches).and_then(|action| {
        let registry = VersionRegistry::builtin().map_err(|e| e.to_string())?;
        execute(action, &registry, &config)
    });

    match result {
        Ok(output) => {
            let formatted = format_output(&output, output_mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => return,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one action against the store layer.
fn execute(
    action: CliAction,
    registry: &VersionRegistry<VersionKey>,
    config: &StoreConfig,
) -> Result<Output, String> {
    match action {
        CliAction::List => Ok(list(registry)),
        CliAction::Check { dir } => {
            let active = open_store(&dir, registry, &config.clone().with_create_if_missing(false))
                .map_err(|e| e.to_string())?;
            let version = active
                .current()
                .unwrap_or_else(|| registry.minimum_supported_version());
            Ok(Output::Store { path: dir, version })
        }
        CliAction::Init { dir } => {
            ensure_uninitialised(&dir, config)?;
            let active = open_store(&dir, registry, &config.clone().with_create_if_missing(true))
                .map_err(|e| e.to_string())?;
            let version = active
                .current()
                .unwrap_or_else(|| registry.binary_version());
            Ok(Output::Initialised { path: dir, version })
        }
        CliAction::Bump { dir, target } => {
            let from = bump_store_version(&dir, registry, config, target)
                .map_err(|e| e.to_string())?;
            Ok(Output::Bumped {
                path: dir,
                from,
                to: target,
            })
        }
        CliAction::Parse { input } => {
            let version = input.parse::<Version>().map_err(|e| e.to_string())?;
            Ok(Output::Parsed { version })
        }
    }
}

fn list(registry: &VersionRegistry<VersionKey>) -> Output {
    let minimum = registry.minimum_supported_version();
    let binary = registry.binary_version();
    let entries = registry
        .catalogue()
        .iter()
        .map(|entry| CatalogueRow {
            key: strata_cluster::GateKey::name(&entry.key),
            version: entry.version,
            description: entry.description,
            minimum_supported: entry.version == minimum,
            binary: entry.version == binary,
        })
        .collect();
    Output::Catalogue { entries }
}

fn ensure_uninitialised(dir: &Path, config: &StoreConfig) -> Result<(), String> {
    let marker = StoreVersionMarker::new(dir, &config.marker_file);
    match marker.read().map_err(|e| e.to_string())? {
        Some(existing) => Err(format!(
            "{} is already initialised at {}",
            dir.display(),
            existing
        )),
        None => Ok(()),
    }
}
