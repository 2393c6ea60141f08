//! ArgMatches → CliAction conversion.

use std::path::PathBuf;

use clap::ArgMatches;
use strata_core::Version;

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print the built-in catalogue.
    List,
    /// Run the startup check against a store.
    Check { dir: PathBuf },
    /// Create a fresh marker at the binary version.
    Init { dir: PathBuf },
    /// Advance the recorded version.
    Bump { dir: PathBuf, target: Version },
    /// Parse and re-render a version string.
    Parse { input: String },
}

/// Convert parsed arguments into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("list", _)) => Ok(CliAction::List),
        Some(("check", sub)) => Ok(CliAction::Check { dir: dir(sub)? }),
        Some(("init", sub)) => Ok(CliAction::Init { dir: dir(sub)? }),
        Some(("bump", sub)) => {
            let raw = required(sub, "version")?;
            let target = raw.parse::<Version>().map_err(|e| e.to_string())?;
            Ok(CliAction::Bump {
                dir: dir(sub)?,
                target,
            })
        }
        Some(("parse", sub)) => Ok(CliAction::Parse {
            input: required(sub, "version")?.to_string(),
        }),
        Some((name, _)) => Err(format!("Unknown command: {}", name)),
        None => Err("No command given".to_string()),
    }
}

fn dir(matches: &ArgMatches) -> Result<PathBuf, String> {
    required(matches, "dir").map(PathBuf::from)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing argument: {}", name))
}
