//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};
use strata_cluster::DEFAULT_MARKER_FILE;

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("strata-versions")
        .about("Inspect and manage Strata cluster versions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (bare values)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("marker-file")
                .long("marker-file")
                .value_name("NAME")
                .default_value(DEFAULT_MARKER_FILE)
                .help("Name of the version marker inside the store directory")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log to stderr (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_list())
        .subcommand(build_check())
        .subcommand(build_init())
        .subcommand(build_bump())
        .subcommand(build_parse())
}

fn build_list() -> Command {
    Command::new("list").about("Print the built-in version catalogue")
}

fn build_check() -> Command {
    Command::new("check")
        .about("Run the startup check against a store")
        .arg(dir_arg())
}

fn build_init() -> Command {
    Command::new("init")
        .about("Create a fresh store marker at the binary version")
        .arg(dir_arg())
}

fn build_bump() -> Command {
    Command::new("bump")
        .about("Advance the version recorded in a store")
        .arg(dir_arg())
        .arg(
            Arg::new("version")
                .required(true)
                .value_name("VERSION")
                .help("Target version, MAJOR.MINOR[.PATCH][-UNSTABLE]"),
        )
}

fn build_parse() -> Command {
    Command::new("parse")
        .about("Parse and re-render a version string")
        .arg(
            Arg::new("version")
                .required(true)
                .value_name("VERSION")
                .allow_hyphen_values(true)
                .help("Version string to parse"),
        )
}

fn dir_arg() -> Arg {
    Arg::new("dir")
        .required(true)
        .value_name("DIR")
        .help("Store directory")
}
