use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use sysrelay::commands;

fn main() -> Result<()> {
    sysrelay::init_logging();

    let matches = Command::new("sysrelay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples host metrics and publishes a report to a Discord channel")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (defaults to ./config.json, then the user config dir)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Log in and publish a report every `interval` seconds (default)"),
        )
        .subcommand(
            Command::new("preview")
                .about("Sample once and print the report without sending it")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the raw snapshot as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("preview", sub_matches)) => commands::preview(
            sub_matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
            sub_matches.get_flag("json"),
        ),
        Some(("run", sub_matches)) => {
            commands::run(sub_matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        }
        _ => commands::run(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)),
    }
}
