use anyhow::Result;
use clap::{Arg, Command};

use jvmstats::commands;

fn main() -> Result<()> {
    jvmstats::init_logging();

    let matches = Command::new("jvmstats")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Registers JVM resource gauges and scrapes them once")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("dump")
                .about("Register all available gauges and print one scrape")
                .arg(
                    Arg::new("pid")
                        .short('p')
                        .long("pid")
                        .value_name("PID")
                        .help("JVM process id to read diagnostic counters from"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the scrape as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("probe")
                .about("Show which diagnostic counter capabilities were found")
                .arg(
                    Arg::new("pid")
                        .short('p')
                        .long("pid")
                        .value_name("PID")
                        .help("JVM process id to probe"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the probe outcome as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("dump", sub)) => commands::dump(sub),
        Some(("probe", sub)) => commands::probe(sub),
        _ => unreachable!("subcommand required"),
    }
}
