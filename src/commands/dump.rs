use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::registry::register;
use crate::core::stats::{InMemoryStats, StatsSink};
use crate::platform::{diagnostic_counters, diagnostic_counters_for};
use crate::ui::print_report;

/// Register against the host's management beans (and a JVM's diagnostic
/// counters when a pid is given), scrape once, and print the result.
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let counters = match target_pid(matches)? {
        Some(pid) => diagnostic_counters_for(pid),
        None => diagnostic_counters(),
    };

    let beans = crate::platform::host::host_beans();
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());

    register(&sink, &beans, counters);
    let report = backend.scrape();

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

pub(super) fn target_pid(matches: &clap::ArgMatches) -> Result<Option<u32>> {
    matches
        .get_one::<String>("pid")
        .map(|raw| raw.parse::<u32>().context("invalid pid"))
        .transpose()
}
