use std::sync::Arc;

use anyhow::Result;

use crate::core::estimator::AllocationEstimator;
use crate::core::stats::{InMemoryStats, StatsSink};
use crate::platform::{diagnostic_counters, diagnostic_counters_for};
use crate::ui::print_capabilities;

/// Probe which diagnostic counters exist and report the outcome.
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let counters = match super::dump::target_pid(matches)? {
        Some(pid) => diagnostic_counters_for(pid),
        None => diagnostic_counters(),
    };

    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend).scope("jvm").scope("mem");
    let mut estimator = AllocationEstimator::new(sink, counters);
    estimator.start();

    let caps = estimator.capabilities();
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&caps)?);
    } else {
        print_capabilities(&caps);
    }

    Ok(())
}
