use colored::*;
use humansize::{format_size, BINARY};

use crate::core::estimator::EstimatorCapabilities;
use crate::core::stats::MetricsReport;

/// Format a gauge value for display, byte-sized metrics human-readably.
pub fn format_metric_value(name: &str, value: f64) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    let byte_like = matches!(last, "used" | "max" | "committed" | "bytes" | "max_capacity");

    if byte_like && value >= 0.0 {
        format_size(value as u64, BINARY)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

/// Pretty-print a scrape, one gauge per line.
pub fn print_report(report: &MetricsReport) {
    println!("\n{}", "JVM METRICS".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    let mut samples = report.samples.clone();
    samples.sort_by(|a, b| a.name.cmp(&b.name));

    for sample in &samples {
        let marker = if sample.counter_like {
            " (counter)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<44} {}{}",
            sample.name.bright_white(),
            format_metric_value(&sample.name, sample.value).green(),
            marker
        );
    }

    println!("{}", "=".repeat(60));
    println!("  {} gauges, scraped at {}", samples.len(), report.timestamp);
}

/// Print the estimator's probe outcome.
pub fn print_capabilities(caps: &EstimatorCapabilities) {
    println!("\n{}", "DIAGNOSTIC COUNTER CAPABILITIES".bold().bright_cyan());
    println!("{}", "=".repeat(60));
    print_capability("eden allocation tracking", caps.eden);
    print_capability("safepoint counters", caps.safepoints);
    print_capability("application time", caps.application_time);
    print_capability("tenuring threshold", caps.tenuring_threshold);
    print_capability("metaspace capacity", caps.metaspace);
    print_capability("direct TLAB allocation counter", caps.tlab_allocation);
}

fn print_capability(label: &str, available: bool) {
    let status = if available {
        "available".green()
    } else {
        "unavailable".dimmed()
    };
    println!("  {:<36} {}", label, status);
}
