//! Platform-specific code module.
//!
//! Hosts the vendor diagnostic-counter adapters. The rest of the crate
//! only sees the `DiagnosticCounters` trait; which adapter backs it is
//! decided once at startup.

pub mod host;

#[cfg(unix)]
pub mod perfdata;

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

/// Narrow adapter over a runtime's internal diagnostic counters.
///
/// `lookup` performs a fresh read on every call. Returning `None` means
/// the counter does not exist for this runtime; adapters never invent
/// values.
pub trait DiagnosticCounters: Send + Sync {
    fn lookup(&self, name: &str) -> Option<i64>;
}

/// Always-unavailable default adapter.
pub struct NullCounters;

impl DiagnosticCounters for NullCounters {
    fn lookup(&self, _name: &str) -> Option<i64> {
        None
    }
}

/// Mutable in-memory counter table.
///
/// Backs simulated runtimes in tests and doubles as an adapter for
/// counters fed from an external source.
#[derive(Default)]
pub struct MapCounters {
    values: Mutex<HashMap<String, i64>>,
}

impl MapCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: i64) {
        self.values.lock().insert(name.to_string(), value);
    }

    pub fn remove(&self, name: &str) {
        self.values.lock().remove(name);
    }
}

impl DiagnosticCounters for MapCounters {
    fn lookup(&self, name: &str) -> Option<i64> {
        self.values.lock().get(name).copied()
    }
}

/// Counters for the current process.
///
/// Tries each platform adapter in turn and falls back to the
/// always-unavailable one. Never fails outward.
pub fn diagnostic_counters() -> Arc<dyn DiagnosticCounters> {
    diagnostic_counters_for(std::process::id())
}

/// Counters for an arbitrary process id.
pub fn diagnostic_counters_for(pid: u32) -> Arc<dyn DiagnosticCounters> {
    #[cfg(unix)]
    {
        match perfdata::PerfDataCounters::attach(pid) {
            Ok(counters) => return Arc::new(counters),
            Err(err) => debug!("no perfdata counters for pid {}: {}", pid, err),
        }
    }

    debug!("falling back to null diagnostic counters for pid {}", pid);
    Arc::new(NullCounters)
}
