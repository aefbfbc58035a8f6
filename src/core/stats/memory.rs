use std::sync::Weak;

use parking_lot::Mutex;
use serde::Serialize;

use super::schema::ExpressionSchema;
use super::sink::{ReadFn, SinkBackend};

struct Entry {
    name: String,
    read: Weak<ReadFn>,
    counter_like: bool,
}

/// In-memory sink backend.
///
/// Holds weak references to gauge read closures, so only gauges whose
/// handles are still owned somewhere show up in a scrape. Used by the
/// CLI and by tests; also a reference for wiring real sinks.
#[derive(Default)]
pub struct InMemoryStats {
    entries: Mutex<Vec<Entry>>,
    expressions: Mutex<Vec<ExpressionSchema>>,
}

/// One gauge reading taken during a scrape.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub counter_like: bool,
}

/// A full scrape of every live gauge.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub timestamp: i64, // Unix timestamp
    pub samples: Vec<MetricSample>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every gauge whose handle is still alive.
    ///
    /// Dead entries (handle dropped) are skipped, not an error: the
    /// owner deciding to drop a gauge is how deregistration works here.
    pub fn scrape(&self) -> MetricsReport {
        let entries = self.entries.lock();
        let samples = entries
            .iter()
            .filter_map(|entry| {
                entry.read.upgrade().map(|read| MetricSample {
                    name: entry.name.clone(),
                    value: (*read)(),
                    counter_like: entry.counter_like,
                })
            })
            .collect();

        MetricsReport {
            timestamp: chrono::Utc::now().timestamp(),
            samples,
        }
    }

    /// Composite expressions registered so far.
    pub fn expressions(&self) -> Vec<ExpressionSchema> {
        self.expressions.lock().clone()
    }

    /// Number of installed gauge entries, live or dead.
    pub fn installed_count(&self) -> usize {
        self.entries.lock().len()
    }
}

impl SinkBackend for InMemoryStats {
    fn install(&self, path: &[String], read: Weak<ReadFn>) {
        self.entries.lock().push(Entry {
            name: path.join("."),
            read,
            counter_like: false,
        });
    }

    fn mark_counter_like(&self, path: &[String]) {
        let name = path.join(".");
        let mut entries = self.entries.lock();
        // Last entry wins: duplicate paths are permitted by the sink.
        if let Some(entry) = entries.iter_mut().rev().find(|e| e.name == name) {
            entry.counter_like = true;
        }
    }

    fn register_expression(&self, schema: ExpressionSchema) {
        self.expressions.lock().push(schema);
    }
}

impl MetricsReport {
    /// Value of a sample by dotted name, if present.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.samples.iter().find(|s| s.name == name).map(|s| s.value)
    }

    /// Whether a sample with the given dotted name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.samples.iter().any(|s| s.name == name)
    }
}
