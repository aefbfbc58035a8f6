//! Metrics-sink boundary.
//!
//! The registry only needs a narrow surface from the downstream metrics
//! system: hierarchical scoping, gauge registration against a read
//! closure, a counter-like marker, and composite-expression metadata.
//! `StatsSink` is that surface; `InMemoryStats` is a backend that holds
//! only weak references to the read closures, which is what makes the
//! registry's retention collection load-bearing.

mod memory;
mod schema;
mod sink;

pub use memory::{InMemoryStats, MetricSample, MetricsReport};
pub use schema::ExpressionSchema;
pub use sink::{Gauge, ReadFn, SinkBackend, StatsSink};
