//! Allocation and safepoint estimator.
//!
//! HotSpot exposes young-generation allocation and safepoint pause data
//! only through internal `sun.*` counters whose presence varies by
//! vendor and version. This component probes for them exactly once in
//! [`AllocationEstimator::start`] and afterwards serves best-effort
//! readings: eden allocation is gated on a tracking flag, safepoint and
//! application-time readings degrade to zero when unsupported. The
//! registry never sees which counters actually exist.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::core::stats::{Gauge, StatsSink};
use crate::platform::DiagnosticCounters;

// HotSpot counter names, probed by exact name.
const HRT_FREQUENCY: &str = "sun.os.hrt.frequency";
const SAFEPOINT_COUNT: &str = "sun.rt.safepoints";
const SAFEPOINT_TIME: &str = "sun.rt.safepointTime";
const SAFEPOINT_SYNC_TIME: &str = "sun.rt.safepointSyncTime";
const APPLICATION_TIME: &str = "sun.rt.applicationTime";
const TENURING_THRESHOLD: &str = "sun.gc.policy.tenuringThreshold";
const METASPACE_MAX_CAPACITY: &str = "sun.gc.metaspace.maxCapacity";
const EDEN_INVOCATIONS: &str = "sun.gc.collector.0.invocations";
const EDEN_CAPACITY: &str = "sun.gc.generation.0.space.0.capacity";
const EDEN_USED: &str = "sun.gc.generation.0.space.0.used";
const TLAB_ALLOCATED: &str = "sun.gc.tlab.alloc";

/// Cumulative safepoint counters. All zero when the runtime does not
/// expose them; callers cannot distinguish that from a pause-free run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SafepointStats {
    pub sync_time_millis: i64,
    pub total_time_millis: i64,
    pub count: i64,
}

/// Optional derived allocation readings, recomputed on each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocationEstimate {
    pub eden_bytes: Option<i64>,
}

/// Which optional readings the probe found, for diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EstimatorCapabilities {
    pub eden: bool,
    pub safepoints: bool,
    pub application_time: bool,
    pub tenuring_threshold: bool,
    pub metaspace: bool,
    pub tlab_allocation: bool,
}

pub struct AllocationEstimator {
    sink: StatsSink,
    counters: Arc<dyn DiagnosticCounters>,
    nanos_per_tick: f64,
    tracking_eden: bool,
    // Gauges this component registered itself; retained here so they
    // outlive the weak references the sink holds.
    tracking_gauges: Vec<Gauge>,
}

impl AllocationEstimator {
    /// `sink` is where the estimator registers any direct tracking
    /// counters it discovers; derived readings are served through the
    /// accessor methods instead.
    pub fn new(sink: StatsSink, counters: Arc<dyn DiagnosticCounters>) -> Self {
        Self {
            sink,
            counters,
            nanos_per_tick: 1.0,
            tracking_eden: false,
            tracking_gauges: Vec::new(),
        }
    }

    /// One-time capability probe. Call exactly once, before any reads.
    pub fn start(&mut self) {
        // Safepoint and application-time counters are in high-resolution
        // ticks; without a frequency counter they are taken as nanos.
        self.nanos_per_tick = match self.counters.lookup(HRT_FREQUENCY) {
            Some(hz) if hz > 0 => 1e9 / hz as f64,
            _ => 1.0,
        };

        self.tracking_eden = [EDEN_INVOCATIONS, EDEN_CAPACITY, EDEN_USED]
            .iter()
            .all(|name| self.counters.lookup(name).is_some());
        debug!(
            "allocation probe: eden tracking {}",
            if self.tracking_eden { "on" } else { "off" }
        );

        if self.counters.lookup(TLAB_ALLOCATED).is_some() {
            let counters = Arc::clone(&self.counters);
            let gauge = self
                .sink
                .scope("allocations")
                .scope("tlab")
                .add_gauge("bytes", move || {
                    counters.lookup(TLAB_ALLOCATED).unwrap_or(0) as f64
                });
            self.sink.mark_counter_like(&gauge);
            self.tracking_gauges.push(gauge);
            debug!("registered direct tlab allocation counter");
        }
    }

    /// True iff a usable young-generation allocation counter was found.
    pub fn tracking_eden(&self) -> bool {
        self.tracking_eden
    }

    /// Cumulative bytes allocated into eden. Meaningful only while
    /// [`tracking_eden`](Self::tracking_eden) is true.
    ///
    /// There is no single cumulative counter for this, so it is derived:
    /// every young collection empties eden, so completed collections
    /// times eden capacity, plus whatever sits in eden right now. Raw
    /// counter wraparound or eden resizing passes through unsmoothed.
    pub fn eden(&self) -> i64 {
        let invocations = self.counters.lookup(EDEN_INVOCATIONS).unwrap_or(0);
        let capacity = self.counters.lookup(EDEN_CAPACITY).unwrap_or(0);
        let used = self.counters.lookup(EDEN_USED).unwrap_or(0);
        invocations * capacity + used
    }

    /// Current allocation estimate; `eden_bytes` is `None` when no
    /// usable counter combination was found.
    pub fn allocation_estimate(&self) -> AllocationEstimate {
        AllocationEstimate {
            eden_bytes: if self.tracking_eden {
                Some(self.eden())
            } else {
                None
            },
        }
    }

    /// Fresh safepoint counters, zero when unsupported.
    pub fn safepoint(&self) -> SafepointStats {
        SafepointStats {
            sync_time_millis: self.ticks_to_millis(SAFEPOINT_SYNC_TIME),
            total_time_millis: self.ticks_to_millis(SAFEPOINT_TIME),
            count: self.counters.lookup(SAFEPOINT_COUNT).unwrap_or(0),
        }
    }

    /// Cumulative time spent running outside safepoints, in nanoseconds.
    pub fn application_time_nanos(&self) -> i64 {
        let ticks = self.counters.lookup(APPLICATION_TIME).unwrap_or(0);
        (ticks as f64 * self.nanos_per_tick) as i64
    }

    /// Current tenuring threshold; may fluctuate under adaptive sizing.
    pub fn tenuring_threshold(&self) -> i32 {
        self.counters.lookup(TENURING_THRESHOLD).unwrap_or(0) as i32
    }

    /// Metaspace capacity limit, when the runtime publishes one.
    pub fn metaspace_max_capacity(&self) -> Option<i64> {
        self.counters.lookup(METASPACE_MAX_CAPACITY)
    }

    /// Probe outcome summary for the CLI.
    pub fn capabilities(&self) -> EstimatorCapabilities {
        EstimatorCapabilities {
            eden: self.tracking_eden,
            safepoints: self.counters.lookup(SAFEPOINT_COUNT).is_some(),
            application_time: self.counters.lookup(APPLICATION_TIME).is_some(),
            tenuring_threshold: self.counters.lookup(TENURING_THRESHOLD).is_some(),
            metaspace: self.counters.lookup(METASPACE_MAX_CAPACITY).is_some(),
            tlab_allocation: self.counters.lookup(TLAB_ALLOCATED).is_some(),
        }
    }

    fn ticks_to_millis(&self, name: &str) -> i64 {
        let ticks = self.counters.lookup(name).unwrap_or(0);
        (ticks as f64 * self.nanos_per_tick / 1e6) as i64
    }
}
