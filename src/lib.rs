// jvmstats Library - Public API

// Re-export error types
pub mod error;
pub use error::{JvmStatsError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::estimator::{
    AllocationEstimate, AllocationEstimator, EstimatorCapabilities, SafepointStats,
};
pub use crate::core::registry::{
    normalize_name, register, retained_gauge_count, retained_gauge_paths,
};
pub use crate::core::stats::{ExpressionSchema, Gauge, InMemoryStats, SinkBackend, StatsSink};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
