// Core business logic module

pub mod estimator;
pub mod registry;
pub mod runtime;
pub mod stats;

// Re-export commonly used items
pub use estimator::{AllocationEstimator, SafepointStats};
pub use registry::register;
pub use runtime::ManagementBeans;
pub use stats::{InMemoryStats, StatsSink};
