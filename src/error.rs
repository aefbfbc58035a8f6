use std::io;
use thiserror::Error;

/// Custom error type for the jvmstats library
#[derive(Error, Debug)]
pub enum JvmStatsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Performance data error: {0}")]
    PerfData(String),

    #[error("Counters not available: {0}")]
    CountersNotAvailable(String),

    #[error("Host introspection error: {0}")]
    HostIntrospection(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the jvmstats library
pub type Result<T> = std::result::Result<T, JvmStatsError>;

impl JvmStatsError {
    /// Create a performance-data error
    pub fn perf_data<S: Into<String>>(msg: S) -> Self {
        JvmStatsError::PerfData(msg.into())
    }

    /// Create a counters-not-available error
    pub fn counters_not_available<S: Into<String>>(msg: S) -> Self {
        JvmStatsError::CountersNotAvailable(msg.into())
    }

    /// Create a host introspection error
    pub fn host_introspection<S: Into<String>>(msg: S) -> Self {
        JvmStatsError::HostIntrospection(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        JvmStatsError::Other(msg.into())
    }
}
