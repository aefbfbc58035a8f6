use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Point-in-time memory usage snapshot.
///
/// `max` may be -1 when the source imposes no limit. Fields are read
/// together but are not atomic with respect to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub committed: i64,
    pub max: i64,
    pub used: i64,
}

/// A memory region (heap or non-heap) with a live usage snapshot.
pub trait MemorySource: Send + Sync {
    fn usage(&self) -> MemoryUsage;
}

/// Thread counts for the whole process.
pub trait ThreadSource: Send + Sync {
    fn count(&self) -> i64;
    fn peak_count(&self) -> i64;
    fn daemon_count(&self) -> i64;
}

/// Process uptime, start time and runtime identity.
pub trait RuntimeSource: Send + Sync {
    fn uptime_millis(&self) -> i64;
    fn start_time_millis(&self) -> i64;

    /// JIT/AOT compiler name from the runtime's properties, if exposed.
    fn jit_compiler(&self) -> Option<String> {
        None
    }
}

/// Operating-system level readings.
pub trait OsSource: Send + Sync {
    fn available_processors(&self) -> i64;

    /// Open file descriptors; `None` when the platform does not account
    /// for them.
    fn open_fd_count(&self) -> Option<i64> {
        None
    }

    fn max_fd_count(&self) -> Option<i64> {
        None
    }
}

/// JIT compilation time, when the runtime supports time monitoring.
pub trait CompilationSource: Send + Sync {
    fn total_time_millis(&self) -> Option<i64>;
}

/// Class-loading counters.
pub trait ClassLoadingSource: Send + Sync {
    fn total_loaded(&self) -> i64;
    fn total_unloaded(&self) -> i64;
    fn currently_loaded(&self) -> i64;
}

/// A runtime-managed memory pool (e.g. an old generation or metaspace).
///
/// Current usage and post-collection usage are independent snapshots;
/// two consecutive calls may describe different points in time.
pub trait MemoryPoolSource: Send + Sync {
    fn name(&self) -> String;
    fn usage(&self) -> Option<MemoryUsage>;
    fn post_gc_usage(&self) -> Option<MemoryUsage>;
}

/// A buffer pool (direct, mapped, ...).
pub trait BufferPoolSource: Send + Sync {
    fn name(&self) -> String;
    fn count(&self) -> i64;
    fn used_bytes(&self) -> i64;
    fn capacity_bytes(&self) -> i64;
}

/// A garbage collector's cumulative counters.
///
/// Either reading may be a negative sentinel meaning "unsupported by
/// this collector"; callers aggregate around it but the raw value is
/// still exposed per collector.
pub trait GcCollectorSource: Send + Sync {
    fn name(&self) -> String;
    fn collection_count(&self) -> i64;
    fn collection_time_millis(&self) -> i64;
}

/// Everything discoverable through the runtime's management interfaces.
///
/// Mirrors the capability-conditional layout the registry consumes:
/// absent beans are `None`, absent bean families are empty vectors.
#[derive(Clone, Default)]
pub struct ManagementBeans {
    pub heap: Option<Arc<dyn MemorySource>>,
    pub non_heap: Option<Arc<dyn MemorySource>>,
    pub threads: Option<Arc<dyn ThreadSource>>,
    pub runtime: Option<Arc<dyn RuntimeSource>>,
    pub os: Option<Arc<dyn OsSource>>,
    pub compilation: Option<Arc<dyn CompilationSource>>,
    pub class_loading: Option<Arc<dyn ClassLoadingSource>>,
    pub memory_pools: Vec<Arc<dyn MemoryPoolSource>>,
    pub buffer_pools: Vec<Arc<dyn BufferPoolSource>>,
    pub gc_collectors: Vec<Arc<dyn GcCollectorSource>>,
}

impl ManagementBeans {
    /// Beans with every capability absent.
    pub fn empty() -> Self {
        Self::default()
    }
}
