//! Stub management beans with switchable capabilities.
//!
//! Used by the integration tests to simulate runtimes ranging from
//! fully featured down to ones exposing nothing optional at all.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::beans::*;

/// Memory source with a settable usage snapshot.
#[derive(Default)]
pub struct StubMemory {
    usage: Mutex<MemoryUsage>,
}

impl StubMemory {
    pub fn new(committed: i64, max: i64, used: i64) -> Arc<Self> {
        Arc::new(Self {
            usage: Mutex::new(MemoryUsage {
                committed,
                max,
                used,
            }),
        })
    }

    pub fn set_used(&self, used: i64) {
        self.usage.lock().used = used;
    }
}

impl MemorySource for StubMemory {
    fn usage(&self) -> MemoryUsage {
        *self.usage.lock()
    }
}

pub struct StubThreads {
    pub count: AtomicI64,
    pub peak: AtomicI64,
    pub daemon: AtomicI64,
}

impl StubThreads {
    pub fn new(count: i64, peak: i64, daemon: i64) -> Arc<Self> {
        Arc::new(Self {
            count: AtomicI64::new(count),
            peak: AtomicI64::new(peak),
            daemon: AtomicI64::new(daemon),
        })
    }
}

impl ThreadSource for StubThreads {
    fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
    fn peak_count(&self) -> i64 {
        self.peak.load(Ordering::Relaxed)
    }
    fn daemon_count(&self) -> i64 {
        self.daemon.load(Ordering::Relaxed)
    }
}

pub struct StubRuntimeInfo {
    pub uptime: AtomicI64,
    pub start_time: i64,
    pub compiler: Option<String>,
}

impl StubRuntimeInfo {
    pub fn new(uptime: i64, start_time: i64, compiler: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            uptime: AtomicI64::new(uptime),
            start_time,
            compiler: compiler.map(str::to_string),
        })
    }

    pub fn advance_uptime(&self, millis: i64) {
        self.uptime.fetch_add(millis, Ordering::Relaxed);
    }
}

impl RuntimeSource for StubRuntimeInfo {
    fn uptime_millis(&self) -> i64 {
        self.uptime.load(Ordering::Relaxed)
    }
    fn start_time_millis(&self) -> i64 {
        self.start_time
    }
    fn jit_compiler(&self) -> Option<String> {
        self.compiler.clone()
    }
}

pub struct StubOs {
    pub cpus: i64,
    pub fds: Option<(i64, i64)>, // (open, limit)
}

impl StubOs {
    pub fn new(cpus: i64, fds: Option<(i64, i64)>) -> Arc<Self> {
        Arc::new(Self { cpus, fds })
    }
}

impl OsSource for StubOs {
    fn available_processors(&self) -> i64 {
        self.cpus
    }
    fn open_fd_count(&self) -> Option<i64> {
        self.fds.map(|(open, _)| open)
    }
    fn max_fd_count(&self) -> Option<i64> {
        self.fds.map(|(_, limit)| limit)
    }
}

pub struct StubCompilation {
    pub time_millis: Option<i64>,
}

impl StubCompilation {
    pub fn new(time_millis: Option<i64>) -> Arc<Self> {
        Arc::new(Self { time_millis })
    }
}

impl CompilationSource for StubCompilation {
    fn total_time_millis(&self) -> Option<i64> {
        self.time_millis
    }
}

pub struct StubClassLoading {
    pub loaded: AtomicI64,
    pub unloaded: AtomicI64,
}

impl StubClassLoading {
    pub fn new(loaded: i64, unloaded: i64) -> Arc<Self> {
        Arc::new(Self {
            loaded: AtomicI64::new(loaded),
            unloaded: AtomicI64::new(unloaded),
        })
    }

    pub fn load_classes(&self, n: i64) {
        self.loaded.fetch_add(n, Ordering::Relaxed);
    }
}

impl ClassLoadingSource for StubClassLoading {
    fn total_loaded(&self) -> i64 {
        self.loaded.load(Ordering::Relaxed)
    }
    fn total_unloaded(&self) -> i64 {
        self.unloaded.load(Ordering::Relaxed)
    }
    fn currently_loaded(&self) -> i64 {
        self.total_loaded() - self.total_unloaded()
    }
}

pub struct StubMemoryPool {
    name: String,
    usage: Mutex<Option<MemoryUsage>>,
    post_gc: Mutex<Option<MemoryUsage>>,
}

impl StubMemoryPool {
    pub fn new(name: &str, usage: Option<MemoryUsage>, post_gc: Option<MemoryUsage>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            usage: Mutex::new(usage),
            post_gc: Mutex::new(post_gc),
        })
    }

    pub fn set_usage(&self, usage: Option<MemoryUsage>) {
        *self.usage.lock() = usage;
    }
}

impl MemoryPoolSource for StubMemoryPool {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn usage(&self) -> Option<MemoryUsage> {
        *self.usage.lock()
    }
    fn post_gc_usage(&self) -> Option<MemoryUsage> {
        *self.post_gc.lock()
    }
}

pub struct StubBufferPool {
    pub name: String,
    pub count: i64,
    pub used: i64,
    pub capacity: i64,
}

impl StubBufferPool {
    pub fn new(name: &str, count: i64, used: i64, capacity: i64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            count,
            used,
            capacity,
        })
    }
}

impl BufferPoolSource for StubBufferPool {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn count(&self) -> i64 {
        self.count
    }
    fn used_bytes(&self) -> i64 {
        self.used
    }
    fn capacity_bytes(&self) -> i64 {
        self.capacity
    }
}

pub struct StubGcCollector {
    name: String,
    pub cycles: AtomicI64,
    pub time_millis: AtomicI64,
}

impl StubGcCollector {
    pub fn new(name: &str, cycles: i64, time_millis: i64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cycles: AtomicI64::new(cycles),
            time_millis: AtomicI64::new(time_millis),
        })
    }

    /// Simulate a collection cycle.
    pub fn collect(&self, millis: i64) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.time_millis.fetch_add(millis, Ordering::Relaxed);
    }
}

impl GcCollectorSource for StubGcCollector {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn collection_count(&self) -> i64 {
        self.cycles.load(Ordering::Relaxed)
    }
    fn collection_time_millis(&self) -> i64 {
        self.time_millis.load(Ordering::Relaxed)
    }
}
