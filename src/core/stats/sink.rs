use std::sync::{Arc, Weak};

use super::schema::ExpressionSchema;

/// Zero-argument read function behind a gauge. Re-queries the live
/// source on every invocation; must be safe to call concurrently.
pub type ReadFn = dyn Fn() -> f64 + Send + Sync;

/// Handle to a registered gauge.
///
/// Owns the read closure. Backends keep only a `Weak` to it, so a gauge
/// whose handle is dropped disappears from subsequent scrapes; the
/// registry retains every handle it creates for exactly this reason.
#[derive(Clone)]
pub struct Gauge {
    path: Arc<[String]>,
    read: Arc<ReadFn>,
}

impl Gauge {
    /// Path segments of this gauge, root scope first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Dotted metric name, e.g. `jvm.heap.used`.
    pub fn name(&self) -> String {
        self.path.join(".")
    }

    /// Invoke the read closure.
    pub fn read(&self) -> f64 {
        (*self.read)()
    }
}

impl std::fmt::Debug for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gauge").field("path", &self.name()).finish()
    }
}

/// Trait for metrics-sink backends.
///
/// Implementations store the weak read handle; they must not upgrade it
/// into long-lived ownership. Counter-like marking and expression
/// registration are optional capabilities and default to no-ops.
pub trait SinkBackend: Send + Sync {
    /// Record a newly created gauge. `read` is weak by contract.
    fn install(&self, path: &[String], read: Weak<ReadFn>);

    /// Hint that the gauge at `path` carries a monotonically
    /// non-decreasing series.
    fn mark_counter_like(&self, _path: &[String]) {}

    /// Attach cosmetic metadata referencing already-registered gauges.
    /// Purely descriptive; numeric gauges never depend on it.
    fn register_expression(&self, _schema: ExpressionSchema) {}
}

/// Cheaply-cloneable scoping handle over a sink backend.
#[derive(Clone)]
pub struct StatsSink {
    backend: Arc<dyn SinkBackend>,
    path: Vec<String>,
}

impl StatsSink {
    pub fn new(backend: Arc<dyn SinkBackend>) -> Self {
        Self {
            backend,
            path: Vec::new(),
        }
    }

    /// Derive a sink one namespace level deeper.
    pub fn scope(&self, segment: &str) -> StatsSink {
        let mut path = self.path.clone();
        path.push(segment.to_string());
        StatsSink {
            backend: Arc::clone(&self.backend),
            path,
        }
    }

    /// Path segments this sink prefixes onto gauge names.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Register a gauge under this scope and return its handle.
    ///
    /// The backend receives only a weak reference to the read closure;
    /// the returned handle is the sole owner and must be kept alive for
    /// as long as the gauge should stay scrapeable.
    pub fn add_gauge<F>(&self, name: &str, read: F) -> Gauge
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        let mut path = self.path.clone();
        path.push(name.to_string());
        let read: Arc<ReadFn> = Arc::new(read);
        self.backend.install(&path, Arc::downgrade(&read));
        Gauge {
            path: path.into(),
            read,
        }
    }

    /// Mark a gauge's series as counter-like (monotonic).
    pub fn mark_counter_like(&self, gauge: &Gauge) {
        self.backend.mark_counter_like(gauge.path());
    }

    /// Register a composite expression with the backend.
    pub fn register_expression(&self, schema: ExpressionSchema) {
        self.backend.register_expression(schema);
    }
}
