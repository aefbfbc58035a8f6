//! Gauge registry.
//!
//! One synchronous registration pass over every discoverable metric
//! source. Each gauge is bound to a closure that re-queries the live
//! source on every scrape; every created handle is moved into a
//! process-lifetime retention collection so that sinks holding only
//! weak references can never lose a gauge to a dropped handle.
//!
//! A source that does not exist on the current runtime is skipped
//! silently. Registration has no failure path by design: the
//! instrumentation must not be able to take down the process it
//! instruments.

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::core::estimator::AllocationEstimator;
use crate::core::runtime::{GcCollectorSource, ManagementBeans, MemoryPoolSource, MemorySource};
use crate::core::stats::{ExpressionSchema, Gauge, StatsSink};
use crate::platform::DiagnosticCounters;

// Written only during the single registration pass, then read-only.
// Concurrent register() calls must be serialized by the caller.
static RETAINED: Lazy<Mutex<Vec<Gauge>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Replace every character outside `[A-Za-z0-9_]` with `_`, making a
/// source name safe to use as a metric path segment.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Register every gauge the runtime supports under the `jvm` scope.
///
/// Call once per process, from one thread. All gauges are live when
/// this returns; the handles are retained internally for the process
/// lifetime. Duplicate registration appends rather than replaces.
pub fn register(
    sink: &StatsSink,
    beans: &ManagementBeans,
    counters: Arc<dyn DiagnosticCounters>,
) {
    let jvm = sink.scope("jvm");
    let mem = jvm.scope("mem");

    let mut estimator = AllocationEstimator::new(mem.clone(), counters);
    estimator.start();
    let estimator = Arc::new(estimator);

    let mut gauges: Vec<Gauge> = Vec::new();

    register_memory_regions(&jvm, beans, &mut gauges);
    register_threads(&jvm, beans, &mut gauges);
    register_runtime_info(&jvm, beans, &mut gauges);
    register_os(&jvm, beans, &mut gauges);
    register_compilation(&jvm, beans, &mut gauges);
    register_class_loading(&jvm, beans, &mut gauges);
    register_memory_pools(&mem, beans, &mut gauges);
    register_buffer_pools(&mem, beans, &mut gauges);
    register_gc(&jvm, beans, &mut gauges);
    register_allocations(&jvm, &mem, &estimator, &mut gauges);

    debug!("registered {} gauges", gauges.len());
    RETAINED.lock().extend(gauges);
}

/// Dotted names of every gauge retained since process start.
pub fn retained_gauge_paths() -> Vec<String> {
    RETAINED.lock().iter().map(Gauge::name).collect()
}

/// Number of gauges retained since process start.
pub fn retained_gauge_count() -> usize {
    RETAINED.lock().len()
}

fn register_memory_regions(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    if let Some(heap) = &beans.heap {
        register_memory_region(&jvm.scope("heap"), heap, out);
    }
    if let Some(non_heap) = &beans.non_heap {
        register_memory_region(&jvm.scope("nonheap"), non_heap, out);
    }
}

fn register_memory_region(scope: &StatsSink, source: &Arc<dyn MemorySource>, out: &mut Vec<Gauge>) {
    let src = Arc::clone(source);
    out.push(scope.add_gauge("committed", move || src.usage().committed as f64));
    let src = Arc::clone(source);
    out.push(scope.add_gauge("max", move || src.usage().max as f64));
    let src = Arc::clone(source);
    out.push(scope.add_gauge("used", move || src.usage().used as f64));
}

fn register_threads(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let Some(threads) = &beans.threads else {
        return;
    };
    let scope = jvm.scope("thread");
    let src = Arc::clone(threads);
    out.push(scope.add_gauge("count", move || src.count() as f64));
    let src = Arc::clone(threads);
    out.push(scope.add_gauge("peak_count", move || src.peak_count() as f64));
    let src = Arc::clone(threads);
    out.push(scope.add_gauge("daemon_count", move || src.daemon_count() as f64));
}

fn register_runtime_info(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let Some(runtime) = &beans.runtime else {
        return;
    };

    let src = Arc::clone(runtime);
    let uptime = jvm.add_gauge("uptime", move || src.uptime_millis() as f64);
    jvm.register_expression(
        ExpressionSchema::new("jvm_uptime", "Milliseconds since the process started")
            .with_unit("milliseconds")
            .referencing(&uptime),
    );
    out.push(uptime);

    let src = Arc::clone(runtime);
    out.push(jvm.add_gauge("start_time", move || src.start_time_millis() as f64));

    // Binary flag from the runtime's compiler property, not a bean.
    let src = Arc::clone(runtime);
    out.push(jvm.scope("compiler").add_gauge("graal", move || {
        let graal = src
            .jit_compiler()
            .map(|c| c.to_ascii_lowercase().contains("graal"))
            .unwrap_or(false);
        if graal {
            1.0
        } else {
            0.0
        }
    }));
}

fn register_os(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let Some(os) = &beans.os else {
        return;
    };

    let src = Arc::clone(os);
    out.push(jvm.add_gauge("num_cpus", move || src.available_processors() as f64));

    // Capability-conditional: probed once, here.
    if os.open_fd_count().is_some() {
        let src = Arc::clone(os);
        out.push(jvm.add_gauge("fd_count", move || src.open_fd_count().unwrap_or(0) as f64));
        let src = Arc::clone(os);
        out.push(jvm.add_gauge("fd_limit", move || src.max_fd_count().unwrap_or(0) as f64));
    } else {
        debug!("no file descriptor accounting, skipping fd gauges");
    }
}

fn register_compilation(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let Some(compilation) = &beans.compilation else {
        return;
    };
    if compilation.total_time_millis().is_none() {
        debug!("compilation time monitoring unsupported, skipping");
        return;
    }
    let src = Arc::clone(compilation);
    out.push(
        jvm.scope("compilation")
            .add_gauge("time_msec", move || {
                src.total_time_millis().unwrap_or(0) as f64
            }),
    );
}

fn register_class_loading(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let Some(classes) = &beans.class_loading else {
        return;
    };
    let scope = jvm.scope("classes");
    let src = Arc::clone(classes);
    out.push(scope.add_gauge("total_loaded", move || src.total_loaded() as f64));
    let src = Arc::clone(classes);
    out.push(scope.add_gauge("total_unloaded", move || src.total_unloaded() as f64));
    let src = Arc::clone(classes);
    out.push(scope.add_gauge("current_loaded", move || src.currently_loaded() as f64));
}

fn register_memory_pools(mem: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    for pool in &beans.memory_pools {
        let name = normalize_name(&pool.name());

        // Current and post-GC usage are fetched through two separate
        // accessors; the two snapshots need not be consistent.
        if pool.usage().is_some() {
            let current = mem.scope("current").scope(&name);
            let src = Arc::clone(pool);
            out.push(current.add_gauge("used", move || {
                src.usage().map(|u| u.used).unwrap_or(0) as f64
            }));
            let src = Arc::clone(pool);
            out.push(current.add_gauge("max", move || {
                src.usage().map(|u| u.max).unwrap_or(0) as f64
            }));
        }

        if pool.post_gc_usage().is_some() {
            let src = Arc::clone(pool);
            out.push(mem.scope("postGC").scope(&name).add_gauge("used", move || {
                src.post_gc_usage().map(|u| u.used).unwrap_or(0) as f64
            }));
        }
    }

    if !beans.memory_pools.is_empty() {
        // Pools without usage tracking contribute 0, not an error.
        let pools: Vec<Arc<dyn MemoryPoolSource>> = beans.memory_pools.clone();
        out.push(mem.scope("postGC").add_gauge("used", move || {
            pools
                .iter()
                .map(|p| p.post_gc_usage().map(|u| u.used).unwrap_or(0))
                .sum::<i64>() as f64
        }));
        let pools: Vec<Arc<dyn MemoryPoolSource>> = beans.memory_pools.clone();
        out.push(mem.scope("current").add_gauge("used", move || {
            pools
                .iter()
                .map(|p| p.usage().map(|u| u.used).unwrap_or(0))
                .sum::<i64>() as f64
        }));
    }
}

fn register_buffer_pools(mem: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    for pool in &beans.buffer_pools {
        let scope = mem.scope("buffer").scope(&normalize_name(&pool.name()));
        let src = Arc::clone(pool);
        out.push(scope.add_gauge("count", move || src.count() as f64));
        let src = Arc::clone(pool);
        out.push(scope.add_gauge("used", move || src.used_bytes() as f64));
        let src = Arc::clone(pool);
        out.push(scope.add_gauge("max", move || src.capacity_bytes() as f64));
    }
}

fn register_gc(jvm: &StatsSink, beans: &ManagementBeans, out: &mut Vec<Gauge>) {
    let gc = jvm.scope("gc");

    for collector in &beans.gc_collectors {
        let raw_name = collector.name();
        let name = normalize_name(&raw_name);
        let scope = gc.scope(&name);

        // Raw values pass through even when the collector reports the
        // negative "unsupported" sentinel; only aggregates exclude it.
        let src = Arc::clone(collector);
        let cycles = scope.add_gauge("cycles", move || src.collection_count() as f64);
        gc.mark_counter_like(&cycles);
        gc.register_expression(
            ExpressionSchema::new(
                format!("jvm_gc_{}_cycles", name),
                format!("Completed {} collection cycles", raw_name),
            )
            .with_unit("count")
            .with_label("gc_pool", raw_name.clone())
            .referencing(&cycles),
        );
        out.push(cycles);

        let src = Arc::clone(collector);
        let msec = scope.add_gauge("msec", move || src.collection_time_millis() as f64);
        gc.mark_counter_like(&msec);
        gc.register_expression(
            ExpressionSchema::new(
                format!("jvm_gc_{}_msec", name),
                format!("Time spent in {} collections", raw_name),
            )
            .with_unit("milliseconds")
            .with_label("gc_pool", raw_name)
            .referencing(&msec),
        );
        out.push(msec);
    }

    if !beans.gc_collectors.is_empty() {
        // Collectors reporting a negative sentinel are excluded from
        // the sum entirely, not counted as 0.
        let collectors: Vec<Arc<dyn GcCollectorSource>> = beans.gc_collectors.clone();
        let cycles = gc.add_gauge("cycles", move || {
            collectors
                .iter()
                .map(|c| c.collection_count())
                .filter(|count| *count >= 0)
                .sum::<i64>() as f64
        });
        gc.mark_counter_like(&cycles);
        gc.register_expression(
            ExpressionSchema::new("jvm_gc_cycles", "Completed collection cycles, all collectors")
                .with_unit("count")
                .referencing(&cycles),
        );
        out.push(cycles);

        let collectors: Vec<Arc<dyn GcCollectorSource>> = beans.gc_collectors.clone();
        let msec = gc.add_gauge("msec", move || {
            collectors
                .iter()
                .map(|c| c.collection_time_millis())
                .filter(|millis| *millis >= 0)
                .sum::<i64>() as f64
        });
        gc.mark_counter_like(&msec);
        gc.register_expression(
            ExpressionSchema::new("jvm_gc_msec", "Time spent collecting, all collectors")
                .with_unit("milliseconds")
                .referencing(&msec),
        );
        out.push(msec);
    }
}

fn register_allocations(
    jvm: &StatsSink,
    mem: &StatsSink,
    estimator: &Arc<AllocationEstimator>,
    out: &mut Vec<Gauge>,
) {
    if estimator.tracking_eden() {
        let est = Arc::clone(estimator);
        let eden = mem
            .scope("allocations")
            .scope("eden")
            .add_gauge("bytes", move || est.eden() as f64);
        mem.mark_counter_like(&eden);
        out.push(eden);
    }

    if let Some(capacity) = estimator.metaspace_max_capacity() {
        debug!("metaspace capacity metadata available ({} bytes)", capacity);
        let est = Arc::clone(estimator);
        out.push(mem.scope("metaspace").add_gauge("max_capacity", move || {
            est.metaspace_max_capacity().unwrap_or(0) as f64
        }));
    }

    let safepoint = jvm.scope("safepoint");
    let est = Arc::clone(estimator);
    out.push(safepoint.add_gauge("sync_time_millis", move || {
        est.safepoint().sync_time_millis as f64
    }));
    let est = Arc::clone(estimator);
    out.push(safepoint.add_gauge("total_time_millis", move || {
        est.safepoint().total_time_millis as f64
    }));
    let est = Arc::clone(estimator);
    out.push(safepoint.add_gauge("count", move || est.safepoint().count as f64));

    // Nanos to millis via floating-point division, keeping the fraction.
    let est = Arc::clone(estimator);
    out.push(jvm.add_gauge("application_time_millis", move || {
        est.application_time_nanos() as f64 / 1_000_000.0
    }));

    let est = Arc::clone(estimator);
    out.push(jvm.add_gauge("tenuring_threshold", move || {
        est.tenuring_threshold() as f64
    }));
}
