use std::sync::Arc;

use jvmstats::core::runtime::stubs::*;
use jvmstats::core::runtime::{ManagementBeans, MemoryUsage};
use jvmstats::platform::{DiagnosticCounters, MapCounters, NullCounters};
use jvmstats::{normalize_name, register, retained_gauge_paths, InMemoryStats, StatsSink};

fn new_sink() -> (Arc<InMemoryStats>, StatsSink) {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());
    (backend, sink)
}

fn usage(committed: i64, max: i64, used: i64) -> MemoryUsage {
    MemoryUsage {
        committed,
        max,
        used,
    }
}

fn full_beans() -> ManagementBeans {
    ManagementBeans {
        heap: Some(StubMemory::new(512, 1024, 300)),
        non_heap: Some(StubMemory::new(64, -1, 48)),
        threads: Some(StubThreads::new(10, 14, 3)),
        runtime: Some(StubRuntimeInfo::new(
            5_000,
            1_700_000_000_000,
            Some("HotSpot 64-Bit Tiered Compilers"),
        )),
        os: Some(StubOs::new(8, Some((64, 1024)))),
        compilation: Some(StubCompilation::new(Some(1234))),
        class_loading: Some(StubClassLoading::new(5000, 100)),
        memory_pools: vec![
            StubMemoryPool::new(
                "PS Eden Space",
                Some(usage(100, 200, 80)),
                Some(usage(100, 200, 5)),
            ),
            StubMemoryPool::new("PS Old Gen", Some(usage(400, 800, 350)), None),
        ],
        buffer_pools: vec![
            StubBufferPool::new("direct", 4, 4096, 8192),
            StubBufferPool::new("mapped", 0, 0, 0),
        ],
        gc_collectors: vec![
            StubGcCollector::new("PS Scavenge", 10, 250),
            StubGcCollector::new("PS MarkSweep", 2, 400),
        ],
    }
}

fn eden_counters() -> Arc<MapCounters> {
    let counters = Arc::new(MapCounters::new());
    counters.set("sun.gc.collector.0.invocations", 10);
    counters.set("sun.gc.generation.0.space.0.capacity", 1_000);
    counters.set("sun.gc.generation.0.space.0.used", 250);
    counters
}

#[test]
fn test_full_registration_produces_expected_gauges() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), Arc::new(NullCounters));
    let report = backend.scrape();

    assert_eq!(report.value("jvm.heap.committed"), Some(512.0));
    assert_eq!(report.value("jvm.heap.max"), Some(1024.0));
    assert_eq!(report.value("jvm.heap.used"), Some(300.0));
    assert_eq!(report.value("jvm.nonheap.max"), Some(-1.0));
    assert_eq!(report.value("jvm.thread.count"), Some(10.0));
    assert_eq!(report.value("jvm.thread.peak_count"), Some(14.0));
    assert_eq!(report.value("jvm.thread.daemon_count"), Some(3.0));
    assert_eq!(report.value("jvm.uptime"), Some(5_000.0));
    assert_eq!(report.value("jvm.start_time"), Some(1_700_000_000_000.0));
    assert_eq!(report.value("jvm.num_cpus"), Some(8.0));
    assert_eq!(report.value("jvm.fd_count"), Some(64.0));
    assert_eq!(report.value("jvm.fd_limit"), Some(1024.0));
    assert_eq!(report.value("jvm.compilation.time_msec"), Some(1234.0));
    assert_eq!(report.value("jvm.classes.total_loaded"), Some(5000.0));
    assert_eq!(report.value("jvm.classes.total_unloaded"), Some(100.0));
    assert_eq!(report.value("jvm.classes.current_loaded"), Some(4900.0));
    assert_eq!(report.value("jvm.mem.buffer.direct.count"), Some(4.0));
    assert_eq!(report.value("jvm.mem.buffer.direct.used"), Some(4096.0));
    assert_eq!(report.value("jvm.mem.buffer.direct.max"), Some(8192.0));
    assert_eq!(report.value("jvm.gc.PS_Scavenge.cycles"), Some(10.0));
    assert_eq!(report.value("jvm.gc.PS_Scavenge.msec"), Some(250.0));
    assert_eq!(report.value("jvm.gc.cycles"), Some(12.0));
    assert_eq!(report.value("jvm.gc.msec"), Some(650.0));
}

#[test]
fn test_reads_are_idempotent_without_source_activity() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), Arc::new(NullCounters));

    let first = backend.scrape();
    let second = backend.scrape();
    for (a, b) in first.samples.iter().zip(second.samples.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.value, b.value, "gauge {} changed between reads", a.name);
    }
}

#[test]
fn test_pool_names_are_normalized_in_paths() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), Arc::new(NullCounters));
    let report = backend.scrape();

    assert_eq!(normalize_name("PS Old Gen"), "PS_Old_Gen");
    assert!(report.contains("jvm.mem.current.PS_Old_Gen.used"));
    assert!(report.contains("jvm.mem.current.PS_Eden_Space.max"));
    assert!(!report.contains("jvm.mem.current.PS Old Gen.used"));
}

#[test]
fn test_gc_aggregate_excludes_negative_sentinels() {
    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        gc_collectors: vec![
            StubGcCollector::new("Copy", 3, 120),
            StubGcCollector::new("Shenandoah Pauses", -1, -1),
        ],
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    let report = backend.scrape();

    // Excluded from the sum entirely, not counted as 0.
    assert_eq!(report.value("jvm.gc.cycles"), Some(3.0));
    assert_eq!(report.value("jvm.gc.msec"), Some(120.0));
    // The raw sentinel still passes through per collector.
    assert_eq!(report.value("jvm.gc.Shenandoah_Pauses.cycles"), Some(-1.0));
    assert_eq!(report.value("jvm.gc.Shenandoah_Pauses.msec"), Some(-1.0));
}

#[test]
fn test_pool_aggregate_treats_untracked_usage_as_zero() {
    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        memory_pools: vec![
            StubMemoryPool::new("Tracked", Some(usage(0, 0, 100)), Some(usage(0, 0, 40))),
            StubMemoryPool::new("Untracked", None, None),
        ],
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    let report = backend.scrape();

    assert_eq!(report.value("jvm.mem.current.used"), Some(100.0));
    assert_eq!(report.value("jvm.mem.postGC.used"), Some(40.0));
    // The untracked pool gets no per-pool gauges at all.
    assert!(!report.contains("jvm.mem.current.Untracked.used"));
    assert!(!report.contains("jvm.mem.postGC.Untracked.used"));
}

#[test]
fn test_eden_gauge_conditional_on_tracking() {
    let (backend, sink) = new_sink();
    register(&sink, &ManagementBeans::empty(), Arc::new(NullCounters));
    assert!(!backend.scrape().contains("jvm.mem.allocations.eden.bytes"));

    let (backend, sink) = new_sink();
    register(&sink, &ManagementBeans::empty(), eden_counters());
    let value = backend
        .scrape()
        .value("jvm.mem.allocations.eden.bytes")
        .expect("eden gauge registered");
    assert_eq!(value, (10 * 1_000 + 250) as f64);
    assert!(value >= 0.0);
}

#[test]
fn test_registration_survives_bare_runtime() {
    let (backend, sink) = new_sink();
    // No beans, no counters: nothing optional exists at all.
    register(&sink, &ManagementBeans::empty(), Arc::new(NullCounters));
    let report = backend.scrape();

    assert!(!report.contains("jvm.heap.used"));
    assert!(!report.contains("jvm.fd_count"));
    assert!(!report.contains("jvm.compilation.time_msec"));
    assert!(!report.contains("jvm.mem.current.used"));
    assert!(!report.contains("jvm.gc.cycles"));

    // Safepoint readings degrade to zero rather than disappearing.
    assert_eq!(report.value("jvm.safepoint.count"), Some(0.0));
    assert_eq!(report.value("jvm.safepoint.sync_time_millis"), Some(0.0));
    assert_eq!(report.value("jvm.safepoint.total_time_millis"), Some(0.0));
    assert_eq!(report.value("jvm.application_time_millis"), Some(0.0));
    assert_eq!(report.value("jvm.tenuring_threshold"), Some(0.0));
}

#[test]
fn test_monotonic_counters_never_decrease() {
    let (backend, sink) = new_sink();
    let scavenge = StubGcCollector::new("Scavenge", 1, 10);
    let classes = StubClassLoading::new(100, 0);
    let beans = ManagementBeans {
        class_loading: Some(classes.clone()),
        gc_collectors: vec![scavenge.clone()],
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));

    let before = backend.scrape();
    scavenge.collect(25);
    scavenge.collect(5);
    classes.load_classes(42);
    let after = backend.scrape();

    for name in [
        "jvm.gc.Scavenge.cycles",
        "jvm.gc.Scavenge.msec",
        "jvm.gc.cycles",
        "jvm.gc.msec",
        "jvm.classes.total_loaded",
    ] {
        assert!(
            after.value(name).unwrap() >= before.value(name).unwrap(),
            "{} decreased",
            name
        );
    }
    assert_eq!(after.value("jvm.gc.Scavenge.cycles"), Some(3.0));
}

#[test]
fn test_every_created_gauge_is_retained() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), eden_counters());

    let retained = retained_gauge_paths();
    for sample in backend.scrape().samples {
        assert!(
            retained.contains(&sample.name),
            "gauge {} not in retention collection",
            sample.name
        );
    }
}

#[test]
fn test_gc_gauges_marked_counter_like() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), eden_counters());
    let report = backend.scrape();

    for name in [
        "jvm.gc.PS_Scavenge.cycles",
        "jvm.gc.PS_Scavenge.msec",
        "jvm.gc.cycles",
        "jvm.gc.msec",
        "jvm.mem.allocations.eden.bytes",
    ] {
        let sample = report.samples.iter().find(|s| s.name == name).unwrap();
        assert!(sample.counter_like, "{} not marked counter-like", name);
    }
    // Instantaneous gauges stay plain.
    let heap = report.samples.iter().find(|s| s.name == "jvm.heap.used").unwrap();
    assert!(!heap.counter_like);
}

#[test]
fn test_composite_expressions_registered() {
    let (backend, sink) = new_sink();
    register(&sink, &full_beans(), Arc::new(NullCounters));
    let expressions = backend.expressions();

    let uptime = expressions.iter().find(|e| e.name == "jvm_uptime").unwrap();
    assert_eq!(uptime.gauge_names, ["jvm.uptime"]);
    assert_eq!(uptime.unit.as_deref(), Some("milliseconds"));

    let per_collector = expressions
        .iter()
        .find(|e| e.name == "jvm_gc_PS_Scavenge_cycles")
        .unwrap();
    assert!(per_collector
        .labels
        .contains(&("gc_pool".to_string(), "PS Scavenge".to_string())));
    assert!(!per_collector.description.is_empty());

    assert!(expressions.iter().any(|e| e.name == "jvm_gc_cycles"));
    assert!(expressions.iter().any(|e| e.name == "jvm_gc_msec"));
}

#[test]
fn test_compiler_flag_reflects_runtime_property() {
    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        runtime: Some(StubRuntimeInfo::new(1, 1, Some("GraalVM Compiler"))),
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    assert_eq!(backend.scrape().value("jvm.compiler.graal"), Some(1.0));

    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        runtime: Some(StubRuntimeInfo::new(1, 1, None)),
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    assert_eq!(backend.scrape().value("jvm.compiler.graal"), Some(0.0));
}

#[test]
fn test_unsupported_compilation_time_is_skipped() {
    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        compilation: Some(StubCompilation::new(None)),
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    assert!(!backend.scrape().contains("jvm.compilation.time_msec"));
}

#[test]
fn test_fd_gauges_omitted_without_accounting() {
    let (backend, sink) = new_sink();
    let beans = ManagementBeans {
        os: Some(StubOs::new(4, None)),
        ..ManagementBeans::empty()
    };
    register(&sink, &beans, Arc::new(NullCounters));
    let report = backend.scrape();

    assert_eq!(report.value("jvm.num_cpus"), Some(4.0));
    assert!(!report.contains("jvm.fd_count"));
    assert!(!report.contains("jvm.fd_limit"));
}

#[test]
fn test_metaspace_capacity_conditional_on_counter() {
    let (backend, sink) = new_sink();
    let counters = Arc::new(MapCounters::new());
    counters.set("sun.gc.metaspace.maxCapacity", 268_435_456);
    register(&sink, &ManagementBeans::empty(), counters.clone());
    assert_eq!(
        backend.scrape().value("jvm.mem.metaspace.max_capacity"),
        Some(268_435_456.0)
    );
    assert!(counters.lookup("sun.gc.metaspace.maxCapacity").is_some());

    let (backend, sink) = new_sink();
    register(&sink, &ManagementBeans::empty(), Arc::new(NullCounters));
    assert!(!backend.scrape().contains("jvm.mem.metaspace.max_capacity"));
}
