use std::sync::Arc;

use jvmstats::{ExpressionSchema, InMemoryStats, StatsSink};

#[test]
fn test_nested_scopes_compose_paths() {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());

    let gauge = sink.scope("jvm").scope("mem").scope("current").add_gauge("used", || 7.0);
    assert_eq!(gauge.name(), "jvm.mem.current.used");
    assert_eq!(backend.scrape().value("jvm.mem.current.used"), Some(7.0));
}

#[test]
fn test_backend_holds_only_weak_references() {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());

    let kept = sink.add_gauge("kept", || 1.0);
    let dropped = sink.add_gauge("dropped", || 2.0);
    drop(dropped);

    // Without a retained handle the gauge silently vanishes from the
    // scrape; this is the failure mode the registry's retention
    // collection exists to prevent.
    let report = backend.scrape();
    assert!(report.contains("kept"));
    assert!(!report.contains("dropped"));
    drop(kept);
}

#[test]
fn test_duplicate_paths_are_permitted() {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());

    let _a = sink.add_gauge("dup", || 1.0);
    let _b = sink.add_gauge("dup", || 2.0);

    let values: Vec<f64> = backend
        .scrape()
        .samples
        .iter()
        .filter(|s| s.name == "dup")
        .map(|s| s.value)
        .collect();
    assert_eq!(values, [1.0, 2.0]);
}

#[test]
fn test_expressions_are_cosmetic_metadata() {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());

    let gauge = sink.scope("jvm").add_gauge("uptime", || 100.0);
    sink.register_expression(
        ExpressionSchema::new("jvm_uptime", "Time since start")
            .with_unit("milliseconds")
            .with_label("component", "runtime")
            .referencing(&gauge),
    );

    let expressions = backend.expressions();
    assert_eq!(expressions.len(), 1);
    assert_eq!(expressions[0].gauge_names, ["jvm.uptime"]);
    // The numeric gauge is unaffected by the expression's existence.
    assert_eq!(backend.scrape().value("jvm.uptime"), Some(100.0));
}

#[test]
fn test_concurrent_reads_are_safe() {
    let backend = Arc::new(InMemoryStats::new());
    let sink = StatsSink::new(backend.clone());
    let gauge = Arc::new(sink.add_gauge("shared", || 3.0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gauge = Arc::clone(&gauge);
            let backend = Arc::clone(&backend);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(gauge.read(), 3.0);
                    assert_eq!(backend.scrape().value("shared"), Some(3.0));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
