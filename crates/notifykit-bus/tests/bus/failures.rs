use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use notifykit_bus::{Bus, Handler, HandlerError, Payload};

use crate::common::Recorder;

#[test]
fn test_failing_inline_observer_is_isolated() {
    let bus = Bus::new();
    let rec = Recorder::new();
    rec.observe(&bus, "before", Some("N"), None);
    let bad = bus.add_observer(
        Some("N"),
        None,
        Handler::try_inline(|_| Err(HandlerError::failed("disk full"))).named("writer"),
    );
    rec.observe(&bus, "after", Some("N"), None);

    let report = bus.post("N", None, Payload::empty());
    assert_eq!(rec.hits(), vec!["before", "after"]);
    assert_eq!(report.invoked, 3);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.token, bad);
    assert_eq!(failure.observer, "writer");
    assert_eq!(failure.error.as_message(), "failed: disk full");
    assert!(!report.is_clean());
}

#[test]
fn test_panicking_inline_observer_is_isolated() {
    let bus = Bus::new();
    let rec = Recorder::new();
    bus.observe(Some("N"), None, |_| panic!("observer exploded"));
    rec.observe(&bus, "survivor", Some("N"), None);

    let report = bus.post("N", None, Payload::empty());
    assert_eq!(rec.hits(), vec!["survivor"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_panic());
    assert!(report.failures[0]
        .error
        .to_string()
        .contains("observer exploded"));

    // the registry is intact
    assert_eq!(bus.observer_count(), 2);
    let again = bus.post("N", None, Payload::empty());
    assert_eq!(again.failures.len(), 1);
    assert_eq!(rec.count("survivor"), 2);
}

#[test]
fn test_failing_queued_observer_does_not_stop_queue() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.add_observer(
        None,
        None,
        Handler::try_queued(|_| async { Err::<(), _>(HandlerError::failed("nope")) }),
    );
    bus.observe_queued(None, None, |_| async {
        panic!("queued boom");
    });
    let h = hits.clone();
    bus.observe_queued(None, None, move |_| {
        let h = h.clone();
        async move {
            h.fetch_add(1, Ordering::SeqCst);
        }
    });

    let report = bus.post("N", None, Payload::empty());
    assert_eq!(report.enqueued, 3);
    assert!(report.is_clean());
    bus.post("N", None, Payload::empty());
    bus.drain_blocking();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_anyhow_errors_convert() {
    let bus = Bus::new();
    bus.add_observer(
        None,
        None,
        Handler::try_inline(|_| Err(anyhow::anyhow!("context lost").into())),
    );
    let report = bus.post("N", None, Payload::empty());
    assert_eq!(report.failures[0].error.as_label(), "handler_error");
}
