use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use notifykit_bus::{Bus, ObserverToken, Payload};
use parking_lot::Mutex;

use crate::common::Recorder;

#[test]
fn test_handler_can_post() {
    let bus = Bus::new();
    let rec = Recorder::new();
    rec.observe(&bus, "echo", Some("echo"), None);

    let b = bus.clone();
    bus.observe(Some("ping"), None, move |_| {
        b.post("echo", None, Payload::empty());
    });

    bus.post("ping", None, Payload::empty());
    assert_eq!(rec.hits(), vec!["echo"]);
}

#[test]
fn test_handler_can_remove_itself() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<ObserverToken>>> = Arc::new(Mutex::new(None));

    let (b, h, s) = (bus.clone(), hits.clone(), slot.clone());
    let token = bus.observe(Some("once"), None, move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = s.lock().take() {
            b.remove_observer(&token);
        }
    });
    *slot.lock() = Some(token);

    bus.post("once", None, Payload::empty());
    bus.post("once", None, Payload::empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(bus.is_empty());
}

#[test]
fn test_removal_during_post_uses_snapshot() {
    let bus = Bus::new();
    let rec = Recorder::new();
    let victim_slot: Arc<Mutex<Option<ObserverToken>>> = Arc::new(Mutex::new(None));

    let (b, v) = (bus.clone(), victim_slot.clone());
    bus.observe(Some("N"), None, move |_| {
        if let Some(token) = *v.lock() {
            b.remove_observer(&token);
        }
    });
    let victim = rec.observe(&bus, "victim", Some("N"), None);
    *victim_slot.lock() = Some(victim);

    // the first post already captured the victim
    bus.post("N", None, Payload::empty());
    assert_eq!(rec.count("victim"), 1);

    bus.post("N", None, Payload::empty());
    assert_eq!(rec.count("victim"), 1);
}

#[test]
fn test_observer_added_during_post_waits_for_next_post() {
    let bus = Bus::new();
    let rec = Recorder::new();

    let (b, r) = (bus.clone(), rec.clone());
    let added = Arc::new(AtomicUsize::new(0));
    let a = added.clone();
    bus.observe(Some("N"), None, move |_| {
        if a.fetch_add(1, Ordering::SeqCst) == 0 {
            r.observe(&b, "late", Some("N"), None);
        }
    });

    bus.post("N", None, Payload::empty());
    assert_eq!(rec.count("late"), 0);

    bus.post("N", None, Payload::empty());
    assert_eq!(rec.count("late"), 1);
}

#[test]
fn test_queued_handler_can_post_and_drain_does_not_deadlock() {
    let bus = Bus::new();
    let rec = Recorder::new();
    rec.observe(&bus, "followup", Some("followup"), None);

    let b = bus.clone();
    bus.observe_queued(Some("start"), None, move |_| {
        let b = b.clone();
        async move {
            b.post("followup", None, Payload::empty());
            // waiting on our own queue must not hang
            b.drain_blocking();
        }
    });

    bus.post("start", None, Payload::empty());
    bus.drain_blocking();
    assert_eq!(rec.count("followup"), 1);
}

#[test]
fn test_queued_handler_awaiting_drain_keeps_queue_running() {
    let bus = Bus::new();
    let later_ran = Arc::new(AtomicBool::new(false));

    let b = bus.clone();
    bus.observe_queued(Some("start"), None, move |_| {
        let b = b.clone();
        async move {
            b.drain().await;
        }
    });
    let l = later_ran.clone();
    bus.observe_queued(Some("later"), None, move |_| {
        let l = l.clone();
        async move {
            l.store(true, Ordering::SeqCst);
        }
    });

    bus.post("start", None, Payload::empty());
    bus.post("later", None, Payload::empty());
    bus.drain_blocking();
    assert!(later_ran.load(Ordering::SeqCst));
}
