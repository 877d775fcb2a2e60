use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use notifykit_bus::{Bus, Payload};
use parking_lot::Mutex;

#[test]
fn test_concurrent_registration_unique_tokens() {
    let bus = Bus::new();
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bus = bus.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..100)
                    .map(|_| bus.observe(None, None, |_| {}))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut tokens = HashSet::new();
    for h in handles {
        for t in h.join().unwrap() {
            assert!(tokens.insert(t));
        }
    }
    assert_eq!(tokens.len(), 800);
    assert_eq!(bus.observer_count(), 800);
}

#[test]
fn test_concurrent_post_and_remove() {
    let bus = Bus::new();
    let stable = Arc::new(AtomicUsize::new(0));
    let s = stable.clone();
    bus.observe(Some("N"), None, move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });

    let churn: Vec<_> = (0..200).map(|_| bus.observe(Some("N"), None, |_| {})).collect();
    let churn = Arc::new(Mutex::new(churn));

    let posters: Vec<_> = (0..4)
        .map(|_| {
            let bus = bus.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    bus.post("N", None, Payload::empty());
                }
            })
        })
        .collect();

    let remover = {
        let bus = bus.clone();
        let churn = churn.clone();
        thread::spawn(move || {
            while let Some(token) = churn.lock().pop() {
                bus.remove_observer(&token);
            }
        })
    };

    for p in posters {
        p.join().unwrap();
    }
    remover.join().unwrap();

    assert_eq!(stable.load(Ordering::SeqCst), 1000);
    assert_eq!(bus.observer_count(), 1);
}

#[test]
fn test_removed_observer_never_fires_after_removal_returns() {
    let bus = Bus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let token = bus.observe(Some("N"), None, move |_| {
        h.fetch_add(1, Ordering::SeqCst);
    });

    let poster = {
        let bus = bus.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                bus.post("N", None, Payload::empty());
            }
        })
    };

    thread::yield_now();
    bus.remove_observer(&token);
    let after_removal = hits.load(Ordering::SeqCst);
    poster.join().unwrap();

    // at most one in-flight post may still deliver after removal returns
    assert!(hits.load(Ordering::SeqCst) <= after_removal + 1);
}
