use std::collections::HashSet;

use notifykit_bus::{default_bus, Bus};

#[test]
fn test_default_bus_identity_stable() {
    let a = default_bus();
    let b = default_bus();
    assert_eq!(a, b);
    assert_eq!(a.id(), b.id());
    assert_eq!(a.delivery_queue(), b.delivery_queue());
}

#[test]
fn test_new_buses_are_distinct() {
    let a = Bus::new();
    let b = Bus::new();
    assert_ne!(a, b);
    assert_ne!(a.id(), b.id());
    assert_ne!(a, default_bus());
}

#[test]
fn test_empty_buses_still_unequal() {
    let a = Bus::new();
    let b = Bus::new();
    assert!(a.is_empty() && b.is_empty());
    assert_ne!(a, b);
}

#[test]
fn test_delivery_queues_never_shared() {
    let buses: Vec<Bus> = (0..8).map(|_| Bus::new()).collect();
    for (i, a) in buses.iter().enumerate() {
        for (j, b) in buses.iter().enumerate() {
            if i == j {
                assert_eq!(a.delivery_queue(), b.delivery_queue());
            } else {
                assert_ne!(a.delivery_queue(), b.delivery_queue());
            }
        }
    }
}

#[test]
fn test_clone_shares_registry() {
    let bus = Bus::new();
    let clone = bus.clone();
    clone.observe(None, None, |_| {});
    assert_eq!(bus.observer_count(), 1);
    assert_eq!(bus, clone);
}

#[test]
fn test_hash_follows_identity() {
    let a = Bus::new();
    let b = Bus::new();
    let set: HashSet<Bus> = [a.clone(), a.clone(), b.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&a));
    assert!(set.contains(&b));
}

#[test]
fn test_tokens_never_reused() {
    let a = Bus::new();
    let b = Bus::new();
    let mut seen = HashSet::new();
    for _ in 0..100 {
        let t = a.observe(None, None, |_| {});
        a.remove_observer(&t);
        assert!(seen.insert(t));
        assert!(seen.insert(b.observe(None, None, |_| {})));
    }
}
