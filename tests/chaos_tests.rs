//! Concurrency and fault-injection tests for the save path.
//!
//! Backends here block, fail or panic on purpose so every test observes a
//! fixed interleaving instead of relying on timing luck.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use common::{
    FailingBackend, GatedBackend, LookupFailingBackend, PanicOnceBackend, RendezvousBackend, WAIT,
};
use itemgate::{InMemoryItemBackend, SaveOrchestrator, SaveStatus};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

#[test]
fn test_many_concurrent_same_content_single_winner() {
    let threads = 12;
    let backend = Arc::new(GatedBackend::new());
    let orchestrator = Arc::new(SaveOrchestrator::new(backend.clone()));
    let barrier = Arc::new(Barrier::new(threads));
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            thread::spawn(move || {
                barrier.wait();
                tx.send(orchestrator.save("contended").unwrap()).unwrap();
            })
        })
        .collect();

    // The winner is parked in persist, so everyone else must have collided.
    backend.wait_for_entered(1);
    for _ in 1..threads {
        let result = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(result.status, SaveStatus::Collision);
        assert!(!result.success);
    }

    backend.open();
    let winner = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(winner.status, SaveStatus::Saved);

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(backend.entered(), 1);
    assert_eq!(backend.persists(), 1);
    assert_eq!(orchestrator.in_flight(), 0);
}

#[test]
fn test_distinct_content_overlaps_in_backend() {
    let backend = Arc::new(RendezvousBackend::new(2));
    let orchestrator = SaveOrchestrator::new(backend.clone());

    let results = thread::scope(|s| {
        let a = s.spawn(|| orchestrator.save("a").unwrap());
        let b = s.spawn(|| orchestrator.save("b").unwrap());
        [a.join().unwrap(), b.join().unwrap()]
    });

    assert!(results.iter().all(|r| r.status == SaveStatus::Saved));
    assert_eq!(backend.peak(), 2, "distinct saves never ran in parallel");
}

#[test]
fn test_persist_error_releases_reservation() {
    let backend = Arc::new(FailingBackend::new());
    let orchestrator = SaveOrchestrator::new(backend.clone());

    for attempt in 1..=3 {
        let err = orchestrator.save("x").unwrap_err();
        assert!(err.to_string().contains("database is locked"));
        assert!(!orchestrator.is_in_flight("x"));
        assert_eq!(backend.persists.load(Ordering::SeqCst), attempt);
    }
}

#[test]
fn test_lookup_error_releases_reservation() {
    let backend = Arc::new(LookupFailingBackend::new());
    let orchestrator = SaveOrchestrator::new(backend.clone());

    let err = orchestrator.save("x").unwrap_err();
    assert!(err.to_string().contains("no such table: items"));
    assert!(!orchestrator.is_in_flight("x"));
    assert_eq!(orchestrator.in_flight(), 0);
    assert!(orchestrator.list_all().unwrap().is_empty());

    // Still failing: an error again, never a stale-reservation collision.
    assert!(orchestrator.save("x").is_err());

    backend.recover();
    let retry = orchestrator.save("x").unwrap();
    assert_eq!(retry.status, SaveStatus::Saved);
}

#[test]
fn test_backend_panic_releases_reservation() {
    let orchestrator = Arc::new(SaveOrchestrator::new(Arc::new(PanicOnceBackend::new())));

    let crashed = {
        let orchestrator = Arc::clone(&orchestrator);
        thread::spawn(move || orchestrator.save("x")).join()
    };
    assert!(crashed.is_err());
    assert!(!orchestrator.is_in_flight("x"));
    assert_eq!(orchestrator.in_flight(), 0);

    let retry = orchestrator.save("x").unwrap();
    assert_eq!(retry.status, SaveStatus::Saved);
}

#[test]
fn test_mixed_workload_persists_each_content_once() {
    let backend = Arc::new(
        InMemoryItemBackend::new().with_persist_delay(Duration::from_millis(2)),
    );
    let orchestrator = Arc::new(SaveOrchestrator::new(backend));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let orchestrator = Arc::clone(&orchestrator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..40)
                    .map(|i| {
                        let content = format!("item-{}", (i + t) % 10);
                        orchestrator.save(&content).unwrap()
                    })
                    .filter(|r| r.success)
                    .count()
            })
        })
        .collect();

    let saved: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let items = orchestrator.list_all().unwrap();
    let unique: HashSet<_> = items.iter().map(|i| i.content.as_str()).collect();
    assert_eq!(saved, 10);
    assert_eq!(items.len(), 10);
    assert_eq!(unique.len(), 10);
    assert_eq!(orchestrator.in_flight(), 0);
}
