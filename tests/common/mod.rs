//! Shared backends for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use itemgate::{Error, InMemoryItemBackend, Item, ItemBackend, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Upper bound for any wait in these tests.
pub const WAIT: Duration = Duration::from_secs(10);

/// Backend whose `persist` blocks until the test opens the gate.
pub struct GatedBackend {
    inner: InMemoryItemBackend,
    open: Mutex<bool>,
    opened: Condvar,
    entered: AtomicUsize,
    persists: AtomicUsize,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self {
            inner: InMemoryItemBackend::new(),
            open: Mutex::new(false),
            opened: Condvar::new(),
            entered: AtomicUsize::new(0),
            persists: AtomicUsize::new(0),
        }
    }

    /// Lets every blocked and future `persist` through.
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }

    /// Number of `persist` calls that have started.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    /// Number of `persist` calls that wrote an item.
    pub fn persists(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    /// Spins until `count` calls are inside `persist`.
    pub fn wait_for_entered(&self, count: usize) {
        let deadline = Instant::now() + WAIT;
        while self.entered() < count {
            assert!(Instant::now() < deadline, "timed out waiting for persist");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl ItemBackend for GatedBackend {
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        self.inner.find_by_content(content)
    }

    fn persist(&self, content: &str) -> Result<Item> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let open = self.open.lock().unwrap();
        let (open, timeout) = self
            .opened
            .wait_timeout_while(open, WAIT, |open| !*open)
            .unwrap();
        assert!(!timeout.timed_out(), "gate never opened");
        drop(open);

        self.persists.fetch_add(1, Ordering::SeqCst);
        self.inner.persist(content)
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        self.inner.list_all()
    }
}

/// Backend that rendezvouses `expected` concurrent `persist` calls.
///
/// Each call waits until `expected` calls are inside `persist` at once, so
/// the test only finishes if distinct saves really overlap.
pub struct RendezvousBackend {
    inner: InMemoryItemBackend,
    expected: usize,
    inside: AtomicUsize,
    peak: AtomicUsize,
}

impl RendezvousBackend {
    pub fn new(expected: usize) -> Self {
        Self {
            inner: InMemoryItemBackend::new(),
            expected,
            inside: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Highest number of simultaneous `persist` calls observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl ItemBackend for RendezvousBackend {
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        self.inner.find_by_content(content)
    }

    fn persist(&self, content: &str) -> Result<Item> {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let deadline = Instant::now() + WAIT;
        while self.peak() < self.expected && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        let item = self.inner.persist(content);
        self.inside.fetch_sub(1, Ordering::SeqCst);
        item
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        self.inner.list_all()
    }
}

/// Backend whose `persist` always fails.
pub struct FailingBackend {
    pub persists: AtomicUsize,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self {
            persists: AtomicUsize::new(0),
        }
    }
}

impl ItemBackend for FailingBackend {
    fn find_by_content(&self, _content: &str) -> Result<Vec<Item>> {
        Ok(Vec::new())
    }

    fn persist(&self, _content: &str) -> Result<Item> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        Err(Error::OperationFailed {
            operation: "persist_item".to_string(),
            cause: "database is locked".to_string(),
        })
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        Ok(Vec::new())
    }
}

/// Backend whose lookups fail until [`LookupFailingBackend::recover`] is called.
pub struct LookupFailingBackend {
    inner: InMemoryItemBackend,
    failing: AtomicBool,
}

impl LookupFailingBackend {
    pub fn new() -> Self {
        Self {
            inner: InMemoryItemBackend::new(),
            failing: AtomicBool::new(true),
        }
    }

    /// Lets later lookups through.
    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

impl ItemBackend for LookupFailingBackend {
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::OperationFailed {
                operation: "find_by_content".to_string(),
                cause: "no such table: items".to_string(),
            });
        }
        self.inner.find_by_content(content)
    }

    fn persist(&self, content: &str) -> Result<Item> {
        self.inner.persist(content)
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        self.inner.list_all()
    }
}

/// Backend whose first `persist` panics; later calls succeed.
pub struct PanicOnceBackend {
    inner: InMemoryItemBackend,
    panicked: AtomicBool,
}

impl PanicOnceBackend {
    pub fn new() -> Self {
        Self {
            inner: InMemoryItemBackend::new(),
            panicked: AtomicBool::new(false),
        }
    }
}

impl ItemBackend for PanicOnceBackend {
    fn find_by_content(&self, content: &str) -> Result<Vec<Item>> {
        self.inner.find_by_content(content)
    }

    fn persist(&self, content: &str) -> Result<Item> {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("backend fault while persisting");
        }
        self.inner.persist(content)
    }

    fn list_all(&self) -> Result<Vec<Item>> {
        self.inner.list_all()
    }
}
