//! Per-content reservations for the save path.
//!
//! A [`ReservationGuard`] is a concurrent set of the content values that are
//! currently being saved. Membership is the lock: whoever inserts a value
//! first holds it until it is released. Different values never contend with
//! each other beyond the shard lock of the underlying [`DashSet`].

use dashmap::DashSet;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

/// Concurrent set of content values with an in-flight save.
///
/// # Thread Safety
///
/// `try_reserve` is a single atomic insert-if-absent on a sharded set, so two
/// threads racing on the same value can never both win. `release` is an
/// unconditional, idempotent remove.
///
/// # Example
///
/// ```rust
/// use itemgate::ReservationGuard;
///
/// let guard: ReservationGuard = ReservationGuard::new();
///
/// let held = guard.reserve("x".to_string()).expect("first reservation wins");
/// assert!(guard.reserve("x".to_string()).is_none());
/// assert!(guard.try_reserve("y".to_string()));
///
/// drop(held);
/// assert!(!guard.is_reserved("x"));
/// ```
pub struct ReservationGuard<K = String>
where
    K: Eq + Hash,
{
    in_flight: DashSet<K>,
}

impl<K> ReservationGuard<K>
where
    K: Eq + Hash,
{
    /// Creates an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: DashSet::new(),
        }
    }

    /// Creates an empty guard with room for `capacity` concurrent reservations.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            in_flight: DashSet::with_capacity(capacity),
        }
    }

    /// Atomically reserves `key` if nobody holds it.
    ///
    /// Returns `true` when the caller now holds the reservation and must
    /// eventually call [`release`](Self::release) exactly once. Prefer
    /// [`reserve`](Self::reserve), which releases automatically.
    pub fn try_reserve(&self, key: K) -> bool {
        let reserved = self.in_flight.insert(key);
        if reserved {
            metrics::gauge!("item_reservations_in_flight").increment(1.0);
        }
        reserved
    }

    /// Releases `key`. Releasing a value that is not reserved is a no-op.
    pub fn release<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.in_flight.remove(key).is_some() {
            metrics::gauge!("item_reservations_in_flight").decrement(1.0);
        }
    }

    /// Reserves `key` for the lifetime of the returned [`Reservation`].
    ///
    /// Returns `None` if another caller already holds it. The reservation is
    /// released when the handle is dropped, including during a panic unwind.
    #[must_use]
    pub fn reserve(&self, key: K) -> Option<Reservation<'_, K>>
    where
        K: Clone,
    {
        // Only build the handle on success: its Drop would release the winner's entry.
        if self.try_reserve(key.clone()) {
            Some(Reservation { guard: self, key })
        } else {
            None
        }
    }

    /// Returns whether `key` is currently reserved.
    ///
    /// The answer may be stale by the time the caller looks at it; use it for
    /// diagnostics and tests, never to decide whether to save.
    #[must_use]
    pub fn is_reserved<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.in_flight.contains(key)
    }

    /// Returns the number of reservations currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl<K> Default for ReservationGuard<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for ReservationGuard<K>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationGuard")
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

/// A held reservation. Dropping it releases the value.
#[must_use = "dropping a Reservation releases it immediately"]
pub struct Reservation<'a, K = String>
where
    K: Eq + Hash,
{
    guard: &'a ReservationGuard<K>,
    key: K,
}

impl<K> Reservation<'_, K>
where
    K: Eq + Hash,
{
    /// Returns the reserved value.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }
}

impl<K> Drop for Reservation<'_, K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.guard.release(&self.key);
    }
}

impl<K> fmt::Debug for Reservation<'_, K>
where
    K: Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation").field("key", &self.key).finish()
    }
}
