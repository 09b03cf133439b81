//! Lock helpers shared by the backends.

use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, taking the data back if a previous holder panicked.
///
/// Both backends only mutate their state in single statements (a `Vec`
/// push, one `INSERT`), so a poisoned lock never guards half-written data.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Backend mutex was poisoned, recovering");
        metrics::counter!("storage_mutex_poison_recovery_total").increment(1);
        poisoned.into_inner()
    })
}
