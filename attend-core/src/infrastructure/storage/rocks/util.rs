//! Bounded write-lock acquisition for the RocksDB store.

use crate::foundation::{PipelineError, STORAGE_LOCK_TIMEOUT_SECS};
use log::warn;
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;

/// Takes the store's write lock, giving up after `STORAGE_LOCK_TIMEOUT_SECS`.
pub fn lock_for_write<'a>(lock: &'a Mutex<()>, operation: &'static str) -> Result<MutexGuard<'a, ()>, PipelineError> {
    lock_for_write_within(lock, operation, Duration::from_secs(STORAGE_LOCK_TIMEOUT_SECS))
}

pub fn lock_for_write_within<'a>(
    lock: &'a Mutex<()>,
    operation: &'static str,
    timeout: Duration,
) -> Result<MutexGuard<'a, ()>, PipelineError> {
    lock.try_lock_for(timeout).ok_or_else(|| {
        warn!("storage write lock not acquired operation={} timeout_ms={}", operation, timeout.as_millis());
        PipelineError::StorageLockTimeout { operation: operation.to_string(), timeout_secs: timeout.as_secs() }
    })
}
