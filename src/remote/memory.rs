//! In-memory remote store.
//!
//! Test double for the HTTP store: a single record slot behind a mutex,
//! with failure injection and call counters.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::SessionRecord;

use super::{RemoteError, RemoteStore};

/// In-memory [`RemoteStore`] holding one record slot.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    record: Mutex<Option<SessionRecord>>,
    should_fail_fetch: AtomicBool,
    should_fail_upsert: AtomicBool,
    fetch_count: AtomicUsize,
    upsert_count: AtomicUsize,
}

impl MemoryRemoteStore {
    /// Creates an empty store (no record yet, the first-run state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a record.
    pub fn with_record(record: SessionRecord) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(record);
        store
    }

    /// Makes subsequent fetches fail.
    pub fn set_should_fail_fetch(&self, should_fail: bool) {
        self.should_fail_fetch.store(should_fail, Ordering::SeqCst);
    }

    /// Makes subsequent upserts fail.
    pub fn set_should_fail_upsert(&self, should_fail: bool) {
        self.should_fail_upsert.store(should_fail, Ordering::SeqCst);
    }

    /// Number of fetch calls, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of upsert calls, including failed ones.
    pub fn upsert_count(&self) -> usize {
        self.upsert_count.load(Ordering::SeqCst)
    }

    /// Returns the stored record without going through the trait.
    pub fn stored(&self) -> Option<SessionRecord> {
        self.record.lock().unwrap().clone()
    }

    /// Replaces the stored record directly, simulating another writer.
    pub fn seed(&self, record: SessionRecord) {
        *self.record.lock().unwrap() = Some(record);
    }
}

impl RemoteStore for MemoryRemoteStore {
    async fn fetch(&self) -> Result<Option<SessionRecord>, RemoteError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected fetch failure".into()));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), RemoteError> {
        self.upsert_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_upsert.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected upsert failure".into()));
        }
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }
}
