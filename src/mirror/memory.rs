//! In-memory local mirror.
//!
//! Test double for the file mirror, and the stub implementation for
//! platforms with no process-shared storage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::SessionState;

use super::{LocalMirror, MirrorError};

/// In-memory [`LocalMirror`] with failure injection and call counters.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    state: Mutex<Option<SessionState>>,
    should_fail_write: AtomicBool,
    should_fail_read: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryMirror {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail.
    pub fn set_should_fail_write(&self, should_fail: bool) {
        self.should_fail_write.store(should_fail, Ordering::SeqCst);
    }

    /// Makes subsequent reads fail.
    pub fn set_should_fail_read(&self, should_fail: bool) {
        self.should_fail_read.store(should_fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Returns the stored state, if any, without default-filling.
    pub fn stored(&self) -> Option<SessionState> {
        self.state.lock().unwrap().clone()
    }
}

impl LocalMirror for MemoryMirror {
    fn write(&self, state: &SessionState) -> Result<(), MirrorError> {
        if self.should_fail_write.load(Ordering::SeqCst) {
            return Err(MirrorError::Unavailable("injected write failure".into()));
        }
        *self.state.lock().unwrap() = Some(state.clone());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&self) -> Result<SessionState, MirrorError> {
        if self.should_fail_read.load(Ordering::SeqCst) {
            return Err(MirrorError::Unavailable("injected read failure".into()));
        }
        Ok(self.state.lock().unwrap().clone().unwrap_or_default())
    }
}
