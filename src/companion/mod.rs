//! Companion channel: direct device-to-device session replication.
//!
//! On every local mutation the session record is pushed to the paired
//! device. When the companion is reachable an immediate message is sent;
//! otherwise the record lands in the context slot, a latest-value-wins
//! file the companion reads when it next wakes. Incoming records flow
//! through the same conflict-gated apply path as remote fetches.
//!
//! Implementations:
//! - [`SocketCompanion`] / [`CompanionListener`]: Unix-socket message push
//!   with a context-file fallback (the production channel).
//! - `Option<C>`: `None` is the stub for platforms without a paired device.
//! - [`MockCompanion`]: call-recording double for tests.

pub mod error;
pub mod socket;

pub use error::CompanionError;
pub use socket::{CompanionListener, SocketCompanion};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::SessionRecord;

// ============================================================================
// CompanionChannel
// ============================================================================

/// Capability interface for the paired-device channel.
#[allow(async_fn_in_trait)]
pub trait CompanionChannel {
    /// Returns true if the companion looks reachable right now.
    fn is_reachable(&self) -> bool;

    /// Sends the record directly to the companion.
    async fn send_message(&self, record: &SessionRecord) -> Result<(), CompanionError>;

    /// Replaces the context slot with the record, to be picked up
    /// opportunistically when the companion wakes.
    async fn update_context(&self, record: &SessionRecord) -> Result<(), CompanionError>;
}

/// Pushes a record to the companion, falling back to the context slot.
///
/// The fallback also runs when an immediate send fails mid-flight, so the
/// latest value is never lost just because the companion went away between
/// the reachability check and the write.
pub async fn push<C: CompanionChannel>(
    channel: &C,
    record: &SessionRecord,
) -> Result<(), CompanionError> {
    if channel.is_reachable() {
        match channel.send_message(record).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "Companion message failed, using context slot");
            }
        }
    }
    channel.update_context(record).await
}

/// A disabled channel: `None` is never reachable and swallows context
/// updates. Used on platforms without a paired device.
impl<C: CompanionChannel> CompanionChannel for Option<C> {
    fn is_reachable(&self) -> bool {
        self.as_ref().is_some_and(CompanionChannel::is_reachable)
    }

    async fn send_message(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        match self {
            Some(channel) => channel.send_message(record).await,
            None => Ok(()),
        }
    }

    async fn update_context(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        match self {
            Some(channel) => channel.update_context(record).await,
            None => Ok(()),
        }
    }
}

// ============================================================================
// MockCompanion
// ============================================================================

/// Call-recording [`CompanionChannel`] for tests.
#[derive(Debug, Default)]
pub struct MockCompanion {
    reachable: AtomicBool,
    should_fail_message: AtomicBool,
    messages: Mutex<Vec<SessionRecord>>,
    context_updates: Mutex<Vec<SessionRecord>>,
}

impl MockCompanion {
    /// Creates an unreachable mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reachable mock.
    pub fn reachable() -> Self {
        let mock = Self::default();
        mock.set_reachable(true);
        mock
    }

    /// Sets reachability.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Makes subsequent immediate sends fail.
    pub fn set_should_fail_message(&self, should_fail: bool) {
        self.should_fail_message.store(should_fail, Ordering::SeqCst);
    }

    /// Records delivered as immediate messages.
    pub fn messages(&self) -> Vec<SessionRecord> {
        self.messages.lock().unwrap().clone()
    }

    /// Records written to the context slot.
    pub fn context_updates(&self) -> Vec<SessionRecord> {
        self.context_updates.lock().unwrap().clone()
    }
}

impl CompanionChannel for MockCompanion {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn send_message(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        if self.should_fail_message.load(Ordering::SeqCst) {
            return Err(CompanionError::Unavailable("injected send failure".into()));
        }
        self.messages.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update_context(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        self.context_updates.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
