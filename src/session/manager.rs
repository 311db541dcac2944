//! Session manager: the single shared state holder.
//!
//! All mutations flow through [`SessionManager`], which owns the in-memory
//! [`SessionState`] and the three injected capabilities (local mirror,
//! remote store, companion channel). Every local mutation runs the same
//! propagation sequence: write the local mirror, overwrite the remote
//! record, push to the companion, then broadcast a change event to all
//! observers in registration order.
//!
//! Incoming sync records (remote fetch or companion message) go through a
//! conflict gate: they are applied only when strictly newer than the local
//! state, and are never echoed back out to the remote or companion.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::companion::{self, CompanionChannel};
use crate::mirror::LocalMirror;
use crate::remote::RemoteStore;
use crate::types::{SessionRecord, SessionState};

use super::SessionError;

// ============================================================================
// SessionEvent
// ============================================================================

/// Where a state change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOrigin {
    /// Overwritten from the remote record store
    Remote,
    /// Overwritten from a companion message or context slot
    Companion,
}

/// State-change events broadcast to observers (UI, widget refresh).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was started locally
    Started {
        /// Break vs. focus
        is_break: bool,
        /// Session length in seconds
        duration_seconds: u32,
    },
    /// The session was stopped/reset locally
    Stopped,
    /// Local state was overwritten by a sync source
    Applied {
        /// Which sync source produced the overwrite
        origin: SyncOrigin,
        /// The state after the overwrite
        state: SessionState,
    },
}

// ============================================================================
// SessionManager
// ============================================================================

/// Dependency-injected holder of the shared session state.
///
/// Generic over the capability interfaces so tests construct isolated
/// instances with in-memory doubles. Not internally synchronized; callers
/// that share one across tasks wrap it in `Arc<Mutex<_>>` so there is a
/// single mutation path.
pub struct SessionManager<M, R, C> {
    state: SessionState,
    mirror: M,
    remote: R,
    companion: C,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl<M, R, C> SessionManager<M, R, C>
where
    M: LocalMirror,
    R: RemoteStore,
    C: CompanionChannel,
{
    /// Creates a manager in the idle state with the given capabilities.
    pub fn new(mirror: M, remote: R, companion: C) -> Self {
        Self {
            state: SessionState::idle(),
            mirror,
            remote,
            companion,
            subscribers: Vec::new(),
        }
    }

    /// Registers an observer.
    ///
    /// Events are dispatched to observers in registration order. A dropped
    /// receiver is pruned on the next broadcast.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Returns the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Seconds remaining in the current session at `now`.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> u32 {
        self.state.time_remaining(now)
    }

    /// Initializes state from the local mirror, e.g. at process start.
    ///
    /// Mirror errors propagate so the caller can decide to log and start
    /// idle instead.
    pub fn load_from_mirror(&mut self) -> Result<(), crate::mirror::MirrorError> {
        self.state = self.mirror.read()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Local mutations
    // ------------------------------------------------------------------------

    /// Starts a session now.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidDuration`] for a zero duration; an
    /// immediately-expired session is never constructed.
    pub async fn start(
        &mut self,
        is_break: bool,
        duration_seconds: u32,
    ) -> Result<(), SessionError> {
        self.start_at(is_break, duration_seconds, Utc::now()).await
    }

    /// Starts a session at an explicit instant (injectable clock for tests).
    pub async fn start_at(
        &mut self,
        is_break: bool,
        duration_seconds: u32,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if duration_seconds == 0 {
            return Err(SessionError::InvalidDuration(duration_seconds));
        }

        self.state.begin(is_break, duration_seconds, now);
        self.propagate(SessionEvent::Started {
            is_break,
            duration_seconds,
        })
        .await;

        Ok(())
    }

    /// Stops the session and resets to idle defaults.
    pub async fn stop(&mut self) {
        self.stop_at(Utc::now()).await;
    }

    /// Stops at an explicit instant (injectable clock for tests).
    pub async fn stop_at(&mut self, now: DateTime<Utc>) {
        self.state.reset(now);
        self.propagate(SessionEvent::Stopped).await;
    }

    // ------------------------------------------------------------------------
    // Sync intake
    // ------------------------------------------------------------------------

    /// Applies a record fetched from the remote store.
    ///
    /// Returns true if the record was applied. Skipped when the record is
    /// not strictly newer than local state (latest-write-wins gate).
    pub fn apply_remote(&mut self, record: &SessionRecord) -> bool {
        self.apply(record, SyncOrigin::Remote)
    }

    /// Applies a record received from the companion channel.
    pub fn apply_companion(&mut self, record: &SessionRecord) -> bool {
        self.apply(record, SyncOrigin::Companion)
    }

    fn apply(&mut self, record: &SessionRecord, origin: SyncOrigin) -> bool {
        if record.modified_at() <= self.state.modified_at {
            tracing::debug!(
                ?origin,
                incoming = record.modified_at,
                local = self.state.modified_at.timestamp(),
                "Skipping stale sync record"
            );
            return false;
        }

        self.state = record.into_state();

        // Write-through and broadcast only. Sync-originated overwrites are
        // not pushed back out, so two devices cannot ping-pong one record.
        if let Err(e) = self.mirror.write(&self.state) {
            tracing::warn!(error = %e, "Local mirror write failed");
        }
        self.broadcast(SessionEvent::Applied {
            origin,
            state: self.state.clone(),
        });

        true
    }

    // ------------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------------

    /// Runs the full write-through sequence for a local mutation.
    ///
    /// Order: local mirror, remote upsert, companion push, observer
    /// broadcast. Each side effect's failure is logged and swallowed; the
    /// mutation stands regardless.
    async fn propagate(&mut self, event: SessionEvent) {
        if let Err(e) = self.mirror.write(&self.state) {
            tracing::warn!(error = %e, "Local mirror write failed");
        }

        let record = SessionRecord::from_state(&self.state);

        if let Err(e) = self.remote.upsert(&record).await {
            tracing::warn!(error = %e, "Remote record upsert failed");
        }

        if let Err(e) = companion::push(&self.companion, &record).await {
            tracing::warn!(error = %e, "Companion push failed");
        }

        self.broadcast(event);
    }

    /// Dispatches an event to observers in registration order, pruning
    /// observers whose receivers have been dropped.
    fn broadcast(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the injected remote store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the injected companion channel.
    pub fn companion(&self) -> &C {
        &self.companion
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::MockCompanion;
    use crate::mirror::{LocalMirror, MemoryMirror};
    use crate::remote::MemoryRemoteStore;
    use crate::types::DEFAULT_FOCUS_SECONDS;

    type TestManager = SessionManager<MemoryMirror, MemoryRemoteStore, MockCompanion>;

    fn ts(epoch_seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(epoch_seconds, 0).unwrap()
    }

    fn create_manager() -> TestManager {
        SessionManager::new(
            MemoryMirror::new(),
            MemoryRemoteStore::new(),
            MockCompanion::reachable(),
        )
    }

    // ------------------------------------------------------------------------
    // Mutation Tests
    // ------------------------------------------------------------------------

    mod mutation_tests {
        use super::*;

        #[tokio::test]
        async fn test_start_focus_session() {
            let mut manager = create_manager();

            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            let state = manager.state();
            assert_eq!(state.started_at, Some(ts(1_000_000)));
            assert_eq!(state.duration_seconds, 1500);
            assert!(!state.is_break);
        }

        #[tokio::test]
        async fn test_start_break_session() {
            let mut manager = create_manager();

            manager.start_at(true, 300, ts(1_000_000)).await.unwrap();

            assert!(manager.state().is_break);
            assert_eq!(manager.state().duration_seconds, 300);
        }

        #[tokio::test]
        async fn test_start_rejects_zero_duration() {
            let mut manager = create_manager();

            let result = manager.start_at(false, 0, ts(1_000_000)).await;

            assert_eq!(result, Err(SessionError::InvalidDuration(0)));
            assert!(!manager.state().is_active());
        }

        #[tokio::test]
        async fn test_stop_resets_to_defaults() {
            let mut manager = create_manager();
            manager.start_at(true, 300, ts(1_000_000)).await.unwrap();

            manager.stop_at(ts(1_000_100)).await;

            let state = manager.state();
            assert_eq!(state.started_at, None);
            assert!(!state.is_break);
            assert_eq!(state.duration_seconds, DEFAULT_FOCUS_SECONDS);
            assert_eq!(state.modified_at, ts(1_000_100));
        }

        #[tokio::test]
        async fn test_time_remaining_through_manager() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            assert_eq!(manager.time_remaining(ts(1_000_000)), 1500);
            assert_eq!(manager.time_remaining(ts(1_001_500)), 0);
            assert_eq!(manager.time_remaining(ts(1_002_000)), 0);
        }
    }

    // ------------------------------------------------------------------------
    // Propagation Tests
    // ------------------------------------------------------------------------

    mod propagation_tests {
        use super::*;

        #[tokio::test]
        async fn test_start_writes_through_everywhere() {
            let mut manager = create_manager();

            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            // Local mirror
            let mirrored = manager.mirror_state();
            assert_eq!(mirrored.started_at, Some(ts(1_000_000)));
            // Remote record
            let stored = manager.remote().stored().unwrap();
            assert_eq!(stored.start_time, 1_000_000);
            assert_eq!(manager.remote().upsert_count(), 1);
            // Companion message
            assert_eq!(manager.companion().messages().len(), 1);
        }

        #[tokio::test]
        async fn test_unreachable_companion_falls_back_to_context() {
            let mut manager = SessionManager::new(
                MemoryMirror::new(),
                MemoryRemoteStore::new(),
                MockCompanion::new(),
            );

            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            assert_eq!(manager.companion().messages().len(), 0);
            assert_eq!(manager.companion().context_updates().len(), 1);
        }

        #[tokio::test]
        async fn test_mutation_survives_all_side_effect_failures() {
            let mirror = MemoryMirror::new();
            mirror.set_should_fail_write(true);
            let remote = MemoryRemoteStore::new();
            remote.set_should_fail_upsert(true);
            let companion = MockCompanion::reachable();
            companion.set_should_fail_message(true);

            let mut manager = SessionManager::new(mirror, remote, companion);
            let result = manager.start_at(false, 1500, ts(1_000_000)).await;

            assert!(result.is_ok());
            assert!(manager.state().is_active());
        }

        #[tokio::test]
        async fn test_stop_propagates_idle_record() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            manager.stop_at(ts(1_000_100)).await;

            let stored = manager.remote().stored().unwrap();
            assert_eq!(stored.start_time, 0);
            assert_eq!(stored.duration_seconds, DEFAULT_FOCUS_SECONDS);
            assert!(!stored.is_break);
        }
    }

    // ------------------------------------------------------------------------
    // Sync Intake Tests
    // ------------------------------------------------------------------------

    mod sync_intake_tests {
        use super::*;

        fn record_at(modified_at: i64, is_break: bool) -> SessionRecord {
            SessionRecord {
                start_time: modified_at,
                duration_seconds: 600,
                is_break,
                modified_at,
            }
        }

        #[tokio::test]
        async fn test_newer_remote_record_applies() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            let applied = manager.apply_remote(&record_at(1_000_500, true));

            assert!(applied);
            assert!(manager.state().is_break);
            assert_eq!(manager.state().duration_seconds, 600);
        }

        #[tokio::test]
        async fn test_older_remote_record_is_skipped() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            let applied = manager.apply_remote(&record_at(999_000, true));

            assert!(!applied);
            assert!(!manager.state().is_break);
            assert_eq!(manager.state().duration_seconds, 1500);
        }

        #[tokio::test]
        async fn test_equal_timestamp_is_skipped() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            let applied = manager.apply_remote(&record_at(1_000_000, true));

            assert!(!applied);
        }

        #[tokio::test]
        async fn test_remote_apply_is_not_echoed_back() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();
            let upserts_before = manager.remote().upsert_count();
            let messages_before = manager.companion().messages().len();

            manager.apply_remote(&record_at(1_000_500, true));

            assert_eq!(manager.remote().upsert_count(), upserts_before);
            assert_eq!(manager.companion().messages().len(), messages_before);
        }

        #[tokio::test]
        async fn test_remote_apply_writes_local_mirror() {
            let mut manager = create_manager();

            manager.apply_remote(&record_at(1_000_500, true));

            assert!(manager.mirror_state().is_break);
        }

        #[tokio::test]
        async fn test_companion_record_same_gate() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();

            assert!(!manager.apply_companion(&record_at(999_000, true)));
            assert!(manager.apply_companion(&record_at(1_000_500, true)));
        }

        #[tokio::test]
        async fn test_apply_onto_fresh_manager() {
            // A freshly constructed manager has an epoch modified_at, so any
            // real record applies.
            let mut manager = create_manager();

            assert!(manager.apply_remote(&record_at(1, false)));
        }
    }

    // ------------------------------------------------------------------------
    // Observer Tests
    // ------------------------------------------------------------------------

    mod observer_tests {
        use super::*;

        #[tokio::test]
        async fn test_started_event() {
            let mut manager = create_manager();
            let mut rx = manager.subscribe();

            manager.start_at(true, 300, ts(1_000_000)).await.unwrap();

            let event = rx.try_recv().unwrap();
            assert_eq!(
                event,
                SessionEvent::Started {
                    is_break: true,
                    duration_seconds: 300
                }
            );
        }

        #[tokio::test]
        async fn test_stopped_event() {
            let mut manager = create_manager();
            let mut rx = manager.subscribe();

            manager.stop_at(ts(1_000_000)).await;

            assert_eq!(rx.try_recv().unwrap(), SessionEvent::Stopped);
        }

        #[tokio::test]
        async fn test_applied_event_carries_origin_and_state() {
            let mut manager = create_manager();
            let mut rx = manager.subscribe();

            let record = SessionRecord {
                start_time: 1_000_500,
                duration_seconds: 600,
                is_break: true,
                modified_at: 1_000_500,
            };
            manager.apply_remote(&record);

            match rx.try_recv().unwrap() {
                SessionEvent::Applied { origin, state } => {
                    assert_eq!(origin, SyncOrigin::Remote);
                    assert!(state.is_break);
                }
                other => panic!("Expected Applied event, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_skipped_record_emits_no_event() {
            let mut manager = create_manager();
            manager.start_at(false, 1500, ts(1_000_000)).await.unwrap();
            let mut rx = manager.subscribe();

            let stale = SessionRecord {
                start_time: 999_000,
                duration_seconds: 600,
                is_break: true,
                modified_at: 999_000,
            };
            manager.apply_remote(&stale);

            assert!(rx.try_recv().is_err());
        }

        #[tokio::test]
        async fn test_all_observers_receive_events() {
            let mut manager = create_manager();
            let mut first = manager.subscribe();
            let mut second = manager.subscribe();

            manager.stop_at(ts(1_000_000)).await;

            assert_eq!(first.try_recv().unwrap(), SessionEvent::Stopped);
            assert_eq!(second.try_recv().unwrap(), SessionEvent::Stopped);
        }

        #[tokio::test]
        async fn test_dropped_observer_is_pruned() {
            let mut manager = create_manager();
            let rx = manager.subscribe();
            drop(rx);
            let mut live = manager.subscribe();

            manager.stop_at(ts(1_000_000)).await;

            assert_eq!(live.try_recv().unwrap(), SessionEvent::Stopped);
        }
    }

    // ------------------------------------------------------------------------
    // Mirror Bootstrap Tests
    // ------------------------------------------------------------------------

    mod bootstrap_tests {
        use super::*;

        #[tokio::test]
        async fn test_load_from_mirror() {
            let mirror = MemoryMirror::new();
            let mut seeded = SessionState::idle();
            seeded.begin(true, 300, ts(1_000_000));
            mirror.write(&seeded).unwrap();

            let mut manager =
                SessionManager::new(mirror, MemoryRemoteStore::new(), MockCompanion::new());
            manager.load_from_mirror().unwrap();

            assert_eq!(manager.state(), &seeded);
        }

        #[tokio::test]
        async fn test_load_from_mirror_failure_propagates() {
            let mirror = MemoryMirror::new();
            mirror.set_should_fail_read(true);

            let mut manager =
                SessionManager::new(mirror, MemoryRemoteStore::new(), MockCompanion::new());

            assert!(manager.load_from_mirror().is_err());
            assert_eq!(manager.state(), &SessionState::idle());
        }
    }

    impl TestManager {
        /// Reads back what the in-memory mirror holds.
        fn mirror_state(&self) -> SessionState {
            self.mirror.read().unwrap()
        }
    }
}
