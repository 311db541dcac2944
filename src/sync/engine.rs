//! Sync engine: single-loop intake for remote and companion changes.
//!
//! The engine owns every path that can overwrite local state from outside:
//! the periodic remote poll, the foreground/account-change triggers, and
//! incoming companion messages. All of them run on one `select!` loop and
//! each intake is awaited to completion while holding the manager lock, so
//! overlapping fetches are never issued and a slow fetch can never apply a
//! stale record over a newer local mutation.
//!
//! Every failure in here is logged and swallowed; the loop degrades to
//! "state unchanged, try again next tick".

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::companion::{CompanionChannel, CompanionListener, SocketCompanion};
use crate::mirror::LocalMirror;
use crate::remote::RemoteStore;
use crate::session::SessionManager;

// ============================================================================
// SyncTrigger
// ============================================================================

/// Events that force an immediate remote refresh between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The app came to the foreground
    Foreground,
    /// The signed-in account changed
    AccountChanged,
}

/// Clonable handle for delivering [`SyncTrigger`]s to a running engine.
#[derive(Debug, Clone)]
pub struct SyncTriggerHandle {
    tx: mpsc::UnboundedSender<SyncTrigger>,
}

impl SyncTriggerHandle {
    /// Requests a refresh because the app came to the foreground.
    pub fn foreground(&self) {
        let _ = self.tx.send(SyncTrigger::Foreground);
    }

    /// Requests a refresh because the account changed.
    pub fn account_changed(&self) {
        let _ = self.tx.send(SyncTrigger::AccountChanged);
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Runs the remote poll and companion intake against a shared manager.
pub struct SyncEngine<M, R, C> {
    manager: Arc<Mutex<SessionManager<M, R, C>>>,
    poll_interval: Duration,
    trigger_rx: mpsc::UnboundedReceiver<SyncTrigger>,
    trigger_tx: mpsc::UnboundedSender<SyncTrigger>,
}

impl<M, R, C> SyncEngine<M, R, C>
where
    M: LocalMirror,
    R: RemoteStore,
    C: CompanionChannel,
{
    /// Creates an engine polling at the given interval.
    pub fn new(manager: Arc<Mutex<SessionManager<M, R, C>>>, poll_interval: Duration) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        Self {
            manager,
            poll_interval,
            trigger_rx,
            trigger_tx,
        }
    }

    /// Returns a handle for delivering refresh triggers.
    pub fn trigger_handle(&self) -> SyncTriggerHandle {
        SyncTriggerHandle {
            tx: self.trigger_tx.clone(),
        }
    }

    /// Fetches the remote record once and applies it through the conflict
    /// gate.
    ///
    /// Three outcomes, per the store's error taxonomy: no record yet
    /// (normal first run, nothing happens), fetch error (logged, nothing
    /// happens, no retry scheduled), record found (conflict-gated apply).
    pub async fn refresh(&self) {
        let mut manager = self.manager.lock().await;

        let fetched = manager.remote().fetch().await;
        match fetched {
            Ok(Some(record)) => {
                if manager.apply_remote(&record) {
                    tracing::debug!("Applied remote session record");
                }
            }
            Ok(None) => {
                tracing::debug!("No remote session record yet");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote fetch failed");
            }
        }
    }

    /// Catches up on a context slot written while this device was asleep.
    pub async fn catch_up_context(&self, companion: &SocketCompanion) {
        match companion.read_context() {
            Ok(Some(record)) => {
                let mut manager = self.manager.lock().await;
                if manager.apply_companion(&record) {
                    tracing::debug!("Applied companion context record");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Companion context read failed");
            }
        }
    }

    /// Runs the intake loop until the task is cancelled.
    ///
    /// `listener` is the incoming companion socket, if this platform has
    /// one.
    pub async fn run(&mut self, listener: Option<CompanionListener>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                Some(trigger) = self.trigger_rx.recv() => {
                    tracing::debug!(?trigger, "Refresh trigger received");
                    self.refresh().await;
                }
                incoming = recv_companion(listener.as_ref()) => {
                    match incoming {
                        Ok(record) => {
                            let mut manager = self.manager.lock().await;
                            if manager.apply_companion(&record) {
                                tracing::debug!("Applied companion message");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Companion receive failed");
                        }
                    }
                }
            }
        }
    }
}

/// Awaits the next companion message, or forever when there is no listener.
async fn recv_companion(
    listener: Option<&CompanionListener>,
) -> Result<crate::types::SessionRecord, crate::companion::CompanionError> {
    match listener {
        Some(listener) => listener.recv().await,
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::MockCompanion;
    use crate::mirror::MemoryMirror;
    use crate::remote::MemoryRemoteStore;
    use crate::types::SessionRecord;

    type TestEngine = SyncEngine<MemoryMirror, MemoryRemoteStore, MockCompanion>;
    type TestManager = SessionManager<MemoryMirror, MemoryRemoteStore, MockCompanion>;

    fn create_engine(remote: MemoryRemoteStore) -> (TestEngine, Arc<Mutex<TestManager>>) {
        let manager = Arc::new(Mutex::new(SessionManager::new(
            MemoryMirror::new(),
            remote,
            MockCompanion::new(),
        )));
        let engine = SyncEngine::new(manager.clone(), Duration::from_secs(5));
        (engine, manager)
    }

    fn record_at(modified_at: i64, is_break: bool) -> SessionRecord {
        SessionRecord {
            start_time: modified_at,
            duration_seconds: 600,
            is_break,
            modified_at,
        }
    }

    #[tokio::test]
    async fn test_refresh_applies_found_record() {
        let remote = MemoryRemoteStore::with_record(record_at(1_000_000, true));
        let (engine, manager) = create_engine(remote);

        engine.refresh().await;

        let manager = manager.lock().await;
        assert!(manager.state().is_break);
        assert_eq!(manager.state().duration_seconds, 600);
    }

    #[tokio::test]
    async fn test_refresh_with_no_record_is_first_run() {
        let (engine, manager) = create_engine(MemoryRemoteStore::new());

        engine.refresh().await;

        let manager = manager.lock().await;
        assert!(!manager.state().is_active());
        assert_eq!(manager.remote().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_error_leaves_state_unchanged() {
        let remote = MemoryRemoteStore::with_record(record_at(1_000_000, true));
        remote.set_should_fail_fetch(true);
        let (engine, manager) = create_engine(remote);

        engine.refresh().await;

        let manager = manager.lock().await;
        assert!(!manager.state().is_break);
    }

    #[tokio::test]
    async fn test_refresh_skips_stale_record() {
        let (engine, manager) = create_engine(MemoryRemoteStore::new());

        {
            let mut m = manager.lock().await;
            m.start_at(false, 1500, chrono::DateTime::from_timestamp(1_000_000, 0).unwrap())
                .await
                .unwrap();
            // Another device's older write lands in the store afterwards.
            m.remote().seed(record_at(999_000, true));
        }

        engine.refresh().await;

        let manager = manager.lock().await;
        assert!(!manager.state().is_break);
        assert_eq!(manager.state().duration_seconds, 1500);
    }

    #[tokio::test]
    async fn test_trigger_forces_refresh_in_run_loop() {
        let remote = MemoryRemoteStore::with_record(record_at(1_000_000, true));
        let (mut engine, manager) = create_engine(remote);
        let handle = engine.trigger_handle();

        let run = tokio::spawn(async move {
            engine.run(None).await;
        });

        handle.foreground();
        tokio::time::sleep(Duration::from_millis(100)).await;
        run.abort();

        let manager = manager.lock().await;
        assert!(manager.state().is_break);
    }

    #[tokio::test]
    async fn test_poll_tick_refreshes_in_run_loop() {
        let remote = MemoryRemoteStore::with_record(record_at(1_000_000, true));
        let manager = Arc::new(Mutex::new(SessionManager::new(
            MemoryMirror::new(),
            remote,
            MockCompanion::new(),
        )));
        let mut engine = SyncEngine::new(manager.clone(), Duration::from_millis(20));

        let run = tokio::spawn(async move {
            engine.run(None).await;
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        run.abort();

        let manager = manager.lock().await;
        assert!(manager.state().is_break);
        assert!(manager.remote().fetch_count() >= 2);
    }

    #[tokio::test]
    async fn test_account_changed_trigger() {
        let (engine, _manager) = create_engine(MemoryRemoteStore::new());
        let handle = engine.trigger_handle();

        // Sending on an un-started engine only queues the trigger.
        handle.account_changed();
        handle.foreground();
    }

    #[tokio::test]
    async fn test_companion_message_applies_through_run_loop() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("companion.sock");
        let context = dir.path().join("context.json");

        let listener = CompanionListener::bind(&socket).unwrap();
        let (mut engine, manager) = create_engine(MemoryRemoteStore::new());

        let run = tokio::spawn(async move {
            engine.run(Some(listener)).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let sender = SocketCompanion::new(&socket, &context);
        sender.send_message(&record_at(1_000_000, true)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        run.abort();

        let manager = manager.lock().await;
        assert!(manager.state().is_break);
    }

    #[tokio::test]
    async fn test_catch_up_context() {
        let dir = tempfile::tempdir().unwrap();
        let sender = SocketCompanion::new(
            dir.path().join("companion.sock"),
            dir.path().join("context.json"),
        );
        sender.update_context(&record_at(1_000_000, true)).await.unwrap();

        let (engine, manager) = create_engine(MemoryRemoteStore::new());
        engine.catch_up_context(&sender).await;

        let manager = manager.lock().await;
        assert!(manager.state().is_break);
    }
}
