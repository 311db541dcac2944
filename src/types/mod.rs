//! Core data types for the session sync engine.
//!
//! This module defines the data structures used for:
//! - In-memory session state (start time, duration, break flag)
//! - The wire record shared by the remote store and the companion channel
//! - Default durations and the idle-state sentinel encoding

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default focus session duration in seconds (25 minutes).
pub const DEFAULT_FOCUS_SECONDS: u32 = 25 * 60;

/// Default break session duration in seconds (5 minutes).
pub const DEFAULT_BREAK_SECONDS: u32 = 5 * 60;

// ============================================================================
// SessionState
// ============================================================================

/// In-memory representation of the current Pomodoro session.
///
/// There is exactly one logical session per account. An absent `started_at`
/// means no session is active. `modified_at` is stamped on every mutation
/// and drives the latest-write-wins conflict gate on sync intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// When the current session started; `None` means idle.
    pub started_at: Option<DateTime<Utc>>,
    /// Session length in seconds. Always positive while a session is active.
    pub duration_seconds: u32,
    /// Whether the current session is a break (vs. focus).
    pub is_break: bool,
    /// Timestamp of the last mutation, local or applied from a sync source.
    pub modified_at: DateTime<Utc>,
}

impl SessionState {
    /// Creates the idle state.
    ///
    /// `modified_at` is the Unix epoch so that any real mutation, local or
    /// remote, is newer than a freshly constructed state.
    pub fn idle() -> Self {
        Self {
            started_at: None,
            duration_seconds: DEFAULT_FOCUS_SECONDS,
            is_break: false,
            modified_at: DateTime::UNIX_EPOCH,
        }
    }

    /// Begins a session at `now` with the given break flag and duration.
    pub fn begin(&mut self, is_break: bool, duration_seconds: u32, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.duration_seconds = duration_seconds;
        self.is_break = is_break;
        self.modified_at = now;
    }

    /// Resets to the idle state: no start time, focus flag cleared,
    /// duration back to the 25-minute default.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.started_at = None;
        self.duration_seconds = DEFAULT_FOCUS_SECONDS;
        self.is_break = false;
        self.modified_at = now;
    }

    /// Returns true if a session is currently active.
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Computes when the current session ends, if one is active.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|start| start + Duration::seconds(i64::from(self.duration_seconds)))
    }

    /// Seconds remaining in the current session at `now`.
    ///
    /// Clamped to zero, never negative. Zero when no session is active.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> u32 {
        match self.ends_at() {
            Some(end) => {
                let remaining = (end - now).num_seconds();
                u32::try_from(remaining).unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Returns true if a session is active but its end time has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.ends_at(), Some(end) if end <= now)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

// ============================================================================
// SessionRecord
// ============================================================================

/// Wire form of the session, shared by the remote record store, the
/// companion message payload, and the companion context slot.
///
/// `start_time` is epoch seconds with `0` as the "no active session"
/// sentinel; a non-positive value decodes back to `None`, never to a
/// valid past timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session start as epoch seconds; `0` means idle.
    #[serde(default)]
    pub start_time: i64,
    /// Session length in seconds.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u32,
    /// Break flag.
    #[serde(default)]
    pub is_break: bool,
    /// Last mutation time as epoch seconds, for the conflict gate.
    #[serde(default)]
    pub modified_at: i64,
}

fn default_duration_seconds() -> u32 {
    DEFAULT_FOCUS_SECONDS
}

impl SessionRecord {
    /// Encodes the in-memory state as a wire record.
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            start_time: state.started_at.map_or(0, |t| t.timestamp()),
            duration_seconds: state.duration_seconds,
            is_break: state.is_break,
            modified_at: state.modified_at.timestamp(),
        }
    }

    /// Decodes the wire record into in-memory state.
    ///
    /// Out-of-range timestamps fall back to the idle sentinel / epoch so a
    /// corrupt record degrades to a harmless state instead of failing.
    pub fn into_state(&self) -> SessionState {
        SessionState {
            started_at: decode_timestamp(self.start_time),
            duration_seconds: self.duration_seconds,
            is_break: self.is_break,
            modified_at: decode_timestamp(self.modified_at).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }

    /// The record's modification time as a timestamp.
    pub fn modified_at(&self) -> DateTime<Utc> {
        decode_timestamp(self.modified_at).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Decodes epoch seconds, treating non-positive values as absent.
pub fn decode_timestamp(epoch_seconds: i64) -> Option<DateTime<Utc>> {
    if epoch_seconds <= 0 {
        return None;
    }
    DateTime::from_timestamp(epoch_seconds, 0)
}

// ============================================================================
// Tests
// ============================================================================
