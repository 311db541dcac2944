//! Timeline entries for the home-screen widget.
//!
//! A pure function from session state to a sequence of future display
//! frames. Each frame carries the session end time so the host can render
//! a live countdown primitive; the refresh policy tells the host when to
//! ask for a new sequence. No state lives here — the widget process reads
//! the local mirror, builds a timeline, and hands it off.

use chrono::{DateTime, Duration, Utc};

use crate::types::SessionState;

// ============================================================================
// Constants
// ============================================================================

/// Spacing between timeline entries in seconds.
pub const TIMELINE_STEP_SECONDS: i64 = 60;

/// Upper bound on entries per timeline, matching what widget hosts accept.
const MAX_ENTRIES: usize = 60;

// ============================================================================
// Timeline types
// ============================================================================

/// One future display frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// When the host should switch to this frame
    pub date: DateTime<Utc>,
    /// Countdown target; `None` renders the idle face
    pub session_end: Option<DateTime<Utc>>,
    /// Break flag for frame styling
    pub is_break: bool,
}

/// When the host OS should next request a fresh timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Ask again as soon as possible (idle or expired session)
    Immediately,
    /// Ask again once the session ends
    After(DateTime<Utc>),
}

/// A frame sequence plus its refresh policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    /// Frames in display order
    pub entries: Vec<TimelineEntry>,
    /// When to rebuild
    pub refresh: RefreshPolicy,
}

// ============================================================================
// Construction
// ============================================================================

/// Builds the widget timeline for the given state as of `now`.
///
/// An idle or already-expired session yields a single idle frame and an
/// immediate refresh policy. An active session yields frames at fixed
/// increments from `now` until the session end, then asks the host to come
/// back at the end.
pub fn build_timeline(state: &SessionState, now: DateTime<Utc>) -> Timeline {
    let end = match state.ends_at() {
        Some(end) if end > now => end,
        _ => {
            return Timeline {
                entries: vec![TimelineEntry {
                    date: now,
                    session_end: None,
                    is_break: false,
                }],
                refresh: RefreshPolicy::Immediately,
            };
        }
    };

    let mut entries = Vec::new();
    let mut date = now;
    while date < end && entries.len() < MAX_ENTRIES {
        entries.push(TimelineEntry {
            date,
            session_end: Some(end),
            is_break: state.is_break,
        });
        date += Duration::seconds(TIMELINE_STEP_SECONDS);
    }

    // Terminal idle frame so the widget goes blank exactly at session end.
    entries.push(TimelineEntry {
        date: end,
        session_end: None,
        is_break: false,
    });

    Timeline {
        entries,
        refresh: RefreshPolicy::After(end),
    }
}

// ============================================================================
// Tests
// ============================================================================
