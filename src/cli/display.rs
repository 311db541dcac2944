//! Display utilities for the session sync CLI.
//!
//! This module provides formatted output for:
//! - Session start/stop messages
//! - Status display
//! - Widget timeline dumps
//! - Error messages

use chrono::{DateTime, Utc};

use crate::types::SessionState;
use crate::widget::{RefreshPolicy, Timeline};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a message for session start.
    pub fn show_started(state: &SessionState, now: DateTime<Utc>) {
        let kind = if state.is_break { "Break" } else { "Focus" };
        println!("* {} session started", kind);

        let (minutes, seconds) = Self::format_time(state.time_remaining(now));
        println!("  Remaining: {}:{:02}", minutes, seconds);
    }

    /// Shows a message for session stop.
    pub fn show_stopped() {
        println!("[] Session stopped");
    }

    /// Shows the current session status.
    pub fn show_status(state: &SessionState, now: DateTime<Utc>) {
        println!("Pomodoro Status");
        println!("─────────────────────────────");

        if !state.is_active() {
            println!("State: idle");
            return;
        }

        let remaining = state.time_remaining(now);
        if remaining == 0 {
            println!("State: finished");
            return;
        }

        let kind = if state.is_break { "break" } else { "focus" };
        let (minutes, seconds) = Self::format_time(remaining);
        println!("State: {}", kind);
        println!("Remaining: {}:{:02}", minutes, seconds);
        if let Some(end) = state.ends_at() {
            println!("Ends at: {}", end.format("%H:%M:%S"));
        }
    }

    /// Shows the remaining time on one refreshing line, for the run loop.
    pub fn show_countdown(state: &SessionState, now: DateTime<Utc>) {
        use std::io::Write;

        if !state.is_active() {
            print!("\r\x1b[2Kidle");
        } else {
            let kind = if state.is_break { "break" } else { "focus" };
            let (minutes, seconds) = Self::format_time(state.time_remaining(now));
            print!("\r\x1b[2K{} {}:{:02}", kind, minutes, seconds);
        }
        let _ = std::io::stdout().flush();
    }

    /// Shows a widget timeline, one entry per line.
    pub fn show_timeline(timeline: &Timeline) {
        println!("Widget Timeline ({} entries)", timeline.entries.len());

        for entry in &timeline.entries {
            match entry.session_end {
                Some(end) => {
                    let kind = if entry.is_break { "break" } else { "focus" };
                    println!(
                        "  {}  {} until {}",
                        entry.date.format("%H:%M:%S"),
                        kind,
                        end.format("%H:%M:%S")
                    );
                }
                None => println!("  {}  idle", entry.date.format("%H:%M:%S")),
            }
        }

        match timeline.refresh {
            RefreshPolicy::Immediately => println!("Refresh: immediately"),
            RefreshPolicy::After(at) => println!("Refresh: after {}", at.format("%H:%M:%S")),
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
