//! File-backed local mirror.
//!
//! Stores each session field as its own file inside a group directory so
//! that the main process and a widget process can share it. Each field is
//! written independently; there is deliberately no rename-based atomicity
//! across the set.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::DateTime;

use crate::types::{decode_timestamp, SessionState, DEFAULT_FOCUS_SECONDS};

use super::{LocalMirror, MirrorError};

// ============================================================================
// Field file names
// ============================================================================

const FIELD_START_TIME: &str = "start_time";
const FIELD_DURATION: &str = "duration_seconds";
const FIELD_IS_BREAK: &str = "is_break";
const FIELD_MODIFIED_AT: &str = "modified_at";

// ============================================================================
// FileMirror
// ============================================================================

/// Local mirror backed by one file per field in a shared group directory.
#[derive(Debug, Clone)]
pub struct FileMirror {
    /// Group directory shared with the widget process.
    group_dir: PathBuf,
}

impl FileMirror {
    /// Creates a mirror rooted at the given group directory.
    ///
    /// The directory is created on first write, not here, so constructing
    /// a mirror for a read-only consumer never touches the filesystem.
    pub fn new(group_dir: impl Into<PathBuf>) -> Self {
        Self {
            group_dir: group_dir.into(),
        }
    }

    /// Returns the group directory path.
    pub fn group_dir(&self) -> &Path {
        &self.group_dir
    }

    fn write_field(&self, field: &'static str, value: &str) -> Result<(), MirrorError> {
        fs::write(self.group_dir.join(field), value)
            .map_err(|source| MirrorError::WriteField { field, source })
    }

    /// Reads and parses one field file.
    ///
    /// A missing file is `None`. An unparsable value is also treated as
    /// missing (logged at debug) so a corrupt field degrades to its default
    /// instead of poisoning the whole read.
    fn read_field<T: FromStr>(&self, field: &'static str) -> Result<Option<T>, MirrorError> {
        let raw = match fs::read_to_string(self.group_dir.join(field)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(MirrorError::ReadField { field, source }),
        };

        match raw.trim().parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                tracing::debug!(field, raw = raw.trim(), "Ignoring unparsable mirror field");
                Ok(None)
            }
        }
    }
}

impl LocalMirror for FileMirror {
    fn write(&self, state: &SessionState) -> Result<(), MirrorError> {
        fs::create_dir_all(&self.group_dir).map_err(|source| MirrorError::CreateDir {
            path: self.group_dir.display().to_string(),
            source,
        })?;

        // Zero is the "no active session" sentinel for the start time.
        let start_time = state.started_at.map_or(0, |t| t.timestamp());

        self.write_field(FIELD_START_TIME, &start_time.to_string())?;
        self.write_field(FIELD_DURATION, &state.duration_seconds.to_string())?;
        self.write_field(FIELD_IS_BREAK, &state.is_break.to_string())?;
        self.write_field(FIELD_MODIFIED_AT, &state.modified_at.timestamp().to_string())?;

        Ok(())
    }

    fn read(&self) -> Result<SessionState, MirrorError> {
        let start_time: i64 = self.read_field(FIELD_START_TIME)?.unwrap_or(0);
        let duration_seconds = self
            .read_field(FIELD_DURATION)?
            .unwrap_or(DEFAULT_FOCUS_SECONDS);
        let is_break = self.read_field(FIELD_IS_BREAK)?.unwrap_or(false);
        let modified_at: i64 = self.read_field(FIELD_MODIFIED_AT)?.unwrap_or(0);

        Ok(SessionState {
            started_at: decode_timestamp(start_time),
            duration_seconds,
            is_break,
            modified_at: decode_timestamp(modified_at).unwrap_or(DateTime::UNIX_EPOCH),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
