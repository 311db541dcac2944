//! Session manager error types.

use thiserror::Error;

/// Errors a session mutation can report to its caller.
///
/// Side-effect failures (mirror, remote, companion) are deliberately not
/// represented here; they are logged and swallowed so a mutation never
/// fails for I/O reasons.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session was started with a non-positive duration.
    #[error("Session duration must be positive, got {0} seconds")]
    InvalidDuration(u32),
}
