//! Remote record store error types.

use thiserror::Error;

/// Errors that can occur talking to the remote record store.
///
/// "Record not found" is not an error: `fetch` reports it as `Ok(None)`
/// because an absent record is the normal first-run state. Everything here
/// is logged by the sync engine and otherwise swallowed; there is no retry
/// and no user-visible failure state.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or the connection failed.
    #[error("Remote store request failed: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("Remote store returned status {0}")]
    Status(u16),

    /// The record body could not be encoded or decoded.
    #[error("Remote record serialization failed: {0}")]
    Serialization(String),

    /// Injected failure from a test double.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Returns true if this error came from an HTTP status code.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}
