//! Companion channel error types.

use thiserror::Error;

/// Errors that can occur on the companion-device channel.
///
/// All companion errors are best-effort: the sender logs them and moves on,
/// falling back from the immediate message to the context slot. No delivery
/// confirmation is tracked.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// The companion socket could not be reached.
    #[error("Companion unreachable: {0}")]
    Unreachable(String),

    /// Listener setup failed.
    #[error("Failed to bind companion socket: {0}")]
    Bind(String),

    /// Reading or writing a message failed.
    #[error("Companion message I/O failed: {0}")]
    Io(String),

    /// The context slot could not be read or written.
    #[error("Companion context slot failed: {0}")]
    Context(String),

    /// A payload could not be encoded or decoded.
    #[error("Companion payload serialization failed: {0}")]
    Serialization(String),

    /// The send or read timed out.
    #[error("Companion operation timed out")]
    Timeout,

    /// Injected failure from a test double.
    #[error("Companion unavailable: {0}")]
    Unavailable(String),
}
