//! Local mirror: process-group-shared storage for fast same-device reads.
//!
//! The mirror holds the session triple as raw primitives so a widget or
//! extension process can read it without talking to the cloud. Writes go
//! field by field with no transaction across them; a reader racing a writer
//! may observe a mix of old and new values, which is acceptable for a
//! single-user countdown display.
//!
//! Implementations:
//! - [`FileMirror`]: one small file per field inside a shared group
//!   directory (the production mirror).
//! - [`MemoryMirror`]: in-process double, also the stub for platforms
//!   without shared storage.

pub mod error;
pub mod file;
pub mod memory;

pub use error::MirrorError;
pub use file::FileMirror;
pub use memory::MemoryMirror;

use crate::types::SessionState;

/// Capability interface for the local mirror.
pub trait LocalMirror {
    /// Writes the session fields through to the mirror.
    fn write(&self, state: &SessionState) -> Result<(), MirrorError>;

    /// Reads the session back from the mirror.
    ///
    /// Missing fields decode to their idle defaults: no start time, the
    /// 25-minute default duration, focus flag cleared.
    fn read(&self) -> Result<SessionState, MirrorError>;
}
