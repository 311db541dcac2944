//! Unix-socket companion channel.
//!
//! The paired process listens on a Unix domain socket. An immediate push is
//! one JSON-encoded record written over a fresh connection; the context
//! slot is a JSON file overwritten in place and read back when the
//! companion wakes. Messages are one-way, no response is read.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

use crate::types::SessionRecord;

use super::{CompanionChannel, CompanionError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum message size in bytes (4KB)
const MAX_MESSAGE_SIZE: usize = 4096;

/// Connect/send timeout in seconds
const SEND_TIMEOUT_SECS: u64 = 2;

/// Read timeout for incoming messages in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// SocketCompanion
// ============================================================================

/// Sender side of the companion channel.
#[derive(Debug, Clone)]
pub struct SocketCompanion {
    /// Socket the companion listens on
    socket_path: PathBuf,
    /// Context slot read by the companion on wake
    context_path: PathBuf,
}

impl SocketCompanion {
    /// Creates a sender for the given socket and context paths.
    pub fn new(socket_path: impl Into<PathBuf>, context_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            context_path: context_path.into(),
        }
    }

    /// Reads the context slot, if one has been written.
    ///
    /// Used by the companion side on wake to catch up on a value pushed
    /// while it was unreachable.
    pub fn read_context(&self) -> Result<Option<SessionRecord>, CompanionError> {
        let raw = match std::fs::read(&self.context_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CompanionError::Context(e.to_string())),
        };

        let record = serde_json::from_slice(&raw)
            .map_err(|e| CompanionError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }
}

impl CompanionChannel for SocketCompanion {
    fn is_reachable(&self) -> bool {
        // The listener binds the socket file; its absence means the
        // companion process is not up.
        self.socket_path.exists()
    }

    async fn send_message(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        let payload =
            serde_json::to_vec(record).map_err(|e| CompanionError::Serialization(e.to_string()))?;

        let send = async {
            let mut stream = UnixStream::connect(&self.socket_path)
                .await
                .map_err(|e| CompanionError::Unreachable(e.to_string()))?;
            stream
                .write_all(&payload)
                .await
                .map_err(|e| CompanionError::Io(e.to_string()))?;
            stream
                .shutdown()
                .await
                .map_err(|e| CompanionError::Io(e.to_string()))?;
            Ok(())
        };

        match timeout(Duration::from_secs(SEND_TIMEOUT_SECS), send).await {
            Ok(result) => result,
            Err(_) => Err(CompanionError::Timeout),
        }
    }

    async fn update_context(&self, record: &SessionRecord) -> Result<(), CompanionError> {
        let payload =
            serde_json::to_vec(record).map_err(|e| CompanionError::Serialization(e.to_string()))?;

        if let Some(parent) = self.context_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompanionError::Context(e.to_string()))?;
        }
        std::fs::write(&self.context_path, payload)
            .map_err(|e| CompanionError::Context(e.to_string()))
    }
}

// ============================================================================
// CompanionListener
// ============================================================================

/// Receiving side of the companion channel.
///
/// Binds the socket the sender connects to and yields decoded records, one
/// per connection.
pub struct CompanionListener {
    listener: UnixListener,
    socket_path: PathBuf,
}

impl CompanionListener {
    /// Binds the companion socket, replacing a stale socket file if present.
    pub fn bind(socket_path: &Path) -> Result<Self, CompanionError> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path).map_err(|e| CompanionError::Bind(e.to_string()))?;
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompanionError::Bind(e.to_string()))?;
        }

        let listener =
            UnixListener::bind(socket_path).map_err(|e| CompanionError::Bind(e.to_string()))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Waits for the next pushed record.
    pub async fn recv(&self) -> Result<SessionRecord, CompanionError> {
        let (mut stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| CompanionError::Io(e.to_string()))?;

        Self::read_record(&mut stream).await
    }

    /// Reads and decodes one record from a connection.
    async fn read_record(stream: &mut UnixStream) -> Result<SessionRecord, CompanionError> {
        let mut buffer = Vec::with_capacity(MAX_MESSAGE_SIZE);
        let mut chunk = [0u8; 1024];

        loop {
            let read = timeout(Duration::from_secs(READ_TIMEOUT_SECS), stream.read(&mut chunk))
                .await
                .map_err(|_| CompanionError::Timeout)?
                .map_err(|e| CompanionError::Io(e.to_string()))?;

            if read == 0 {
                break;
            }
            if buffer.len() + read > MAX_MESSAGE_SIZE {
                return Err(CompanionError::Io("message too large".to_string()));
            }
            buffer.extend_from_slice(&chunk[..read]);
        }

        serde_json::from_slice(&buffer).map_err(|e| CompanionError::Serialization(e.to_string()))
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for CompanionListener {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// Tests
// ============================================================================
