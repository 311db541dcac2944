//! Remote mirror: the single shared record in a per-account cloud store.
//!
//! The store holds exactly one record per account under a fixed identifier.
//! Reads fetch that record; writes overwrite it wholesale. There is no
//! optimistic-concurrency token, so two near-simultaneous writers resolve
//! to whichever upsert the store accepted last (last-write-wins, no merge).
//!
//! Implementations:
//! - [`HttpRemoteStore`]: JSON-over-HTTP client for the managed store.
//! - [`MemoryRemoteStore`]: in-memory double with failure injection.

pub mod error;
pub mod http;
pub mod memory;

pub use error::RemoteError;
pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use crate::types::SessionRecord;

/// Capability interface for the remote record store.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Fetches the account's session record.
    ///
    /// `Ok(None)` means the record does not exist yet, which is the normal
    /// first-run state and never treated as a failure.
    async fn fetch(&self) -> Result<Option<SessionRecord>, RemoteError>;

    /// Overwrites the account's session record, creating it if absent.
    async fn upsert(&self, record: &SessionRecord) -> Result<(), RemoteError>;
}

/// A disabled remote store: `None` never has a record and accepts writes
/// silently. Used when cloud sync is turned off in the configuration.
impl<R: RemoteStore> RemoteStore for Option<R> {
    async fn fetch(&self) -> Result<Option<SessionRecord>, RemoteError> {
        match self {
            Some(store) => store.fetch().await,
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), RemoteError> {
        match self {
            Some(store) => store.upsert(record).await,
            None => Ok(()),
        }
    }
}
