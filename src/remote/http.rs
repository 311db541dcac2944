//! HTTP client for the remote record store.
//!
//! Talks JSON to `{base_url}/containers/{container}/records/{record_id}`:
//! GET fetches the record (404 means it does not exist yet), PUT upserts
//! it wholesale. Requests carry a short timeout so a stuck fetch cannot
//! stall the sync loop past the next poll.

use std::time::Duration;

use reqwest::StatusCode;

use crate::types::SessionRecord;

use super::{RemoteError, RemoteStore};

/// Request timeout for store calls.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// JSON-over-HTTP [`RemoteStore`] for a per-account container.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    record_url: String,
}

impl HttpRemoteStore {
    /// Creates a store client for one record in one container.
    pub fn new(
        base_url: impl AsRef<str>,
        container: impl AsRef<str>,
        record_id: impl AsRef<str>,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let record_url = format!(
            "{}/containers/{}/records/{}",
            base_url.as_ref().trim_end_matches('/'),
            container.as_ref(),
            record_id.as_ref(),
        );

        Ok(Self { client, record_url })
    }

    /// The full URL of the account's record.
    pub fn record_url(&self) -> &str {
        &self.record_url
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self) -> Result<Option<SessionRecord>, RemoteError> {
        let response = self
            .client
            .get(&self.record_url)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record = response
                    .json::<SessionRecord>()
                    .await
                    .map_err(|e| RemoteError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            status => Err(RemoteError::Status(status.as_u16())),
        }
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(&self.record_url)
            .json(record)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Status(status.as_u16()))
        }
    }
}
