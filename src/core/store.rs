//! Store client used by the pipelines
//!
//! Wraps an [`ObjectStore`] with the run's policies: lookups never fail, and
//! writes are guarded against archived targets and retried up to a ceiling.

use crate::adapters::store::{ObjectStore, StoredObject};
use crate::domain::{MirrorError, Result};
use crate::log_retry_attempt;
use std::sync::Arc;

/// Policy wrapper around an object store
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn ObjectStore>,
    max_attempts: usize,
}

impl StoreClient {
    /// Creates a client that tries each write at most `max_attempts` times
    pub fn new(store: Arc<dyn ObjectStore>, max_attempts: usize) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Looks up the object at `path`
    ///
    /// A miss is `None`. Any other lookup failure is logged and also reported
    /// as `None`, so a flaky read never blocks the write that follows.
    pub async fn exists(&self, path: &str) -> Option<StoredObject> {
        match self.store.get_object(path).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                tracing::warn!(
                    store = %self.store.describe(),
                    path = %path,
                    error = %e,
                    "Lookup failed, treating object as absent"
                );
                None
            }
        }
    }

    /// Writes `bytes` to `path` and returns the new revision
    ///
    /// The archive flag is checked before every attempt. Each attempt is a
    /// full write; there is no delay between attempts.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::Archived`] as soon as the target reports archived
    /// - [`MirrorError::RetryExhausted`] after `max_attempts` failed attempts
    pub async fn publish(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        base_revision: Option<&str>,
    ) -> Result<String> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(path, bytes, message, base_revision).await {
                Ok(revision) => {
                    tracing::debug!(
                        store = %self.store.describe(),
                        path = %path,
                        attempt = attempt,
                        "Object written"
                    );
                    return Ok(revision);
                }
                Err(e @ MirrorError::Archived(_)) => return Err(e),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        log_retry_attempt!(attempt, self.max_attempts, last_error);
                    }
                }
            }
        }

        tracing::error!(
            store = %self.store.describe(),
            path = %path,
            attempts = self.max_attempts,
            error = %last_error,
            "Giving up on write"
        );
        Err(MirrorError::RetryExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }

    async fn attempt(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        base_revision: Option<&str>,
    ) -> Result<String> {
        if self.store.is_archived().await? {
            return Err(MirrorError::Archived(self.store.describe()));
        }
        self.store
            .create_or_update(path, bytes, message, base_revision)
            .await
    }
}
