//! Object store abstraction
//!
//! Assets and the published document are written to a store that addresses
//! objects by path and versions them with an opaque revision string. The
//! live backend is a GitHub repository driven through the contents API; dry
//! runs write to a local directory instead.

pub mod factory;
pub mod github;
pub mod local;

use crate::domain::Result;
use async_trait::async_trait;

pub use factory::create_object_store;
pub use github::GitHubContentStore;
pub use local::LocalDirStore;

/// An object read back from a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Store-relative path
    pub path: String,

    /// Revision to pass back when updating the object
    pub revision: String,

    /// Current contents, `None` when the store only reported metadata
    pub bytes: Option<Vec<u8>>,
}

/// Path-addressed, versioned object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human readable name of the store, used in logs and errors
    fn describe(&self) -> String;

    /// Reads an object
    ///
    /// Returns `Ok(None)` when nothing is stored under `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or the response is
    /// malformed.
    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>>;

    /// Creates or replaces an object and returns its new revision
    ///
    /// # Arguments
    ///
    /// * `path` - Store-relative path
    /// * `bytes` - New contents
    /// * `message` - Commit message
    /// * `base_revision` - Revision being replaced, `None` when creating
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected. Callers decide whether the
    /// failure is worth retrying.
    async fn create_or_update(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        base_revision: Option<&str>,
    ) -> Result<String>;

    /// Whether the store refuses all writes
    ///
    /// # Errors
    ///
    /// Returns an error if the store metadata cannot be read.
    async fn is_archived(&self) -> Result<bool>;
}
