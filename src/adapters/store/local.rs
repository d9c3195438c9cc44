//! Object store backed by a local directory, used for dry runs

use super::{ObjectStore, StoredObject};
use crate::domain::{MirrorError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Writes objects below a root directory
///
/// Revisions are the SHA-256 of the file contents. The directory is never
/// archived.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a store path below the root, refusing anything that would
    /// escape it
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(MirrorError::Store("Empty object path".to_string()));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(MirrorError::Store(format!(
                        "Object path '{path}' escapes the output directory"
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

fn revision_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[async_trait]
impl ObjectStore for LocalDirStore {
    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(StoredObject {
                path: path.to_string(),
                revision: revision_of(&bytes),
                bytes: Some(bytes),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MirrorError::Store(format!(
                "Failed to read {}: {e}",
                full.display()
            ))),
        }
    }

    async fn create_or_update(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        base_revision: Option<&str>,
    ) -> Result<String> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MirrorError::Store(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|e| MirrorError::Store(format!("Failed to write {}: {e}", full.display())))?;

        tracing::debug!(
            path = %full.display(),
            size = bytes.len(),
            message = %message,
            replaced = base_revision.is_some(),
            "Wrote object to local store"
        );

        Ok(revision_of(bytes))
    }

    async fn is_archived(&self) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = LocalDirStore::new(dir.path());

        assert!(store.get_object("assets/a.png").await.unwrap().is_none());

        let revision = store
            .create_or_update("assets/a.png", b"png", "Add assets/a.png", None)
            .await
            .unwrap();
        let object = store.get_object("assets/a.png").await.unwrap().unwrap();

        assert_eq!(object.bytes.as_deref(), Some(&b"png"[..]));
        assert_eq!(object.revision, revision);
        assert!(dir.path().join("assets").join("a.png").exists());
    }

    #[tokio::test]
    async fn test_rejects_parent_segments() {
        let dir = TempDir::new().unwrap();
        let store = LocalDirStore::new(dir.path());

        let err = store
            .create_or_update("../outside.md", b"x", "Escape", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Store(_)));
    }

    #[tokio::test]
    async fn test_never_archived() {
        let dir = TempDir::new().unwrap();
        assert!(!LocalDirStore::new(dir.path()).is_archived().await.unwrap());
    }
}
