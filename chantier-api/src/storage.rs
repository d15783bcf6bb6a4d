//! Document bytes on disk.
//!
//! Uploaded files are written under `{root}/{project_id}/{document_id}.{ext}`
//! and the resulting path is recorded on the document row. The store is a
//! plain pass-through: no deduplication, no versioning; deleting a document
//! removes the row first and the file best-effort afterwards.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// Filesystem store for uploaded documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path where a document's bytes are stored
    pub fn path_for(&self, project_id: Uuid, document_id: Uuid, extension: &str) -> PathBuf {
        self.root
            .join(project_id.to_string())
            .join(format!("{}.{}", document_id, extension))
    }

    /// Writes document bytes, creating the project directory if needed
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or the write
    /// fails.
    pub async fn write(
        &self,
        project_id: Uuid,
        document_id: Uuid,
        extension: &str,
        bytes: &[u8],
    ) -> io::Result<PathBuf> {
        let dir = self.root.join(project_id.to_string());
        fs::create_dir_all(&dir).await?;

        let path = self.path_for(project_id, document_id, extension);
        fs::write(&path, bytes).await?;

        Ok(path)
    }

    /// Removes a stored file, logging instead of failing when it is already
    /// gone
    pub async fn remove(&self, stored_path: &str) {
        if let Err(e) = fs::remove_file(Path::new(stored_path)).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = stored_path, error = %e, "Failed to remove document file");
            }
        }
    }

    /// Removes a set of stored files best-effort
    pub async fn remove_all(&self, stored_paths: &[String]) {
        for path in stored_paths {
            self.remove(path).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_layout_keyed_by_project() {
        let store = DocumentStore::new("/var/lib/chantier");
        let project_id = Uuid::new_v4();
        let document_id = Uuid::new_v4();

        let path = store.path_for(project_id, document_id, "pdf");
        assert_eq!(
            path,
            PathBuf::from("/var/lib/chantier")
                .join(project_id.to_string())
                .join(format!("{}.pdf", document_id))
        );
    }

    #[tokio::test]
    async fn test_write_and_remove_roundtrip() {
        let root = std::env::temp_dir().join(format!("chantier-store-{}", Uuid::new_v4()));
        let store = DocumentStore::new(&root);
        let project_id = Uuid::new_v4();
        let document_id = Uuid::new_v4();

        let path = store
            .write(project_id, document_id, "pdf", b"%PDF-1.4 test")
            .await
            .unwrap();
        assert!(path.exists());

        store.remove(path.to_str().unwrap()).await;
        assert!(!path.exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_silent() {
        let store = DocumentStore::new("/tmp");
        // Must not panic or error
        store.remove("/tmp/chantier-does-not-exist-42.pdf").await;
    }
}
