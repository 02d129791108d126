//! File storage collaborator boundary
//!
//! The orchestrator needs a file id before generated content exists for a
//! creation task. [`FileStorage::create_placeholder`] is that single point
//! of contact; persistence mechanics live behind the trait.

use crate::record::{FileRecord, ProjectId};
use crate::ProjectPath;
use async_trait::async_trait;
use std::sync::Mutex;

/// Errors from the file storage collaborator
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Record creation failed
    #[error("failed to create file record for '{path}': {reason}")]
    CreateFailed {
        /// Target path
        path: String,
        /// Backend-specific reason
        reason: String,
    },

    /// Backend unavailable
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// File storage boundary used by the task plan executor
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create a placeholder record for a file about to be generated
    ///
    /// Called for creation tasks only, before final content is known, so
    /// an id exists to thread through the rewrite.
    ///
    /// # Errors
    /// Returns [`StorageError`] if the backing store rejects the record.
    async fn create_placeholder(
        &self,
        project_id: ProjectId,
        path: &ProjectPath,
        initial_content: &str,
    ) -> Result<FileRecord, StorageError>;
}

/// In-memory storage backend
///
/// Records exist only for the lifetime of this instance. Suitable for
/// tests and for callers that persist results themselves after a run.
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    created: Mutex<Vec<FileRecord>>,
}

impl InMemoryFileStorage {
    /// Create empty storage
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records created through this instance, in creation order
    #[must_use]
    pub fn created_records(&self) -> Vec<FileRecord> {
        self.created
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn create_placeholder(
        &self,
        project_id: ProjectId,
        path: &ProjectPath,
        initial_content: &str,
    ) -> Result<FileRecord, StorageError> {
        let record = FileRecord::new(project_id, path.clone(), initial_content);
        self.created
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?
            .push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn placeholder_gets_identity_and_checksum() {
        let storage = InMemoryFileStorage::new();
        let path = ProjectPath::from_str("src/new.ts").unwrap();

        let record = storage
            .create_placeholder(ProjectId::new(), &path, "// pending")
            .await
            .unwrap();

        assert_eq!(record.path, path);
        assert_eq!(record.content, "// pending");
        assert_eq!(record.checksum, crate::Checksum::of_text("// pending"));
    }

    #[tokio::test]
    async fn created_records_are_tracked() {
        let storage = InMemoryFileStorage::new();
        let project = ProjectId::new();
        let a = ProjectPath::from_str("a.ts").unwrap();
        let b = ProjectPath::from_str("b.ts").unwrap();

        storage.create_placeholder(project, &a, "").await.unwrap();
        storage.create_placeholder(project, &b, "").await.unwrap();

        let created = storage.created_records();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].path, a);
        assert_eq!(created[1].path, b);
    }
}
