//! Project file records
//!
//! [`FileRecord`] is the unit the orchestrator tracks: identity, canonical
//! path, content and its checksum. Identity is the immutable [`FileId`];
//! at most one record per path is resolvable in a run's snapshot.

use crate::checksum::Checksum;
use crate::path::ProjectPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique file identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub Ulid);

impl FileId {
    /// Generate new file ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Ulid);

impl ProjectId {
    /// Generate new project ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project file as tracked through a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Immutable identity
    pub id: FileId,
    /// Owning project
    pub project_id: ProjectId,
    /// Canonical project-relative path
    pub path: ProjectPath,
    /// File name (final path segment)
    pub name: String,
    /// File extension including the dot, empty if none
    pub extension: String,
    /// Full file content
    pub content: String,
    /// Checksum of `content`
    pub checksum: Checksum,
    /// Content size in bytes
    pub size: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new record, deriving name, extension, checksum and size
    /// from the path and content
    #[must_use]
    pub fn new(project_id: ProjectId, path: ProjectPath, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: FileId::new(),
            project_id,
            name: path.file_name().to_string(),
            extension: path.extension().to_string(),
            checksum: Checksum::of_text(&content),
            size: content.len() as u64,
            path,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produce an updated copy with new content
    ///
    /// Identity, project and path are preserved; checksum, size and
    /// `updated_at` are recomputed.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            checksum: Checksum::of_text(&content),
            size: content.len() as u64,
            content,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
