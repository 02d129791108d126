//! TaskWeave File System
//!
//! Project file records with deterministic change detection.
//!
//! # Core Concepts
//!
//! - [`FileRecord`]: A project file with identity, content and checksum
//! - [`Checksum`]: 32-byte SHA-256 digest used purely for change detection
//! - [`ProjectPath`]: Canonical project-relative path form
//! - [`FileStorage`]: Collaborator boundary for creating file records
//!
//! # Example
//!
//! ```rust,ignore
//! use taskweave_file::{Checksum, FileRecord, ProjectId, ProjectPath};
//!
//! let path = ProjectPath::normalize("src/auth.ts")?;
//! let file = FileRecord::new(ProjectId::new(), path, "export {}");
//! assert_eq!(file.checksum, Checksum::of_text("export {}"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod checksum;
mod path;
mod record;
mod store;

// Re-exports
pub use checksum::{Checksum, ChecksumError};
pub use path::{PathError, ProjectPath};
pub use record::{FileId, FileRecord, ProjectId};
pub use store::{FileStorage, InMemoryFileStorage, StorageError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
