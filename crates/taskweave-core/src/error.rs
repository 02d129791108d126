//! Error types for TaskWeave Core
//!
//! Provides error handling for:
//! - Context validation failures
//! - Planning failures (schema violations, missing target paths)
//! - Per-task execution failures
//!
//! Task-level errors never retry; the executor halts on the first failure
//! and leaves later tasks pending. The orchestrator boundary converts
//! every error into a failed run result instead of propagating.

use taskweave_file::{PathError, StorageError};
use taskweave_genai::{GenerationError, SchemaValidationError};

/// Main run error type
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Run context failed structural validation
    #[error("invalid context: {0}")]
    InvalidContext(#[from] ContextError),

    /// Structured model output failed its schema
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// Planner emitted a task without a usable target path
    #[error("task '{title}' has no target file path")]
    MissingTargetPath {
        /// Title of the offending task
        title: String,
    },

    /// Planner emitted a path that does not normalize
    #[error("task '{title}' has invalid target path '{path}': {source}")]
    InvalidTargetPath {
        /// Title of the offending task
        title: String,
        /// The raw path as emitted
        path: String,
        /// Normalization failure
        source: PathError,
    },

    /// Generation service call failed
    #[error("generation failed: {0}")]
    Generation(String),

    /// File storage collaborator failed
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<GenerationError> for AgentError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::RequestFailed(msg) => Self::Generation(msg),
            GenerationError::InvalidResponse(e) => Self::SchemaValidation(e),
        }
    }
}

/// Context validation errors
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The user request is empty
    #[error("user request is empty")]
    EmptyRequest,

    /// Two files in the snapshot share a path
    #[error("duplicate file path in context: '{0}'")]
    DuplicatePath(String),

    /// A file belongs to a different project
    #[error("file '{path}' belongs to foreign project {project_id}")]
    ForeignFile {
        /// Path of the offending file
        path: String,
        /// Its declared project id
        project_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskweave_genai::FieldError;

    #[test]
    fn agent_error_display() {
        let err = AgentError::MissingTargetPath {
            title: "add tests".to_string(),
        };
        assert!(err.to_string().contains("no target file path"));
    }

    #[test]
    fn generation_error_splits_into_variants() {
        let request_failed: AgentError =
            GenerationError::RequestFailed("quota exceeded".to_string()).into();
        assert!(matches!(request_failed, AgentError::Generation(_)));

        let invalid: AgentError = GenerationError::InvalidResponse(SchemaValidationError {
            type_name: "TaskPlan",
            raw: json!({}),
            errors: vec![FieldError {
                pointer: "/tasks".to_string(),
                message: "required".to_string(),
            }],
        })
        .into();
        assert!(matches!(invalid, AgentError::SchemaValidation(_)));
    }

    #[test]
    fn context_error_display() {
        let err = ContextError::DuplicatePath("src/a.ts".to_string());
        assert!(err.to_string().contains("src/a.ts"));
    }
}
