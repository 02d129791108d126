//! Canonical project-relative file paths
//!
//! Provides [`ProjectPath`], the normalized path form every task and file
//! record resolves against. Planner output may arrive with backslashes,
//! leading `./` or duplicate separators; normalization makes path equality
//! reliable for creation-vs-modification decisions.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Normalized project-relative path
///
/// Canonical form: forward slashes only, no leading `./`, no empty or
/// duplicate segments, no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectPath(String);

impl ProjectPath {
    /// Normalize a raw path into canonical form
    ///
    /// # Errors
    /// Returns error if the path is empty after normalization or escapes
    /// the project root (`..` segments).
    pub fn normalize(raw: &str) -> Result<Self, PathError> {
        let unified = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(PathError::EscapesRoot(raw.to_string())),
                seg => segments.push(seg),
            }
        }
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments.join("/")))
    }

    /// Get the canonical path string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name (final segment)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File extension including the dot, or empty string
    ///
    /// # Examples
    /// - `src/auth.ts` → `.ts`
    /// - `Makefile` → ``
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[idx..],
            _ => "",
        }
    }

    /// Parent directory path, or `None` for top-level files
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }
}

impl Display for ProjectPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for ProjectPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<ProjectPath> for String {
    fn from(path: ProjectPath) -> Self {
        path.0
    }
}

/// Errors related to project paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Path is empty or reduces to nothing
    #[error("path is empty")]
    Empty,

    /// Path escapes the project root
    #[error("path escapes project root: {0}")]
    EscapesRoot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_already_canonical() {
        let path = ProjectPath::normalize("src/utils/auth.ts").unwrap();
        assert_eq!(path.as_str(), "src/utils/auth.ts");
    }

    #[test]
    fn path_backslashes_unified() {
        let path = ProjectPath::normalize(r"src\utils\auth.ts").unwrap();
        assert_eq!(path.as_str(), "src/utils/auth.ts");
    }

    #[test]
    fn path_leading_dot_slash_stripped() {
        let path = ProjectPath::normalize("./src/main.rs").unwrap();
        assert_eq!(path.as_str(), "src/main.rs");
    }

    #[test]
    fn path_duplicate_separators_collapsed() {
        let path = ProjectPath::normalize("src//nested///file.ts").unwrap();
        assert_eq!(path.as_str(), "src/nested/file.ts");
    }

    #[test]
    fn path_trailing_slash_stripped() {
        let path = ProjectPath::normalize("src/module/").unwrap();
        assert_eq!(path.as_str(), "src/module");
    }

    #[test]
    fn path_empty_rejected() {
        assert!(matches!(ProjectPath::normalize(""), Err(PathError::Empty)));
        assert!(matches!(ProjectPath::normalize("./"), Err(PathError::Empty)));
    }

    #[test]
    fn path_parent_escape_rejected() {
        let result = ProjectPath::normalize("../outside.ts");
        assert!(matches!(result, Err(PathError::EscapesRoot(_))));
    }

    #[test]
    fn path_file_name_and_extension() {
        let path = ProjectPath::normalize("src/utils/auth.ts").unwrap();
        assert_eq!(path.file_name(), "auth.ts");
        assert_eq!(path.extension(), ".ts");
    }

    #[test]
    fn path_no_extension() {
        let path = ProjectPath::normalize("Makefile").unwrap();
        assert_eq!(path.extension(), "");
    }

    #[test]
    fn path_hidden_file_is_not_extension() {
        let path = ProjectPath::normalize("src/.gitignore").unwrap();
        assert_eq!(path.extension(), "");
    }

    #[test]
    fn path_parent() {
        let nested = ProjectPath::normalize("src/utils/auth.ts").unwrap();
        assert_eq!(nested.parent(), Some("src/utils"));

        let top = ProjectPath::normalize("README.md").unwrap();
        assert_eq!(top.parent(), None);
    }

    #[test]
    fn path_equality_after_normalization() {
        let a = ProjectPath::normalize(r".\src\a.ts").unwrap();
        let b = ProjectPath::normalize("src/a.ts").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn path_serializes_as_plain_string() {
        let path = ProjectPath::normalize("src/a.ts").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"src/a.ts\"");
    }

    #[test]
    fn path_deserialization_normalizes() {
        let path: ProjectPath = serde_json::from_str(r#"".\\src\\a.ts""#).unwrap();
        assert_eq!(path.as_str(), "src/a.ts");
    }
}
