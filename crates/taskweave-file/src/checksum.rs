//! Content checksums for change detection
//!
//! Provides [`Checksum`], a strongly-typed 32-byte SHA-256 digest used to
//! decide whether a rewrite actually changed a file. Deterministic change
//! detection only, not an integrity or security mechanism.

use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content checksum (SHA-256)
///
/// Two files with equal checksums are treated as unchanged.
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Create a new Checksum from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create checksum from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChecksumError> {
        if bytes.len() != 32 {
            return Err(ChecksumError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Compute the checksum of arbitrary content bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Self(arr)
    }

    /// Compute the checksum of UTF-8 text content
    #[inline]
    #[must_use]
    pub fn of_text(content: &str) -> Self {
        Self::compute(content.as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; 32]> for Checksum {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

// Hex string in JSON, raw bytes in binary formats
impl serde::Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ChecksumVisitor;

        impl serde::de::Visitor<'_> for ChecksumVisitor {
            type Value = Checksum;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-byte checksum as hex string or byte array")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Checksum::from_slice(value).map_err(serde::de::Error::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(ChecksumVisitor)
        } else {
            deserializer.deserialize_bytes(ChecksumVisitor)
        }
    }
}

/// Errors that can occur when working with checksums
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// Invalid checksum length
    #[error("invalid checksum length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_compute_deterministic() {
        let data = b"export function login() {}";
        let c1 = Checksum::compute(data);
        let c2 = Checksum::compute(data);
        assert_eq!(c1, c2);
    }

    #[test]
    fn checksum_differs_for_different_content() {
        let c1 = Checksum::of_text("content a");
        let c2 = Checksum::of_text("content b");
        assert_ne!(c1, c2);
    }

    #[test]
    fn checksum_of_text_matches_bytes() {
        assert_eq!(Checksum::of_text("x"), Checksum::compute(b"x"));
    }

    #[test]
    fn checksum_display_and_parse() {
        let checksum = Checksum::of_text("test");
        let s = checksum.to_string();
        assert_eq!(s.len(), 64);
        let parsed: Checksum = s.parse().unwrap();
        assert_eq!(checksum, parsed);
    }

    #[test]
    fn checksum_from_slice_invalid_length() {
        let result = Checksum::from_slice(&[1u8; 16]);
        assert!(matches!(
            result,
            Err(ChecksumError::InvalidLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn checksum_short() {
        let checksum = Checksum::of_text("test");
        let short = checksum.short();
        assert_eq!(short.len(), 16);
        assert!(checksum.to_string().starts_with(&short));
    }

    #[test]
    fn checksum_serde_json_roundtrip() {
        let checksum = Checksum::of_text("test");
        let json = serde_json::to_string(&checksum).unwrap();
        let decoded: Checksum = serde_json::from_str(&json).unwrap();
        assert_eq!(checksum, decoded);
    }
}
