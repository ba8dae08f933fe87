// crates/sortkey-types/src/hashing.rs
// ============================================================================
// Module: Canonical Fingerprints
// Description: RFC 8785 canonical JSON hashing for schemas and sort orders.
// Purpose: Provide stable fingerprints for configuration snapshots.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Fingerprints are SHA-256 digests over RFC 8785 (JCS) canonical JSON, so
//! key order and whitespace never change the result. A digest renders as
//! `sha256:<lowercase hex>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Supported fingerprint algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the algorithm label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Fingerprint digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced the digest.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.as_str(), self.value)
    }
}

/// Errors raised while fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// Value could not be canonicalized.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing
// ============================================================================

/// Hashes the canonical JSON form of a value.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when the value cannot be serialized.
pub fn hash_canonical_json<T: Serialize + ?Sized>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let canonical =
        serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    let value = match algorithm {
        HashAlgorithm::Sha256 => hex_encode(&Sha256::digest(&canonical)),
    };
    Ok(HashDigest {
        algorithm,
        value,
    })
}

/// Encodes bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
