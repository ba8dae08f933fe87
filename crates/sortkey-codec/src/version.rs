// crates/sortkey-codec/src/version.rs
// ============================================================================
// Module: Format Versions
// Description: Closed set of sort-key tuple format versions.
// Purpose: Gate null markers and reject unknown persisted versions.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Version 1 tuples carry no null markers; version 2 prefixes every field
//! with a one-byte null flag. Versions only move forward: unknown numbers
//! are rejected rather than mapped to a guess.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Format Version
// ============================================================================

/// Tuple format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FormatVersion {
    /// Legacy format without null markers.
    V1,
    /// Current format with a null flag per field.
    V2,
}

impl FormatVersion {
    /// The version new codecs use.
    pub const CURRENT: Self = Self::V2;

    /// Returns the numeric version tag.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Returns true when tuples carry null flags.
    #[must_use]
    pub const fn supports_nulls(self) -> bool {
        matches!(self, Self::V2)
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = UnknownVersionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(UnknownVersionError(other)),
        }
    }
}

impl From<FormatVersion> for u32 {
    fn from(version: FormatVersion) -> Self {
        version.as_u32()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// A persisted version number outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown format version: {0}")]
pub struct UnknownVersionError(pub u32);
