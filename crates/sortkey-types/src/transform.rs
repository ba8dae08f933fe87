// crates/sortkey-types/src/transform.rs
// ============================================================================
// Module: Partition and Sort Transforms
// Description: Transforms mapping a source field type to a derived result type.
// Purpose: Resolve sort-key component types and transform order equivalence.
// Dependencies: crate::types, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Transform`] derives a sort-key component from a source column
//! (identity, bucketing, truncation, or a calendar granularity). Only the
//! type-level behaviour lives here: which source types a transform accepts,
//! what result type it produces, and when two transforms order values the
//! same way. Transforms only ever produce scalar result types from scalar
//! sources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use thiserror::Error;

use crate::types::PrimitiveType;
use crate::types::Type;

// ============================================================================
// SECTION: Transform
// ============================================================================

/// Transform applied to a source field to derive a sort-key component.
///
/// # Invariants
/// - `Bucket` and `Truncate` parameters are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Source value unchanged.
    Identity,
    /// Hash bucket in `[0, N)`.
    Bucket(u32),
    /// Truncation to width `W`.
    Truncate(u32),
    /// Years since epoch.
    Year,
    /// Months since epoch.
    Month,
    /// Days since epoch.
    Day,
    /// Hours since epoch.
    Hour,
    /// Always null.
    Void,
}

impl Transform {
    /// Returns the result type produced for a source type.
    ///
    /// This is a pure type mapping; use [`Transform::can_transform`] to check
    /// whether the source type is accepted at all.
    #[must_use]
    pub fn result_type(&self, source: &Type) -> Type {
        match self {
            Self::Identity | Self::Truncate(_) | Self::Void => source.clone(),
            Self::Bucket(_) | Self::Year | Self::Month | Self::Hour => {
                Type::Primitive(PrimitiveType::Int)
            }
            Self::Day => Type::Primitive(PrimitiveType::Date),
        }
    }

    /// Returns true when the transform accepts the source type.
    #[must_use]
    pub fn can_transform(&self, source: &Type) -> bool {
        let Type::Primitive(primitive) = source else {
            return false;
        };
        match self {
            Self::Identity | Self::Void => true,
            Self::Bucket(_) => matches!(
                primitive,
                PrimitiveType::Int
                    | PrimitiveType::Long
                    | PrimitiveType::Decimal { .. }
                    | PrimitiveType::Date
                    | PrimitiveType::Time
                    | PrimitiveType::Timestamp
                    | PrimitiveType::Timestamptz
                    | PrimitiveType::String
                    | PrimitiveType::Uuid
                    | PrimitiveType::Fixed(_)
                    | PrimitiveType::Binary
            ),
            Self::Truncate(_) => matches!(
                primitive,
                PrimitiveType::Int
                    | PrimitiveType::Long
                    | PrimitiveType::Decimal { .. }
                    | PrimitiveType::String
                    | PrimitiveType::Binary
            ),
            Self::Year | Self::Month | Self::Day => matches!(
                primitive,
                PrimitiveType::Date | PrimitiveType::Timestamp | PrimitiveType::Timestamptz
            ),
            Self::Hour => {
                matches!(primitive, PrimitiveType::Timestamp | PrimitiveType::Timestamptz)
            }
        }
    }

    /// Returns true when both transforms order values identically.
    ///
    /// Truncation keeps the source type and preserves order whatever the
    /// width, so two truncates are equivalent. Every other transform must
    /// match exactly, parameters included.
    #[must_use]
    pub fn same_order(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Truncate(_), Self::Truncate(_)) => true,
            _ => self == other,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Bucket(buckets) => write!(f, "bucket[{buckets}]"),
            Self::Truncate(width) => write!(f, "truncate[{width}]"),
            Self::Year => f.write_str("year"),
            Self::Month => f.write_str("month"),
            Self::Day => f.write_str("day"),
            Self::Hour => f.write_str("hour"),
            Self::Void => f.write_str("void"),
        }
    }
}

impl FromStr for Transform {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parsed = match trimmed {
            "identity" => Self::Identity,
            "year" => Self::Year,
            "month" => Self::Month,
            "day" => Self::Day,
            "hour" => Self::Hour,
            "void" => Self::Void,
            _ => {
                if let Some(param) = bracketed(trimmed, "bucket") {
                    Self::Bucket(parse_parameter(trimmed, param)?)
                } else if let Some(param) = bracketed(trimmed, "truncate") {
                    Self::Truncate(parse_parameter(trimmed, param)?)
                } else {
                    return Err(TransformError::Unknown(trimmed.to_string()));
                }
            }
        };
        Ok(parsed)
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing transform names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Transform name is not recognized.
    #[error("unknown transform: {0}")]
    Unknown(String),
    /// Transform parameter is missing, malformed, or zero.
    #[error("invalid transform parameter: {0}")]
    InvalidParameter(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the bracketed parameter text for `name[...]`.
fn bracketed<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value.strip_prefix(name)?.strip_prefix('[')?.strip_suffix(']')
}

/// Parses a non-zero transform parameter.
fn parse_parameter(value: &str, param: &str) -> Result<u32, TransformError> {
    match param.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(TransformError::InvalidParameter(value.to_string())),
    }
}
