// crates/sortkey-codec/src/error.rs
// ============================================================================
// Module: Codec Errors
// Description: Error types for tuple encoding and snapshot persistence.
// Purpose: Surface contract violations and corrupt input without panicking.
// Dependencies: crate::version, sortkey-types, thiserror
// ============================================================================

//! ## Overview
//! Every failure in this crate is local and immediate: contract violations
//! (size mismatch, composite layout types, nulls in the legacy format) point
//! at misconfiguration, and decode failures point at corrupt bytes. Nothing
//! is retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sortkey_types::HashError;
use sortkey_types::SortOrderError;
use sortkey_types::TextError;
use sortkey_types::TypeId;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::version::UnknownVersionError;
use crate::wire::WireError;

// ============================================================================
// SECTION: Codec Errors
// ============================================================================

/// Errors raised while encoding or decoding sort keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Tuple size disagrees with the layout size.
    #[error("sort key size mismatch: layout has {expected} fields, tuple has {actual}")]
    SizeMismatch {
        /// Layout size.
        expected: usize,
        /// Tuple size.
        actual: usize,
    },
    /// A layout position resolves to a composite type.
    #[error("unsupported sort key type: {0}")]
    UnsupportedType(TypeId),
    /// A value does not match the layout type at its position.
    #[error("value of kind {found} cannot be encoded as {expected}")]
    ValueTypeMismatch {
        /// Layout type identifier.
        expected: TypeId,
        /// Kind of the supplied value.
        found: &'static str,
    },
    /// Fixed-length bytes have the wrong length.
    #[error("fixed value has {actual} bytes, expected {expected}")]
    FixedLengthMismatch {
        /// Declared fixed length.
        expected: u32,
        /// Actual byte length.
        actual: usize,
    },
    /// A null value was supplied to the legacy format.
    #[error("format version 1 cannot encode a null at position {position}")]
    NullInLegacyFormat {
        /// Position of the null value.
        position: usize,
    },
    /// A boolean or null flag byte is neither 0 nor 1.
    #[error("invalid flag byte: {0}")]
    InvalidFlag(u8),
    /// A length prefix is negative.
    #[error("invalid length prefix: {0}")]
    InvalidLength(i32),
    /// A length exceeds the configured limit.
    #[error("length {length} exceeds limit {limit}")]
    LengthLimitExceeded {
        /// Length found or requested.
        length: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Decimal scale does not fit the wire representation.
    #[error("decimal scale out of range: {0}")]
    DecimalScaleOverflow(i64),
    /// String bytes are not valid UTF-8.
    #[error("string value is not valid utf-8")]
    InvalidUtf8,
    /// A tuple position is outside the tuple.
    #[error("position {position} out of range for sort key of size {size}")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Tuple size.
        size: usize,
    },
    /// Format version is not known.
    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersionError),
    /// Input ended before a value was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Underlying I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::UnexpectedEof => Self::UnexpectedEof,
            WireError::Io(message) => Self::Io(message),
            WireError::InvalidLength(length) => Self::InvalidLength(length),
            WireError::LengthLimitExceeded {
                length,
                limit,
            } => Self::LengthLimitExceeded {
                length,
                limit,
            },
        }
    }
}

// ============================================================================
// SECTION: Snapshot Errors
// ============================================================================

/// Errors raised while persisting or restoring configuration snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot lacks its schema or sort order.
    #[error("invalid snapshot state: {0}")]
    InvalidState(&'static str),
    /// Declared version is not known.
    #[error(transparent)]
    UnknownVersion(#[from] UnknownVersionError),
    /// Schema or sort order text is invalid.
    #[error(transparent)]
    Text(#[from] TextError),
    /// Sort order does not bind to the schema.
    #[error(transparent)]
    SortOrder(#[from] SortOrderError),
    /// Codec layout could not be derived.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// Fingerprint could not be computed.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// Text block is not valid UTF-8.
    #[error("snapshot text is not valid utf-8")]
    InvalidUtf8,
    /// A text block length prefix is negative.
    #[error("invalid length prefix: {0}")]
    InvalidLength(i32),
    /// A text block exceeds the configured limit.
    #[error("text block of {length} bytes exceeds limit {limit}")]
    LengthLimitExceeded {
        /// Length found.
        length: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Input ended before the snapshot was complete.
    #[error("unexpected end of snapshot")]
    UnexpectedEof,
    /// Underlying I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<WireError> for SnapshotError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::UnexpectedEof => Self::UnexpectedEof,
            WireError::Io(message) => Self::Io(message),
            WireError::InvalidLength(length) => Self::InvalidLength(length),
            WireError::LengthLimitExceeded {
                length,
                limit,
            } => Self::LengthLimitExceeded {
                length,
                limit,
            },
        }
    }
}
