// crates/sortkey-codec/src/wire.rs
// ============================================================================
// Module: Wire Primitives
// Description: Big-endian fixed-width and length-prefixed byte primitives.
// Purpose: Share bounded read/write helpers between tuples and snapshots.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! All multi-byte integers are big-endian. Length prefixes are signed 32-bit
//! and are validated against a caller-supplied limit before any buffer is
//! allocated, so a corrupt prefix cannot trigger a large allocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Read;
use std::io::Write;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Low-level wire errors, mapped into codec and snapshot errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Input ended early.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Underlying I/O failed.
    #[error("io error: {0}")]
    Io(String),
    /// Length prefix is negative.
    #[error("invalid length prefix: {0}")]
    InvalidLength(i32),
    /// Length exceeds the limit.
    #[error("length {length} exceeds limit {limit}")]
    LengthLimitExceeded {
        /// Length found or requested.
        length: usize,
        /// Configured limit.
        limit: usize,
    },
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Writes a single byte.
pub(crate) fn write_u8<W: Write + ?Sized>(sink: &mut W, value: u8) -> Result<(), WireError> {
    Ok(sink.write_all(&[value])?)
}

/// Writes a big-endian `i32`.
pub(crate) fn write_i32<W: Write + ?Sized>(sink: &mut W, value: i32) -> Result<(), WireError> {
    Ok(sink.write_all(&value.to_be_bytes())?)
}

/// Writes a big-endian `u32`.
pub(crate) fn write_u32<W: Write + ?Sized>(sink: &mut W, value: u32) -> Result<(), WireError> {
    Ok(sink.write_all(&value.to_be_bytes())?)
}

/// Writes a big-endian `i64`.
pub(crate) fn write_i64<W: Write + ?Sized>(sink: &mut W, value: i64) -> Result<(), WireError> {
    Ok(sink.write_all(&value.to_be_bytes())?)
}

/// Writes raw bytes without a prefix.
pub(crate) fn write_raw<W: Write + ?Sized>(sink: &mut W, bytes: &[u8]) -> Result<(), WireError> {
    Ok(sink.write_all(bytes)?)
}

/// Writes an `i32` length prefix followed by the bytes.
pub(crate) fn write_prefixed<W: Write + ?Sized>(
    sink: &mut W,
    bytes: &[u8],
    limit: usize,
) -> Result<(), WireError> {
    let length = checked_prefix(bytes.len(), limit)?;
    write_i32(sink, length)?;
    write_raw(sink, bytes)
}

/// Converts a byte count into a length prefix, enforcing the limit.
pub(crate) fn checked_prefix(length: usize, limit: usize) -> Result<i32, WireError> {
    if length > limit {
        return Err(WireError::LengthLimitExceeded {
            length,
            limit,
        });
    }
    i32::try_from(length).map_err(|_| WireError::LengthLimitExceeded {
        length,
        limit: usize::try_from(i32::MAX).unwrap_or(usize::MAX),
    })
}

// ============================================================================
// SECTION: Readers
// ============================================================================

/// Reads exactly `N` bytes.
pub(crate) fn read_array<const N: usize, R: Read + ?Sized>(
    source: &mut R,
) -> Result<[u8; N], WireError> {
    let mut buf = [0_u8; N];
    source.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a single byte.
pub(crate) fn read_u8<R: Read + ?Sized>(source: &mut R) -> Result<u8, WireError> {
    let [byte] = read_array::<1, R>(source)?;
    Ok(byte)
}

/// Reads a big-endian `i32`.
pub(crate) fn read_i32<R: Read + ?Sized>(source: &mut R) -> Result<i32, WireError> {
    Ok(i32::from_be_bytes(read_array(source)?))
}

/// Reads a big-endian `u32`.
pub(crate) fn read_u32<R: Read + ?Sized>(source: &mut R) -> Result<u32, WireError> {
    Ok(u32::from_be_bytes(read_array(source)?))
}

/// Reads a big-endian `i64`.
pub(crate) fn read_i64<R: Read + ?Sized>(source: &mut R) -> Result<i64, WireError> {
    Ok(i64::from_be_bytes(read_array(source)?))
}

/// Reads an `i32` length prefix and the bytes it announces.
pub(crate) fn read_prefixed<R: Read + ?Sized>(
    source: &mut R,
    limit: usize,
) -> Result<Vec<u8>, WireError> {
    let length = read_i32(source)?;
    let length = usize::try_from(length).map_err(|_| WireError::InvalidLength(length))?;
    if length > limit {
        return Err(WireError::LengthLimitExceeded {
            length,
            limit,
        });
    }
    let mut buf = vec![0_u8; length];
    source.read_exact(&mut buf)?;
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
