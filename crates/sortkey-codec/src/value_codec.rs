// crates/sortkey-codec/src/value_codec.rs
// ============================================================================
// Module: Value Codec
// Description: Type-directed encoding of single scalar values.
// Purpose: Reproduce the persisted per-type wire layout byte for byte.
// Dependencies: bigdecimal, uuid, sortkey-types
// ============================================================================

//! ## Overview
//! One encode/decode pair per scalar [`TypeId`]. Composite identifiers are a
//! contract violation and fail with [`CodecError::UnsupportedType`].
//!
//! Wire layout (big-endian throughout):
//!
//! | type | bytes |
//! |---|---|
//! | boolean | 1 byte, 0 or 1 |
//! | integer, date | 4-byte signed |
//! | long, time, timestamp | 8-byte signed |
//! | float / double | 4 / 8 bytes IEEE-754 |
//! | string | i32 length + UTF-8 |
//! | uuid | 16 bytes, most significant half first |
//! | fixed, binary | i32 length + bytes |
//! | decimal | i32 length + two's-complement unscaled bytes + i32 scale |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use sortkey_types::TypeId;
use uuid::Uuid;

use crate::error::CodecError;
use crate::value::Value;
use crate::wire;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default cap on a single length-prefixed value.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 16 * 1024 * 1024;

/// Bounds applied to length-prefixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecLimits {
    /// Maximum bytes in one string, binary, or decimal magnitude.
    pub max_value_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Value Codec
// ============================================================================

/// Stateless scalar codec parameterised by limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueCodec {
    /// Length limits.
    limits: CodecLimits,
}

impl ValueCodec {
    /// Creates a value codec with the given limits.
    #[must_use]
    pub const fn new(limits: CodecLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> CodecLimits {
        self.limits
    }

    /// Checks that a value can be encoded under a type without writing it.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] for composite types, mismatched values, values
    /// over the length limit, and decimal scales outside `i32`.
    pub fn check(&self, type_id: TypeId, value: &Value) -> Result<(), CodecError> {
        if !type_id.is_primitive() {
            return Err(CodecError::UnsupportedType(type_id));
        }
        if !value.matches(type_id) {
            return Err(CodecError::ValueTypeMismatch {
                expected: type_id,
                found: value.kind(),
            });
        }
        let limit = self.limits.max_value_bytes;
        match value {
            Value::String(text) => {
                wire::checked_prefix(text.len(), limit)?;
            }
            Value::Binary(bytes) => {
                wire::checked_prefix(bytes.len(), limit)?;
            }
            Value::Decimal(decimal) => {
                let (unscaled, scale) = decimal.as_bigint_and_exponent();
                i32::try_from(scale).map_err(|_| CodecError::DecimalScaleOverflow(scale))?;
                wire::checked_prefix(unscaled.to_signed_bytes_be().len(), limit)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Encodes a value under a type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when [`ValueCodec::check`] fails or the sink fails.
    pub fn encode<W: Write + ?Sized>(
        &self,
        type_id: TypeId,
        value: &Value,
        sink: &mut W,
    ) -> Result<(), CodecError> {
        self.check(type_id, value)?;
        let limit = self.limits.max_value_bytes;
        match value {
            Value::Boolean(flag) => wire::write_u8(sink, u8::from(*flag))?,
            Value::Int(int) => wire::write_i32(sink, *int)?,
            Value::Long(long) => wire::write_i64(sink, *long)?,
            Value::Float(float) => wire::write_raw(sink, &float.to_be_bytes())?,
            Value::Double(double) => wire::write_raw(sink, &double.to_be_bytes())?,
            Value::String(text) => wire::write_prefixed(sink, text.as_bytes(), limit)?,
            Value::Uuid(uuid) => wire::write_raw(sink, uuid.as_bytes())?,
            Value::Binary(bytes) => wire::write_prefixed(sink, bytes, limit)?,
            Value::Decimal(decimal) => encode_decimal(decimal, sink, limit)?,
        }
        Ok(())
    }

    /// Decodes a value of a type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] for composite types, corrupt input, and early
    /// end of input.
    pub fn decode<R: Read + ?Sized>(
        &self,
        type_id: TypeId,
        source: &mut R,
    ) -> Result<Value, CodecError> {
        let limit = self.limits.max_value_bytes;
        let value = match type_id {
            TypeId::Boolean => Value::Boolean(read_flag(source)?),
            TypeId::Integer | TypeId::Date => Value::Int(wire::read_i32(source)?),
            TypeId::Long | TypeId::Time | TypeId::Timestamp => {
                Value::Long(wire::read_i64(source)?)
            }
            TypeId::Float => Value::Float(f32::from_be_bytes(wire::read_array(source)?)),
            TypeId::Double => Value::Double(f64::from_be_bytes(wire::read_array(source)?)),
            TypeId::String => {
                let bytes = wire::read_prefixed(source, limit)?;
                Value::String(String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?)
            }
            TypeId::Uuid => Value::Uuid(Uuid::from_bytes(wire::read_array(source)?)),
            TypeId::Fixed | TypeId::Binary => Value::Binary(wire::read_prefixed(source, limit)?),
            TypeId::Decimal => Value::Decimal(decode_decimal(source, limit)?),
            TypeId::Struct | TypeId::List | TypeId::Map => {
                return Err(CodecError::UnsupportedType(type_id));
            }
        };
        Ok(value)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a strict 0/1 flag byte.
pub(crate) fn read_flag<R: Read + ?Sized>(source: &mut R) -> Result<bool, CodecError> {
    match wire::read_u8(source)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidFlag(other)),
    }
}

/// Writes a decimal as unscaled bytes plus scale.
fn encode_decimal<W: Write + ?Sized>(
    decimal: &BigDecimal,
    sink: &mut W,
    limit: usize,
) -> Result<(), CodecError> {
    let (unscaled, scale) = decimal.as_bigint_and_exponent();
    let scale = i32::try_from(scale).map_err(|_| CodecError::DecimalScaleOverflow(scale))?;
    wire::write_prefixed(sink, &unscaled.to_signed_bytes_be(), limit)?;
    wire::write_i32(sink, scale)?;
    Ok(())
}

/// Reads a decimal written by [`encode_decimal`].
fn decode_decimal<R: Read + ?Sized>(source: &mut R, limit: usize) -> Result<BigDecimal, CodecError> {
    let unscaled = BigInt::from_signed_bytes_be(&wire::read_prefixed(source, limit)?);
    let scale = wire::read_i32(source)?;
    Ok(BigDecimal::new(unscaled, i64::from(scale)))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
