// crates/sortkey-codec/src/value.rs
// ============================================================================
// Module: Sort Key Values
// Description: Scalar values and the fixed-length sort key tuple.
// Purpose: Hold transformed field values positionally for encoding.
// Dependencies: bigdecimal, uuid, sortkey-types
// ============================================================================

//! ## Overview
//! [`Value`] is the in-memory form of one scalar sort-key component. Dates
//! are day counts in `Int`; times and timestamps are microsecond counts in
//! `Long`; fixed and variable bytes are both `Binary`.
//!
//! [`SortKey`] is a fixed-length tuple of nullable values. Its length never
//! changes after construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use sortkey_types::TypeId;
use uuid::Uuid;

use crate::error::CodecError;

// ============================================================================
// SECTION: Value
// ============================================================================

/// Scalar sort-key value.
///
/// Floats and doubles compare by bit pattern, so `NaN` equals itself and
/// `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean.
    Boolean(bool),
    /// 32-bit integer or date (days since epoch).
    Int(i32),
    /// 64-bit integer, time or timestamp (microseconds).
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// UUID.
    Uuid(Uuid),
    /// Fixed or variable-length bytes.
    Binary(Vec<u8>),
    /// Decimal.
    Decimal(BigDecimal),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Long(left), Self::Long(right)) => left == right,
            (Self::Float(left), Self::Float(right)) => left.to_bits() == right.to_bits(),
            (Self::Double(left), Self::Double(right)) => left.to_bits() == right.to_bits(),
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Uuid(left), Self::Uuid(right)) => left == right,
            (Self::Binary(left), Self::Binary(right)) => left == right,
            (Self::Decimal(left), Self::Decimal(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns a short label for the value kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Binary(_) => "binary",
            Self::Decimal(_) => "decimal",
        }
    }

    /// Returns true when the value can be stored under the type identifier.
    #[must_use]
    pub const fn matches(&self, type_id: TypeId) -> bool {
        matches!(
            (self, type_id),
            (Self::Boolean(_), TypeId::Boolean)
                | (Self::Int(_), TypeId::Integer | TypeId::Date)
                | (Self::Long(_), TypeId::Long | TypeId::Time | TypeId::Timestamp)
                | (Self::Float(_), TypeId::Float)
                | (Self::Double(_), TypeId::Double)
                | (Self::String(_), TypeId::String)
                | (Self::Uuid(_), TypeId::Uuid)
                | (Self::Binary(_), TypeId::Fixed | TypeId::Binary)
                | (Self::Decimal(_), TypeId::Decimal)
        )
    }

    /// Widens the value to the target type where a lossless promotion exists.
    ///
    /// Int widens to long and float to double; every other value is returned
    /// unchanged.
    #[must_use]
    pub fn promote(self, target: TypeId) -> Self {
        match (self, target) {
            (Self::Int(value), TypeId::Long) => Self::Long(i64::from(value)),
            (Self::Float(value), TypeId::Double) => Self::Double(f64::from(value)),
            (value, _) => value,
        }
    }
}

// ============================================================================
// SECTION: Sort Key
// ============================================================================

/// Fixed-length tuple of nullable values, one per layout position.
///
/// # Invariants
/// - The number of positions is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortKey {
    /// Values by position; `None` is null.
    values: Vec<Option<Value>>,
}

impl SortKey {
    /// Creates an all-null tuple of the given size.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![None; size],
        }
    }

    /// Creates a tuple from values.
    #[must_use]
    pub const fn from_values(values: Vec<Option<Value>>) -> Self {
        Self {
            values,
        }
    }

    /// Returns the number of positions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns the value at a position; `None` for null or out of range.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position).and_then(Option::as_ref)
    }

    /// Sets the value at a position.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::PositionOutOfRange`] when the position is outside the tuple.
    pub fn set(&mut self, position: usize, value: Option<Value>) -> Result<(), CodecError> {
        let size = self.values.len();
        let slot = self.values.get_mut(position).ok_or(CodecError::PositionOutOfRange {
            position,
            size,
        })?;
        *slot = value;
        Ok(())
    }

    /// Resets every position to null.
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|slot| *slot = None);
    }

    /// Returns all positions in order.
    #[must_use]
    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Consumes the tuple and returns its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Option<Value>> {
        self.values
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
