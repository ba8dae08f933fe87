// crates/sortkey-types/src/sort_order.rs
// ============================================================================
// Module: Sort Orders
// Description: Ordered (source field, transform) sequences defining sort keys.
// Purpose: Provide sort order equivalence, binding, and source id discovery.
// Dependencies: crate::{schema, transform}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`SortOrder`] lists the fields a record is sorted by. Position matters:
//! it defines the positional layout of the derived sort key. Binding a sort
//! order against a [`Schema`] validates that every source field exists and
//! accepts its transform.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::schema::Schema;
use crate::transform::Transform;

// ============================================================================
// SECTION: Sort Field
// ============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Placement of nulls relative to non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullOrder {
    /// Nulls sort before values.
    NullsFirst,
    /// Nulls sort after values.
    NullsLast,
}

/// One component of a sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SortField {
    /// Transform applied to the source field.
    pub transform: Transform,
    /// Source field id.
    pub source_id: i32,
    /// Sort direction.
    pub direction: SortDirection,
    /// Null placement.
    pub null_order: NullOrder,
}

impl SortField {
    /// Ascending field with nulls first.
    #[must_use]
    pub const fn asc(source_id: i32, transform: Transform) -> Self {
        Self {
            transform,
            source_id,
            direction: SortDirection::Asc,
            null_order: NullOrder::NullsFirst,
        }
    }

    /// Descending field with nulls last.
    #[must_use]
    pub const fn desc(source_id: i32, transform: Transform) -> Self {
        Self {
            transform,
            source_id,
            direction: SortDirection::Desc,
            null_order: NullOrder::NullsLast,
        }
    }

    /// Returns true when both fields order records identically.
    #[must_use]
    pub fn same_order(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.direction == other.direction
            && self.null_order == other.null_order
            && self.transform.same_order(&other.transform)
    }
}

// ============================================================================
// SECTION: Sort Order
// ============================================================================

/// Ordered sequence of sort fields.
///
/// # Invariants
/// - The unsorted order has id 0 and no fields; sorted orders have id >= 1
///   (checked by [`SortOrder::bind`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SortOrder {
    /// Sort order identifier.
    pub order_id: i32,
    /// Fields in sort priority order.
    pub fields: Vec<SortField>,
}

impl SortOrder {
    /// Creates a sort order.
    #[must_use]
    pub const fn new(order_id: i32, fields: Vec<SortField>) -> Self {
        Self {
            order_id,
            fields,
        }
    }

    /// The unsorted order.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self {
            order_id: 0,
            fields: Vec::new(),
        }
    }

    /// Returns true for the unsorted order.
    #[must_use]
    pub fn is_unsorted(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true when both orders sort records identically.
    ///
    /// Order ids are ignored; field count, source ids, directions, null
    /// orders and transform equivalence must match position by position.
    #[must_use]
    pub fn same_order(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(left, right)| left.same_order(right))
    }

    /// Returns the set of source field ids referenced by the order.
    #[must_use]
    pub fn source_ids(&self) -> BTreeSet<i32> {
        self.fields.iter().map(|field| field.source_id).collect()
    }

    /// Validates the order against a schema and returns the bound order.
    ///
    /// # Errors
    ///
    /// Returns [`SortOrderError`] when the order id is inconsistent, a source
    /// field is missing, or a transform cannot apply to its source type.
    pub fn bind(&self, schema: &Schema) -> Result<Self, SortOrderError> {
        if self.fields.is_empty() && self.order_id != 0 {
            return Err(SortOrderError::InvalidOrderId(self.order_id));
        }
        if !self.fields.is_empty() && self.order_id == 0 {
            return Err(SortOrderError::InvalidOrderId(self.order_id));
        }
        for (position, field) in self.fields.iter().enumerate() {
            let Some(source) = schema.find_field(field.source_id) else {
                return Err(SortOrderError::UnknownField {
                    position,
                    source_id: field.source_id,
                });
            };
            if !field.transform.can_transform(&source.field_type) {
                return Err(SortOrderError::InvalidTransform {
                    source_id: field.source_id,
                    transform: field.transform.to_string(),
                    source_type: source.field_type.to_string(),
                });
            }
        }
        Ok(self.clone())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sort order binding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortOrderError {
    /// Order id is inconsistent with the field list.
    #[error("invalid sort order id: {0}")]
    InvalidOrderId(i32),
    /// A sort field references a field the schema does not have.
    #[error("sort field {position} references unknown source field {source_id}")]
    UnknownField {
        /// Position of the sort field.
        position: usize,
        /// Missing source field id.
        source_id: i32,
    },
    /// A transform cannot apply to its source type.
    #[error("transform {transform} cannot apply to field {source_id} of type {source_type}")]
    InvalidTransform {
        /// Source field id.
        source_id: i32,
        /// Transform name.
        transform: String,
        /// Source field type.
        source_type: String,
    },
}
