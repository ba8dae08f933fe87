// crates/sortkey-codec/src/layout.rs
// ============================================================================
// Module: Transformed Field Resolution
// Description: Derives the positional sort-key layout from a schema and sort order.
// Purpose: Map each sort field to its source id and transform result type.
// Dependencies: serde, sortkey-types, thiserror
// ============================================================================

//! ## Overview
//! The layout is the ordered list of [`TransformedField`] values a sort key
//! carries, one per sort field. It is computed once per codec and never
//! changes afterwards.
//!
//! Resolution only looks source fields up and applies transform result
//! types. Transform applicability is checked by [`SortOrder::bind`]; a
//! layout built from an unbound order may therefore contain composite types,
//! which the codec rejects at encode and decode time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sortkey_types::Schema;
use sortkey_types::SortOrder;
use sortkey_types::Type;
use sortkey_types::TypeId;
use thiserror::Error;

// ============================================================================
// SECTION: Transformed Field
// ============================================================================

/// One position of the sort-key layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TransformedField {
    /// Source field id.
    pub field_id: i32,
    /// Result type of the transform applied to the source field.
    pub result_type: Type,
}

impl TransformedField {
    /// Returns the dispatch identifier of the result type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.result_type.type_id()
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the sort-key layout for a schema and sort order.
///
/// # Errors
///
/// Returns [`LayoutError::UnknownField`] when a sort field's source id is not
/// in the schema.
pub fn resolve_layout(
    schema: &Schema,
    sort_order: &SortOrder,
) -> Result<Vec<TransformedField>, LayoutError> {
    sort_order
        .fields
        .iter()
        .enumerate()
        .map(|(position, sort_field)| {
            let source = schema.find_type(sort_field.source_id).ok_or(
                LayoutError::UnknownField {
                    position,
                    field_id: sort_field.source_id,
                },
            )?;
            Ok(TransformedField {
                field_id: sort_field.source_id,
                result_type: sort_field.transform.result_type(source),
            })
        })
        .collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Layout resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A sort field references a field the schema does not have.
    #[error("sort field {position} references unknown field {field_id}")]
    UnknownField {
        /// Position in the sort order.
        position: usize,
        /// Missing field id.
        field_id: i32,
    },
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use sortkey_types::NestedField;
    use sortkey_types::PrimitiveType;
    use sortkey_types::SortField;
    use sortkey_types::Transform;

    use super::*;

    /// Builds a two-column schema.
    fn schema() -> Schema {
        Schema::new(vec![
            NestedField::required(1, "ts", PrimitiveType::Timestamp),
            NestedField::optional(2, "name", PrimitiveType::String),
        ])
        .unwrap()
    }

    /// Layout follows sort order positions and transform result types.
    #[test]
    fn layout_follows_sort_order() {
        let order = SortOrder::new(
            1,
            vec![SortField::asc(2, Transform::Bucket(4)), SortField::asc(1, Transform::Day)],
        );
        let layout = resolve_layout(&schema(), &order).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].field_id, 2);
        assert_eq!(layout[0].type_id(), TypeId::Integer);
        assert_eq!(layout[1].type_id(), TypeId::Date);
    }

    /// Unknown source ids report their position.
    #[test]
    fn unknown_source_reports_position() {
        let order = SortOrder::new(1, vec![SortField::asc(1, Transform::Identity), SortField::asc(
            5,
            Transform::Identity,
        )]);
        assert_eq!(resolve_layout(&schema(), &order), Err(LayoutError::UnknownField {
            position: 1,
            field_id: 5,
        }));
    }
}
