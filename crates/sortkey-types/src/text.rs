// crates/sortkey-types/src/text.rs
// ============================================================================
// Module: Schema and Sort Order Text
// Description: JSON text forms for schemas and sort orders.
// Purpose: Convert schemas and sort orders to and from persisted text.
// Dependencies: crate::{schema, sort_order}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Text forms use the common table-format JSON layout. Schemas serialize as a
//! `struct` with `schema-id` and `fields`; sort orders as `order-id` plus a
//! list of fields with `source-id`, `transform`, `direction`, `null-order`.
//! Text is compact so equal values always produce equal text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::schema::Schema;
use crate::sort_order::SortOrder;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Text conversion errors.
#[derive(Debug, Error)]
pub enum TextError {
    /// Serialization failed.
    #[error("failed to render {kind}: {message}")]
    Render {
        /// Kind of value being rendered.
        kind: &'static str,
        /// Underlying error message.
        message: String,
    },
    /// Text could not be parsed.
    #[error("failed to parse {kind}: {message}")]
    Parse {
        /// Kind of value being parsed.
        kind: &'static str,
        /// Underlying error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Schema Text
// ============================================================================

/// Renders a schema as JSON text.
///
/// # Errors
///
/// Returns [`TextError::Render`] when serialization fails.
pub fn schema_to_text(schema: &Schema) -> Result<String, TextError> {
    serde_json::to_string(schema).map_err(|err| TextError::Render {
        kind: "schema",
        message: err.to_string(),
    })
}

/// Parses a schema from JSON text.
///
/// # Errors
///
/// Returns [`TextError::Parse`] when the text is malformed or the schema is invalid.
pub fn text_to_schema(text: &str) -> Result<Schema, TextError> {
    serde_json::from_str(text).map_err(|err| TextError::Parse {
        kind: "schema",
        message: err.to_string(),
    })
}

// ============================================================================
// SECTION: Sort Order Text
// ============================================================================

/// Renders a sort order as JSON text.
///
/// # Errors
///
/// Returns [`TextError::Render`] when serialization fails.
pub fn sort_order_to_text(order: &SortOrder) -> Result<String, TextError> {
    serde_json::to_string(order).map_err(|err| TextError::Render {
        kind: "sort order",
        message: err.to_string(),
    })
}

/// Parses a sort order from JSON text.
///
/// The result is unbound; call [`SortOrder::bind`] against a schema.
///
/// # Errors
///
/// Returns [`TextError::Parse`] when the text is malformed.
pub fn text_to_sort_order(text: &str) -> Result<SortOrder, TextError> {
    serde_json::from_str(text).map_err(|err| TextError::Parse {
        kind: "sort order",
        message: err.to_string(),
    })
}
