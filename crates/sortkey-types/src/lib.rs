// crates/sortkey-types/src/lib.rs
// ============================================================================
// Module: Sort Key Types Library
// Description: Public API surface for the schema and sort order model.
// Purpose: Expose types, schemas, transforms, sort orders, and text codecs.
// Dependencies: crate::{types, schema, transform, sort_order, compatibility, text, hashing}
// ============================================================================

//! ## Overview
//! The schema model that sort-key codecs are derived from: a field-id indexed
//! type system, schemas with projection, transforms, sort orders, the schema
//! write-compatibility checker, JSON text forms, and canonical fingerprints.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compatibility;
pub mod hashing;
pub mod schema;
pub mod sort_order;
pub mod text;
pub mod transform;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compatibility::is_promotion_allowed;
pub use compatibility::write_compatibility_errors;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::hash_canonical_json;
pub use schema::Schema;
pub use schema::SchemaError;
pub use sort_order::NullOrder;
pub use sort_order::SortDirection;
pub use sort_order::SortField;
pub use sort_order::SortOrder;
pub use sort_order::SortOrderError;
pub use text::TextError;
pub use text::schema_to_text;
pub use text::sort_order_to_text;
pub use text::text_to_schema;
pub use text::text_to_sort_order;
pub use transform::Transform;
pub use transform::TransformError;
pub use types::ListType;
pub use types::MAX_DECIMAL_PRECISION;
pub use types::MapType;
pub use types::NestedField;
pub use types::PrimitiveType;
pub use types::StructType;
pub use types::Type;
pub use types::TypeError;
pub use types::TypeId;
