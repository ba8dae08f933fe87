// crates/sortkey-types/src/compatibility.rs
// ============================================================================
// Module: Schema Write Compatibility
// Description: Checks whether data written with one schema is readable by another.
// Purpose: Report every incompatibility between a read schema and a write schema.
// Dependencies: crate::{schema, types}
// ============================================================================

//! ## Overview
//! Fields are matched by id. For each field of the read schema the checker
//! verifies the write schema still provides it with a compatible type,
//! nullability, and relative position. All problems are collected rather than
//! stopping at the first, so callers can show the full list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::schema::Schema;
use crate::types::NestedField;
use crate::types::PrimitiveType;
use crate::types::StructType;
use crate::types::Type;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Returns every reason data written with `write` cannot be read as `read`.
///
/// An empty result means the schemas are write-compatible.
#[must_use]
pub fn write_compatibility_errors(read: &Schema, write: &Schema) -> Vec<String> {
    let mut errors = Vec::new();
    check_struct("", read.as_struct(), write.as_struct(), &mut errors);
    errors
}

/// Returns true when a value of type `from` may be read as `to`.
///
/// Allowed: identity, int to long, float to double, and decimal precision
/// widening at the same scale.
#[must_use]
pub fn is_promotion_allowed(from: &PrimitiveType, to: &PrimitiveType) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (PrimitiveType::Int, PrimitiveType::Long)
        | (PrimitiveType::Float, PrimitiveType::Double) => true,
        (
            PrimitiveType::Decimal {
                precision: from_precision,
                scale: from_scale,
            },
            PrimitiveType::Decimal {
                precision: to_precision,
                scale: to_scale,
            },
        ) => from_scale == to_scale && to_precision >= from_precision,
        _ => false,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks struct fields, including their relative order.
fn check_struct(path: &str, read: &StructType, write: &StructType, errors: &mut Vec<String>) {
    let mut last_position: Option<usize> = None;
    for read_field in &read.fields {
        let field_path = join_path(path, &read_field.name);
        let Some(position) = write.fields.iter().position(|field| field.id == read_field.id)
        else {
            if read_field.required {
                errors.push(format!("{field_path}: required field is missing"));
            }
            continue;
        };
        if let Some(previous) = last_position
            && position < previous
        {
            errors.push(format!("{field_path}: field is out of order"));
        }
        last_position = Some(position);
        if let Some(write_field) = write.fields.get(position) {
            check_field(&field_path, read_field, write_field, errors);
        }
    }
}

/// Checks a matched field pair.
fn check_field(path: &str, read: &NestedField, write: &NestedField, errors: &mut Vec<String>) {
    if read.required && !write.required {
        errors.push(format!("{path}: cannot read optional field as required"));
    }
    check_type(path, &read.field_type, &write.field_type, errors);
}

/// Checks a type pair, recursing into nested types.
fn check_type(path: &str, read: &Type, write: &Type, errors: &mut Vec<String>) {
    match (read, write) {
        (Type::Primitive(read_type), Type::Primitive(write_type)) => {
            if !is_promotion_allowed(write_type, read_type) {
                errors.push(format!("{path}: {write_type} cannot be promoted to {read_type}"));
            }
        }
        (Type::Struct(read_struct), Type::Struct(write_struct)) => {
            check_struct(path, read_struct, write_struct, errors);
        }
        (Type::List(read_list), Type::List(write_list)) => {
            let element_path = join_path(path, "element");
            check_field(&element_path, &read_list.element, &write_list.element, errors);
        }
        (Type::Map(read_map), Type::Map(write_map)) => {
            check_field(&join_path(path, "key"), &read_map.key, &write_map.key, errors);
            check_field(&join_path(path, "value"), &read_map.value, &write_map.value, errors);
        }
        _ => errors.push(format!("{path}: {write} cannot be read as {read}")),
    }
}

/// Joins a dotted field path.
fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() { name.to_string() } else { format!("{parent}.{name}") }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
