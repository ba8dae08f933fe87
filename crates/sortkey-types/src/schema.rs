// crates/sortkey-types/src/schema.rs
// ============================================================================
// Module: Table Schema
// Description: Immutable field-id indexed schemas with projection support.
// Purpose: Provide field lookup, structural identity, and id-subset projection.
// Dependencies: crate::types, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Schema`] wraps a top-level struct type plus table metadata (schema id
//! and identifier fields). Field ids are validated to be unique across the
//! whole tree at construction, so lookups by id are unambiguous.
//!
//! Structural identity is carried by [`Schema::as_struct`]; metadata such as
//! the schema id is deliberately excluded from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::types::NestedField;
use crate::types::StructType;
use crate::types::Type;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Immutable table schema.
///
/// # Invariants
/// - Field ids are unique across all nesting levels.
/// - Identifier field ids resolve to fields of this schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr", into = "SchemaRepr")]
pub struct Schema {
    /// Schema identifier assigned by the table.
    schema_id: i32,
    /// Fields that identify a row.
    identifier_field_ids: Vec<i32>,
    /// Top-level struct.
    fields: StructType,
}

impl Schema {
    /// Creates a schema with id 0 from top-level fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFieldId`] when field ids collide.
    pub fn new(fields: Vec<NestedField>) -> Result<Self, SchemaError> {
        Self::with_schema_id(0, fields)
    }

    /// Creates a schema with an explicit schema id.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFieldId`] when field ids collide.
    pub fn with_schema_id(schema_id: i32, fields: Vec<NestedField>) -> Result<Self, SchemaError> {
        let fields = StructType::new(fields);
        ensure_unique_field_ids(&fields)?;
        Ok(Self {
            schema_id,
            identifier_field_ids: Vec::new(),
            fields,
        })
    }

    /// Returns the schema with identifier fields assigned.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownIdentifierField`] when an id does not resolve.
    pub fn with_identifier_field_ids(mut self, ids: Vec<i32>) -> Result<Self, SchemaError> {
        if let Some(missing) = ids.iter().find(|id| self.find_field(**id).is_none()) {
            return Err(SchemaError::UnknownIdentifierField(*missing));
        }
        self.identifier_field_ids = ids;
        Ok(self)
    }

    /// Returns the schema identifier.
    #[must_use]
    pub const fn schema_id(&self) -> i32 {
        self.schema_id
    }

    /// Returns the identifier field ids.
    #[must_use]
    pub fn identifier_field_ids(&self) -> &[i32] {
        &self.identifier_field_ids
    }

    /// Returns the structural part of the schema.
    #[must_use]
    pub const fn as_struct(&self) -> &StructType {
        &self.fields
    }

    /// Returns the top-level fields.
    #[must_use]
    pub fn columns(&self) -> &[NestedField] {
        &self.fields.fields
    }

    /// Finds a field by id at any nesting level.
    #[must_use]
    pub fn find_field(&self, id: i32) -> Option<&NestedField> {
        find_in_struct(&self.fields, id)
    }

    /// Finds a field type by id at any nesting level.
    #[must_use]
    pub fn find_type(&self, id: i32) -> Option<&Type> {
        self.find_field(id).map(|field| &field.field_type)
    }

    /// Returns every field id in the schema.
    #[must_use]
    pub fn field_ids(&self) -> BTreeSet<i32> {
        let mut ids = BTreeSet::new();
        collect_struct_ids(&self.fields, &mut ids);
        ids
    }

    /// Projects the schema onto a set of field ids.
    ///
    /// Selected fields are kept whole. Unselected structs are kept only when
    /// they contain selected descendants, and then only with those
    /// descendants. Descendants of lists and maps are not selectable on their
    /// own.
    #[must_use]
    pub fn project(&self, ids: &BTreeSet<i32>) -> Self {
        let fields = project_struct(&self.fields, ids);
        let identifier_field_ids = self
            .identifier_field_ids
            .iter()
            .copied()
            .filter(|id| find_in_struct(&fields, *id).is_some())
            .collect();
        Self {
            schema_id: self.schema_id,
            identifier_field_ids,
            fields,
        }
    }
}

// ============================================================================
// SECTION: Wire Representation
// ============================================================================

/// JSON representation of a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaRepr {
    /// Always `struct`.
    #[serde(rename = "type")]
    kind: String,
    /// Schema identifier.
    #[serde(rename = "schema-id", default)]
    schema_id: i32,
    /// Identifier field ids.
    #[serde(rename = "identifier-field-ids", default, skip_serializing_if = "Vec::is_empty")]
    identifier_field_ids: Vec<i32>,
    /// Top-level fields.
    fields: Vec<NestedField>,
}

impl TryFrom<SchemaRepr> for Schema {
    type Error = SchemaError;

    fn try_from(repr: SchemaRepr) -> Result<Self, Self::Error> {
        if repr.kind != "struct" {
            return Err(SchemaError::NotAStruct(repr.kind));
        }
        Self::with_schema_id(repr.schema_id, repr.fields)?
            .with_identifier_field_ids(repr.identifier_field_ids)
    }
}

impl From<Schema> for SchemaRepr {
    fn from(schema: Schema) -> Self {
        Self {
            kind: "struct".to_string(),
            schema_id: schema.schema_id,
            identifier_field_ids: schema.identifier_field_ids,
            fields: schema.fields.fields,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields share an id.
    #[error("duplicate field id: {0}")]
    DuplicateFieldId(i32),
    /// An identifier field id does not resolve.
    #[error("identifier field id does not exist: {0}")]
    UnknownIdentifierField(i32),
    /// Top-level type is not a struct.
    #[error("schema must be a struct, found: {0}")]
    NotAStruct(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures field ids are unique across the struct tree.
fn ensure_unique_field_ids(fields: &StructType) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    collect_struct_id_list(fields, &mut ids);
    for id in ids {
        if !seen.insert(id) {
            return Err(SchemaError::DuplicateFieldId(id));
        }
    }
    Ok(())
}

/// Appends every field id under a struct, duplicates included.
fn collect_struct_id_list(fields: &StructType, out: &mut Vec<i32>) {
    for field in &fields.fields {
        collect_field_id_list(field, out);
    }
}

/// Appends a field id and its descendants, duplicates included.
fn collect_field_id_list(field: &NestedField, out: &mut Vec<i32>) {
    out.push(field.id);
    match &field.field_type {
        Type::Primitive(_) => {}
        Type::Struct(inner) => collect_struct_id_list(inner, out),
        Type::List(list) => collect_field_id_list(&list.element, out),
        Type::Map(map) => {
            collect_field_id_list(&map.key, out);
            collect_field_id_list(&map.value, out);
        }
    }
}

/// Collects every field id under a struct.
fn collect_struct_ids(fields: &StructType, out: &mut BTreeSet<i32>) {
    let mut ids = Vec::new();
    collect_struct_id_list(fields, &mut ids);
    out.extend(ids);
}

/// Finds a field by id within a struct tree.
fn find_in_struct(fields: &StructType, id: i32) -> Option<&NestedField> {
    fields.fields.iter().find_map(|field| find_in_field(field, id))
}

/// Finds a field by id within a field and its descendants.
fn find_in_field(field: &NestedField, id: i32) -> Option<&NestedField> {
    if field.id == id {
        return Some(field);
    }
    match &field.field_type {
        Type::Primitive(_) => None,
        Type::Struct(inner) => find_in_struct(inner, id),
        Type::List(list) => find_in_field(&list.element, id),
        Type::Map(map) => find_in_field(&map.key, id).or_else(|| find_in_field(&map.value, id)),
    }
}

/// Projects a struct onto the selected ids.
fn project_struct(fields: &StructType, ids: &BTreeSet<i32>) -> StructType {
    let mut projected = Vec::new();
    for field in &fields.fields {
        if ids.contains(&field.id) {
            projected.push(field.clone());
        } else if let Type::Struct(inner) = &field.field_type {
            let inner = project_struct(inner, ids);
            if !inner.fields.is_empty() {
                projected.push(field.with_type(Type::Struct(inner)));
            }
        }
    }
    StructType::new(projected)
}
