// crates/sortkey-types/src/types.rs
// ============================================================================
// Module: Sort Key Type System
// Description: Primitive and nested field types for table schemas.
// Purpose: Provide a closed, hashable type model with a stable textual form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Types form a closed set: scalar primitives plus the composite struct, list
//! and map types. Primitive types render to and parse from their canonical
//! names (`long`, `decimal(9,2)`, `fixed[16]`). Composite types serialize as
//! JSON objects tagged with `"type"`.
//!
//! [`TypeId`] is the dispatch tag used by codecs; timestamp and timestamptz
//! share a single identifier because they share a physical representation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use serde::ser::SerializeMap;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum decimal precision accepted by [`PrimitiveType::Decimal`].
pub const MAX_DECIMAL_PRECISION: u32 = 38;

// ============================================================================
// SECTION: Type Identifiers
// ============================================================================

/// Type identifier used for type-directed dispatch.
///
/// # Invariants
/// - Variants are stable for serialization and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeId {
    /// Boolean values.
    Boolean,
    /// 32-bit signed integers.
    Integer,
    /// 64-bit signed integers.
    Long,
    /// 32-bit IEEE-754 floats.
    Float,
    /// 64-bit IEEE-754 floats.
    Double,
    /// Calendar dates (days since epoch).
    Date,
    /// Time of day (microseconds).
    Time,
    /// Timestamps with or without zone (microseconds since epoch).
    Timestamp,
    /// UTF-8 strings.
    String,
    /// 128-bit UUIDs.
    Uuid,
    /// Fixed-length byte arrays.
    Fixed,
    /// Variable-length byte arrays.
    Binary,
    /// Fixed-point decimals.
    Decimal,
    /// Nested struct.
    Struct,
    /// Nested list.
    List,
    /// Nested map.
    Map,
}

impl TypeId {
    /// Returns a stable label for the type identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::String => "string",
            Self::Uuid => "uuid",
            Self::Fixed => "fixed",
            Self::Binary => "binary",
            Self::Decimal => "decimal",
            Self::Struct => "struct",
            Self::List => "list",
            Self::Map => "map",
        }
    }

    /// Returns true for scalar (non-composite) identifiers.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !matches!(self, Self::Struct | Self::List | Self::Map)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Primitive Types
// ============================================================================

/// Scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Date without time.
    Date,
    /// Time of day without date.
    Time,
    /// Timestamp without zone.
    Timestamp,
    /// Timestamp adjusted to UTC.
    Timestamptz,
    /// UTF-8 string.
    String,
    /// UUID.
    Uuid,
    /// Fixed-length bytes.
    Fixed(u32),
    /// Variable-length bytes.
    Binary,
    /// Fixed-point decimal.
    Decimal {
        /// Total number of digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
    },
}

impl PrimitiveType {
    /// Returns the dispatch identifier for this type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::Boolean => TypeId::Boolean,
            Self::Int => TypeId::Integer,
            Self::Long => TypeId::Long,
            Self::Float => TypeId::Float,
            Self::Double => TypeId::Double,
            Self::Date => TypeId::Date,
            Self::Time => TypeId::Time,
            Self::Timestamp | Self::Timestamptz => TypeId::Timestamp,
            Self::String => TypeId::String,
            Self::Uuid => TypeId::Uuid,
            Self::Fixed(_) => TypeId::Fixed,
            Self::Binary => TypeId::Binary,
            Self::Decimal {
                ..
            } => TypeId::Decimal,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Timestamptz => f.write_str("timestamptz"),
            Self::String => f.write_str("string"),
            Self::Uuid => f.write_str("uuid"),
            Self::Fixed(length) => write!(f, "fixed[{length}]"),
            Self::Binary => f.write_str("binary"),
            Self::Decimal {
                precision,
                scale,
            } => write!(f, "decimal({precision},{scale})"),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parsed = match trimmed {
            "boolean" => Self::Boolean,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::Timestamptz,
            "string" => Self::String,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            _ => return parse_parameterized(trimmed),
        };
        Ok(parsed)
    }
}

/// Parses `fixed[L]` and `decimal(P,S)` type names.
fn parse_parameterized(value: &str) -> Result<PrimitiveType, TypeError> {
    if let Some(inner) = value.strip_prefix("fixed[").and_then(|rest| rest.strip_suffix(']')) {
        let length = inner
            .trim()
            .parse::<u32>()
            .map_err(|_| TypeError::InvalidFixedLength(value.to_string()))?;
        if length == 0 {
            return Err(TypeError::InvalidFixedLength(value.to_string()));
        }
        return Ok(PrimitiveType::Fixed(length));
    }
    if let Some(inner) = value.strip_prefix("decimal(").and_then(|rest| rest.strip_suffix(')')) {
        let Some((precision, scale)) = inner.split_once(',') else {
            return Err(TypeError::InvalidDecimal(value.to_string()));
        };
        let precision = precision
            .trim()
            .parse::<u32>()
            .map_err(|_| TypeError::InvalidDecimal(value.to_string()))?;
        let scale =
            scale.trim().parse::<u32>().map_err(|_| TypeError::InvalidDecimal(value.to_string()))?;
        if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
            return Err(TypeError::InvalidDecimal(value.to_string()));
        }
        return Ok(PrimitiveType::Decimal {
            precision,
            scale,
        });
    }
    Err(TypeError::UnknownType(value.to_string()))
}

impl Serialize for PrimitiveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrimitiveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// SECTION: Nested Types
// ============================================================================

/// Field of a struct, list element, or map key/value.
///
/// # Invariants
/// - `id` is unique within the owning schema (enforced by [`crate::Schema`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NestedField {
    /// Field identifier.
    pub id: i32,
    /// Field name.
    pub name: String,
    /// Whether the field is required (non-null).
    pub required: bool,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: Type,
    /// Optional documentation string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl NestedField {
    /// Creates a required field.
    #[must_use]
    pub fn required(id: i32, name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self {
            id,
            name: name.into(),
            required: true,
            field_type: field_type.into(),
            doc: None,
        }
    }

    /// Creates an optional field.
    #[must_use]
    pub fn optional(id: i32, name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self {
            id,
            name: name.into(),
            required: false,
            field_type: field_type.into(),
            doc: None,
        }
    }

    /// Returns the field with documentation attached.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Returns a copy of the field carrying a different type.
    #[must_use]
    pub fn with_type(&self, field_type: Type) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            required: self.required,
            field_type,
            doc: self.doc.clone(),
        }
    }
}

/// Struct type: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StructType {
    /// Fields in declaration order.
    pub fields: Vec<NestedField>,
}

impl StructType {
    /// Creates a struct type from fields.
    #[must_use]
    pub const fn new(fields: Vec<NestedField>) -> Self {
        Self {
            fields,
        }
    }

    /// Returns the direct child field with the given id.
    #[must_use]
    pub fn field(&self, id: i32) -> Option<&NestedField> {
        self.fields.iter().find(|field| field.id == id)
    }
}

/// List type with a single element field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListType {
    /// Element field (named `element`).
    pub element: Box<NestedField>,
}

impl ListType {
    /// Creates a list type.
    #[must_use]
    pub fn new(element_id: i32, element_required: bool, element_type: impl Into<Type>) -> Self {
        let element = if element_required {
            NestedField::required(element_id, "element", element_type)
        } else {
            NestedField::optional(element_id, "element", element_type)
        };
        Self {
            element: Box::new(element),
        }
    }
}

/// Map type with key and value fields.
///
/// # Invariants
/// - Keys are always required.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    /// Key field (named `key`).
    pub key: Box<NestedField>,
    /// Value field (named `value`).
    pub value: Box<NestedField>,
}

impl MapType {
    /// Creates a map type.
    #[must_use]
    pub fn new(
        key_id: i32,
        key_type: impl Into<Type>,
        value_id: i32,
        value_required: bool,
        value_type: impl Into<Type>,
    ) -> Self {
        let value = if value_required {
            NestedField::required(value_id, "value", value_type)
        } else {
            NestedField::optional(value_id, "value", value_type)
        };
        Self {
            key: Box::new(NestedField::required(key_id, "key", key_type)),
            value: Box::new(value),
        }
    }
}

// ============================================================================
// SECTION: Type
// ============================================================================

/// A field type: primitive or composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Scalar type.
    Primitive(PrimitiveType),
    /// Struct type.
    Struct(StructType),
    /// List type.
    List(ListType),
    /// Map type.
    Map(MapType),
}

impl Type {
    /// Returns the dispatch identifier for this type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::Primitive(primitive) => primitive.type_id(),
            Self::Struct(_) => TypeId::Struct,
            Self::List(_) => TypeId::List,
            Self::Map(_) => TypeId::Map,
        }
    }

    /// Returns the primitive type when this is a scalar.
    #[must_use]
    pub const fn as_primitive(&self) -> Option<&PrimitiveType> {
        match self {
            Self::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    /// Returns true for scalar types.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Self::Primitive(value)
    }
}

impl From<StructType> for Type {
    fn from(value: StructType) -> Self {
        Self::Struct(value)
    }
}

impl From<ListType> for Type {
    fn from(value: ListType) -> Self {
        Self::List(value)
    }
}

impl From<MapType> for Type {
    fn from(value: MapType) -> Self {
        Self::Map(value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => primitive.fmt(f),
            Self::Struct(struct_type) => {
                f.write_str("struct<")?;
                for (index, field) in struct_type.fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.field_type)?;
                }
                f.write_str(">")
            }
            Self::List(list) => write!(f, "list<{}>", list.element.field_type),
            Self::Map(map) => write!(f, "map<{}, {}>", map.key.field_type, map.value.field_type),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Primitive(primitive) => serializer.collect_str(primitive),
            Self::Struct(struct_type) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "struct")?;
                map.serialize_entry("fields", &struct_type.fields)?;
                map.end()
            }
            Self::List(list) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "list")?;
                map.serialize_entry("element-id", &list.element.id)?;
                map.serialize_entry("element", &list.element.field_type)?;
                map.serialize_entry("element-required", &list.element.required)?;
                map.end()
            }
            Self::Map(map_type) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("type", "map")?;
                map.serialize_entry("key-id", &map_type.key.id)?;
                map.serialize_entry("key", &map_type.key.field_type)?;
                map.serialize_entry("value-id", &map_type.value.id)?;
                map.serialize_entry("value", &map_type.value.field_type)?;
                map.serialize_entry("value-required", &map_type.value.required)?;
                map.end()
            }
        }
    }
}

/// Wire form of a type: a primitive name or a tagged composite object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    /// Primitive type name.
    Primitive(String),
    /// Composite type object.
    Nested(NestedRepr),
}

/// Wire form of composite types.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum NestedRepr {
    /// Struct object.
    Struct {
        /// Struct fields.
        fields: Vec<NestedField>,
    },
    /// List object.
    List {
        /// Element field id.
        #[serde(rename = "element-id")]
        element_id: i32,
        /// Element type.
        element: Box<Type>,
        /// Whether elements are required.
        #[serde(rename = "element-required")]
        element_required: bool,
    },
    /// Map object.
    Map {
        /// Key field id.
        #[serde(rename = "key-id")]
        key_id: i32,
        /// Key type.
        key: Box<Type>,
        /// Value field id.
        #[serde(rename = "value-id")]
        value_id: i32,
        /// Value type.
        value: Box<Type>,
        /// Whether values are required.
        #[serde(rename = "value-required")]
        value_required: bool,
    },
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TypeRepr::deserialize(deserializer)? {
            TypeRepr::Primitive(name) => {
                name.parse::<PrimitiveType>().map(Self::Primitive).map_err(de::Error::custom)
            }
            TypeRepr::Nested(NestedRepr::Struct {
                fields,
            }) => Ok(Self::Struct(StructType::new(fields))),
            TypeRepr::Nested(NestedRepr::List {
                element_id,
                element,
                element_required,
            }) => Ok(Self::List(ListType::new(element_id, element_required, *element))),
            TypeRepr::Nested(NestedRepr::Map {
                key_id,
                key,
                value_id,
                value,
                value_required,
            }) => Ok(Self::Map(MapType::new(key_id, *key, value_id, value_required, *value))),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing type names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Type name is not recognized.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// Fixed type has an invalid length.
    #[error("invalid fixed type: {0}")]
    InvalidFixedLength(String),
    /// Decimal type has invalid precision or scale.
    #[error("invalid decimal type: {0}")]
    InvalidDecimal(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
