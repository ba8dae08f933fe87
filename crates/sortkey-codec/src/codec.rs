// crates/sortkey-codec/src/codec.rs
// ============================================================================
// Module: Sort Key Codec
// Description: Versioned encoding of full sort-key tuples.
// Purpose: Encode and decode tuples against a layout derived from a schema and sort order.
// Dependencies: crate::{layout, value, value_codec, version, snapshot}, sortkey-types
// ============================================================================

//! ## Overview
//! A [`SortKeyCodec`] resolves its layout once at construction and then
//! encodes tuples position by position. Version 2 writes a null flag byte
//! before every field; version 1 writes values only and cannot represent
//! null.
//!
//! Encoding validates the whole tuple before writing its first byte, so a
//! contract error (size mismatch, composite layout type, mismatched value,
//! null under version 1) never leaves partial output in the sink.
//!
//! A codec is not shareable across threads while decoding into its scratch
//! tuple; each worker takes its own [`SortKeyCodec::duplicate`]. Duplicates
//! share the immutable schema, sort order, and layout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::hash::Hash;
use std::hash::Hasher;
use std::io::Read;
use std::io::Write;
use std::sync::Arc;

use sortkey_types::PrimitiveType;
use sortkey_types::Schema;
use sortkey_types::SortOrder;
use sortkey_types::Type;

use crate::error::CodecError;
use crate::layout::LayoutError;
use crate::layout::TransformedField;
use crate::layout::resolve_layout;
use crate::snapshot::ConfigurationSnapshot;
use crate::value::SortKey;
use crate::value::Value;
use crate::value_codec::CodecLimits;
use crate::value_codec::ValueCodec;
use crate::value_codec::read_flag;
use crate::version::FormatVersion;
use crate::wire;

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Versioned sort-key tuple codec.
///
/// # Invariants
/// - `layout.len() == sort_order.fields.len()`.
/// - The scratch tuple, when present, has the layout size.
#[derive(Debug)]
pub struct SortKeyCodec {
    /// Record schema.
    schema: Arc<Schema>,
    /// Sort order the layout derives from.
    sort_order: Arc<SortOrder>,
    /// Resolved positional layout.
    layout: Arc<[TransformedField]>,
    /// Active tuple format version.
    version: FormatVersion,
    /// Scalar codec.
    values: ValueCodec,
    /// Reusable decode target.
    scratch: Option<SortKey>,
}

impl SortKeyCodec {
    /// Creates a codec at the current format version.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when a sort field references an unknown field.
    pub fn new(schema: Schema, sort_order: SortOrder) -> Result<Self, LayoutError> {
        Self::with_version(schema, sort_order, FormatVersion::CURRENT)
    }

    /// Creates a codec at an explicit format version.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when a sort field references an unknown field.
    pub fn with_version(
        schema: Schema,
        sort_order: SortOrder,
        version: FormatVersion,
    ) -> Result<Self, LayoutError> {
        Self::from_shared(Arc::new(schema), Arc::new(sort_order), version)
    }

    /// Creates a codec from shared definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when a sort field references an unknown field.
    pub fn from_shared(
        schema: Arc<Schema>,
        sort_order: Arc<SortOrder>,
        version: FormatVersion,
    ) -> Result<Self, LayoutError> {
        let layout: Arc<[TransformedField]> = resolve_layout(&schema, &sort_order)?.into();
        Ok(Self {
            schema,
            sort_order,
            layout,
            version,
            values: ValueCodec::default(),
            scratch: None,
        })
    }

    /// Returns the codec with different value limits.
    #[must_use]
    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.values = ValueCodec::new(limits);
        self
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the sort order.
    #[must_use]
    pub fn sort_order(&self) -> &SortOrder {
        &self.sort_order
    }

    /// Returns the resolved layout.
    #[must_use]
    pub fn layout(&self) -> &[TransformedField] {
        &self.layout
    }

    /// Returns the active format version.
    #[must_use]
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// Returns the value limits.
    #[must_use]
    pub const fn limits(&self) -> CodecLimits {
        self.values.limits()
    }

    /// Returns the newest format version.
    #[must_use]
    pub const fn latest_version() -> FormatVersion {
        FormatVersion::CURRENT
    }

    /// Switches the active format version.
    pub const fn set_version(&mut self, version: FormatVersion) {
        self.version = version;
    }

    /// Switches to the newest format version.
    pub const fn restore_to_latest_version(&mut self) {
        self.version = FormatVersion::CURRENT;
    }

    /// Creates an all-null tuple of the layout size.
    #[must_use]
    pub fn create_key(&self) -> SortKey {
        SortKey::new(self.layout.len())
    }

    /// Returns a codec sharing the definitions but not the scratch tuple.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            sort_order: Arc::clone(&self.sort_order),
            layout: Arc::clone(&self.layout),
            version: self.version,
            values: self.values,
            scratch: None,
        }
    }

    /// Captures the configuration needed to rebuild this codec.
    #[must_use]
    pub fn snapshot_configuration(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot::new(
            self.schema.as_ref().clone(),
            self.sort_order.as_ref().clone(),
            self.version,
        )
    }

    // ------------------------------------------------------------------------
    // Encode
    // ------------------------------------------------------------------------

    /// Encodes a tuple into the sink.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the tuple violates the layout (nothing is
    /// written in that case) or when the sink fails.
    pub fn encode<W: Write + ?Sized>(&self, key: &SortKey, sink: &mut W) -> Result<(), CodecError> {
        self.validate(key)?;
        let nullable = self.version.supports_nulls();
        for (field, slot) in self.layout.iter().zip(key.values()) {
            match slot {
                None => wire::write_u8(sink, 1)?,
                Some(value) => {
                    if nullable {
                        wire::write_u8(sink, 0)?;
                    }
                    self.values.encode(field.type_id(), value, sink)?;
                }
            }
        }
        Ok(())
    }

    /// Encodes a tuple into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the tuple violates the layout.
    pub fn encode_to_vec(&self, key: &SortKey) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode(key, &mut out)?;
        Ok(out)
    }

    /// Checks a tuple against the layout and format version.
    fn validate(&self, key: &SortKey) -> Result<(), CodecError> {
        self.check_size(key)?;
        for (position, (field, slot)) in self.layout.iter().zip(key.values()).enumerate() {
            match slot {
                None if !self.version.supports_nulls() => {
                    return Err(CodecError::NullInLegacyFormat {
                        position,
                    });
                }
                None => check_scalar(field)?,
                Some(value) => {
                    self.values.check(field.type_id(), value)?;
                    check_fixed_length(field, value)?;
                }
            }
        }
        Ok(())
    }

    /// Checks the tuple size against the layout.
    fn check_size(&self, key: &SortKey) -> Result<(), CodecError> {
        check_size(self.layout.len(), key.size())
    }

    // ------------------------------------------------------------------------
    // Decode
    // ------------------------------------------------------------------------

    /// Decodes a tuple into a new value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the layout is unsupported or the input is corrupt.
    pub fn decode<R: Read + ?Sized>(&self, source: &mut R) -> Result<SortKey, CodecError> {
        let mut key = self.create_key();
        self.decode_into(&mut key, source)?;
        Ok(key)
    }

    /// Decodes a tuple into an existing tuple.
    ///
    /// The tuple size and layout are checked before any position is written.
    /// If the input turns out to be corrupt midway, positions already
    /// decoded keep their new values.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SizeMismatch`] when the reuse tuple has the
    /// wrong size, and other [`CodecError`] values for corrupt input.
    pub fn decode_into<'a, R: Read + ?Sized>(
        &self,
        reuse: &'a mut SortKey,
        source: &mut R,
    ) -> Result<&'a mut SortKey, CodecError> {
        decode_fields(&self.layout, self.version, self.values, reuse, source)?;
        Ok(reuse)
    }

    /// Borrows the reusable decode target, creating it on first use.
    pub fn scratch_key(&mut self) -> &mut SortKey {
        let size = self.layout.len();
        self.scratch.get_or_insert_with(|| SortKey::new(size))
    }

    /// Decodes into the reusable decode target.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the input is corrupt.
    pub fn decode_scratch<R: Read + ?Sized>(
        &mut self,
        source: &mut R,
    ) -> Result<&SortKey, CodecError> {
        let layout = &self.layout;
        let scratch = self.scratch.get_or_insert_with(|| SortKey::new(layout.len()));
        decode_fields(layout, self.version, self.values, scratch, source)?;
        Ok(scratch)
    }

    /// Copies one tuple from the source to the sink by decoding and re-encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when decoding or encoding fails.
    pub fn copy<R: Read + ?Sized, W: Write + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
    ) -> Result<(), CodecError> {
        let key = self.decode(source)?;
        self.encode(&key, sink)
    }
}

// ============================================================================
// SECTION: Structural Identity
// ============================================================================

impl PartialEq for SortKeyCodec {
    fn eq(&self, other: &Self) -> bool {
        self.schema.as_struct() == other.schema.as_struct() && self.sort_order == other.sort_order
    }
}

impl Eq for SortKeyCodec {}

impl Hash for SortKeyCodec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.as_struct().hash(state);
        self.sort_order.hash(state);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes every layout position into the target tuple.
pub(crate) fn decode_fields<R: Read + ?Sized>(
    layout: &[TransformedField],
    version: FormatVersion,
    values: ValueCodec,
    target: &mut SortKey,
    source: &mut R,
) -> Result<(), CodecError> {
    check_size(layout.len(), target.size())?;
    layout.iter().try_for_each(check_scalar)?;
    for (position, field) in layout.iter().enumerate() {
        let is_null = version.supports_nulls() && read_flag(source)?;
        let value = if is_null {
            None
        } else {
            let value = values.decode(field.type_id(), source)?;
            check_fixed_length(field, &value)?;
            Some(value)
        };
        target.set(position, value)?;
    }
    Ok(())
}

/// Fails when sizes differ.
const fn check_size(expected: usize, actual: usize) -> Result<(), CodecError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CodecError::SizeMismatch {
            expected,
            actual,
        })
    }
}

/// Fails when a layout position has a composite type.
fn check_scalar(field: &TransformedField) -> Result<(), CodecError> {
    let type_id = field.type_id();
    if type_id.is_primitive() { Ok(()) } else { Err(CodecError::UnsupportedType(type_id)) }
}

/// Fails when fixed-length bytes do not match the declared length.
fn check_fixed_length(field: &TransformedField, value: &Value) -> Result<(), CodecError> {
    if let (Type::Primitive(PrimitiveType::Fixed(expected)), Value::Binary(bytes)) =
        (&field.result_type, value)
        && usize::try_from(*expected).ok() != Some(bytes.len())
    {
        return Err(CodecError::FixedLengthMismatch {
            expected: *expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}
