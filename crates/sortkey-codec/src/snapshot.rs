// crates/sortkey-codec/src/snapshot.rs
// ============================================================================
// Module: Configuration Snapshots
// Description: Durable record of the schema, sort order, and format version.
// Purpose: Persist and restore the state needed to rebuild a sort-key codec.
// Dependencies: crate::{codec, version, wire}, sortkey-types, serde
// ============================================================================

//! ## Overview
//! The snapshot body is two length-prefixed UTF-8 text blocks: schema text
//! then sort order text. Its version tag lives outside the body; versions 1
//! and 2 share the same body layout because the version only changes the
//! tuple format.
//!
//! The versioned envelope prepends a kind tag block and a 4-byte version so
//! a restore can recognise snapshots written by a different serializer
//! family before reading anything else.
//!
//! ```text
//! envelope := text("sort-key") u32(version) body
//! body     := text(schema json) text(sort order json)
//! text     := i32(byte length) utf8 bytes
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;

use serde::Serialize;
use sortkey_types::HashAlgorithm;
use sortkey_types::HashDigest;
use sortkey_types::Schema;
use sortkey_types::SortOrder;
use sortkey_types::hash_canonical_json;
use sortkey_types::schema_to_text;
use sortkey_types::sort_order_to_text;
use sortkey_types::text_to_schema;
use sortkey_types::text_to_sort_order;

use crate::codec::SortKeyCodec;
use crate::error::SnapshotError;
use crate::value_codec::CodecLimits;
use crate::version::FormatVersion;
use crate::wire;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Kind tag identifying sort-key snapshots in the versioned envelope.
pub const SNAPSHOT_KIND: &str = "sort-key";

/// Default cap on one snapshot text block.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Persisted codec configuration.
///
/// # Invariants
/// - Writing and restoring require both schema and sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    /// Record schema.
    schema: Option<Schema>,
    /// Sort order.
    sort_order: Option<SortOrder>,
    /// Tuple format version active when the snapshot was taken.
    format_version: FormatVersion,
}

/// Outcome of reading a versioned envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoredSnapshot {
    /// A sort-key snapshot.
    SortKey(ConfigurationSnapshot),
    /// A snapshot written by another serializer family; left unparsed.
    Foreign {
        /// Kind tag found.
        kind: String,
        /// Version found.
        version: u32,
    },
}

/// Fingerprint input.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    /// Schema.
    schema: &'a Schema,
    /// Sort order.
    sort_order: &'a SortOrder,
    /// Format version.
    format_version: FormatVersion,
}

impl ConfigurationSnapshot {
    /// Creates a complete snapshot.
    #[must_use]
    pub const fn new(schema: Schema, sort_order: SortOrder, format_version: FormatVersion) -> Self {
        Self {
            schema: Some(schema),
            sort_order: Some(sort_order),
            format_version,
        }
    }

    /// Creates a snapshot without schema or sort order.
    #[must_use]
    pub const fn empty(format_version: FormatVersion) -> Self {
        Self {
            schema: None,
            sort_order: None,
            format_version,
        }
    }

    /// Returns the schema when present.
    #[must_use]
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Returns the sort order when present.
    #[must_use]
    pub const fn sort_order(&self) -> Option<&SortOrder> {
        self.sort_order.as_ref()
    }

    /// Returns the format version.
    #[must_use]
    pub const fn format_version(&self) -> FormatVersion {
        self.format_version
    }

    /// Returns schema and sort order, failing when either is missing.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidState`] when either part is missing.
    pub fn require(&self) -> Result<(&Schema, &SortOrder), SnapshotError> {
        let schema = self.schema.as_ref().ok_or(SnapshotError::InvalidState("missing schema"))?;
        let sort_order =
            self.sort_order.as_ref().ok_or(SnapshotError::InvalidState("missing sort order"))?;
        Ok((schema, sort_order))
    }

    // ------------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------------

    /// Writes the snapshot body.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when schema or sort order is missing, text
    /// rendering fails, or the sink fails.
    pub fn write<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), SnapshotError> {
        let (schema, sort_order) = self.require()?;
        let schema_text = schema_to_text(schema)?;
        let sort_order_text = sort_order_to_text(sort_order)?;
        write_text(sink, &schema_text)?;
        write_text(sink, &sort_order_text)?;
        Ok(())
    }

    /// Reads a snapshot body written under the declared version.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownVersion`] for versions other than 1 and
    /// 2, and other [`SnapshotError`] values for corrupt input.
    pub fn read<R: Read + ?Sized>(
        source: &mut R,
        declared_version: u32,
        max_text_bytes: usize,
    ) -> Result<Self, SnapshotError> {
        let format_version = FormatVersion::try_from(declared_version)?;
        match format_version {
            FormatVersion::V1 | FormatVersion::V2 => {
                let schema = text_to_schema(&read_text(source, max_text_bytes)?)?;
                let sort_order = text_to_sort_order(&read_text(source, max_text_bytes)?)?;
                Ok(Self::new(schema, sort_order, format_version))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Envelope
    // ------------------------------------------------------------------------

    /// Writes the kind tag, version, and body.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the body cannot be written.
    pub fn write_versioned<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), SnapshotError> {
        self.require()?;
        write_text(sink, SNAPSHOT_KIND)?;
        wire::write_u32(sink, self.format_version.as_u32())?;
        self.write(sink)
    }

    /// Writes the versioned envelope into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the body cannot be written.
    pub fn to_versioned_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut out = Vec::new();
        self.write_versioned(&mut out)?;
        Ok(out)
    }

    /// Reads a versioned envelope.
    ///
    /// Foreign kinds are returned without reading their body.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] for unknown versions of this kind and
    /// corrupt input.
    pub fn read_versioned<R: Read + ?Sized>(
        source: &mut R,
        max_text_bytes: usize,
    ) -> Result<RestoredSnapshot, SnapshotError> {
        let kind = read_text(source, max_text_bytes)?;
        let version = wire::read_u32(source)?;
        if kind != SNAPSHOT_KIND {
            return Ok(RestoredSnapshot::Foreign {
                kind,
                version,
            });
        }
        Self::read(source, version, max_text_bytes).map(RestoredSnapshot::SortKey)
    }

    // ------------------------------------------------------------------------
    // Derived State
    // ------------------------------------------------------------------------

    /// Returns the canonical fingerprint of schema, sort order, and version.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when a part is missing or hashing fails.
    pub fn fingerprint(&self) -> Result<HashDigest, SnapshotError> {
        let (schema, sort_order) = self.require()?;
        let input = FingerprintInput {
            schema,
            sort_order,
            format_version: self.format_version,
        };
        Ok(hash_canonical_json(HashAlgorithm::Sha256, &input)?)
    }

    /// Rebuilds the codec this snapshot describes.
    ///
    /// The sort order is bound against the schema first.
    pub(crate) fn restore_codec(&self, limits: CodecLimits) -> Result<SortKeyCodec, SnapshotError> {
        let (schema, sort_order) = self.require()?;
        let bound = sort_order.bind(schema)?;
        let codec = SortKeyCodec::with_version(schema.clone(), bound, self.format_version)?;
        Ok(codec.with_limits(limits))
    }
}

impl RestoredSnapshot {
    /// Returns the kind tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::SortKey(_) => SNAPSHOT_KIND,
            Self::Foreign {
                kind, ..
            } => kind,
        }
    }

    /// Returns the declared version number.
    #[must_use]
    pub const fn version(&self) -> u32 {
        match self {
            Self::SortKey(snapshot) => snapshot.format_version.as_u32(),
            Self::Foreign {
                version, ..
            } => *version,
        }
    }
}

// ============================================================================
// SECTION: Text Blocks
// ============================================================================

/// Writes a length-prefixed UTF-8 text block.
fn write_text<W: Write + ?Sized>(sink: &mut W, text: &str) -> Result<(), SnapshotError> {
    Ok(wire::write_prefixed(sink, text.as_bytes(), usize::MAX)?)
}

/// Reads a length-prefixed UTF-8 text block.
fn read_text<R: Read + ?Sized>(source: &mut R, limit: usize) -> Result<String, SnapshotError> {
    let bytes = wire::read_prefixed(source, limit)?;
    String::from_utf8(bytes).map_err(|_| SnapshotError::InvalidUtf8)
}
