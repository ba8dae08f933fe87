// crates/sortkey-codec/src/compatibility.rs
// ============================================================================
// Module: Restore Compatibility
// Description: Decides whether persisted sort-key tuples survive a configuration change.
// Purpose: Resolve compatibility and turn the decision into an explicit restore plan.
// Dependencies: crate::{audit, codec, snapshot, value, version}, sortkey-types
// ============================================================================

//! ## Overview
//! [`resolve`] is a pure decision over a persisted snapshot and the current
//! configuration:
//!
//! 1. a snapshot of another kind is incompatible;
//! 2. version 1 to version 2 needs migration, whatever the definitions;
//! 3. version 2 to version 1 is a downgrade and is incompatible;
//! 4. sort orders must order records the same way;
//! 5. both schemas are projected onto the sort source ids, and the current
//!    projection must be able to read data written under the persisted one.
//!
//! [`plan_restore`] is the only way to obtain a codec for restored bytes. It
//! refines "compatible as-is" into a migration when a sort field's physical
//! type was promoted (int to long, for example), since the old bytes would
//! otherwise be misread at the new width.
//!
//! Security posture: restored bytes are untrusted until a plan accepts them;
//! every plan is audited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::io::Write;

use sortkey_types::PrimitiveType;
use sortkey_types::Type;
use sortkey_types::write_compatibility_errors;

use crate::audit::RestoreAuditEvent;
use crate::audit::RestoreAuditEventParams;
use crate::audit::RestoreAuditSink;
use crate::audit::RestoreOutcome;
use crate::codec::SortKeyCodec;
use crate::error::CodecError;
use crate::error::SnapshotError;
use crate::layout::TransformedField;
use crate::snapshot::ConfigurationSnapshot;
use crate::snapshot::RestoredSnapshot;
use crate::value::SortKey;
use crate::value_codec::CodecLimits;
use crate::version::FormatVersion;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Why persisted tuples cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompatibilityReason {
    /// The persisted snapshot belongs to another serializer family.
    ForeignSnapshot {
        /// Kind tag found.
        kind: String,
    },
    /// The current configuration uses an older tuple format.
    VersionDowngrade {
        /// Persisted version.
        old: FormatVersion,
        /// Current version.
        new: FormatVersion,
    },
    /// The sort orders do not order records the same way.
    SortOrderChanged,
    /// Sort source fields are no longer write-compatible.
    SchemaIncompatible(Vec<String>),
}

impl fmt::Display for IncompatibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignSnapshot {
                kind,
            } => write!(f, "snapshot kind {kind} is not a sort-key snapshot"),
            Self::VersionDowngrade {
                old,
                new,
            } => write!(f, "format version downgrade from {old} to {new}"),
            Self::SortOrderChanged => f.write_str("sort order changed"),
            Self::SchemaIncompatible(errors) => {
                write!(f, "sort fields are incompatible: {}", errors.join("; "))
            }
        }
    }
}

/// Compatibility of persisted tuples with the current configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Persisted tuples can be read without change.
    CompatibleAsIs,
    /// Persisted tuples must be rewritten first.
    CompatibleAfterMigration,
    /// Persisted tuples cannot be trusted.
    Incompatible(IncompatibilityReason),
}

/// Decides whether tuples persisted under `old` can be used with `new`.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidState`] when a sort-key snapshot lacks its
/// schema or sort order.
pub fn resolve(
    old: &RestoredSnapshot,
    new: &ConfigurationSnapshot,
) -> Result<Compatibility, SnapshotError> {
    let RestoredSnapshot::SortKey(old) = old else {
        return Ok(Compatibility::Incompatible(IncompatibilityReason::ForeignSnapshot {
            kind: old.kind().to_string(),
        }));
    };
    let (old_schema, old_order) = old.require()?;
    let (new_schema, new_order) = new.require()?;

    match (old.format_version(), new.format_version()) {
        (FormatVersion::V1, FormatVersion::V2) => {
            return Ok(Compatibility::CompatibleAfterMigration);
        }
        (FormatVersion::V2, FormatVersion::V1) => {
            return Ok(Compatibility::Incompatible(IncompatibilityReason::VersionDowngrade {
                old: FormatVersion::V2,
                new: FormatVersion::V1,
            }));
        }
        _ => {}
    }

    if !new_order.same_order(old_order) {
        return Ok(Compatibility::Incompatible(IncompatibilityReason::SortOrderChanged));
    }

    let source_ids = old_order.source_ids();
    let old_projected = old_schema.project(&source_ids);
    let new_projected = new_schema.project(&source_ids);
    let errors = write_compatibility_errors(&new_projected, &old_projected);
    if errors.is_empty() {
        Ok(Compatibility::CompatibleAsIs)
    } else {
        Ok(Compatibility::Incompatible(IncompatibilityReason::SchemaIncompatible(errors)))
    }
}

// ============================================================================
// SECTION: Restore Plan
// ============================================================================

/// What to do with persisted tuples.
#[derive(Debug)]
pub enum RestorePlan {
    /// Read persisted tuples with this codec.
    Reuse(SortKeyCodec),
    /// Rewrite persisted tuples before use.
    Migrate(StateMigrator),
    /// Do not trust persisted tuples.
    Reject(IncompatibilityReason),
}

impl RestorePlan {
    /// Returns the audit label for the plan.
    #[must_use]
    pub const fn outcome(&self) -> RestoreOutcome {
        match self {
            Self::Reuse(_) => RestoreOutcome::Reuse,
            Self::Migrate(_) => RestoreOutcome::Migrate,
            Self::Reject(_) => RestoreOutcome::Reject,
        }
    }
}

/// Plans a restore with default codec limits.
///
/// # Errors
///
/// Returns [`SnapshotError`] when a snapshot is incomplete or its sort order
/// does not bind to its schema.
pub fn plan_restore(
    old: &RestoredSnapshot,
    new: &ConfigurationSnapshot,
    audit: &dyn RestoreAuditSink,
) -> Result<RestorePlan, SnapshotError> {
    plan_restore_with_limits(old, new, CodecLimits::default(), audit)
}

/// Plans a restore, building codecs with the given limits.
///
/// # Errors
///
/// Returns [`SnapshotError`] when a snapshot is incomplete, its sort order
/// does not bind to its schema, or fingerprinting fails. Nothing is audited
/// in that case.
pub fn plan_restore_with_limits(
    old: &RestoredSnapshot,
    new: &ConfigurationSnapshot,
    limits: CodecLimits,
    audit: &dyn RestoreAuditSink,
) -> Result<RestorePlan, SnapshotError> {
    let (plan, reason) = match resolve(old, new)? {
        Compatibility::Incompatible(reason) => {
            let label = reason.to_string();
            (RestorePlan::Reject(reason), Some(label))
        }
        Compatibility::CompatibleAfterMigration => {
            let migrator = StateMigrator::from_snapshots(old, new, limits)?;
            (RestorePlan::Migrate(migrator), Some("tuple format upgrade".to_string()))
        }
        Compatibility::CompatibleAsIs => {
            let migrator = StateMigrator::from_snapshots(old, new, limits)?;
            if migrator.is_identity() {
                (RestorePlan::Reuse(migrator.into_target()), None)
            } else {
                (RestorePlan::Migrate(migrator), Some("sort key type promotion".to_string()))
            }
        }
    };
    let old_fingerprint = fingerprint_label(old)?;
    let new_fingerprint = new.fingerprint()?.to_string();
    audit.record(&RestoreAuditEvent::new(RestoreAuditEventParams {
        old_kind: old.kind().to_string(),
        old_version: old.version(),
        new_version: new.format_version().as_u32(),
        old_fingerprint,
        new_fingerprint: Some(new_fingerprint),
        outcome: plan.outcome(),
        reason,
    }));
    Ok(plan)
}

/// Returns the fingerprint of a sort-key snapshot.
fn fingerprint_label(snapshot: &RestoredSnapshot) -> Result<Option<String>, SnapshotError> {
    match snapshot {
        RestoredSnapshot::SortKey(snapshot) => Ok(Some(snapshot.fingerprint()?.to_string())),
        RestoredSnapshot::Foreign {
            ..
        } => Ok(None),
    }
}

// ============================================================================
// SECTION: Migration
// ============================================================================

/// Rewrites tuples persisted under one layout into another.
#[derive(Debug)]
pub struct StateMigrator {
    /// Codec for persisted tuples.
    source: SortKeyCodec,
    /// Codec for rewritten tuples.
    target: SortKeyCodec,
}

impl StateMigrator {
    /// Creates a migrator between two codecs.
    #[must_use]
    pub const fn new(source: SortKeyCodec, target: SortKeyCodec) -> Self {
        Self {
            source,
            target,
        }
    }

    /// Builds source and target codecs from snapshots.
    fn from_snapshots(
        old: &RestoredSnapshot,
        new: &ConfigurationSnapshot,
        limits: CodecLimits,
    ) -> Result<Self, SnapshotError> {
        let RestoredSnapshot::SortKey(old) = old else {
            return Err(SnapshotError::InvalidState("foreign snapshot cannot be migrated"));
        };
        Ok(Self::new(old.restore_codec(limits)?, new.restore_codec(limits)?))
    }

    /// Returns the codec for persisted tuples.
    #[must_use]
    pub const fn source_codec(&self) -> &SortKeyCodec {
        &self.source
    }

    /// Returns the codec for rewritten tuples.
    #[must_use]
    pub const fn target_codec(&self) -> &SortKeyCodec {
        &self.target
    }

    /// Returns true when both codecs read and write identical bytes.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.source.version() == self.target.version()
            && self.source.layout().len() == self.target.layout().len()
            && self
                .source
                .layout()
                .iter()
                .zip(self.target.layout())
                .all(|(old, new)| same_wire_shape(old, new))
    }

    /// Converts one persisted tuple into the target layout.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SizeMismatch`] when the layouts differ in size.
    pub fn migrate_key(&self, key: &SortKey) -> Result<SortKey, CodecError> {
        promote_key(self.target.layout(), key)
    }

    /// Rewrites `count` tuples from the source into the sink.
    ///
    /// Returns the number of tuples written.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when a tuple cannot be decoded, converted, or
    /// encoded.
    pub fn migrate<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        source: &mut R,
        sink: &mut W,
        count: usize,
    ) -> Result<usize, CodecError> {
        for _ in 0..count {
            let key = self.source.decode_scratch(source)?;
            let migrated = promote_key(self.target.layout(), key)?;
            self.target.encode(&migrated, sink)?;
        }
        Ok(count)
    }

    /// Consumes the migrator and returns the target codec.
    #[must_use]
    pub fn into_target(self) -> SortKeyCodec {
        self.target
    }
}

/// Returns true when two layout positions read and write the same bytes.
///
/// Decimal precision is not part of the encoding; fixed lengths are checked
/// on encode, so they must match.
fn same_wire_shape(old: &TransformedField, new: &TransformedField) -> bool {
    if old.type_id() != new.type_id() {
        return false;
    }
    match (&old.result_type, &new.result_type) {
        (
            Type::Primitive(PrimitiveType::Fixed(old_length)),
            Type::Primitive(PrimitiveType::Fixed(new_length)),
        ) => old_length == new_length,
        _ => true,
    }
}

/// Converts a tuple into a layout, widening promoted values.
fn promote_key(layout: &[TransformedField], key: &SortKey) -> Result<SortKey, CodecError> {
    if layout.len() != key.size() {
        return Err(CodecError::SizeMismatch {
            expected: layout.len(),
            actual: key.size(),
        });
    }
    let values = layout
        .iter()
        .zip(key.values())
        .map(|(field, slot)| slot.clone().map(|value| value.promote(field.type_id())))
        .collect();
    Ok(SortKey::from_values(values))
}
