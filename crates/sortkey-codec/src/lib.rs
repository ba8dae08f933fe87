// crates/sortkey-codec/src/lib.rs
// ============================================================================
// Module: Sort Key Codec Library
// Description: Public API surface for the sort-key tuple codec.
// Purpose: Expose the codec, configuration snapshots, and restore planning.
// Dependencies: crate::{codec, compatibility, snapshot, value, value_codec, version}
// ============================================================================

//! ## Overview
//! A versioned binary codec for ordered scalar tuples derived from a schema
//! and sort order, plus the persisted configuration snapshot and the
//! compatibility decision that must run before restored tuple bytes are
//! trusted.
//!
//! The codec performs no I/O of its own; callers pass already-open readers
//! and writers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod codec;
pub mod compatibility;
pub mod error;
pub mod layout;
pub mod snapshot;
pub mod value;
pub mod value_codec;
pub mod version;
mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RestoreAuditEvent;
pub use audit::RestoreAuditSink;
pub use audit::RestoreOutcome;
pub use audit::StderrAuditSink;
pub use codec::SortKeyCodec;
pub use compatibility::Compatibility;
pub use compatibility::IncompatibilityReason;
pub use compatibility::RestorePlan;
pub use compatibility::StateMigrator;
pub use compatibility::plan_restore;
pub use compatibility::plan_restore_with_limits;
pub use compatibility::resolve;
pub use error::CodecError;
pub use error::SnapshotError;
pub use layout::LayoutError;
pub use layout::TransformedField;
pub use layout::resolve_layout;
pub use snapshot::ConfigurationSnapshot;
pub use snapshot::DEFAULT_MAX_TEXT_BYTES;
pub use snapshot::RestoredSnapshot;
pub use snapshot::SNAPSHOT_KIND;
pub use value::SortKey;
pub use value::Value;
pub use value_codec::CodecLimits;
pub use value_codec::DEFAULT_MAX_VALUE_BYTES;
pub use value_codec::ValueCodec;
pub use version::FormatVersion;
pub use version::UnknownVersionError;
