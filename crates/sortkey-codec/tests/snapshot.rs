// crates/sortkey-codec/tests/snapshot.rs
// ============================================================================
// Module: Configuration Snapshot Tests
// Description: Tests for snapshot persistence, envelopes, and fingerprints.
// ============================================================================
//! ## Overview
//! Validates the body layout, version dispatch, foreign envelopes, text
//! limits, and fingerprint stability.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use sortkey_codec::ConfigurationSnapshot;
use sortkey_codec::DEFAULT_MAX_TEXT_BYTES;
use sortkey_codec::FormatVersion;
use sortkey_codec::RestoredSnapshot;
use sortkey_codec::SNAPSHOT_KIND;
use sortkey_codec::SnapshotError;
use sortkey_codec::UnknownVersionError;
use sortkey_types::NestedField;
use sortkey_types::PrimitiveType;
use sortkey_types::Schema;
use sortkey_types::SortField;
use sortkey_types::SortOrder;
use sortkey_types::Transform;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a snapshot over a two-column schema.
fn snapshot(version: FormatVersion) -> ConfigurationSnapshot {
    let schema = Schema::new(vec![
        NestedField::required(1, "id", PrimitiveType::Long),
        NestedField::optional(2, "name", PrimitiveType::String),
    ])
    .unwrap();
    let order = SortOrder::new(1, vec![SortField::asc(2, Transform::Truncate(4))]);
    ConfigurationSnapshot::new(schema, order, version)
}

/// Reads one length-prefixed text block from the front of a buffer.
fn leading_text(bytes: &[u8]) -> (String, &[u8]) {
    let length = usize::try_from(i32::from_be_bytes(bytes[..4].try_into().unwrap())).unwrap();
    let text = String::from_utf8(bytes[4..4 + length].to_vec()).unwrap();
    (text, &bytes[4 + length..])
}

// ============================================================================
// SECTION: Body
// ============================================================================

/// Tests the body is schema text then sort order text.
#[test]
fn test_body_is_two_text_blocks() {
    let mut bytes = Vec::new();
    snapshot(FormatVersion::V2).write(&mut bytes).unwrap();
    let (schema_text, rest) = leading_text(&bytes);
    let (order_text, rest) = leading_text(rest);
    assert!(schema_text.contains("\"type\":\"struct\""));
    assert!(order_text.contains("\"truncate[4]\""));
    assert!(rest.is_empty());
}

/// Tests versions 1 and 2 read the same body.
#[test]
fn test_body_reads_under_both_versions() {
    let mut bytes = Vec::new();
    snapshot(FormatVersion::V2).write(&mut bytes).unwrap();
    for version in [1, 2] {
        let read =
            ConfigurationSnapshot::read(&mut bytes.as_slice(), version, DEFAULT_MAX_TEXT_BYTES)
                .unwrap();
        assert_eq!(read.format_version().as_u32(), version);
        assert_eq!(read.schema(), snapshot(FormatVersion::V2).schema());
    }
}

/// Tests unknown versions are rejected rather than guessed.
#[test]
fn test_unknown_version_rejected() {
    let mut bytes = Vec::new();
    snapshot(FormatVersion::V2).write(&mut bytes).unwrap();
    let err = ConfigurationSnapshot::read(&mut bytes.as_slice(), 3, DEFAULT_MAX_TEXT_BYTES)
        .unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownVersion(UnknownVersionError(3))));
}

/// Tests incomplete snapshots cannot be written.
#[test]
fn test_incomplete_snapshot_is_invalid_state() {
    let empty = ConfigurationSnapshot::empty(FormatVersion::V2);
    let mut bytes = Vec::new();
    assert!(matches!(empty.write(&mut bytes), Err(SnapshotError::InvalidState(_))));
    assert!(matches!(empty.fingerprint(), Err(SnapshotError::InvalidState(_))));
    assert!(bytes.is_empty());
}

/// Tests oversized text blocks are rejected.
#[test]
fn test_text_limit_enforced() {
    let mut bytes = Vec::new();
    snapshot(FormatVersion::V2).write(&mut bytes).unwrap();
    let err = ConfigurationSnapshot::read(&mut bytes.as_slice(), 2, 8).unwrap_err();
    assert!(matches!(err, SnapshotError::LengthLimitExceeded { limit: 8, .. }));
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Tests the envelope records kind and version and reads back.
#[test]
fn test_versioned_envelope_round_trip() {
    let original = snapshot(FormatVersion::V1);
    let bytes = original.to_versioned_bytes().unwrap();
    let (kind, rest) = leading_text(&bytes);
    assert_eq!(kind, SNAPSHOT_KIND);
    assert_eq!(&rest[..4], &[0, 0, 0, 1]);

    let restored =
        ConfigurationSnapshot::read_versioned(&mut bytes.as_slice(), DEFAULT_MAX_TEXT_BYTES)
            .unwrap();
    assert_eq!(restored, RestoredSnapshot::SortKey(original));
    assert_eq!(restored.version(), 1);
}

/// Tests other kinds are reported without parsing their body.
#[test]
fn test_foreign_envelope_is_not_parsed() {
    let mut bytes = 5_i32.to_be_bytes().to_vec();
    bytes.extend_from_slice(b"other");
    bytes.extend_from_slice(&7_u32.to_be_bytes());
    bytes.extend_from_slice(&[0xde, 0xad]);

    let restored =
        ConfigurationSnapshot::read_versioned(&mut bytes.as_slice(), DEFAULT_MAX_TEXT_BYTES)
            .unwrap();
    assert_eq!(restored, RestoredSnapshot::Foreign {
        kind: "other".to_string(),
        version: 7,
    });
    assert_eq!(restored.kind(), "other");
}

/// Tests unknown versions of this kind fail inside the envelope too.
#[test]
fn test_envelope_unknown_version_rejected() {
    let mut bytes = snapshot(FormatVersion::V2).to_versioned_bytes().unwrap();
    let version_offset = 4 + SNAPSHOT_KIND.len();
    bytes[version_offset..version_offset + 4].copy_from_slice(&9_u32.to_be_bytes());
    let err = ConfigurationSnapshot::read_versioned(&mut bytes.as_slice(), DEFAULT_MAX_TEXT_BYTES)
        .unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownVersion(UnknownVersionError(9))));
}

// ============================================================================
// SECTION: Fingerprints
// ============================================================================

/// Tests fingerprints cover the format version.
#[test]
fn test_fingerprint_covers_version() {
    let v1 = snapshot(FormatVersion::V1).fingerprint().unwrap();
    let v2 = snapshot(FormatVersion::V2).fingerprint().unwrap();
    assert_eq!(v2, snapshot(FormatVersion::V2).fingerprint().unwrap());
    assert_ne!(v1, v2);
}
