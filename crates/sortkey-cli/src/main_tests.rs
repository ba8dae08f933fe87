// crates/sortkey-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads and restore policy decisions.
// Purpose: Ensure inputs fail closed and policy maps plans predictably.
// Dependencies: sortkey-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` enforces size limits and `apply_policy`
//! honors `allow_migration` and `on_incompatible`.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use sortkey_codec::ConfigurationSnapshot;
use sortkey_codec::FormatVersion;
use sortkey_codec::NoopAuditSink;
use sortkey_codec::RestorePlan;
use sortkey_codec::RestoredSnapshot;
use sortkey_codec::plan_restore;
use sortkey_config::IncompatiblePolicy;
use sortkey_config::RestoreConfig;
use sortkey_types::NestedField;
use sortkey_types::PrimitiveType;
use sortkey_types::Schema;
use sortkey_types::SortField;
use sortkey_types::SortOrder;
use sortkey_types::Transform;

use super::ReadLimitError;
use super::read_bytes_with_limit;
use crate::restore_policy::RestoreDecision;
use crate::restore_policy::apply_policy;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a snapshot sorting on a single column of the given type.
fn snapshot(sort_type: PrimitiveType, version: FormatVersion) -> ConfigurationSnapshot {
    let schema = Schema::new(vec![
        NestedField::required(1, "k", sort_type),
        NestedField::optional(2, "v", PrimitiveType::String),
    ])
    .unwrap();
    let order = SortOrder::new(1, vec![SortField::asc(1, Transform::Identity)]);
    ConfigurationSnapshot::new(schema, order, version)
}

/// Plans a restore between two snapshots.
fn plan(old: ConfigurationSnapshot, new: &ConfigurationSnapshot) -> RestorePlan {
    plan_restore(&RestoredSnapshot::SortKey(old), new, &NoopAuditSink).unwrap()
}

/// Builds a restore policy.
const fn policy(on_incompatible: IncompatiblePolicy, allow_migration: bool) -> RestoreConfig {
    RestoreConfig {
        on_incompatible,
        allow_migration,
    }
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_small_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    fs::write(&path, b"{}").unwrap();
    assert_eq!(read_bytes_with_limit(&path, 2).unwrap(), b"{}".to_vec());
}

#[test]
fn read_bytes_with_limit_rejects_large_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.json");
    fs::write(&path, vec![b'a'; 16]).unwrap();
    let err = read_bytes_with_limit(&path, 8).unwrap_err();
    assert!(matches!(err, ReadLimitError::TooLarge { size: 16, limit: 8 }));
}

#[test]
fn read_bytes_with_limit_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_bytes_with_limit(&dir.path().join("absent"), 8).unwrap_err();
    assert!(matches!(err, ReadLimitError::Io(_)));
}

// ============================================================================
// SECTION: Restore Policy
// ============================================================================

#[test]
fn apply_policy_reuses_identical_layouts() {
    let new = snapshot(PrimitiveType::Int, FormatVersion::V2);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V2), &new);
    let decision = apply_policy(&plan, &policy(IncompatiblePolicy::Fail, false));
    assert_eq!(decision, RestoreDecision::Reuse);
    assert!(!decision.is_failure());
}

#[test]
fn apply_policy_allows_format_upgrade() {
    let new = snapshot(PrimitiveType::Int, FormatVersion::V2);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V1), &new);
    let decision = apply_policy(&plan, &policy(IncompatiblePolicy::Fail, true));
    assert_eq!(decision.label(), "migrate");
    assert_eq!(decision.reason(), Some("tuple format upgrade"));
}

#[test]
fn apply_policy_labels_type_promotion() {
    let new = snapshot(PrimitiveType::Long, FormatVersion::V2);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V2), &new);
    let decision = apply_policy(&plan, &policy(IncompatiblePolicy::Fail, true));
    assert_eq!(decision.reason(), Some("sort key type promotion"));
}

#[test]
fn apply_policy_fails_disabled_migration() {
    let new = snapshot(PrimitiveType::Int, FormatVersion::V2);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V1), &new);
    let decision = apply_policy(&plan, &policy(IncompatiblePolicy::Fail, false));
    assert!(decision.is_failure());
    assert!(decision.reason().unwrap().contains("disabled"));
}

#[test]
fn apply_policy_resets_incompatible_state_when_configured() {
    let new = snapshot(PrimitiveType::String, FormatVersion::V2);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V2), &new);
    let decision = apply_policy(&plan, &policy(IncompatiblePolicy::Reset, true));
    assert_eq!(decision.label(), "reset");
    assert!(!decision.is_failure());
}

#[test]
fn apply_policy_fails_incompatible_state_by_default() {
    let new = snapshot(PrimitiveType::Int, FormatVersion::V1);
    let plan = plan(snapshot(PrimitiveType::Int, FormatVersion::V2), &new);
    let decision = apply_policy(&plan, &RestoreConfig::default());
    assert!(decision.is_failure());
    assert!(decision.reason().unwrap().contains("downgrade"));
}
