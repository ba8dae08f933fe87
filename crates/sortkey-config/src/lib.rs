// crates/sortkey-config/src/lib.rs
// ============================================================================
// Module: Sort Key Config Library
// Description: Public API surface for sort-key tooling configuration.
// Purpose: Expose config loading, validation, and derived runtime settings.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Loads `sortkey.toml` with fail-closed validation and derives codec limits,
//! restore policy, and the restore audit sink from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::CONFIG_ENV_VAR;
pub use config::CodecConfig;
pub use config::ConfigError;
pub use config::IncompatiblePolicy;
pub use config::RestoreConfig;
pub use config::SortKeyConfig;
