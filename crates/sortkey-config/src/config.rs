// crates/sortkey-config/src/config.rs
// ============================================================================
// Module: Sort Key Configuration
// Description: Configuration loading and validation for sort-key tooling.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: sortkey-codec, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to defaults; any value that is
//! present must validate or loading fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sortkey_codec::CodecLimits;
use sortkey_codec::DEFAULT_MAX_TEXT_BYTES;
use sortkey_codec::DEFAULT_MAX_VALUE_BYTES;
use sortkey_codec::FileAuditSink;
use sortkey_codec::FormatVersion;
use sortkey_codec::NoopAuditSink;
use sortkey_codec::RestoreAuditSink;
use sortkey_codec::StderrAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sortkey.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SORTKEY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum allowed per-value byte limit.
pub(crate) const MAX_VALUE_BYTES_CEILING: usize = 256 * 1024 * 1024;
/// Maximum allowed snapshot text block limit.
pub(crate) const MAX_TEXT_BYTES_CEILING: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Sort-key tooling configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortKeyConfig {
    /// Codec settings.
    #[serde(default)]
    pub codec: CodecConfig,
    /// Restore policy.
    #[serde(default)]
    pub restore: RestoreConfig,
    /// Restore audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Codec settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Tuple format version for newly written state.
    #[serde(default = "default_format_version")]
    pub format_version: FormatVersion,
    /// Maximum bytes in one length-prefixed value.
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
    /// Maximum bytes in one snapshot text block.
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            max_value_bytes: default_max_value_bytes(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

impl CodecConfig {
    /// Validates codec limits.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_limit("codec.max_value_bytes", self.max_value_bytes, MAX_VALUE_BYTES_CEILING)?;
        validate_limit("codec.max_text_bytes", self.max_text_bytes, MAX_TEXT_BYTES_CEILING)
    }

    /// Returns the codec limits.
    #[must_use]
    pub const fn limits(&self) -> CodecLimits {
        CodecLimits {
            max_value_bytes: self.max_value_bytes,
        }
    }
}

/// Action taken when persisted state is incompatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncompatiblePolicy {
    /// Fail the restore.
    #[default]
    Fail,
    /// Discard persisted state and start clean.
    Reset,
}

/// Restore policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    /// Action on incompatible state.
    #[serde(default)]
    pub on_incompatible: IncompatiblePolicy,
    /// Whether state may be migrated to a new layout.
    #[serde(default = "default_allow_migration")]
    pub allow_migration: bool,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            on_incompatible: IncompatiblePolicy::default(),
            allow_migration: default_allow_migration(),
        }
    }
}

/// Restore audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Restore audit settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path, required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn open_sink(&self) -> Result<Box<dyn RestoreAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Box::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SortKeyConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_from(&resolved)
    }

    /// Loads configuration when one is configured, or returns defaults.
    ///
    /// An explicit path or the environment variable must point at a readable
    /// file; only the implicit default filename may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an existing or explicit config fails to load.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let implicit = path.is_none() && env::var_os(CONFIG_ENV_VAR).is_none();
        if implicit && !resolved.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&resolved)
    }

    /// Loads and validates a config file at a resolved path.
    fn load_from(resolved: &Path) -> Result<Self, ConfigError> {
        validate_path(resolved)?;
        let bytes = fs::read(resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.codec.validate()?;
        self.audit.validate()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default tuple format version.
const fn default_format_version() -> FormatVersion {
    FormatVersion::CURRENT
}

/// Default per-value byte limit.
const fn default_max_value_bytes() -> usize {
    DEFAULT_MAX_VALUE_BYTES
}

/// Default snapshot text block limit.
const fn default_max_text_bytes() -> usize {
    DEFAULT_MAX_TEXT_BYTES
}

/// Migration is allowed by default.
const fn default_allow_migration() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string from the config body.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a byte limit is positive and under its ceiling.
fn validate_limit(field: &str, value: usize, ceiling: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > ceiling {
        return Err(ConfigError::Invalid(format!("{field} exceeds maximum of {ceiling}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
