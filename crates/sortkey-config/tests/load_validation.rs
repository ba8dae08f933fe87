//! Config load validation tests for sortkey-config.
// crates/sortkey-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section validation.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use sortkey_codec::FormatVersion;
use sortkey_config::AuditSinkKind;
use sortkey_config::ConfigError;
use sortkey_config::IncompatiblePolicy;
use sortkey_config::SortKeyConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<SortKeyConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    file.flush().map_err(|err| err.to_string())?;
    Ok(file)
}

fn load_text(contents: &str) -> Result<SortKeyConfig, ConfigError> {
    let file = write_config(contents.as_bytes()).map_err(ConfigError::Io)?;
    SortKeyConfig::load(Some(file.path()))
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SortKeyConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "b".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SortKeyConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(SortKeyConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let contents = vec![b' '; 1024 * 1024 + 1];
    let file = write_config(&contents)?;
    assert_invalid(SortKeyConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let file = write_config(&[0xff, 0xfe, 0xfd])?;
    assert_invalid(SortKeyConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    assert_invalid(load_text("[codec]\nmax_bytes = 10\n"), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_format_version() -> TestResult {
    assert_invalid(load_text("[codec]\nformat_version = 3\n"), "config parse error")?;
    Ok(())
}

#[test]
fn load_empty_file_uses_defaults() -> TestResult {
    let config = load_text("").map_err(|err| err.to_string())?;
    if config.codec.format_version != FormatVersion::V2 {
        return Err("default format version should be 2".to_string());
    }
    if config.restore.on_incompatible != IncompatiblePolicy::Fail || !config.restore.allow_migration
    {
        return Err("default restore policy should fail and allow migration".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("default audit sink should be none".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_all_sections() -> TestResult {
    let config = load_text(
        r#"
[codec]
format_version = 1
max_value_bytes = 4096
max_text_bytes = 65536

[restore]
on_incompatible = "reset"
allow_migration = false

[audit]
sink = "stderr"
"#,
    )
    .map_err(|err| err.to_string())?;
    if config.codec.format_version != FormatVersion::V1 {
        return Err("format version not applied".to_string());
    }
    if config.codec.limits().max_value_bytes != 4096 || config.codec.max_text_bytes != 65_536 {
        return Err("codec limits not applied".to_string());
    }
    if config.restore.on_incompatible != IncompatiblePolicy::Reset || config.restore.allow_migration
    {
        return Err("restore policy not applied".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("audit sink not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_zero_value_limit() -> TestResult {
    assert_invalid(
        load_text("[codec]\nmax_value_bytes = 0\n"),
        "codec.max_value_bytes must be greater than zero",
    )?;
    Ok(())
}

#[test]
fn load_rejects_text_limit_over_ceiling() -> TestResult {
    assert_invalid(
        load_text("[codec]\nmax_text_bytes = 67108865\n"),
        "codec.max_text_bytes exceeds maximum",
    )?;
    Ok(())
}

#[test]
fn load_rejects_file_sink_without_path() -> TestResult {
    assert_invalid(
        load_text("[audit]\nsink = \"file\"\n"),
        "audit.path is required for the file sink",
    )?;
    Ok(())
}

#[test]
fn load_rejects_blank_audit_path() -> TestResult {
    assert_invalid(
        load_text("[audit]\nsink = \"file\"\npath = \"  \"\n"),
        "audit.path must be non-empty",
    )?;
    Ok(())
}

#[test]
fn load_rejects_path_for_non_file_sink() -> TestResult {
    assert_invalid(
        load_text("[audit]\nsink = \"stderr\"\npath = \"audit.jsonl\"\n"),
        "audit.path is only valid for the file sink",
    )?;
    Ok(())
}

#[test]
fn file_sink_opens_configured_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let audit_path = dir.path().join("restore.jsonl");
    let text = format!("[audit]\nsink = \"file\"\npath = '{}'\n", audit_path.display());
    let config = load_text(&text).map_err(|err| err.to_string())?;
    config.audit.open_sink().map_err(|err| err.to_string())?;
    if !audit_path.exists() {
        return Err("file sink should create the audit log".to_string());
    }
    Ok(())
}

#[test]
fn load_or_default_reads_explicit_path() -> TestResult {
    let file = write_config(b"[restore]\nallow_migration = false\n")?;
    let config = SortKeyConfig::load_or_default(Some(file.path())).map_err(|err| err.to_string())?;
    if config.restore.allow_migration {
        return Err("explicit config should be loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_or_default_requires_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("missing.toml");
    assert_invalid(SortKeyConfig::load_or_default(Some(&path)), "config io error")?;
    Ok(())
}
