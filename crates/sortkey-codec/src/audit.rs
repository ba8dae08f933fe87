// crates/sortkey-codec/src/audit.rs
// ============================================================================
// Module: Restore Audit
// Description: Structured audit events for restore decisions.
// Purpose: Record every reuse, migrate, or reject decision as a JSON line.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Restore planning is the one observable event in this crate. Each plan
//! emits a [`RestoreAuditEvent`] to a [`RestoreAuditSink`]; sinks serialize
//! events as JSON lines to stderr or an append-only file. Sink failures are
//! swallowed so auditing never changes a restore outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Restore decision label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// Persisted tuples are read as-is.
    Reuse,
    /// Persisted tuples must be rewritten.
    Migrate,
    /// Persisted tuples cannot be trusted.
    Reject,
}

/// Restore audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Kind tag of the persisted snapshot.
    pub old_kind: String,
    /// Version of the persisted snapshot.
    pub old_version: u32,
    /// Version of the current configuration.
    pub new_version: u32,
    /// Fingerprint of the persisted configuration when available.
    pub old_fingerprint: Option<String>,
    /// Fingerprint of the current configuration when available.
    pub new_fingerprint: Option<String>,
    /// Decision taken.
    pub outcome: RestoreOutcome,
    /// Rejection or migration reason.
    pub reason: Option<String>,
}

/// Inputs required to construct a restore audit event.
pub struct RestoreAuditEventParams {
    /// Kind tag of the persisted snapshot.
    pub old_kind: String,
    /// Version of the persisted snapshot.
    pub old_version: u32,
    /// Version of the current configuration.
    pub new_version: u32,
    /// Fingerprint of the persisted configuration.
    pub old_fingerprint: Option<String>,
    /// Fingerprint of the current configuration.
    pub new_fingerprint: Option<String>,
    /// Decision taken.
    pub outcome: RestoreOutcome,
    /// Rejection or migration reason.
    pub reason: Option<String>,
}

impl RestoreAuditEvent {
    /// Creates a restore audit event stamped with the current time.
    #[must_use]
    pub fn new(params: RestoreAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "sort_key_restore",
            timestamp_ms,
            old_kind: params.old_kind,
            old_version: params.old_version,
            new_version: params.new_version,
            old_fingerprint: params.old_fingerprint,
            new_fingerprint: params.new_fingerprint,
            outcome: params.outcome,
            reason: params.reason,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for restore audit events.
pub trait RestoreAuditSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &RestoreAuditEvent);
}

/// Sink writing JSON lines to stderr.
pub struct StderrAuditSink;

impl RestoreAuditSink for StderrAuditSink {
    fn record(&self, event: &RestoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink appending JSON lines to a file.
pub struct FileAuditSink {
    /// Append-only file handle.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit file in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RestoreAuditSink for FileAuditSink {
    fn record(&self, event: &RestoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink discarding every event.
pub struct NoopAuditSink;

impl RestoreAuditSink for NoopAuditSink {
    fn record(&self, _event: &RestoreAuditEvent) {}
}
