// crates/sortkey-cli/src/restore_policy.rs
// ============================================================================
// Module: Restore Policy
// Description: Applies configured restore policy to a restore plan.
// Purpose: Turn codec-level restore plans into operator-facing decisions.
// Dependencies: sortkey-codec, sortkey-config
// ============================================================================

//! ## Overview
//! The codec decides what is technically possible; configuration decides what
//! is permitted. A migration that is not allowed is treated like an
//! incompatibility, and incompatibilities either fail or reset state per
//! `restore.on_incompatible`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sortkey_codec::RestorePlan;
use sortkey_config::IncompatiblePolicy;
use sortkey_config::RestoreConfig;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Operator-facing restore decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RestoreDecision {
    /// Use persisted state as-is.
    Reuse,
    /// Rewrite persisted state before use.
    Migrate {
        /// Why the rewrite is needed.
        reason: String,
    },
    /// Discard persisted state and start clean.
    Reset {
        /// Why state is discarded.
        reason: String,
    },
    /// Refuse to restore.
    Fail {
        /// Why the restore is refused.
        reason: String,
    },
}

impl RestoreDecision {
    /// Returns the output label.
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Reuse => "reuse",
            Self::Migrate {
                ..
            } => "migrate",
            Self::Reset {
                ..
            } => "reset",
            Self::Fail {
                ..
            } => "fail",
        }
    }

    /// Returns the decision reason, if any.
    pub(crate) fn reason(&self) -> Option<&str> {
        match self {
            Self::Reuse => None,
            Self::Migrate {
                reason,
            }
            | Self::Reset {
                reason,
            }
            | Self::Fail {
                reason,
            } => Some(reason.as_str()),
        }
    }

    /// Returns true when the command should exit non-zero.
    pub(crate) const fn is_failure(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

/// Applies restore policy to a restore plan.
pub(crate) fn apply_policy(plan: &RestorePlan, policy: &RestoreConfig) -> RestoreDecision {
    let reason = match plan {
        RestorePlan::Reuse(_) => return RestoreDecision::Reuse,
        RestorePlan::Migrate(migrator) => {
            let reason = if migrator.source_codec().version() == migrator.target_codec().version() {
                "sort key type promotion"
            } else {
                "tuple format upgrade"
            };
            if policy.allow_migration {
                return RestoreDecision::Migrate {
                    reason: reason.to_string(),
                };
            }
            format!("migration required ({reason}) but disabled")
        }
        RestorePlan::Reject(reason) => reason.to_string(),
    };
    match policy.on_incompatible {
        IncompatiblePolicy::Fail => RestoreDecision::Fail {
            reason,
        },
        IncompatiblePolicy::Reset => RestoreDecision::Reset {
            reason,
        },
    }
}
