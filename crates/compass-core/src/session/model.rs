//! Session snapshot for the review workflow.

use serde::{Deserialize, Serialize};

use super::failure::{OperationFailure, OperationKind};
use super::stage::WorkflowStage;

/// Penalties applied by the remote scorer per detected conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub critical_penalty: i32,
    pub minor_penalty: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical_penalty: 30,
            minor_penalty: 10,
        }
    }
}

/// The stage operation currently holding the busy flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyState {
    pub operation: OperationKind,
    pub reason: String,
}

/// Process-wide workflow state.
///
/// A `Session` is never edited in place by callers: every transition method
/// consumes a snapshot and returns the next one, and the coordinator swaps
/// the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub credential_configured: bool,
    pub knowledge_base_ready: bool,
    pub scoring: ScoringConfig,
    pub busy: Option<BusyState>,
    pub last_error: Option<OperationFailure>,
    /// Raw Markdown of the report being viewed.
    pub current_report: Option<String>,
    /// Bumped whenever the user navigates away explicitly; in-flight
    /// responses started under an older generation are discarded.
    pub generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_scoring(ScoringConfig::default())
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session starting from the given scoring penalties.
    pub fn with_scoring(scoring: ScoringConfig) -> Self {
        Self {
            credential_configured: false,
            knowledge_base_ready: false,
            scoring,
            busy: None,
            last_error: None,
            current_report: None,
            generation: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn busy_reason(&self) -> Option<&str> {
        self.busy.as_ref().map(|b| b.reason.as_str())
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error.as_ref().map(|e| e.message.as_str())
    }

    pub fn stage(&self) -> WorkflowStage {
        WorkflowStage::of(self)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Marks `operation` as running: sets busy, clears the error and, for
    /// report-producing operations, the current report.
    pub fn started(self, operation: OperationKind) -> Self {
        let current_report = if operation.clears_report_on_start() {
            None
        } else {
            self.current_report
        };
        Self {
            busy: Some(BusyState {
                operation,
                reason: operation.busy_reason().to_string(),
            }),
            last_error: None,
            current_report,
            ..self
        }
    }

    pub fn released(self) -> Self {
        Self { busy: None, ..self }
    }

    pub fn failed(self, failure: OperationFailure) -> Self {
        Self {
            last_error: Some(failure),
            ..self
        }
    }

    pub fn credential_accepted(self) -> Self {
        Self {
            credential_configured: true,
            ..self
        }
    }

    pub fn knowledge_base_loaded(self) -> Self {
        Self {
            knowledge_base_ready: true,
            ..self
        }
    }

    pub fn report_loaded(self, report: impl Into<String>) -> Self {
        Self {
            current_report: Some(report.into()),
            ..self
        }
    }

    /// Clears report and error ahead of an explicit navigation and opens a
    /// new generation.
    pub fn navigated_away(self) -> Self {
        Self {
            current_report: None,
            last_error: None,
            generation: self.generation + 1,
            ..self
        }
    }

    pub fn scoring_updated(self, scoring: ScoringConfig) -> Self {
        Self { scoring, ..self }
    }
}
