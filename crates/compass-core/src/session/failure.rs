//! Typed operation failures surfaced to the user.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The stage operations guarded by the busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    ConfigureCredential,
    IngestCorpus,
    SubmitAnalysis,
    ViewReport,
}

impl OperationKind {
    /// Label shown while the operation holds the busy flag.
    pub fn busy_reason(self) -> &'static str {
        match self {
            Self::ConfigureCredential => "Configuring API Key...",
            Self::IngestCorpus => "Processing documents...",
            Self::SubmitAnalysis => "Agents are at work...",
            Self::ViewReport => "Loading report...",
        }
    }

    /// Message used when a remote failure carries no server detail.
    pub fn generic_failure_message(self) -> &'static str {
        match self {
            Self::ConfigureCredential => "Failed to configure API key.",
            Self::IngestCorpus => "Failed to process documents.",
            Self::SubmitAnalysis => "An error occurred during analysis.",
            Self::ViewReport => "Failed to load the report.",
        }
    }

    /// Whether starting this operation discards the report currently held.
    pub fn clears_report_on_start(self) -> bool {
        matches!(self, Self::SubmitAnalysis | Self::ViewReport)
    }
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureCategory {
    /// Another stage operation is in flight; nothing was started.
    Busy,
    /// A local precondition failed before any remote call.
    Precondition,
    /// The request never reached the server.
    Unreachable,
    /// The server answered with a non-success status.
    Server,
    /// The server answered successfully but the body could not be decoded.
    InvalidResponse,
}

/// A failed stage operation: what was attempted, why it failed, and the
/// message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub operation: OperationKind,
    pub category: FailureCategory,
    pub message: String,
}

impl OperationFailure {
    pub fn new(
        operation: OperationKind,
        category: FailureCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            category,
            message: message.into(),
        }
    }

    pub fn precondition(operation: OperationKind, message: impl Into<String>) -> Self {
        Self::new(operation, FailureCategory::Precondition, message)
    }

    pub fn busy(operation: OperationKind) -> Self {
        Self::new(
            operation,
            FailureCategory::Busy,
            "Another operation is already in progress.",
        )
    }

    pub fn is_busy(&self) -> bool {
        self.category == FailureCategory::Busy
    }

    pub fn is_precondition(&self) -> bool {
        self.category == FailureCategory::Precondition
    }
}

impl std::fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OperationFailure {}

/// Result of a stage operation that was allowed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The response was applied to the session.
    Applied,
    /// The session moved on (reset/navigation) while the call was in flight;
    /// the response was discarded.
    Superseded,
}
