//! Boundary to the remote analysis service.
//!
//! The gateway is a stateless translation layer: it encodes requests,
//! decodes responses, and reports failures. It never retries or caches.

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::{AnalysisReport, AnalysisRequest, UploadFile};
use crate::history::HistoryRecord;
use crate::session::{FailureCategory, OperationFailure, OperationKind, ScoringConfig};

/// Why a remote call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never reached the server (connection refused, DNS,
    /// timeout, request construction).
    #[error("Request did not reach the server: {message}")]
    Unreachable { message: String },

    /// The server answered with a non-success status.
    #[error("Server returned status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// The server answered successfully but the body was not understood.
    #[error("Failed to decode server response: {message}")]
    Decode { message: String },
}

impl GatewayError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    pub fn server(status: u16, detail: Option<String>) -> Self {
        Self::Server { status, detail }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Server-supplied human-readable detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }

    pub fn reached_server(&self) -> bool {
        !matches!(self, Self::Unreachable { .. })
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Unreachable { .. } => FailureCategory::Unreachable,
            Self::Server { .. } => FailureCategory::Server,
            Self::Decode { .. } => FailureCategory::InvalidResponse,
        }
    }

    /// Converts into the user-facing failure for `operation`: the server
    /// detail when present, otherwise the operation's generic message.
    pub fn into_failure(self, operation: OperationKind) -> OperationFailure {
        let message = self
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| operation.generic_failure_message().to_string());
        OperationFailure::new(operation, self.category(), message)
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// The remote operations the workflow depends on.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// `POST /configure` with `{ google_api_key }`.
    async fn configure_credential(&self, api_key: &str) -> GatewayResult<()>;

    /// `POST /upload`, every file under the `files` field.
    async fn ingest_corpus(&self, files: &[UploadFile]) -> GatewayResult<()>;

    /// `POST /analyze`; returns the report Markdown.
    async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
        scoring: ScoringConfig,
    ) -> GatewayResult<String>;

    /// `GET /report/{id}`.
    async fn fetch_report(&self, id: &str) -> GatewayResult<AnalysisReport>;

    /// `GET /history`.
    async fn list_history(&self) -> GatewayResult<Vec<HistoryRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_detail_becomes_message() {
        let failure = GatewayError::server(429, Some("quota exceeded".into()))
            .into_failure(OperationKind::SubmitAnalysis);
        assert_eq!(failure.message, "quota exceeded");
        assert_eq!(failure.category, FailureCategory::Server);
    }

    #[test]
    fn test_missing_detail_falls_back_to_generic() {
        let failure =
            GatewayError::server(500, None).into_failure(OperationKind::IngestCorpus);
        assert_eq!(failure.message, "Failed to process documents.");

        let blank = GatewayError::server(500, Some("  ".into()))
            .into_failure(OperationKind::ViewReport);
        assert_eq!(blank.message, "Failed to load the report.");
    }

    #[test]
    fn test_unreachable_is_distinguished() {
        let err = GatewayError::unreachable("connection refused");
        assert!(!err.reached_server());
        let failure = err.into_failure(OperationKind::ConfigureCredential);
        assert_eq!(failure.category, FailureCategory::Unreachable);
        assert_eq!(failure.message, "Failed to configure API key.");

        assert!(GatewayError::decode("bad json").reached_server());
    }
}
