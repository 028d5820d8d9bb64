//! Explicit stage machine over the session flags.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::failure::{OperationFailure, OperationKind};
use super::model::Session;

pub const MSG_EMPTY_API_KEY: &str = "Please enter an API Key.";
pub const MSG_NO_FILES: &str = "Please select files.";
pub const MSG_KNOWLEDGE_BASE_NOT_READY: &str = "Please process the Knowledge Base first.";
pub const MSG_CREDENTIAL_NOT_CONFIGURED: &str = "Please configure the API Key first.";
pub const MSG_EMPTY_REPORT_ID: &str = "Please select a report.";

/// Where the workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum WorkflowStage {
    Unconfigured,
    Configured,
    KnowledgeBaseReady,
    Analyzing,
    ResultReady,
}

/// Named transitions between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StageTransition {
    ConfigureCredential,
    IngestCorpus,
    SubmitAnalysis,
    ViewReport,
    Reset,
}

impl From<OperationKind> for StageTransition {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::ConfigureCredential => Self::ConfigureCredential,
            OperationKind::IngestCorpus => Self::IngestCorpus,
            OperationKind::SubmitAnalysis => Self::SubmitAnalysis,
            OperationKind::ViewReport => Self::ViewReport,
        }
    }
}

impl WorkflowStage {
    /// Derives the stage from a session snapshot.
    pub fn of(session: &Session) -> Self {
        let analyzing = session
            .busy
            .as_ref()
            .is_some_and(|b| b.operation == OperationKind::SubmitAnalysis);

        if analyzing {
            Self::Analyzing
        } else if session.current_report.is_some() {
            Self::ResultReady
        } else if session.knowledge_base_ready {
            Self::KnowledgeBaseReady
        } else if session.credential_configured {
            Self::Configured
        } else {
            Self::Unconfigured
        }
    }

    pub fn permits(self, transition: StageTransition) -> bool {
        use StageTransition as T;
        use WorkflowStage as S;

        match (self, transition) {
            (_, T::Reset) => true,
            (S::Analyzing, _) => false,
            (_, T::ConfigureCredential) | (_, T::ViewReport) => true,
            (S::Unconfigured, T::IngestCorpus) => false,
            (_, T::IngestCorpus) => true,
            (S::KnowledgeBaseReady, T::SubmitAnalysis) => true,
            (S::ResultReady, T::SubmitAnalysis) => true,
            (_, T::SubmitAnalysis) => false,
        }
    }
}

impl Session {
    /// Checks that `operation` is defined for the current stage.
    ///
    /// `ResultReady` does not imply a loaded knowledge base (a report can be
    /// opened from history first), so submission is gated on the flag itself.
    pub fn check_transition(&self, operation: OperationKind) -> Result<(), OperationFailure> {
        if operation == OperationKind::SubmitAnalysis && !self.knowledge_base_ready {
            return Err(OperationFailure::precondition(
                operation,
                MSG_KNOWLEDGE_BASE_NOT_READY,
            ));
        }

        let stage = self.stage();
        if stage.permits(operation.into()) {
            return Ok(());
        }

        let message = match (stage, operation) {
            (_, OperationKind::IngestCorpus) if !self.credential_configured => {
                MSG_CREDENTIAL_NOT_CONFIGURED
            }
            (_, OperationKind::SubmitAnalysis) => MSG_KNOWLEDGE_BASE_NOT_READY,
            _ => "This action is not available right now.",
        };
        Err(OperationFailure::precondition(operation, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_progression() {
        let session = Session::new();
        assert_eq!(session.stage(), WorkflowStage::Unconfigured);

        let session = session.credential_accepted();
        assert_eq!(session.stage(), WorkflowStage::Configured);

        let session = session.knowledge_base_loaded();
        assert_eq!(session.stage(), WorkflowStage::KnowledgeBaseReady);

        let session = session.started(OperationKind::SubmitAnalysis);
        assert_eq!(session.stage(), WorkflowStage::Analyzing);

        let session = session.report_loaded("# done").released();
        assert_eq!(session.stage(), WorkflowStage::ResultReady);
    }

    #[test]
    fn test_submit_requires_knowledge_base() {
        let session = Session::new().credential_accepted();
        let err = session
            .check_transition(OperationKind::SubmitAnalysis)
            .unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(err.message, MSG_KNOWLEDGE_BASE_NOT_READY);
    }

    #[test]
    fn test_submit_from_history_report_without_knowledge_base() {
        let session = Session::new().report_loaded("# from history");
        assert_eq!(session.stage(), WorkflowStage::ResultReady);
        let err = session
            .check_transition(OperationKind::SubmitAnalysis)
            .unwrap_err();
        assert_eq!(err.message, MSG_KNOWLEDGE_BASE_NOT_READY);
    }

    #[test]
    fn test_ingest_requires_credential() {
        let err = Session::new()
            .check_transition(OperationKind::IngestCorpus)
            .unwrap_err();
        assert_eq!(err.message, MSG_CREDENTIAL_NOT_CONFIGURED);

        assert!(
            Session::new()
                .credential_accepted()
                .check_transition(OperationKind::IngestCorpus)
                .is_ok()
        );
    }

    #[test]
    fn test_view_and_configure_allowed_everywhere_but_analyzing() {
        for stage in [
            WorkflowStage::Unconfigured,
            WorkflowStage::Configured,
            WorkflowStage::KnowledgeBaseReady,
            WorkflowStage::ResultReady,
        ] {
            assert!(stage.permits(StageTransition::ViewReport));
            assert!(stage.permits(StageTransition::ConfigureCredential));
        }
        assert!(!WorkflowStage::Analyzing.permits(StageTransition::ViewReport));
        assert!(WorkflowStage::Analyzing.permits(StageTransition::Reset));
    }
}
