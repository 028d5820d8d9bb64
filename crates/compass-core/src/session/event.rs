use serde::{Deserialize, Serialize};

use super::model::Session;
use super::route::Route;

/// Notifications published by the workflow coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A new session snapshot replaced the previous one.
    SessionChanged { session: Session },
    /// The coordinator asked the front end to move to `route`.
    Navigated { route: Route },
    /// An analysis finished and its report is stored in the session.
    AnalysisCompleted,
}
