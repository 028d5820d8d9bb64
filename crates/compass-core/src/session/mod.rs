//! Workflow session: state snapshot, stage machine, failures and events.

pub mod event;
pub mod failure;
pub mod model;
pub mod route;
pub mod stage;

pub use event::WorkflowEvent;
pub use failure::{FailureCategory, OperationFailure, OperationKind, OperationOutcome};
pub use model::{BusyState, ScoringConfig, Session};
pub use route::Route;
pub use stage::{StageTransition, WorkflowStage};
