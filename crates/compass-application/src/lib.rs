//! Workflow orchestration for the Compass client.

pub mod coordinator;
pub mod history_ledger;

pub use coordinator::{WorkflowCoordinator, WorkflowResult};
pub use history_ledger::HistoryLedger;
