pub mod export;
pub mod history;
pub mod render;
pub mod report;
pub mod run;
pub mod shell;

use anyhow::{bail, Result};
use compass_application::WorkflowResult;
use compass_core::session::OperationOutcome;

/// Turns a stage operation result into a command result.
fn applied(result: WorkflowResult) -> Result<()> {
    match result {
        Ok(OperationOutcome::Applied) => Ok(()),
        Ok(OperationOutcome::Superseded) => bail!("The operation was superseded by a reset"),
        Err(failure) => Err(failure.into()),
    }
}
