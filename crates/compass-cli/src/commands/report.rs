use anyhow::Result;

use super::applied;
use crate::app::App;
use crate::display;

/// Loads a past report by id and prints it.
pub async fn execute(app: &App, id: &str) -> Result<()> {
    applied(app.coordinator.view_report(id).await)?;
    let report = app.coordinator.session().current_report.unwrap_or_default();
    display::report(&report);
    Ok(())
}
