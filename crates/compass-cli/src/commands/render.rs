use std::path::Path;

use anyhow::Result;
use compass_export::ReportView;

use super::applied;
use crate::app::App;
use crate::display;

/// Loads a past report and writes it as a standalone HTML page.
pub async fn execute(app: &App, id: &str, out: &Path) -> Result<()> {
    applied(app.coordinator.view_report(id).await)?;
    let report = app.coordinator.session().current_report.unwrap_or_default();
    ReportView::new(report).save_html(out)?;
    display::success(&format!("Report written to {}", out.display()));
    Ok(())
}
