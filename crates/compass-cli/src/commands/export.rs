use std::path::PathBuf;

use anyhow::Result;
use compass_core::config::ExportConfig;
use compass_export::{export_report, AbsentSurface, ReportSurface, ReportView};

use super::applied;
use crate::app::App;
use crate::display;

/// Loads a past report by id and exports it as a paged PDF.
pub async fn execute(app: &App, id: &str, out_dir: Option<PathBuf>) -> Result<()> {
    applied(app.coordinator.view_report(id).await)?;
    let report = app.coordinator.session().current_report;
    write_pdf(&app.config.export, report.as_deref(), out_dir)?;
    Ok(())
}

/// Captures `report` at the configured scale and writes it as a paged PDF.
///
/// Without a report there is nothing on screen to capture and no file is
/// written.
pub fn write_pdf(
    config: &ExportConfig,
    report: Option<&str>,
    out_dir: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let mut config = config.clone();
    if let Some(dir) = out_dir {
        config.output_dir = Some(dir.to_string_lossy().into_owned());
    }

    let written = match report {
        Some(markdown) => {
            let surface = ReportSurface::new(&ReportView::new(markdown));
            export_report(&surface, &config)?
        }
        None => export_report(&AbsentSurface, &config)?,
    };

    match &written {
        Some(path) => display::success(&format!("Exported {}", path.display())),
        None => display::info("No report loaded; nothing to export."),
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pdf_captures_loaded_report() {
        let dir = tempfile::tempdir().unwrap();

        let written = write_pdf(
            &ExportConfig::default(),
            Some("# Alignment\n\nStrong match."),
            Some(dir.path().to_path_buf()),
        )
        .unwrap();

        let path = written.unwrap();
        assert_eq!(path, dir.path().join("alignment-report.pdf"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_pdf_without_report_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let written =
            write_pdf(&ExportConfig::default(), None, Some(dir.path().to_path_buf())).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join("alignment-report.pdf").exists());
    }
}
