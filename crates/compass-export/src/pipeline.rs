use std::path::{Path, PathBuf};

use compass_core::config::{ExportConfig, EXPORT_FILE_NAME};

use crate::error::Result;
use crate::pagination::PageLayout;
use crate::pdf::PdfAssembler;
use crate::surface::RenderSurface;

/// Captures `surface` and writes it as a multi-page A4 PDF.
///
/// Returns the written path, or `None` when the surface had nothing to
/// capture (no file is written in that case).
pub fn export_report(surface: &dyn RenderSurface, config: &ExportConfig) -> Result<Option<PathBuf>> {
    let Some(capture) = surface.capture(config.scale)? else {
        tracing::info!("[Export] No rendered report to export");
        return Ok(None);
    };

    let layout = PageLayout::plan(capture.width(), capture.height())?;
    let mut doc = PdfAssembler::new().assemble(&capture, &layout)?;

    let path = output_path(config);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    PdfAssembler::new().save(&mut doc, &path)?;

    tracing::info!(
        "[Export] Saved {} page(s) to {}",
        layout.page_count(),
        path.display()
    );
    Ok(Some(path))
}

pub fn output_path(config: &ExportConfig) -> PathBuf {
    match config.output_dir.as_deref() {
        Some(dir) if !dir.trim().is_empty() => Path::new(dir).join(EXPORT_FILE_NAME),
        _ => PathBuf::from(EXPORT_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report_view::ReportView;
    use crate::surface::{AbsentSurface, ReportSurface};

    #[test]
    fn test_absent_surface_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..ExportConfig::default()
        };

        let written = export_report(&AbsentSurface, &config).unwrap();

        assert!(written.is_none());
        assert!(!dir.path().join("alignment-report.pdf").exists());
    }

    #[test]
    fn test_exports_long_report_across_pages() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: Some(dir.path().join("exports").to_string_lossy().into_owned()),
            ..ExportConfig::default()
        };
        // 150 single-line paragraphs: 2742 px tall at scale 1 on a 752 px
        // wide page, so about 2.6 A4 pages.
        let markdown = (1..=150)
            .map(|i| format!("Finding {i}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let surface = ReportSurface::new(&ReportView::new(markdown));

        let path = export_report(&surface, &config).unwrap().unwrap();

        assert_eq!(path, dir.path().join("exports").join("alignment-report.pdf"));
        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_short_report_is_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: Some(dir.path().to_string_lossy().into_owned()),
            scale: 1.0,
        };
        let surface = ReportSurface::new(&ReportView::new("# Alignment\n\nStrong match."));

        let path = export_report(&surface, &config).unwrap().unwrap();

        let doc = lopdf::Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_invalid_scale_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            output_dir: Some(dir.path().to_string_lossy().into_owned()),
            scale: 1e9,
        };
        let surface = ReportSurface::new(&ReportView::new("# Alignment"));

        let err = export_report(&surface, &config).unwrap_err();

        assert!(matches!(err, crate::error::ExportError::InvalidScale(_)));
        assert!(!dir.path().join("alignment-report.pdf").exists());
    }

    #[test]
    fn test_output_path_without_dir() {
        assert_eq!(
            output_path(&ExportConfig::default()),
            PathBuf::from("alignment-report.pdf")
        );
    }
}
