//! Report presentation and PDF export.
//!
//! The export pipeline captures a rendered report surface, lays the capture
//! out across A4 portrait pages and writes a single PDF.

pub mod error;
pub mod pagination;
pub mod pdf;
pub mod pipeline;
pub mod report_view;
pub mod surface;
mod text_layout;

pub use error::{ExportError, Result};
pub use pagination::{PageLayout, PagePlacement};
pub use pdf::PdfAssembler;
pub use pipeline::export_report;
pub use report_view::ReportView;
pub use surface::{AbsentSurface, RenderSurface, ReportSurface};
