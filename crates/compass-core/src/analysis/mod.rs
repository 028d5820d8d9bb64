//! Analysis submission payloads.

pub mod request;

pub use request::{AnalysisReport, AnalysisRequest, UploadFile};
