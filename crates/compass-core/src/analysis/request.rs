use serde::{Deserialize, Serialize};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file selected for upload, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            bytes,
        }
    }

    pub fn text(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            file_name,
            Some("text/plain".to_string()),
            content.into().into_bytes(),
        )
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A candidate dossier submitted for analysis. Built per submission and
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub candidate_name: String,
    /// Free-text statements (cover letter, interview answers, ...).
    pub written_submissions: String,
    pub attachments: Vec<UploadFile>,
}

impl AnalysisRequest {
    pub fn new(candidate_name: impl Into<String>) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            ..Self::default()
        }
    }

    pub fn with_statements(mut self, statements: impl Into<String>) -> Self {
        self.written_submissions = statements.into();
        self
    }

    pub fn with_attachment(mut self, file: UploadFile) -> Self {
        self.attachments.push(file);
        self
    }

    pub fn with_attachments(mut self, files: impl IntoIterator<Item = UploadFile>) -> Self {
        self.attachments.extend(files);
        self
    }
}

/// A stored report as returned by the report lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub candidate_name: String,
    pub score: i64,
    pub date: String,
    /// Markdown body.
    pub full_report: String,
}
