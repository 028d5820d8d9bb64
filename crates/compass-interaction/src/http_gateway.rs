//! HttpAnalysisGateway - REST implementation of the analysis gateway.
//!
//! Encodes the five remote operations as JSON or multipart requests against a
//! single base origin and maps failures onto `GatewayError`.

use async_trait::async_trait;
use compass_core::analysis::{AnalysisReport, AnalysisRequest, UploadFile};
use compass_core::gateway::{AnalysisGateway, GatewayError, GatewayResult};
use compass_core::history::HistoryRecord;
use compass_core::session::ScoringConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::dto::{AnalyzeResponse, ConfigureRequest, ReportResponse, parse_error_detail};

/// Multipart field carrying knowledge-base documents.
pub const FIELD_CORPUS_FILES: &str = "files";
/// Multipart field carrying candidate attachments.
pub const FIELD_CANDIDATE_FILES: &str = "candidate_files";

/// Gateway implementation that talks to the analysis service over HTTP.
#[derive(Clone)]
pub struct HttpAnalysisGateway {
    client: Client,
    base_url: String,
}

impl HttpAnalysisGateway {
    /// Creates a gateway without a request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Creates a gateway whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::unreachable(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let invalid = |reason: String| {
            GatewayError::unreachable(format!("Invalid base URL '{}': {reason}", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request and turns non-success statuses into
    /// `GatewayError::Server`.
    async fn send(&self, request: RequestBuilder, operation: &str) -> GatewayResult<Response> {
        let response = request.send().await.map_err(|err| {
            tracing::warn!("[Gateway] {} request failed to send: {}", operation, err);
            GatewayError::unreachable(format!("{operation} request failed: {err}"))
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("[Gateway] {} -> {}", operation, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = parse_error_detail(&body);
        tracing::warn!(
            "[Gateway] {} -> {} (detail: {:?})",
            operation,
            status,
            detail
        );
        Err(GatewayError::server(status.as_u16(), detail))
    }

    async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> GatewayResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::decode(format!("Failed to parse {operation} response: {err}")))
    }
}

#[async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn configure_credential(&self, api_key: &str) -> GatewayResult<()> {
        let request = self
            .client
            .post(self.endpoint(&["configure"])?)
            .json(&ConfigureRequest {
                google_api_key: api_key,
            });
        self.send(request, "configure").await?;
        Ok(())
    }

    async fn ingest_corpus(&self, files: &[UploadFile]) -> GatewayResult<()> {
        let form = build_corpus_form(files)?;
        let request = self.client.post(self.endpoint(&["upload"])?).multipart(form);
        self.send(request, "upload").await?;
        Ok(())
    }

    async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
        scoring: ScoringConfig,
    ) -> GatewayResult<String> {
        let form = build_analysis_form(request, scoring)?;
        let http_request = self.client.post(self.endpoint(&["analyze"])?).multipart(form);
        let response = self.send(http_request, "analyze").await?;
        let parsed: AnalyzeResponse = Self::decode(response, "analyze").await?;
        Ok(parsed.report)
    }

    async fn fetch_report(&self, id: &str) -> GatewayResult<AnalysisReport> {
        let request = self.client.get(self.endpoint(&["report", id])?);
        let response = self.send(request, "report").await?;
        let parsed: ReportResponse = Self::decode(response, "report").await?;
        Ok(parsed.into_report(id))
    }

    async fn list_history(&self) -> GatewayResult<Vec<HistoryRecord>> {
        let request = self.client.get(self.endpoint(&["history"])?);
        let response = self.send(request, "history").await?;
        Self::decode(response, "history").await
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn file_part(file: &UploadFile) -> GatewayResult<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)
        .map_err(|err| {
            GatewayError::unreachable(format!(
                "Invalid MIME type '{}' for {}: {err}",
                file.mime_type, file.file_name
            ))
        })
}

/// Multipart body of `POST /upload`: every file under `files`.
pub(crate) fn build_corpus_form(files: &[UploadFile]) -> GatewayResult<Form> {
    files.iter().try_fold(Form::new(), |form, file| {
        Ok(form.part(FIELD_CORPUS_FILES, file_part(file)?))
    })
}

/// Multipart body of `POST /analyze`: scalar fields then candidate files.
pub(crate) fn build_analysis_form(
    request: &AnalysisRequest,
    scoring: ScoringConfig,
) -> GatewayResult<Form> {
    let form = Form::new()
        .text("candidate_name", request.candidate_name.clone())
        .text(
            "candidate_written_submissions",
            request.written_submissions.clone(),
        )
        .text("critical_penalty", scoring.critical_penalty.to_string())
        .text("minor_penalty", scoring.minor_penalty.to_string());

    request.attachments.iter().try_fold(form, |form, file| {
        Ok(form.part(FIELD_CANDIDATE_FILES, file_part(file)?))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(gateway: &HttpAnalysisGateway, segments: &[&str]) -> String {
        gateway.endpoint(segments).unwrap().to_string()
    }

    #[test]
    fn test_endpoint_joining_strips_slashes() {
        let gateway = HttpAnalysisGateway::new(" http://127.0.0.1:8000/ ");
        assert_eq!(gateway.base_url(), "http://127.0.0.1:8000");
        assert_eq!(endpoint(&gateway, &["history"]), "http://127.0.0.1:8000/history");
        assert_eq!(endpoint(&gateway, &["report", "42"]), "http://127.0.0.1:8000/report/42");
    }

    #[test]
    fn test_endpoint_encodes_report_id_as_one_segment() {
        let gateway = HttpAnalysisGateway::new("http://127.0.0.1:8000");
        assert_eq!(
            endpoint(&gateway, &["report", "abc#def"]),
            "http://127.0.0.1:8000/report/abc%23def"
        );
        assert_eq!(
            endpoint(&gateway, &["report", "a/b?c"]),
            "http://127.0.0.1:8000/report/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let gateway = HttpAnalysisGateway::new("http://gateway.local/compass/");
        assert_eq!(endpoint(&gateway, &["history"]), "http://gateway.local/compass/history");
    }

    #[test]
    fn test_invalid_base_url_fails_before_sending() {
        let gateway = HttpAnalysisGateway::new("not a url");
        let err = gateway.endpoint(&["history"]).unwrap_err();
        assert!(!err.reached_server());
    }

    #[test]
    fn test_invalid_mime_type_is_rejected_before_sending() {
        let file = UploadFile::new("cv.pdf", Some("not a mime".to_string()), vec![1]);
        let err = build_corpus_form(&[file]).unwrap_err();
        assert!(!err.reached_server());
    }

    #[test]
    fn test_analysis_form_has_boundary() {
        let request = AnalysisRequest::new("Dr. Evelyn Reed")
            .with_attachment(UploadFile::text("cv.txt", "Ten years of research"));
        let form = build_analysis_form(&request, ScoringConfig::default()).unwrap();
        assert!(!form.boundary().is_empty());
    }
}
