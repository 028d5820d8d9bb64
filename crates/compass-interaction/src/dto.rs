//! Wire shapes of the remote analysis service.

use compass_core::analysis::AnalysisReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct ConfigureRequest<'a> {
    pub google_api_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeResponse {
    pub report: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    pub full_report: String,
}

impl ReportResponse {
    /// `requested_id` fills in for servers that omit the id.
    pub fn into_report(self, requested_id: &str) -> AnalysisReport {
        let id = match self.id {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => requested_id.to_string(),
            Some(other) => other.to_string(),
        };
        AnalysisReport {
            id,
            candidate_name: self.candidate_name.unwrap_or_else(|| "Unknown".to_string()),
            score: self.score.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            full_report: self.full_report,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Extracts the human-readable `detail` of an error body.
///
/// Only string details are surfaced; structured validation details are
/// left to the generic message.
pub(crate) fn parse_error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_detail() {
        assert_eq!(
            parse_error_detail(r#"{"detail": "quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(parse_error_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(parse_error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(
            parse_error_detail(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#),
            None
        );
    }

    #[test]
    fn test_report_response_fills_missing_fields() {
        let response: ReportResponse =
            serde_json::from_str(r##"{"full_report": "# Report"}"##).unwrap();
        let report = response.into_report("abc123");
        assert_eq!(report.id, "abc123");
        assert_eq!(report.candidate_name, "Unknown");
        assert_eq!(report.full_report, "# Report");
    }

    #[test]
    fn test_configure_request_shape() {
        let body = serde_json::to_value(ConfigureRequest {
            google_api_key: "key-1",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"google_api_key": "key-1"}));
    }
}
