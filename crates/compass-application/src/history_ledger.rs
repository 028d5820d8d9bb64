//! Read-only projection of past analyses.
//!
//! The ledger keeps no history of its own: every `refresh` replaces the list
//! with whatever the server returned. Concurrent refreshes are allowed and
//! the last one to resolve wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use compass_core::config::HistoryDisplayConfig;
use compass_core::gateway::{AnalysisGateway, GatewayResult};
use compass_core::history::{HistoryEntry, HistoryRecord};
use compass_core::session::WorkflowEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

pub struct HistoryLedger {
    gateway: Arc<dyn AnalysisGateway>,
    display: HistoryDisplayConfig,
    entries: RwLock<Vec<HistoryEntry>>,
    in_flight: AtomicUsize,
}

impl HistoryLedger {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, display: HistoryDisplayConfig) -> Self {
        Self {
            gateway,
            display,
            entries: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Fetches the full history and replaces the held list.
    ///
    /// On failure the previous list is kept and the error is returned to the
    /// caller; the workflow session is never touched.
    pub async fn refresh(&self) -> GatewayResult<Vec<HistoryEntry>> {
        let _loading = LoadingGuard::enter(&self.in_flight);

        let records = match self.gateway.list_history().await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("[HistoryLedger] Failed to fetch history: {}", err);
                return Err(err);
            }
        };

        let entries: Vec<HistoryEntry> = records
            .iter()
            .map(|record| normalize_record(record, &self.display))
            .collect();

        tracing::debug!("[HistoryLedger] Loaded {} entries", entries.len());
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries.clone();
        Ok(entries)
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while at least one refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Refreshes once per completed analysis until the event stream closes.
    pub fn watch_completions(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<WorkflowEvent>,
    ) -> JoinHandle<()> {
        let ledger = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(WorkflowEvent::AnalysisCompleted) => {
                        let _ = ledger.refresh().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        // A completion may be among the skipped events.
                        tracing::warn!("[HistoryLedger] Missed {} workflow events", skipped);
                        let _ = ledger.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn normalize_record(record: &HistoryRecord, display: &HistoryDisplayConfig) -> HistoryEntry {
    HistoryEntry {
        id: record.id_string(),
        candidate_name: record.candidate_name.clone(),
        date: format_date(&record.date, display),
        score: record.score,
    }
}

/// Formats a server timestamp for display. Naive timestamps are UTC.
/// Unparseable input is returned unchanged.
pub fn format_date(raw: &str, display: &HistoryDisplayConfig) -> String {
    let Some(instant) = parse_timestamp(raw.trim()) else {
        tracing::warn!("[HistoryLedger] Unrecognized date '{}'", raw);
        return raw.to_string();
    };

    if display.utc {
        instant.format(&display.date_format).to_string()
    } else {
        instant
            .with_timezone(&Local)
            .format(&display.date_format)
            .to_string()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_display() -> HistoryDisplayConfig {
        HistoryDisplayConfig {
            utc: true,
            ..HistoryDisplayConfig::default()
        }
    }

    #[test]
    fn test_format_naive_iso_timestamp() {
        assert_eq!(
            format_date("2025-03-07T14:22:05.123456", &utc_display()),
            "3/7/2025"
        );
    }

    #[test]
    fn test_format_rfc3339_converts_to_utc() {
        assert_eq!(
            format_date("2025-03-07T23:30:00-05:00", &utc_display()),
            "3/8/2025"
        );
    }

    #[test]
    fn test_format_plain_date_with_custom_pattern() {
        let display = HistoryDisplayConfig {
            date_format: "%Y-%m-%d".to_string(),
            utc: true,
        };
        assert_eq!(format_date("2024-12-31", &display), "2024-12-31");
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        assert_eq!(format_date("yesterday", &utc_display()), "yesterday");
    }

    #[test]
    fn test_normalize_record_trims_id() {
        let record = HistoryRecord {
            id: serde_json::Value::String(" 65f0c2\t".to_string()),
            candidate_name: "Ada".to_string(),
            date: "2025-01-02T00:00:00".to_string(),
            score: 81,
        };
        let entry = normalize_record(&record, &utc_display());
        assert_eq!(entry.id, "65f0c2");
        assert_eq!(entry.date, "1/2/2025");
        assert_eq!(entry.score, 81);
    }
}
