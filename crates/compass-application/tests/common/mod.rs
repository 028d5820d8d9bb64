#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use compass_application::WorkflowCoordinator;
use compass_core::analysis::{AnalysisReport, AnalysisRequest, UploadFile};
use compass_core::gateway::{AnalysisGateway, GatewayResult};
use compass_core::history::HistoryRecord;
use compass_core::navigation::Navigator;
use compass_core::session::{Route, ScoringConfig};
use tokio::sync::Notify;

/// Holds a gateway call open until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Scripted gateway. Each `*_result` slot is consumed by the next call;
/// an empty slot answers with success.
#[derive(Default)]
pub struct MockGateway {
    pub calls: Mutex<Vec<String>>,
    pub configure_result: Mutex<Option<GatewayResult<()>>>,
    pub ingest_result: Mutex<Option<GatewayResult<()>>>,
    pub submit_result: Mutex<Option<GatewayResult<String>>>,
    pub report_result: Mutex<Option<GatewayResult<AnalysisReport>>>,
    pub history: Mutex<Vec<HistoryRecord>>,
    pub submitted_scoring: Mutex<Vec<ScoringConfig>>,
    pub submit_gate: Option<Arc<Gate>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit_gate(gate: Arc<Gate>) -> Self {
        Self {
            submit_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AnalysisGateway for MockGateway {
    async fn configure_credential(&self, api_key: &str) -> GatewayResult<()> {
        self.record(format!("configure:{}", api_key));
        self.configure_result.lock().unwrap().take().unwrap_or(Ok(()))
    }

    async fn ingest_corpus(&self, files: &[UploadFile]) -> GatewayResult<()> {
        self.record(format!("ingest:{}", files.len()));
        self.ingest_result.lock().unwrap().take().unwrap_or(Ok(()))
    }

    async fn submit_analysis(
        &self,
        request: &AnalysisRequest,
        scoring: ScoringConfig,
    ) -> GatewayResult<String> {
        self.record(format!("submit:{}", request.candidate_name));
        self.submitted_scoring.lock().unwrap().push(scoring);
        if let Some(gate) = &self.submit_gate {
            gate.pass().await;
        }
        self.submit_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(format!("# Report for {}", request.candidate_name)))
    }

    async fn fetch_report(&self, id: &str) -> GatewayResult<AnalysisReport> {
        self.record(format!("report:{}", id));
        self.report_result.lock().unwrap().take().unwrap_or_else(|| {
            Ok(AnalysisReport {
                id: id.to_string(),
                candidate_name: "Stored".to_string(),
                score: 64,
                date: "2025-02-01T09:00:00".to_string(),
                full_report: format!("# Stored report {}", id),
            })
        })
    }

    async fn list_history(&self) -> GatewayResult<Vec<HistoryRecord>> {
        self.record("history");
        Ok(self.history.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub navigator: Arc<RecordingNavigator>,
    pub coordinator: Arc<WorkflowCoordinator>,
}

impl Harness {
    pub fn new(gateway: MockGateway) -> Self {
        let gateway = Arc::new(gateway);
        let navigator = Arc::new(RecordingNavigator::default());
        let coordinator = Arc::new(WorkflowCoordinator::new(
            gateway.clone(),
            navigator.clone(),
            ScoringConfig::default(),
        ));
        Self {
            gateway,
            navigator,
            coordinator,
        }
    }

    /// Configures the credential and loads a one-document knowledge base.
    pub async fn ready(gateway: MockGateway) -> Self {
        let harness = Self::new(gateway);
        harness
            .coordinator
            .configure_credential("key-123")
            .await
            .unwrap();
        harness
            .coordinator
            .ingest_corpus(&[UploadFile::text("values.txt", "Integrity first.")])
            .await
            .unwrap();
        harness.navigator.routes.lock().unwrap().clear();
        harness
    }
}

pub fn request(name: &str) -> AnalysisRequest {
    AnalysisRequest::new(name).with_statements("I value candour.")
}
