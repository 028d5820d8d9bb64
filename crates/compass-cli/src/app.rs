//! Composition root wiring configuration, gateway, coordinator and ledger.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use compass_application::{HistoryLedger, WorkflowCoordinator};
use compass_core::config::CompassConfig;
use compass_core::gateway::AnalysisGateway;
use compass_infrastructure::ConfigService;
use compass_interaction::HttpAnalysisGateway;

use crate::navigator::TerminalNavigator;

pub struct App {
    pub config: CompassConfig,
    pub navigator: Arc<TerminalNavigator>,
    pub coordinator: Arc<WorkflowCoordinator>,
    pub ledger: Arc<HistoryLedger>,
}

impl App {
    pub fn bootstrap(config_service: &ConfigService, base_url: Option<String>) -> Result<Self> {
        let mut config = config_service.get_config();
        if let Some(url) = base_url {
            config.api_base_url = url;
        }

        let http = match config.request_timeout_secs {
            Some(secs) => HttpAnalysisGateway::with_timeout(
                config.api_base_url.clone(),
                Duration::from_secs(secs),
            )
            .context("Failed to build HTTP client")?,
            None => HttpAnalysisGateway::new(config.api_base_url.clone()),
        };
        tracing::info!("[App] Using analysis service at {}", http.base_url());
        let gateway: Arc<dyn AnalysisGateway> = Arc::new(http);

        let navigator = Arc::new(TerminalNavigator::default());
        let coordinator = Arc::new(WorkflowCoordinator::new(
            gateway.clone(),
            navigator.clone(),
            config.scoring,
        ));
        let ledger = Arc::new(HistoryLedger::new(gateway, config.history.clone()));

        Ok(Self {
            config,
            navigator,
            coordinator,
            ledger,
        })
    }
}
