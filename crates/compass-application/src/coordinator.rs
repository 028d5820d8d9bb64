//! Workflow coordinator.
//!
//! Owns the process-wide [`Session`] and exposes the stage operations of the
//! review workflow. Every operation is an atomic transition guarded by the
//! single busy flag:
//!
//! 1. Reject outright if another operation holds the busy flag.
//! 2. Validate input and the stage machine; failures are recorded in the
//!    session without any remote call.
//! 3. Mark busy, call the gateway, then apply the response and release busy
//!    in one snapshot swap.
//! 4. Navigate at most once.
//!
//! Busy is released on every exit path through [`OperationGuard`]'s `Drop`,
//! including a panicking gateway or a dropped future.

use std::sync::{Arc, PoisonError, RwLock};

use compass_core::analysis::{AnalysisRequest, UploadFile};
use compass_core::gateway::{AnalysisGateway, GatewayError};
use compass_core::navigation::Navigator;
use compass_core::session::stage::{MSG_EMPTY_API_KEY, MSG_EMPTY_REPORT_ID, MSG_NO_FILES};
use compass_core::session::{
    OperationFailure, OperationKind, OperationOutcome, Route, ScoringConfig, Session,
    WorkflowEvent,
};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Result of a stage operation.
///
/// `Err` carries the failure that was also stored in the session (or a busy
/// rejection, which leaves the session untouched).
pub type WorkflowResult = Result<OperationOutcome, OperationFailure>;

pub struct WorkflowCoordinator {
    gateway: Arc<dyn AnalysisGateway>,
    navigator: Arc<dyn Navigator>,
    session: RwLock<Session>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowCoordinator {
    /// Creates a coordinator with a fresh session using `scoring` defaults.
    pub fn new(
        gateway: Arc<dyn AnalysisGateway>,
        navigator: Arc<dyn Navigator>,
        scoring: ScoringConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            navigator,
            session: RwLock::new(Session::with_scoring(scoring)),
            events,
        }
    }

    /// Returns the current session snapshot.
    pub fn session(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribes to session changes, navigations and analysis completions.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Replaces the scoring penalties. Allowed at any time, including while
    /// an operation is in flight; the analysis already submitted keeps the
    /// values it was sent with.
    pub fn set_scoring(&self, scoring: ScoringConfig) {
        tracing::debug!(
            "[Coordinator] Scoring set to critical={} minor={}",
            scoring.critical_penalty,
            scoring.minor_penalty
        );
        self.update(|session| session.scoring_updated(scoring));
    }

    // ========================================================================
    // Stage operations
    // ========================================================================

    /// Sends the API key to the service. The credential flag only ever goes
    /// from `false` to `true`.
    pub async fn configure_credential(&self, api_key: &str) -> WorkflowResult {
        let op = OperationKind::ConfigureCredential;
        let key = api_key.trim();

        let guard = self.begin(op, |session| {
            if key.is_empty() {
                return Err(OperationFailure::precondition(op, MSG_EMPTY_API_KEY));
            }
            session.check_transition(op)
        })?;

        tracing::info!("[Coordinator] Configuring credential");
        match self.gateway.configure_credential(key).await {
            Ok(()) => {
                let outcome = guard.complete(Session::credential_accepted);
                tracing::info!("[Coordinator] Credential configured ({:?})", outcome);
                Ok(outcome)
            }
            Err(err) => self.fail(guard, err),
        }
    }

    /// Uploads the knowledge-base documents and, on success, moves on to
    /// candidate submission.
    pub async fn ingest_corpus(&self, files: &[UploadFile]) -> WorkflowResult {
        let op = OperationKind::IngestCorpus;

        let guard = self.begin(op, |session| {
            if files.is_empty() {
                return Err(OperationFailure::precondition(op, MSG_NO_FILES));
            }
            session.check_transition(op)
        })?;

        tracing::info!("[Coordinator] Ingesting {} document(s)", files.len());
        match self.gateway.ingest_corpus(files).await {
            Ok(()) => {
                let outcome = guard.complete(Session::knowledge_base_loaded);
                if outcome == OperationOutcome::Applied {
                    self.navigate(Route::Candidate);
                }
                Ok(outcome)
            }
            Err(err) => self.fail(guard, err),
        }
    }

    /// Submits a candidate dossier with the session's current scoring
    /// penalties.
    pub async fn submit_analysis(&self, request: &AnalysisRequest) -> WorkflowResult {
        let op = OperationKind::SubmitAnalysis;

        let guard = self.begin(op, |session| session.check_transition(op))?;
        let scoring = guard.scoring;

        tracing::info!(
            "[Coordinator] Submitting analysis for '{}' ({} attachment(s))",
            request.candidate_name,
            request.attachments.len()
        );
        match self.gateway.submit_analysis(request, scoring).await {
            Ok(report) => {
                let outcome = guard.complete(|session| session.report_loaded(report));
                if outcome == OperationOutcome::Applied {
                    self.navigate(Route::Result);
                    let _ = self.events.send(WorkflowEvent::AnalysisCompleted);
                }
                Ok(outcome)
            }
            Err(err) => self.fail(guard, err),
        }
    }

    /// Loads a past report by id and shows it.
    pub async fn view_report(&self, id: &str) -> WorkflowResult {
        let op = OperationKind::ViewReport;
        let id = id.trim();

        let guard = self.begin(op, |session| {
            if id.is_empty() {
                return Err(OperationFailure::precondition(op, MSG_EMPTY_REPORT_ID));
            }
            session.check_transition(op)
        })?;

        tracing::info!("[Coordinator] Loading report {}", id);
        match self.gateway.fetch_report(id).await {
            Ok(report) => {
                let outcome =
                    guard.complete(|session| session.report_loaded(report.full_report));
                if outcome == OperationOutcome::Applied {
                    self.navigate(Route::Result);
                }
                Ok(outcome)
            }
            Err(err) => self.fail(guard, err),
        }
    }

    /// Clears the report and error and navigates immediately.
    ///
    /// Never touches the busy flag. Any operation still in flight belongs to
    /// the previous generation and its response will be discarded.
    pub fn reset_and_navigate(&self, route: Route) {
        let session = self.update(Session::navigated_away);
        tracing::debug!(
            "[Coordinator] Reset to {} (generation {})",
            route,
            session.generation
        );
        self.navigate(route);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Swaps in the next session snapshot and publishes it.
    fn update<F>(&self, transition: F) -> Session
    where
        F: FnOnce(Session) -> Session,
    {
        let next = {
            let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
            let next = transition(guard.clone());
            *guard = next.clone();
            next
        };
        let _ = self.events.send(WorkflowEvent::SessionChanged {
            session: next.clone(),
        });
        next
    }

    /// Claims the busy flag for `operation` after `validate` passes.
    ///
    /// The busy check, validation and claim happen under one write lock so
    /// two callers can never both start.
    fn begin<V>(
        &self,
        operation: OperationKind,
        validate: V,
    ) -> Result<OperationGuard<'_>, OperationFailure>
    where
        V: FnOnce(&Session) -> Result<(), OperationFailure>,
    {
        let mut state = self.session.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(busy) = state.busy.as_ref() {
            tracing::warn!(
                "[Coordinator] Rejected {}: {} is in progress",
                operation,
                busy.operation
            );
            return Err(OperationFailure::busy(operation));
        }

        let (next, result) = match validate(&*state) {
            Ok(()) => {
                let next = state.clone().started(operation);
                let guard = OperationGuard::new(self, operation, &next);
                (next, Ok(guard))
            }
            Err(failure) => {
                tracing::info!("[Coordinator] {} precondition failed: {}", operation, failure);
                (state.clone().failed(failure.clone()), Err(failure))
            }
        };
        *state = next.clone();
        drop(state);

        let _ = self.events.send(WorkflowEvent::SessionChanged { session: next });
        result
    }

    /// Records a gateway failure for the operation held by `guard`.
    fn fail(&self, guard: OperationGuard<'_>, err: GatewayError) -> WorkflowResult {
        let failure = err.into_failure(guard.operation);
        tracing::warn!(
            "[Coordinator] {} failed ({}): {}",
            guard.operation,
            failure.category,
            failure.message
        );

        let stored = failure.clone();
        match guard.complete(move |session| session.failed(stored)) {
            OperationOutcome::Applied => Err(failure),
            OperationOutcome::Superseded => Ok(OperationOutcome::Superseded),
        }
    }

    fn navigate(&self, route: Route) {
        tracing::info!("[Coordinator] Navigating to {}", route.path());
        self.navigator.navigate(route);
        let _ = self.events.send(WorkflowEvent::Navigated { route });
    }
}

/// Holds the busy flag for one operation and releases it exactly once.
struct OperationGuard<'a> {
    coordinator: &'a WorkflowCoordinator,
    operation: OperationKind,
    generation: u64,
    scoring: ScoringConfig,
    finished: bool,
}

impl<'a> OperationGuard<'a> {
    fn new(coordinator: &'a WorkflowCoordinator, operation: OperationKind, started: &Session) -> Self {
        Self {
            coordinator,
            operation,
            generation: started.generation,
            scoring: started.scoring,
            finished: false,
        }
    }

    /// Applies the operation's result and releases busy in one swap.
    ///
    /// If the session generation moved on while the call was in flight the
    /// result is dropped and only busy is released.
    fn complete<F>(mut self, apply: F) -> OperationOutcome
    where
        F: FnOnce(Session) -> Session,
    {
        self.finished = true;
        let generation = self.generation;
        let mut outcome = OperationOutcome::Superseded;

        self.coordinator.update(|session| {
            if session.generation == generation {
                outcome = OperationOutcome::Applied;
                apply(session).released()
            } else {
                session.released()
            }
        });

        if outcome == OperationOutcome::Superseded {
            tracing::info!(
                "[Coordinator] Discarded stale {} response (generation {})",
                self.operation,
                generation
            );
        }
        outcome
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                "[Coordinator] {} ended without completing; releasing busy",
                self.operation
            );
            self.coordinator.update(Session::released);
        }
    }
}
