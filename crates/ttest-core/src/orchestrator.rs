//! Analysis orchestrator: the fan-out/fan-in run protocol.
//!
//! # Run phases
//!
//! ```text
//! Idle → Validating → Saving → Dispatching → Collecting → Formatting → Persisting → Idle
//!                                    │             │
//!                                    └─ Cancelled ─┴─→ Idle      (any phase) ─ Error ─→ Idle
//! ```
//!
//! 1. **Validating**: the [`Procedure`] rejects unusable selections.
//! 2. **Saving**: pending dataset edits are flushed through the [`DataSource`].
//! 3. **Dispatching**: one channel is opened and every unit of work is posted
//!    through it. The number of posted requests is the completion target.
//! 4. **Collecting**: each [`ChannelEvent`] is fed to [`handle_event`] with the
//!    [`RunId`] it was received for. Arrival order is irrelevant; completion is
//!    detected by count alone. Events of an earlier run are dropped.
//! 5. **Formatting** and **Persisting**: only when at least one unit
//!    succeeded. Non-empty tables are written under one log and analytic.
//!
//! The close callback fires only after a run without any error.
//!
//! Events can be pushed by an event loop through [`handle_event`], or the
//! blocking driver [`run_to_completion`] can pump them, which also enforces
//! the optional worker timeout.
//!
//! [`handle_event`]: AnalysisOrchestrator::handle_event
//! [`run_to_completion`]: AnalysisOrchestrator::run_to_completion

use std::fmt;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{Span, field};
use ttest_model::{ResponseStatus, UnitResults, WorkerResponse};
use ttest_report::OutputData;

use crate::channel::{ChannelEvent, ChannelFactory, ComputeChannel};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, StoreError};
use crate::procedure::{FormattedOutput, Procedure};
use crate::store::{DataSource, NewAnalytic, NewStatistic, ResultStore};

/// Where the orchestrator is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Saving,
    Dispatching,
    Collecting,
    Formatting,
    Persisting,
    Error,
    Cancelled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Saving => "saving",
            Phase::Dispatching => "dispatching",
            Phase::Collecting => "collecting",
            Phase::Formatting => "formatting",
            Phase::Persisting => "persisting",
            Phase::Error => "error",
            Phase::Cancelled => "cancelled",
        })
    }
}

/// Identity of one dispatched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// What [`AnalysisOrchestrator::run_analysis`] posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub run: RunId,
    /// Number of units posted, the completion target.
    pub units: usize,
}

/// Responses processed so far against the dispatched count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub dispatched: usize,
}

/// What a collected run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub log_id: Option<u64>,
    pub analytic_id: Option<u64>,
    /// Ids of the persisted statistic records, in table order.
    pub statistics: Vec<u64>,
    pub persistence_failed: bool,
    /// Whether the close callback was invoked.
    pub closed: bool,
}

impl RunSummary {
    /// No unit failed and everything was saved.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.persistence_failed
    }
}

/// How the last run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every response was collected.
    Completed(RunSummary),
    /// Aborted by a critical channel error or a timeout.
    Failed(AnalysisError),
    Cancelled,
}

/// State of the run currently collecting responses.
struct ActiveRun {
    id: RunId,
    procedure: Box<dyn Procedure>,
    channel: Box<dyn ComputeChannel>,
    events: Receiver<ChannelEvent>,
    dispatched: usize,
    processed: usize,
    results: Vec<UnitResults>,
    errors: Vec<String>,
    span: Span,
}

impl ActiveRun {
    fn is_complete(&self) -> bool {
        self.processed >= self.dispatched
    }
}

/// Drives analysis runs against injected data, result and compute services.
pub struct AnalysisOrchestrator<D: DataSource, R: ResultStore> {
    data_source: D,
    store: R,
    channels: Box<dyn ChannelFactory>,
    config: AnalysisConfig,
    phase: Phase,
    run: Option<ActiveRun>,
    error_message: Option<String>,
    on_close: Option<Box<dyn FnMut() + Send>>,
    last_outcome: Option<RunOutcome>,
    runs: u64,
}

impl<D: DataSource, R: ResultStore> AnalysisOrchestrator<D, R> {
    pub fn new(data_source: D, store: R, channels: impl ChannelFactory + 'static) -> Self {
        Self {
            data_source,
            store,
            channels: Box::new(channels),
            config: AnalysisConfig::default(),
            phase: Phase::Idle,
            run: None,
            error_message: None,
            on_close: None,
            last_outcome: None,
            runs: 0,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Callback invoked after a run that finished without any error.
    #[must_use]
    pub fn with_on_close(mut self, on_close: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_calculating(&self) -> bool {
        self.run.is_some()
    }

    /// Accumulated user-visible error text, possibly multi-line.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn progress(&self) -> Option<Progress> {
        self.run.as_ref().map(|run| Progress {
            processed: run.processed,
            dispatched: run.dispatched,
        })
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.id)
    }

    /// Inbound events of the active run, for callers running their own loop.
    ///
    /// Events read from the receiver belong to the returned run and must be
    /// handed back with its id.
    pub fn events(&self) -> Option<(RunId, Receiver<ChannelEvent>)> {
        self.run.as_ref().map(|run| (run.id, run.events.clone()))
    }

    pub fn data_source(&self) -> &D {
        &self.data_source
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut R {
        &mut self.store
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::trace!(from = %self.phase, to = %phase, "phase transition");
            self.phase = phase;
        }
    }

    /// Validate, save and dispatch.
    ///
    /// Errors before dispatch leave no run behind. After `Ok`, events must be
    /// fed through [`handle_event`](Self::handle_event) or
    /// [`wait`](Self::wait).
    pub fn run_analysis(
        &mut self,
        procedure: Box<dyn Procedure>,
    ) -> Result<Dispatch, AnalysisError> {
        if self.run.is_some() {
            return Err(AnalysisError::AlreadyRunning);
        }
        self.error_message = None;
        self.last_outcome = None;
        self.runs += 1;
        let id = RunId(self.runs);

        let span = tracing::info_span!(
            "analysis_run",
            run = %id,
            kind = procedure.name(),
            units = field::Empty
        );
        let guard = span.clone().entered();

        self.set_phase(Phase::Validating);
        if let Err(error) = procedure.validate() {
            tracing::info!(%error, "selection rejected");
            return Err(self.fail_before_dispatch(error));
        }

        self.set_phase(Phase::Saving);
        if let Err(error) = self.data_source.check_and_save() {
            tracing::error!(%error, "failed to save pending changes");
            return Err(self.fail_before_dispatch(AnalysisError::SaveFailed {
                message: error.to_string(),
            }));
        }

        self.set_phase(Phase::Dispatching);
        let requests = procedure.build_requests(self.data_source.dataset(), &self.config);
        let mut channel = match self.channels.open() {
            Ok(channel) => channel,
            Err(error) => {
                tracing::error!(%error, "failed to open worker channel");
                return Err(self.fail_before_dispatch(AnalysisError::critical(error.to_string())));
            }
        };
        let events = channel.events();

        let dispatched = requests.len();
        for request in requests {
            let unit = request.unit_label();
            if let Err(error) = channel.send(request) {
                tracing::error!(%unit, %error, "failed to dispatch unit");
                channel.terminate();
                return Err(self.fail_before_dispatch(AnalysisError::critical(error.to_string())));
            }
            tracing::debug!(%unit, "dispatched unit");
        }
        span.record("units", dispatched);
        tracing::info!(units = dispatched, "dispatched analysis");

        self.set_phase(Phase::Collecting);
        self.run = Some(ActiveRun {
            id,
            procedure,
            channel,
            events,
            dispatched,
            processed: 0,
            results: Vec::new(),
            errors: Vec::new(),
            span,
        });
        drop(guard);

        if dispatched == 0 {
            self.finish();
        }
        Ok(Dispatch {
            run: id,
            units: dispatched,
        })
    }

    fn fail_before_dispatch(&mut self, error: AnalysisError) -> AnalysisError {
        self.set_phase(Phase::Error);
        self.error_message = Some(error.user_message());
        self.set_phase(Phase::Idle);
        error
    }

    /// Process one inbound event received for `run`. Returns `true` when the
    /// run ended because of it.
    ///
    /// Events arriving with no active run (after completion or cancellation)
    /// or tagged with an earlier run are ignored.
    pub fn handle_event(&mut self, id: RunId, event: ChannelEvent) -> bool {
        let Some(run) = self.run.as_mut() else {
            tracing::debug!(run = %id, "ignored worker event with no active run");
            return false;
        };
        if run.id != id {
            tracing::debug!(run = %id, current = %run.id, "ignored stale worker event");
            return false;
        }
        let span = run.span.clone();
        let _enter = span.enter();

        match event {
            ChannelEvent::Response(response) => {
                record_response(run, response);
                if run.is_complete() {
                    self.finish();
                    return true;
                }
                false
            }
            ChannelEvent::CriticalError(message) => {
                tracing::error!(%message, "critical worker error");
                self.abort(AnalysisError::critical(message));
                true
            }
        }
    }

    /// Terminate the active run without formatting or persisting.
    fn abort(&mut self, error: AnalysisError) {
        if let Some(mut run) = self.run.take() {
            run.channel.terminate();
        }
        self.set_phase(Phase::Error);
        self.error_message = Some(error.user_message());
        self.last_outcome = Some(RunOutcome::Failed(error));
        self.set_phase(Phase::Idle);
    }

    fn finish(&mut self) {
        let Some(mut run) = self.run.take() else {
            return;
        };

        let mut summary = RunSummary {
            dispatched: run.dispatched,
            succeeded: run.results.len(),
            failed: run.errors.len(),
            ..RunSummary::default()
        };
        let mut messages = run.errors.clone();

        if !run.results.is_empty() {
            self.set_phase(Phase::Formatting);
            let output = run.procedure.format(&run.results, &self.config);

            self.set_phase(Phase::Persisting);
            match self.persist(run.procedure.as_ref(), &output, &mut summary) {
                Ok(()) => tracing::info!(
                    statistics = summary.statistics.len(),
                    "persisted analysis results"
                ),
                Err(error) => {
                    tracing::error!(%error, "failed to persist analysis results");
                    summary.persistence_failed = true;
                    messages.push(
                        AnalysisError::Persistence {
                            message: error.to_string(),
                        }
                        .user_message(),
                    );
                }
            }
        } else {
            tracing::warn!("no unit succeeded; nothing to persist");
        }

        run.channel.terminate();
        self.set_phase(Phase::Idle);

        if messages.is_empty() {
            if self.config.close_on_success
                && let Some(on_close) = self.on_close.as_mut()
            {
                on_close();
                summary.closed = true;
            }
        } else {
            self.error_message = Some(messages.join("\n"));
        }
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "analysis finished"
        );
        self.last_outcome = Some(RunOutcome::Completed(summary));
    }

    /// Log → analytic → statistics, strictly in sequence.
    fn persist(
        &mut self,
        procedure: &dyn Procedure,
        output: &FormattedOutput,
        summary: &mut RunSummary,
    ) -> Result<(), StoreError> {
        let log_id = self.store.add_log(&procedure.command_log(&self.config))?;
        summary.log_id = Some(log_id);

        let analytic_id = self.store.add_analytic(
            log_id,
            NewAnalytic {
                title: procedure.title().to_string(),
                note: output.note.clone(),
            },
        )?;
        summary.analytic_id = Some(analytic_id);

        for table in output.non_empty_tables() {
            let statistic = NewStatistic {
                title: table.title.clone(),
                output_data: OutputData::single(table).to_json()?,
                components: table.title.clone(),
                description: procedure.title().to_string(),
            };
            let id = self.store.add_statistic(analytic_id, statistic)?;
            summary.statistics.push(id);
        }
        Ok(())
    }

    /// Stop the active run. Returns `false` when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let Some(mut run) = self.run.take() else {
            return false;
        };
        run.channel.terminate();
        self.set_phase(Phase::Cancelled);
        tracing::info!(
            processed = run.processed,
            dispatched = run.dispatched,
            "analysis cancelled"
        );
        self.last_outcome = Some(RunOutcome::Cancelled);
        self.set_phase(Phase::Idle);
        true
    }

    /// Pump events of the active run until it ends.
    ///
    /// Enforces the configured worker timeout over the whole collection
    /// phase. Returns `None` when no run was active.
    pub fn wait(&mut self, mut progress: impl FnMut(Progress)) -> Option<RunOutcome> {
        let (run, events) = self.events()?;
        let deadline = self
            .config
            .worker_timeout()
            .map(|timeout| Instant::now() + timeout);

        while self.run.is_some() {
            let received = match deadline {
                Some(deadline) => events.recv_deadline(deadline),
                None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(event) => {
                    self.handle_event(run, event);
                    if let Some(current) = self.progress() {
                        progress(current);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let seconds = self.config.worker_timeout_secs.unwrap_or_default();
                    tracing::error!(seconds, "analysis timed out");
                    self.abort(AnalysisError::Timeout { seconds });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.abort(AnalysisError::critical("worker channel closed"));
                }
            }
        }
        self.last_outcome.clone()
    }

    /// Dispatch and block until the run ends.
    pub fn run_to_completion(
        &mut self,
        procedure: Box<dyn Procedure>,
    ) -> Result<RunOutcome, AnalysisError> {
        self.run_to_completion_with(procedure, |_| {})
    }

    /// [`run_to_completion`](Self::run_to_completion) with a progress callback
    /// invoked after every processed event.
    pub fn run_to_completion_with(
        &mut self,
        procedure: Box<dyn Procedure>,
        progress: impl FnMut(Progress),
    ) -> Result<RunOutcome, AnalysisError> {
        self.run_analysis(procedure)?;
        match self.wait(progress) {
            Some(outcome) => Ok(outcome),
            None => self
                .last_outcome
                .clone()
                .ok_or_else(|| AnalysisError::critical("analysis ended without an outcome")),
        }
    }
}

fn record_response(run: &mut ActiveRun, response: WorkerResponse) {
    run.processed += 1;
    let unit = response.unit_label();
    match (response.status, response.results) {
        (ResponseStatus::Success, Some(results)) => {
            let metadata = results.metadata();
            if metadata.has_insufficient_data {
                tracing::info!(
                    %unit,
                    reasons = ?metadata.insufficient_type,
                    "insufficient data"
                );
            }
            run.results.push(results);
        }
        (ResponseStatus::Success, None) => {
            run.errors.push(
                AnalysisError::UnitFailed {
                    unit,
                    message: "worker returned no results".to_string(),
                }
                .user_message(),
            );
        }
        (ResponseStatus::Error, _) => {
            let message = response
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!(%unit, %message, "unit failed");
            run.errors
                .push(AnalysisError::UnitFailed { unit, message }.user_message());
        }
    }
}

impl<D: DataSource, R: ResultStore> Drop for AnalysisOrchestrator<D, R> {
    fn drop(&mut self) {
        self.cancel();
    }
}
