use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{Instant, sleep},
};
use tracing::{debug, info, warn};

use super::{
    Convergence, DynError, Scenario, WorkflowContext, WorkflowError, WorkflowOutcome,
    WorkflowState,
};
use crate::{constants, nodes::NodeClient};

/// Requests cancellation of a running workflow.
///
/// Observed between steps and between poll iterations; an in-flight call is
/// never interrupted.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Drives a [`Scenario`] across a set of node clients.
pub struct WorkflowExecutor<'a> {
    clients: &'a [NodeClient],
    total: Duration,
    acceptance_ratio: f64,
    poll_interval: Duration,
    cancel: Arc<watch::Sender<bool>>,
}

impl<'a> WorkflowExecutor<'a> {
    /// Bind `clients` for a run allotted `total_execution_time`. Verification
    /// gets the acceptance fraction of that budget, counted from `Init`.
    #[must_use]
    pub fn new(clients: &'a [NodeClient], total_execution_time: Duration) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            clients,
            total: total_execution_time,
            acceptance_ratio: constants::acceptance_timeout_ratio(),
            poll_interval: constants::poll_interval(),
            cancel: Arc::new(tx),
        }
    }

    #[must_use]
    pub fn with_acceptance_ratio(mut self, ratio: f64) -> Self {
        self.acceptance_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel),
        }
    }

    #[must_use]
    pub const fn clients(&self) -> &'a [NodeClient] {
        self.clients
    }

    /// Time verification may take, or why the configuration cannot run.
    pub fn acceptance_window(&self) -> Result<Duration, String> {
        let ratio = self.acceptance_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(format!("acceptance ratio {ratio} is outside (0, 1]"));
        }
        if self.total.is_zero() {
            return Err("total execution time is zero".to_owned());
        }
        Ok(self.total.mul_f64(ratio))
    }

    /// Runs every step in order, then waits for every condition. Never
    /// panics on scenario failure; the outcome carries the error.
    pub async fn run<S>(&self, scenario: &Scenario<S>) -> WorkflowOutcome<S>
    where
        S: Default + Send + Sync,
    {
        let name = scenario.name();
        let started = Instant::now();
        let mut history = vec![WorkflowState::Init];
        let mut data = S::default();

        let window = match self.check_runnable(scenario) {
            Ok(window) => window,
            Err(reason) => {
                warn!(scenario = name, %reason, "workflow cannot start");
                let error = WorkflowError::InvalidScenario {
                    scenario: name.to_owned(),
                    reason,
                };
                return finish(history, 0, data, Some(error));
            }
        };

        info!(
            scenario = name,
            nodes = self.clients.len(),
            steps = scenario.steps().len(),
            acceptance_window = ?window,
            "workflow started"
        );

        let mut ctx = WorkflowContext::new(self.clients, started + window);
        let mut completed = 0;

        for (offset, step) in scenario.steps().iter().enumerate() {
            let index = offset + 1;
            let state = WorkflowState::Step(index);
            if self.is_cancelled() {
                return finish(history, completed, data, Some(cancelled(name, state)));
            }

            history.push(state);
            ctx.advance(index);
            info!(scenario = name, step = step.name(), index, "running step");

            if let Err(source) = step.run(&ctx, &mut data).await {
                warn!(scenario = name, step = step.name(), index, error = %source, "step failed");
                let error = WorkflowError::StepFailed {
                    index,
                    step: step.name().to_owned(),
                    source,
                };
                return finish(history, completed, data, Some(error));
            }
            completed = index;
        }

        history.push(WorkflowState::Verifying);
        for condition in scenario.conditions() {
            if let Err(error) = self
                .converge(&ctx, condition.as_ref(), &data, started)
                .await
            {
                return finish(history, completed, data, Some(error));
            }
        }

        info!(scenario = name, elapsed = ?started.elapsed(), "workflow done");
        finish(history, completed, data, None)
    }

    fn check_runnable<S>(&self, scenario: &Scenario<S>) -> Result<Duration, String>
    where
        S: Send + Sync,
    {
        if self.clients.len() < scenario.min_clients() {
            return Err(format!(
                "needs {} node clients, {} bound",
                scenario.min_clients(),
                self.clients.len()
            ));
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval is zero".to_owned());
        }
        self.acceptance_window()
    }

    /// Polls `condition` until it holds or the shared deadline passes.
    /// Query errors are not terminal; the last one is kept for the report.
    async fn converge<S>(
        &self,
        ctx: &WorkflowContext<'_>,
        condition: &dyn Convergence<S>,
        data: &S,
        started: Instant,
    ) -> Result<(), WorkflowError>
    where
        S: Send + Sync,
    {
        let name = condition.name();
        let interval = condition.poll_interval().unwrap_or(self.poll_interval);
        let mut cancel = self.cancel.subscribe();
        let mut last_error: Option<DynError> = None;
        let mut attempts = 0_u32;

        loop {
            let is_cancelled = *cancel.borrow_and_update();
            if is_cancelled {
                return Err(cancelled(name, WorkflowState::Verifying));
            }

            attempts += 1;
            match condition.check(ctx, data).await {
                Ok(true) => {
                    info!(condition = name, attempts, elapsed = ?started.elapsed(), "condition observed");
                    return Ok(());
                }
                Ok(false) => debug!(condition = name, attempts, "condition not yet observed"),
                Err(err) => {
                    warn!(condition = name, attempts, error = %err, "convergence query failed");
                    last_error = Some(err);
                }
            }

            let remaining = ctx.remaining();
            if remaining.is_zero() {
                warn!(condition = name, attempts, "condition not observed before deadline");
                return Err(WorkflowError::ConvergenceTimeout {
                    condition: name.to_owned(),
                    waited: started.elapsed(),
                    last_error,
                });
            }

            tokio::select! {
                () = sleep(interval.min(remaining)) => {}
                Ok(()) = cancel.changed() => {}
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

fn cancelled(scenario: &str, phase: WorkflowState) -> WorkflowError {
    warn!(scenario, %phase, "workflow cancelled");
    WorkflowError::Cancelled { phase }
}

fn finish<S>(
    mut history: Vec<WorkflowState>,
    completed_steps: usize,
    data: S,
    error: Option<WorkflowError>,
) -> WorkflowOutcome<S> {
    let state = if error.is_some() {
        WorkflowState::Failed
    } else {
        WorkflowState::Done
    };
    history.push(state);

    WorkflowOutcome {
        state,
        completed_steps,
        history,
        data,
        error,
    }
}
