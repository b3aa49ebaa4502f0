use std::{any::Any, future::Future, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt as _;
use thiserror::Error;
use tokio::{task::JoinSet, time::Instant};

use super::DynError;
use crate::nodes::NodeClient;

/// View of the run handed to steps and conditions.
///
/// Borrows the executor's clients; nothing here outlives the run.
pub struct WorkflowContext<'a> {
    clients: &'a [NodeClient],
    deadline: Instant,
    step: usize,
}

impl<'a> WorkflowContext<'a> {
    pub(crate) const fn new(clients: &'a [NodeClient], deadline: Instant) -> Self {
        Self {
            clients,
            deadline,
            step: 0,
        }
    }

    pub(crate) const fn advance(&mut self, step: usize) {
        self.step = step;
    }

    #[must_use]
    pub const fn clients(&self) -> &'a [NodeClient] {
        self.clients
    }

    /// Client at `index` in the order the executor was given them.
    pub fn client(&self, index: usize) -> Result<&'a NodeClient, DynError> {
        self.clients.get(index).ok_or_else(|| {
            format!(
                "scenario needs node #{index} but only {} clients are bound",
                self.clients.len()
            )
            .into()
        })
    }

    /// Instant after which verification gives up.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// 1-based index of the running step, or 0 before the first step.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.step
    }
}

/// A fanned-out call that failed, by submission position.
#[derive(Debug, Error)]
#[error("fanned-out call #{index} failed")]
pub struct FanOutError {
    pub index: usize,
    #[source]
    pub source: DynError,
}

/// Runs every call on its own task and waits for all of them.
///
/// Results come back in submission order. When several calls fail, the one
/// submitted first is reported.
pub async fn fan_out<T, I, Fut>(calls: I) -> Result<Vec<T>, FanOutError>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, DynError>> + Send + 'static,
    T: Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut submitted = 0;
    for (index, call) in calls.into_iter().enumerate() {
        tasks.spawn(async move {
            let outcome = AssertUnwindSafe(call).catch_unwind().await;
            let outcome = outcome.unwrap_or_else(|panic| {
                Err(format!("call panicked: {}", panic_message(panic)).into())
            });
            (index, outcome)
        });
        submitted += 1;
    }

    let mut slots: Vec<Option<Result<T, DynError>>> = (0..submitted).map(|_| None).collect();
    let mut lost_task = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            // Tasks are never aborted here, so a join error means the runtime
            // is shutting down. The call it carried is the slot left empty.
            Err(join_err) => lost_task = Some(join_err.to_string()),
        }
    }

    in_submission_order(slots, lost_task.as_deref())
}

/// Unwraps per-call slots, reporting the first failed or missing call.
fn in_submission_order<T>(
    slots: Vec<Option<Result<T, DynError>>>,
    lost_task: Option<&str>,
) -> Result<Vec<T>, FanOutError> {
    let mut results = Vec::with_capacity(slots.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(Ok(value)) => results.push(value),
            Some(Err(source)) => return Err(FanOutError { index, source }),
            None => {
                let source: DynError = lost_task.map_or_else(
                    || "call produced no result".into(),
                    |reason| format!("call task failed: {reason}").into(),
                );
                return Err(FanOutError { index, source });
            }
        }
    }
    Ok(results)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic.downcast::<String>().map_or_else(
        |panic| {
            panic.downcast::<&'static str>().map_or_else(
                |_| "unknown panic".to_owned(),
                |message| (*message).to_owned(),
            )
        },
        |message| *message,
    )
}
