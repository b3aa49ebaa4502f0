use thiserror::Error;

use super::{Convergence, Step};

#[derive(Debug, Error)]
pub enum ScenarioBuildError {
    #[error("scenario name must not be empty")]
    Unnamed,
    #[error("scenario '{name}' has neither steps nor conditions")]
    Empty { name: String },
    #[error("scenario '{name}' must bind at least one node client")]
    NoClients { name: String },
}

/// Immutable scenario definition: ordered steps, then the conditions checked
/// while verifying.
pub struct Scenario<S>
where
    S: Send + Sync,
{
    name: String,
    min_clients: usize,
    steps: Vec<Box<dyn Step<S>>>,
    conditions: Vec<Box<dyn Convergence<S>>>,
}

impl<S> Scenario<S>
where
    S: Send + Sync,
{
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of node clients the steps index into.
    #[must_use]
    pub const fn min_clients(&self) -> usize {
        self.min_clients
    }

    #[must_use]
    pub fn steps(&self) -> &[Box<dyn Step<S>>] {
        &self.steps
    }

    #[must_use]
    pub fn conditions(&self) -> &[Box<dyn Convergence<S>>] {
        &self.conditions
    }
}

/// Builder used by workflows to describe a scenario.
pub struct ScenarioBuilder<S>
where
    S: Send + Sync,
{
    name: String,
    min_clients: usize,
    steps: Vec<Box<dyn Step<S>>>,
    conditions: Vec<Box<dyn Convergence<S>>>,
}

impl<S> ScenarioBuilder<S>
where
    S: Send + Sync,
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_clients: 1,
            steps: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn requires_clients(mut self, count: usize) -> Self {
        self.min_clients = count;
        self
    }

    #[must_use]
    pub fn with_step<T>(mut self, step: T) -> Self
    where
        T: Step<S> + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    #[must_use]
    /// Add a condition evaluated after all steps, in insertion order.
    pub fn with_condition<C>(mut self, condition: C) -> Self
    where
        C: Convergence<S> + 'static,
    {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn build(self) -> Result<Scenario<S>, ScenarioBuildError> {
        let Self {
            name,
            min_clients,
            steps,
            conditions,
        } = self;

        if name.trim().is_empty() {
            return Err(ScenarioBuildError::Unnamed);
        }
        if min_clients == 0 {
            return Err(ScenarioBuildError::NoClients { name });
        }
        if steps.is_empty() && conditions.is_empty() {
            return Err(ScenarioBuildError::Empty { name });
        }

        Ok(Scenario {
            name,
            min_clients,
            steps,
            conditions,
        })
    }
}
