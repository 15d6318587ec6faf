//! Load, raise, save as one unit.
//!
//! [`SagaProcessor`] is the piece an event consumer calls for every
//! message. It loads the instance for the message's correlation id,
//! raises the event, and saves the result with the version it loaded.
//! When the save conflicts the whole cycle starts over from a fresh load.

use crate::config::ProcessorConfig;
use crate::core::{Event, SagaInstance, State};
use crate::engine::{Disposition, RaiseError, SagaStateMachine};
use crate::repository::{Loaded, RemoveOutcome, RepositoryError, SagaRepository, SaveOutcome};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Raise(#[from] RaiseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Saga {correlation_id} still conflicted after {attempts} attempts")]
    ConcurrencyConflict { correlation_id: Uuid, attempts: u32 },
}

/// What happened to one dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The instance was saved under `version` and is now in `state`.
    Saved { version: u64, state: State },
    /// The instance reached Final and was removed from the repository.
    Completed,
    /// No binding matched. Nothing was saved.
    Ignored(Disposition),
    /// No instance exists for the correlation id.
    Missing,
}

pub struct SagaProcessor<I, R> {
    machine: Arc<SagaStateMachine<I>>,
    repository: R,
    config: ProcessorConfig,
}

impl<I, R> SagaProcessor<I, R>
where
    I: SagaInstance,
    R: SagaRepository<I>,
{
    pub fn new(machine: Arc<SagaStateMachine<I>>, repository: R, config: ProcessorConfig) -> Self {
        Self {
            machine,
            repository,
            config,
        }
    }

    pub fn machine(&self) -> &SagaStateMachine<I> {
        &self.machine
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Deliver an event to an existing instance.
    pub async fn dispatch<D>(
        &self,
        correlation_id: Uuid,
        event: &Event<D>,
        data: D,
    ) -> Result<DispatchOutcome, ProcessorError>
    where
        D: Clone + Send + Sync + 'static,
    {
        self.process(correlation_id, event, data, None::<fn(Uuid) -> I>)
            .await
    }

    /// Deliver an event, creating the instance with `create` when none is
    /// stored yet.
    pub async fn dispatch_or_create<D, F>(
        &self,
        correlation_id: Uuid,
        event: &Event<D>,
        data: D,
        create: F,
    ) -> Result<DispatchOutcome, ProcessorError>
    where
        D: Clone + Send + Sync + 'static,
        F: Fn(Uuid) -> I,
    {
        self.process(correlation_id, event, data, Some(create)).await
    }

    async fn process<D, F>(
        &self,
        correlation_id: Uuid,
        event: &Event<D>,
        data: D,
        create: Option<F>,
    ) -> Result<DispatchOutcome, ProcessorError>
    where
        D: Clone + Send + Sync + 'static,
        F: Fn(Uuid) -> I,
    {
        let attempts = self.config.max_conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (mut instance, version) = match self.repository.load(correlation_id).await? {
                Some(Loaded { instance, version }) => (instance, Some(version)),
                None => match &create {
                    Some(create) => (create(correlation_id), None),
                    None => {
                        debug!(%correlation_id, event = %event.name(), "No saga instance to deliver to");
                        return Ok(DispatchOutcome::Missing);
                    }
                },
            };

            let outcome = self
                .machine
                .raise_event(&mut instance, event, data.clone())
                .await?;
            if outcome.is_ignored() {
                return Ok(DispatchOutcome::Ignored(outcome.disposition()));
            }

            if self.config.remove_completed && self.machine.is_completed(&instance) {
                match self.repository.remove(correlation_id, version).await? {
                    RemoveOutcome::Removed | RemoveOutcome::Absent => {
                        debug!(%correlation_id, "Saga completed");
                        return Ok(DispatchOutcome::Completed);
                    }
                    RemoveOutcome::Conflict { .. } => {
                        warn!(%correlation_id, attempt, attempts, "Concurrency conflict on completion, reloading saga");
                        continue;
                    }
                }
            }

            match self.repository.save(&instance, version).await? {
                SaveOutcome::Saved { version } => {
                    return Ok(DispatchOutcome::Saved {
                        version,
                        state: self.machine.current_state(&instance),
                    })
                }
                SaveOutcome::Conflict { .. } => {
                    warn!(%correlation_id, attempt, attempts, "Concurrency conflict, reloading saga");
                }
            }
        }

        Err(ProcessorError::ConcurrencyConflict {
            correlation_id,
            attempts,
        })
    }
}
