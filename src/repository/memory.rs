//! `DashMap` backed repository.

use super::{Loaded, RemoveOutcome, RepositoryError, SagaRepository, SaveOutcome};
use crate::config::RepositoryConfig;
use crate::core::SagaInstance;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

struct Stored<I> {
    instance: I,
    version: u64,
}

/// Process-local repository. Clones share the same storage.
pub struct InMemorySagaRepository<I> {
    entries: Arc<DashMap<String, Stored<I>>>,
    config: RepositoryConfig,
}

impl<I> Clone for InMemorySagaRepository<I> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            config: self.config.clone(),
        }
    }
}

impl<I: SagaInstance + Clone> InMemorySagaRepository<I> {
    pub fn new() -> Self {
        Self::with_config(RepositoryConfig::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Storage key for a correlation id, including the configured prefix.
    pub fn key(&self, correlation_id: Uuid) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{prefix}:{correlation_id}"),
            None => correlation_id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, correlation_id: Uuid) -> bool {
        self.entries.contains_key(&self.key(correlation_id))
    }

    /// Stored keys in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl<I: SagaInstance + Clone> Default for InMemorySagaRepository<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I: SagaInstance + Clone> SagaRepository<I> for InMemorySagaRepository<I> {
    async fn load(&self, correlation_id: Uuid) -> Result<Option<Loaded<I>>, RepositoryError> {
        Ok(self.entries.get(&self.key(correlation_id)).map(|stored| Loaded {
            instance: stored.instance.clone(),
            version: stored.version,
        }))
    }

    async fn save(
        &self,
        instance: &I,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, RepositoryError> {
        let key = self.key(instance.correlation_id());
        let optimistic = self.config.optimistic_concurrency;

        let outcome = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let actual = occupied.get().version;
                if optimistic && expected_version != Some(actual) {
                    SaveOutcome::Conflict {
                        expected: expected_version,
                        actual: Some(actual),
                    }
                } else {
                    let version = actual + 1;
                    occupied.insert(Stored {
                        instance: instance.clone(),
                        version,
                    });
                    SaveOutcome::Saved { version }
                }
            }
            Entry::Vacant(vacant) => {
                if optimistic && expected_version.is_some() {
                    SaveOutcome::Conflict {
                        expected: expected_version,
                        actual: None,
                    }
                } else {
                    vacant.insert(Stored {
                        instance: instance.clone(),
                        version: 1,
                    });
                    SaveOutcome::Saved { version: 1 }
                }
            }
        };

        match outcome {
            SaveOutcome::Saved { version } => {
                debug!(correlation_id = %instance.correlation_id(), version, "Saga saved")
            }
            SaveOutcome::Conflict { expected, actual } => warn!(
                correlation_id = %instance.correlation_id(),
                ?expected,
                ?actual,
                "Saga save conflicted"
            ),
        }
        Ok(outcome)
    }

    async fn remove(
        &self,
        correlation_id: Uuid,
        expected_version: Option<u64>,
    ) -> Result<RemoveOutcome, RepositoryError> {
        let key = self.key(correlation_id);

        let outcome = match (self.config.optimistic_concurrency, expected_version) {
            (false, _) => match self.entries.remove(&key) {
                Some(_) => RemoveOutcome::Removed,
                None => RemoveOutcome::Absent,
            },
            (true, Some(expected)) => {
                match self.entries.remove_if(&key, |_, stored| stored.version == expected) {
                    Some(_) => RemoveOutcome::Removed,
                    None => RemoveOutcome::Conflict {
                        expected: expected_version,
                        actual: self.entries.get(&key).map(|stored| stored.version),
                    },
                }
            }
            (true, None) => match self.entries.get(&key).map(|stored| stored.version) {
                Some(actual) => RemoveOutcome::Conflict {
                    expected: None,
                    actual: Some(actual),
                },
                None => RemoveOutcome::Absent,
            },
        };

        match outcome {
            RemoveOutcome::Removed => debug!(%correlation_id, "Saga removed"),
            RemoveOutcome::Absent => {}
            RemoveOutcome::Conflict { expected, actual } => warn!(
                %correlation_id,
                ?expected,
                ?actual,
                "Saga remove conflicted"
            ),
        }
        Ok(outcome)
    }
}
