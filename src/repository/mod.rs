//! Saga instance persistence.
//!
//! A repository stores instances keyed by correlation id together with a
//! version number. Saving with the version that was loaded lets an
//! optimistic implementation detect a concurrent writer; a pessimistic
//! implementation accepts every save and leaves exclusivity to the caller.

mod memory;

pub use memory::InMemorySagaRepository;

use crate::core::SagaInstance;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Repository backend failure: {message}")]
    Backend { message: String },
}

/// An instance together with the version it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<I> {
    pub instance: I,
    pub version: u64,
}

/// Result of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored under `version`.
    Saved { version: u64 },
    /// Another writer got there first. `None` means no stored instance.
    Conflict {
        expected: Option<u64>,
        actual: Option<u64>,
    },
}

impl SaveOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn version(&self) -> Option<u64> {
        match self {
            Self::Saved { version } => Some(*version),
            Self::Conflict { .. } => None,
        }
    }
}

/// Result of a remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The stored instance was deleted.
    Removed,
    /// Nothing was stored and nothing was expected.
    Absent,
    /// The stored version is not the one the caller loaded.
    Conflict {
        expected: Option<u64>,
        actual: Option<u64>,
    },
}

impl RemoveOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Storage contract for saga instances.
#[async_trait]
pub trait SagaRepository<I: SagaInstance>: Send + Sync {
    async fn load(&self, correlation_id: Uuid) -> Result<Option<Loaded<I>>, RepositoryError>;

    /// Store `instance`. `expected_version` is the version it was loaded
    /// with, or `None` for an instance that has never been saved.
    async fn save(
        &self,
        instance: &I,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, RepositoryError>;

    /// Delete an instance. `expected_version` follows the same rules as
    /// in [`save`](Self::save).
    async fn remove(
        &self,
        correlation_id: Uuid,
        expected_version: Option<u64>,
    ) -> Result<RemoveOutcome, RepositoryError>;
}
