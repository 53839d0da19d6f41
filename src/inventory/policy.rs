//! MutationPolicy - How increments and decrements are written back.

use serde::{Deserialize, Serialize};

use crate::document::{Precondition, WriteMode};

/// Guarding of the read-then-write pair inside a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concurrency {
    /// Write unconditionally. Concurrent mutations of one item can lose updates.
    Unguarded,
    /// Write conditionally on the version that was read, retrying on conflict.
    Optimistic,
}

/// Write mode, concurrency guard and retry budget for inventory mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationPolicy {
    pub write_mode: WriteMode,
    pub concurrency: Concurrency,
    /// Total tries per mutation under `Optimistic`, at least 1.
    ///
    /// A conflicted try re-reads and rewrites straight away, without delay:
    /// each conflict means another writer has already committed, so the next
    /// read sees fresh state. Every try costs one read and one write against
    /// the store, so keep this small for remote stores.
    pub max_attempts: u32,
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::Merge,
            concurrency: Concurrency::Optimistic,
            max_attempts: 8,
        }
    }
}

impl MutationPolicy {
    /// Unconditional whole-document overwrites: the historical behaviour.
    pub fn legacy() -> Self {
        Self {
            write_mode: WriteMode::Overwrite,
            concurrency: Concurrency::Unguarded,
            max_attempts: 1,
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Precondition for a write following a read that saw `version`
    /// (`None` when the document was missing).
    pub(crate) fn precondition_for(&self, version: Option<u64>) -> Precondition {
        match (self.concurrency, version) {
            (Concurrency::Unguarded, _) => Precondition::Any,
            (Concurrency::Optimistic, Some(version)) => Precondition::Version(version),
            (Concurrency::Optimistic, None) => Precondition::Missing,
        }
    }
}
