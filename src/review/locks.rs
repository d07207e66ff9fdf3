//! Serializes work on the shared local clone of each repository.
//!
//! Operations on different repositories run in parallel, operations on the same repository
//! wait for each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::github::GithubRepoName;

#[derive(Clone, Default)]
pub struct RepositoryLocks {
    locks: Arc<Mutex<HashMap<GithubRepoName, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Holds the lock of a single repository until dropped.
pub struct RepositoryGuard {
    _guard: OwnedMutexGuard<()>,
}

impl RepositoryLocks {
    /// Waits until no other task works with the local clone of `repo`.
    ///
    /// Dropping the returned future (e.g. because of a timeout) does not leave the lock held.
    pub async fn lock(&self, repo: &GithubRepoName) -> RepositoryGuard {
        let lock = self
            .locks
            .lock()
            .unwrap()
            .entry(repo.clone())
            .or_default()
            .clone();
        tracing::trace!("Waiting for the local clone of {repo}");
        RepositoryGuard {
            _guard: lock.lock_owned().await,
        }
    }
}
