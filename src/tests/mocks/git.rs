use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::async_trait;

use super::SQUASHED_SHA;
use crate::github::{CommitSha, Repository};
use crate::review::{GitClient, LocalRepo};

#[derive(Debug, Clone, PartialEq)]
pub enum GitOp {
    Update,
    Rebase { base: CommitSha, head: CommitSha },
    Push(String),
    HeadSha,
}

#[derive(Default)]
struct GitState {
    operations: Mutex<Vec<GitOp>>,
    delay: Mutex<Duration>,
    fail_update: AtomicBool,
    fail_rebase: AtomicBool,
    fail_push: AtomicBool,
    /// Number of local clones currently in use.
    active_sessions: AtomicUsize,
    max_sessions: AtomicUsize,
}

impl GitState {
    async fn record(&self, op: GitOp) {
        self.operations.lock().unwrap().push(op);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// In-memory git collaborator that records the performed operations.
///
/// Every [`LocalRepo`] handed out counts as an active session until it is dropped, which allows
/// tests to detect interleaved work on local clones.
#[derive(Default)]
pub struct TestGit {
    state: Arc<GitState>,
}

impl TestGit {
    pub fn fail_update(&self) {
        self.state.fail_update.store(true, Ordering::SeqCst);
    }

    pub fn fail_rebase(&self) {
        self.state.fail_rebase.store(true, Ordering::SeqCst);
    }

    pub fn fail_push(&self) {
        self.state.fail_push.store(true, Ordering::SeqCst);
    }

    /// Each operation sleeps for `delay` before it finishes.
    pub fn set_operation_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn max_concurrent_sessions(&self) -> usize {
        self.state.max_sessions.load(Ordering::SeqCst)
    }

    pub fn check_operations(&self, expected: &[GitOp]) {
        assert_eq!(*self.state.operations.lock().unwrap(), expected);
    }
}

struct Session {
    state: Arc<GitState>,
}

impl Session {
    fn start(state: Arc<GitState>) -> Self {
        let active = state.active_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_sessions.fetch_max(active, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.state.active_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GitClient for TestGit {
    async fn get_updated_repo(&self, _repo: &Repository) -> anyhow::Result<Box<dyn LocalRepo>> {
        let session = Session::start(self.state.clone());
        self.state.record(GitOp::Update).await;
        if self.state.fail_update.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Cannot fetch"));
        }
        Ok(Box::new(TestLocalRepo {
            session,
            head: Mutex::new(None),
        }))
    }
}

struct TestLocalRepo {
    session: Session,
    head: Mutex<Option<CommitSha>>,
}

#[async_trait]
impl LocalRepo for TestLocalRepo {
    async fn rebase_autosquash(&self, base: &CommitSha, head: &CommitSha) -> anyhow::Result<()> {
        let state = &self.session.state;
        state
            .record(GitOp::Rebase {
                base: base.clone(),
                head: head.clone(),
            })
            .await;
        if state.fail_rebase.load(Ordering::SeqCst) {
            *self.head.lock().unwrap() = Some(head.clone());
            return Err(anyhow::anyhow!("Rebase conflict"));
        }
        *self.head.lock().unwrap() = Some(CommitSha::from(SQUASHED_SHA));
        Ok(())
    }

    async fn force_push_head_to(&self, branch: &str) -> anyhow::Result<()> {
        let state = &self.session.state;
        state.record(GitOp::Push(branch.to_string())).await;
        if state.fail_push.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Push rejected"));
        }
        Ok(())
    }

    async fn get_head_sha(&self) -> anyhow::Result<CommitSha> {
        self.session.state.record(GitOp::HeadSha).await;
        self.head
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("HEAD is not set"))
    }
}
