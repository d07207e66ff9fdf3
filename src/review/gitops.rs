//! Local git operations performed through the git binary.
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use axum::async_trait;

use crate::github::{CommitSha, Repository};
use crate::review::{GitClient, LocalRepo};

/// Name and email used as the committer of rebased commits.
#[derive(Clone, Debug)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Represents a git binary together with the directory where local clones are stored.
#[derive(Clone)]
pub struct Git {
    git: PathBuf,
    repos_dir: PathBuf,
    identity: CommitIdentity,
}

impl Git {
    /// Try to locate a git binary and execute it.
    /// Returns `Git` if it worked.
    pub fn try_init(repos_dir: PathBuf, identity: CommitIdentity) -> anyhow::Result<Self> {
        let path = which::which("git").context("git was not found")?;
        let output = Command::new(&path)
            .arg("--version")
            .output()
            .context("Cannot execute git")?;
        if output.status.success() {
            Ok(Git {
                git: path,
                repos_dir,
                identity,
            })
        } else {
            Err(anyhow::anyhow!("Cannot execute git at `{path:?}`"))
        }
    }

    fn clone_path(&self, repo: &Repository) -> PathBuf {
        self.repos_dir.join(repo.owner()).join(repo.name.name())
    }

    /// Brings a clone left behind by a cancelled request back to a clean state.
    ///
    /// Git processes are killed when a request is dropped, which can leave a rebase in progress,
    /// a stale index lock or a dirty working tree behind.
    async fn discard_interrupted_work(&self, path: &Path) -> anyhow::Result<()> {
        let git_dir = path.join(".git");
        let index_lock = git_dir.join("index.lock");
        if index_lock.exists() {
            tracing::warn!("Removing stale {}", index_lock.display());
            tokio::fs::remove_file(&index_lock).await?;
        }
        if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
            tracing::warn!("Aborting an interrupted rebase in {}", path.display());
            let abort =
                run_command(git_command(&self.git, path).arg("rebase").arg("--abort")).await;
            if let Err(error) = abort {
                tracing::warn!("Cannot abort rebase, dropping its state instead: {error:?}");
                run_command(git_command(&self.git, path).arg("rebase").arg("--quit")).await?;
            }
        }
        run_command(
            git_command(&self.git, path)
                .arg("reset")
                .arg("--hard")
                .arg("--quiet"),
        )
        .await
    }
}

#[async_trait]
impl GitClient for Git {
    async fn get_updated_repo(&self, repo: &Repository) -> anyhow::Result<Box<dyn LocalRepo>> {
        let path = self.clone_path(repo);
        if path.join(".git").is_dir() {
            tracing::debug!("Fetching {repo} into {}", path.display());
            run_command(
                git_command(&self.git, &path)
                    .arg("fetch")
                    .arg("--prune")
                    .arg("origin"),
            )
            .await
            .with_context(|| format!("Cannot fetch {repo}"))?;
            self.discard_interrupted_work(&path)
                .await
                .with_context(|| format!("Cannot restore the local clone of {repo}"))?;
        } else {
            let parent = path.parent().unwrap_or(&self.repos_dir);
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Cannot create directory {}", parent.display()))?;
            tracing::debug!("Cloning {repo} into {}", path.display());
            run_command(
                git_command(&self.git, parent)
                    .arg("clone")
                    .arg(&repo.clone_url)
                    .arg(&path),
            )
            .await
            .with_context(|| format!("Cannot clone {repo}"))?;
        }
        Ok(Box::new(LocalClone {
            git: self.git.clone(),
            path,
            identity: self.identity.clone(),
        }))
    }
}

/// A clone of a repository on the local disk.
pub struct LocalClone {
    git: PathBuf,
    path: PathBuf,
    identity: CommitIdentity,
}

#[async_trait]
impl LocalRepo for LocalClone {
    async fn rebase_autosquash(&self, base: &CommitSha, head: &CommitSha) -> anyhow::Result<()> {
        run_command(
            git_command(&self.git, &self.path)
                .arg("checkout")
                .arg("--detach")
                .arg(head.as_ref()),
        )
        .await
        .with_context(|| format!("Cannot checkout {head}"))?;

        // The sequence editor accepts the generated todo list, the editor accepts the combined
        // messages of squash! commits.
        let rebase = run_command(
            git_command(&self.git, &self.path)
                .arg("-c")
                .arg(format!("user.name={}", self.identity.name))
                .arg("-c")
                .arg(format!("user.email={}", self.identity.email))
                .env("GIT_SEQUENCE_EDITOR", "true")
                .env("GIT_EDITOR", "true")
                .arg("rebase")
                .arg("--interactive")
                .arg("--autosquash")
                .arg(base.as_ref()),
        )
        .await;
        if let Err(error) = rebase {
            if let Err(abort_error) =
                run_command(git_command(&self.git, &self.path).arg("rebase").arg("--abort")).await
            {
                tracing::warn!("Cannot abort rebase in {}: {abort_error:?}", self.path.display());
            }
            return Err(error.context(format!("Cannot autosquash {base}..{head}")));
        }
        Ok(())
    }

    async fn force_push_head_to(&self, branch: &str) -> anyhow::Result<()> {
        // The `+` sign says that it is a force push
        let refspec = format!("+HEAD:refs/heads/{branch}");
        run_command(
            git_command(&self.git, &self.path)
                .arg("push")
                .arg("origin")
                .arg(refspec),
        )
        .await
        .with_context(|| format!("Cannot push to {branch}"))
    }

    async fn get_head_sha(&self) -> anyhow::Result<CommitSha> {
        let output = command_output(
            git_command(&self.git, &self.path)
                .arg("rev-parse")
                .arg("HEAD"),
        )
        .await
        .context("Cannot resolve HEAD")?;
        Ok(CommitSha(output.trim().to_string()))
    }
}

fn git_command(git: &Path, dir: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(git);
    cmd.kill_on_drop(true)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

async fn run_command(cmd: &mut tokio::process::Command) -> anyhow::Result<()> {
    // Use status instead of output, so that we stream the output directly into logs.
    let status = cmd.status().await?;
    if !status.success() {
        Err(anyhow::anyhow!("Command ended with status {status}"))
    } else {
        Ok(())
    }
}

async fn command_output(cmd: &mut tokio::process::Command) -> anyhow::Result<String> {
    let output = cmd.output().await?;
    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "Command ended with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8(output.stdout)?)
}
