// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control backend.
//!
//! Oxiprompt never parses repository internals itself beyond the head
//! pointer file. Everything else is asked of Git through a narrow set of
//! queries described by [`VcsBackend`]. The [`GitCli`] backend answers those
//! queries by calling the Git binary as a subprocess, while tests can swap in
//! their own backend with canned answers.
//!
//! # Timeouts
//!
//! The prompt cannot be displayed until every query finishes. Thus, a hanging
//! Git process would hang the user's shell. Each subprocess spawned by
//! [`GitCli`] is given a fixed amount of time to finish, after which it is
//! killed and the query fails with [`VcsError::Timeout`].

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};
use tokio::{process::Command, time::timeout};
use tracing::{debug, instrument};

/// Layer of indirection for version control queries.
///
/// All queries are relative to the working directory given to them.
#[allow(async_fn_in_trait)]
pub trait VcsBackend {
    /// Resolve path to metadata directory, e.g., `.git`.
    async fn metadata_dir(&self, cwd: &Path) -> Result<PathBuf>;

    /// Short name of currently checked out branch.
    ///
    /// Empty if HEAD does not point to a branch.
    async fn branch_name(&self, cwd: &Path) -> Result<String>;

    /// Name of tag pointing exactly at HEAD.
    ///
    /// Empty if no tag points at HEAD.
    async fn tag_at_head(&self, cwd: &Path) -> Result<String>;

    /// Check if working directory is inside a work tree.
    async fn is_inside_work_tree(&self, cwd: &Path) -> Result<bool>;

    /// Check if tracked files differ from HEAD.
    ///
    /// Untracked files are never considered.
    async fn has_tracked_changes(&self, cwd: &Path) -> Result<bool>;
}

/// Version control queries through the Git binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
    timeout: Duration,
}

impl GitCli {
    /// Construct new Git binary backend.
    pub fn new(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn gitcall(
        &self,
        cwd: &Path,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command.args(args).current_dir(cwd).kill_on_drop(true);
        debug!("run {command:?}");

        timeout(self.timeout, command.output())
            .await
            .map_err(|_| VcsError::Timeout(self.timeout))?
            .map_err(VcsError::Syscall)
    }

    async fn gitcall_stdout(
        &self,
        cwd: &Path,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Result<String> {
        let output = self.gitcall(cwd, args).await?;
        if !output.status.success() {
            return Err(VcsError::Status {
                code: output.status.code(),
                stderr: chomp(String::from_utf8_lossy(&output.stderr).into_owned()),
            });
        }

        Ok(chomp(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", Duration::from_millis(500))
    }
}

impl VcsBackend for GitCli {
    #[instrument(skip(self), level = "debug")]
    async fn metadata_dir(&self, cwd: &Path) -> Result<PathBuf> {
        let gitdir = self.gitcall_stdout(cwd, ["rev-parse", "--git-dir"]).await?;

        // INVARIANT: Git reports the metadata directory relative to cwd.
        Ok(cwd.join(gitdir))
    }

    #[instrument(skip(self), level = "debug")]
    async fn branch_name(&self, cwd: &Path) -> Result<String> {
        let output = self
            .gitcall(cwd, ["symbolic-ref", "--short", "-q", "HEAD"])
            .await?;

        // INVARIANT: Exit code 1 with -q means HEAD is detached, not an error.
        match output.status.code() {
            Some(0) => Ok(chomp(String::from_utf8_lossy(&output.stdout).into_owned())),
            Some(1) => Ok(String::new()),
            code => Err(VcsError::Status {
                code,
                stderr: chomp(String::from_utf8_lossy(&output.stderr).into_owned()),
            }),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn tag_at_head(&self, cwd: &Path) -> Result<String> {
        let output = self
            .gitcall(cwd, ["describe", "--tags", "--exact-match", "HEAD"])
            .await?;

        // INVARIANT: No tag at HEAD makes describe fail, which just means no label.
        if !output.status.success() {
            return Ok(String::new());
        }

        Ok(chomp(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    #[instrument(skip(self), level = "debug")]
    async fn is_inside_work_tree(&self, cwd: &Path) -> Result<bool> {
        let answer = self
            .gitcall_stdout(cwd, ["rev-parse", "--is-inside-work-tree"])
            .await?;

        Ok(answer == "true")
    }

    #[instrument(skip(self), level = "debug")]
    async fn has_tracked_changes(&self, cwd: &Path) -> Result<bool> {
        let output = self.gitcall(cwd, ["diff", "--quiet", "HEAD", "--"]).await?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            code => Err(VcsError::Status {
                code,
                stderr: chomp(String::from_utf8_lossy(&output.stderr).into_owned()),
            }),
        }
    }
}

// INVARIANT: Chomp trailing newlines.
fn chomp(message: String) -> String {
    message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message)
}

/// All possible error types for version control queries.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Subprocess could not be spawned, e.g., binary missing.
    #[error(transparent)]
    Syscall(#[from] std::io::Error),

    /// Subprocess exited unsuccessfully.
    #[error("git exited with status {code:?}: {stderr}")]
    Status { code: Option<i32>, stderr: String },

    /// Subprocess took too long to finish.
    #[error("git did not finish within {0:?}")]
    Timeout(Duration),
}

/// Friendly result alias :3
pub type Result<T, E = VcsError> = std::result::Result<T, E>;
