// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository status probing.
//!
//! Summarize where the working directory sits in its repository: a short
//! label naming the current position, and whether tracked files have been
//! modified. The probe runs on every prompt cycle, so it must never fail.
//! Every query that goes wrong simply leaves its part of the status blank.
//!
//! # Labels
//!
//! The head pointer file tells us what kind of position we are at:
//!
//! - `ref: refs/heads/main` means we sit on a branch tip, so the label is the
//!   branch name.
//! - A raw revision id means HEAD is detached. The label is the name of a tag
//!   pointing exactly at HEAD, if there is one.
//!
//! If neither query produces a name, then the first eight characters of the
//! head pointer are used instead.

use crate::vcs::VcsBackend;

use std::path::Path;
use tracing::{debug, instrument};

const SYMBOLIC_REF_PREFIX: &str = "ref:";
const SHORT_ID_LEN: usize = 8;

/// Summary of repository state for the prompt.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Branch name, tag name, or abbreviated revision id.
    pub label: String,

    /// Tracked files differ from HEAD.
    pub is_dirty: bool,

    /// Working directory is inside a repository.
    pub in_repo: bool,
}

/// Compute [`RepoStatus`] through a version control backend.
#[derive(Debug, Default, Clone)]
pub struct RepoStatusProbe<B>
where
    B: VcsBackend,
{
    backend: B,
}

impl<B> RepoStatusProbe<B>
where
    B: VcsBackend,
{
    /// Construct new probe.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Compute repository status of target working directory.
    ///
    /// Outside of a repository this is the default, empty status.
    #[instrument(skip(self, cwd), level = "debug")]
    pub async fn compute(&self, cwd: &Path) -> RepoStatus {
        let gitdir = match self.backend.metadata_dir(cwd).await {
            Ok(gitdir) => gitdir,
            Err(error) => {
                debug!("{:?} is not in a repository: {error}", cwd.display());
                return RepoStatus::default();
            }
        };

        let head = tokio::fs::read_to_string(gitdir.join("HEAD"))
            .await
            .unwrap_or_else(|error| {
                debug!("cannot read head pointer in {:?}: {error}", gitdir.display());
                String::new()
            });

        RepoStatus {
            label: self.label(cwd, &head).await,
            is_dirty: self.is_dirty(cwd).await,
            in_repo: true,
        }
    }

    async fn label(&self, cwd: &Path, head: &str) -> String {
        let name = if head.starts_with(SYMBOLIC_REF_PREFIX) {
            self.backend.branch_name(cwd).await
        } else {
            self.backend.tag_at_head(cwd).await
        };

        match name {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => short_id(head),
            Err(error) => {
                debug!("cannot name current position: {error}");
                short_id(head)
            }
        }
    }

    async fn is_dirty(&self, cwd: &Path) -> bool {
        // INVARIANT: Bare repositories and metadata directories have no work tree to dirty.
        match self.backend.is_inside_work_tree(cwd).await {
            Ok(true) => (),
            Ok(false) => return false,
            Err(error) => {
                debug!("cannot check for work tree: {error}");
                return false;
            }
        }

        self.backend
            .has_tracked_changes(cwd)
            .await
            .unwrap_or_else(|error| {
                debug!("cannot diff tracked files: {error}");
                false
            })
    }
}

fn short_id(head: &str) -> String {
    head.trim_end().chars().take(SHORT_ID_LEN).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vcs::{Result, VcsError};
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{fs, future::Future, path::PathBuf};

    /// Backend answering every query with a canned response.
    ///
    /// `None` makes the query fail.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct FakeVcs {
        pub(crate) gitdir: Option<PathBuf>,
        pub(crate) branch: Option<String>,
        pub(crate) tag: Option<String>,
        pub(crate) work_tree: Option<bool>,
        pub(crate) dirty: Option<bool>,
    }

    fn canned<T: Clone>(answer: &Option<T>) -> Result<T> {
        answer.clone().ok_or_else(|| VcsError::Status {
            code: Some(128),
            stderr: "fatal: canned failure".into(),
        })
    }

    impl VcsBackend for FakeVcs {
        async fn metadata_dir(&self, _cwd: &Path) -> Result<PathBuf> {
            canned(&self.gitdir)
        }

        async fn branch_name(&self, _cwd: &Path) -> Result<String> {
            canned(&self.branch)
        }

        async fn tag_at_head(&self, _cwd: &Path) -> Result<String> {
            canned(&self.tag)
        }

        async fn is_inside_work_tree(&self, _cwd: &Path) -> Result<bool> {
            canned(&self.work_tree)
        }

        async fn has_tracked_changes(&self, _cwd: &Path) -> Result<bool> {
            canned(&self.dirty)
        }
    }

    /// Metadata directory under current directory with given head pointer.
    ///
    /// Only call from sealed tests, which run inside their own scratch directory.
    pub(crate) fn gitdir_with_head(head: &str) -> anyhow::Result<PathBuf> {
        let gitdir = std::env::current_dir()?.join(".git");
        fs::create_dir_all(&gitdir)?;
        fs::write(gitdir.join("HEAD"), head)?;

        Ok(gitdir)
    }

    /// Drive future to completion on a fresh current-thread runtime.
    pub(crate) fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(runtime.block_on(future))
    }

    const COMMIT: &str = "3f786850e387550fdab836ed7e6dc881de23001b\n";

    #[tokio::test]
    async fn outside_repository_is_empty() {
        let probe = RepoStatusProbe::new(FakeVcs {
            branch: Some("main".into()),
            work_tree: Some(true),
            dirty: Some(true),
            ..Default::default()
        });

        let result = probe.compute(Path::new("/")).await;
        let expect = RepoStatus {
            label: "".into(),
            is_dirty: false,
            in_repo: false,
        };

        assert_eq!(result, expect);
    }

    #[sealed_test]
    fn branch_label() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head("ref: refs/heads/main\n")?),
            branch: Some("main".into()),
            tag: Some("v1.0.0".into()),
            work_tree: Some(true),
            dirty: Some(false),
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        let expect = RepoStatus {
            label: "main".into(),
            is_dirty: false,
            in_repo: true,
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn detached_at_tag_label() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head(COMMIT)?),
            branch: Some("main".into()),
            tag: Some("v1.0.0".into()),
            work_tree: Some(true),
            dirty: Some(false),
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert_eq!(result.label, "v1.0.0");

        Ok(())
    }

    #[sealed_test]
    fn detached_without_tag_label() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head(COMMIT)?),
            tag: Some("".into()),
            work_tree: Some(true),
            dirty: Some(false),
            ..Default::default()
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert_eq!(result.label, "3f786850");

        Ok(())
    }

    #[sealed_test]
    fn failed_tag_query_falls_back_to_short_id() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head(COMMIT)?),
            work_tree: Some(true),
            dirty: Some(false),
            ..Default::default()
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert_eq!(result.label, "3f786850");

        Ok(())
    }

    #[tokio::test]
    async fn unreadable_head_gives_blank_label() {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(PathBuf::from("/oxiprompt/no/such/gitdir")),
            tag: Some("".into()),
            work_tree: Some(true),
            dirty: Some(true),
            ..Default::default()
        });

        let result = probe.compute(Path::new("/")).await;
        let expect = RepoStatus {
            label: "".into(),
            is_dirty: true,
            in_repo: true,
        };

        assert_eq!(result, expect);
    }

    #[sealed_test]
    fn dirty_tracked_files() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head("ref: refs/heads/main\n")?),
            branch: Some("main".into()),
            work_tree: Some(true),
            dirty: Some(true),
            ..Default::default()
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert!(result.is_dirty);

        Ok(())
    }

    #[sealed_test]
    fn outside_work_tree_is_never_dirty() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head("ref: refs/heads/main\n")?),
            branch: Some("main".into()),
            work_tree: Some(false),
            dirty: Some(true),
            ..Default::default()
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert!(!result.is_dirty);

        Ok(())
    }

    #[sealed_test]
    fn failed_diff_is_clean() -> anyhow::Result<()> {
        let probe = RepoStatusProbe::new(FakeVcs {
            gitdir: Some(gitdir_with_head("ref: refs/heads/main\n")?),
            branch: Some("main".into()),
            work_tree: Some(true),
            ..Default::default()
        });

        let result = block_on(probe.compute(Path::new("/")))?;
        assert!(!result.is_dirty);
        assert_eq!(result.label, "main");

        Ok(())
    }

    #[sealed_test]
    fn head_fixture_lives_in_scratch_directory() -> anyhow::Result<()> {
        let gitdir = gitdir_with_head(COMMIT)?;

        assert_eq!(gitdir, std::env::current_dir()?.join(".git"));
        assert_eq!(fs::read_to_string(gitdir.join("HEAD"))?, COMMIT);

        Ok(())
    }

    #[test]
    fn short_id_of_short_head() {
        assert_eq!(short_id("abc\n"), "abc");
    }
}
