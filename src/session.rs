// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Prompt cycle driver.
//!
//! A [`PromptSession`] owns every piece of state that lives across one
//! prompt cycle, and is passed by reference to both shell events. Nothing
//! else holds on to that state.

use crate::{
    config::PromptSettings,
    duration::{Clock, DurationTracker, SystemClock},
    hook::Shell,
    path::{contract_home, home_dir},
    probe::RepoStatusProbe,
    prompt::{render, PromptContext},
    vcs::{GitCli, VcsBackend},
};

use std::path::{Path, PathBuf};
use tracing::instrument;

/// State carried between pre-execution and pre-prompt events.
#[derive(Debug)]
pub struct PromptSession<B = GitCli, C = SystemClock>
where
    B: VcsBackend,
    C: Clock,
{
    probe: RepoStatusProbe<B>,
    tracker: DurationTracker<C>,
    settings: PromptSettings,
    shell: Option<Shell>,
    home: Option<PathBuf>,
}

impl<B, C> PromptSession<B, C>
where
    B: VcsBackend,
    C: Clock,
{
    /// Construct new session.
    pub fn new(backend: B, tracker: DurationTracker<C>, settings: PromptSettings) -> Self {
        let tracker = tracker.with_min_duration(settings.min_duration());
        Self {
            probe: RepoStatusProbe::new(backend),
            tracker,
            settings,
            shell: None,
            home: home_dir().ok(),
        }
    }

    /// Escape substituted values for target shell.
    pub fn with_shell(mut self, shell: Option<Shell>) -> Self {
        self.shell = shell;
        self
    }

    /// Contract working directory relative to `home`.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Command is about to execute.
    pub fn pre_exec(&mut self) {
        self.tracker.on_command_start();
    }

    /// Control returned to the prompt, so render the next one.
    #[instrument(skip(self, cwd), level = "debug")]
    pub async fn pre_prompt(&mut self, cwd: &Path) -> String {
        let duration = self.tracker.on_prompt_return();
        let status = self.probe.compute(cwd).await;
        let cwd = contract_home(cwd, self.home.as_deref());
        let context = PromptContext {
            cwd: &cwd,
            status: &status,
            duration: duration.as_deref(),
        };

        render(&self.settings, context, self.shell)
    }
}
