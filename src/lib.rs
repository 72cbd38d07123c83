// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell prompt with repository status and command timing.
//!
//! Oxiprompt renders the prompt of an interactive shell. On every prompt
//! cycle it computes two things: a short summary of the repository that the
//! working directory belongs to, and how long the last command took to run.
//! Both are interpolated into a user-defined template.
//!
//! The host shell drives everything through two hooks, see [`hook`] for the
//! glue that wires them up. Everything is recomputed from scratch on each
//! cycle, except for the start timestamp of the command that is currently
//! running.
//!
//! Oxiprompt must never get in the way of the user's shell. Thus, failure to
//! figure out repository status is never reported as an error. The prompt
//! simply comes out shorter.

pub mod config;
pub mod duration;
pub mod hook;
pub mod path;
pub mod probe;
pub mod prompt;
pub mod session;
pub mod vcs;

pub use config::Config;
pub use duration::{format_elapsed, Clock, DurationTracker, SystemClock};
pub use hook::Shell;
pub use probe::{RepoStatus, RepoStatusProbe};
pub use session::PromptSession;
pub use vcs::{GitCli, VcsBackend, VcsError};
