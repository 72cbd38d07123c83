// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command duration tracking.
//!
//! The shell tells us when a command starts, and when control returns to the
//! prompt. The time between those two events is the command's duration. The
//! start timestamp is consumed on return to the prompt, so an empty command
//! line never shows the duration of whatever ran before it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Source of wall-clock time.
pub trait Clock {
    /// Current time since the UNIX epoch.
    fn now(&self) -> Duration;
}

/// Clock backed by system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        // INVARIANT: A clock set before the epoch reads as the epoch itself.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Track elapsed time between command start and prompt return.
#[derive(Debug, Default)]
pub struct DurationTracker<C = SystemClock>
where
    C: Clock,
{
    clock: C,
    start: Option<Duration>,
    formatted: Option<String>,
    min_duration: Duration,
}

impl<C> DurationTracker<C>
where
    C: Clock,
{
    /// Construct new tracker with no command in flight.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            start: None,
            formatted: None,
            min_duration: Duration::ZERO,
        }
    }

    /// Construct tracker whose command started at `start`.
    ///
    /// Used when the start timestamp was recorded by another process.
    pub fn resume(clock: C, start: Option<Duration>) -> Self {
        Self {
            start,
            ..Self::new(clock)
        }
    }

    /// Hide elapsed times shorter than `min_duration`.
    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Record start of command execution.
    pub fn on_command_start(&mut self) {
        self.start = Some(self.clock.now());
    }

    /// Consume start timestamp, and format elapsed time since then.
    ///
    /// Returns `None` if no command started since the last call.
    pub fn on_prompt_return(&mut self) -> Option<String> {
        self.formatted = self.start.take().and_then(|start| {
            let elapsed = self.clock.now().saturating_sub(start);
            debug!("command took {elapsed:?}");
            (elapsed >= self.min_duration).then(|| format_elapsed(elapsed))
        });

        self.formatted.clone()
    }

    /// Start timestamp of command currently in flight.
    pub fn start(&self) -> Option<Duration> {
        self.start
    }

    /// Formatted elapsed time from last prompt return.
    pub fn formatted(&self) -> Option<&str> {
        self.formatted.as_deref()
    }
}

/// Format elapsed time with precision fitting its magnitude.
///
/// | elapsed      | format     |
/// |--------------|------------|
/// | >= 1 hour    | `1h1m`     |
/// | >= 1 minute  | `1m15s`    |
/// | >= 10 secs   | `12.34s`   |
/// | >= 1 sec     | `1.234s`   |
/// | < 1 sec      | `42ms`     |
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let fsecs = elapsed.as_secs_f64();

    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs / 60) % 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else if secs >= 10 {
        format!("{fsecs:.2}s")
    } else if secs >= 1 {
        format!("{fsecs:.3}s")
    } else {
        // INVARIANT: Rounding never reaches the seconds band.
        let millis = (fsecs * 1000.0).round() as u64;
        format!("{}ms", millis.min(999))
    }
}

/// Microseconds since the UNIX epoch, as passed between shell hooks.
pub fn to_micros(timestamp: Duration) -> u128 {
    timestamp.as_micros()
}

/// Inverse of [`to_micros`].
pub fn from_micros(micros: u64) -> Duration {
    Duration::from_micros(micros)
}
