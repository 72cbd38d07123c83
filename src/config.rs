// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that Oxiprompt uses to
//! decide how the prompt is rendered, how Git is invoked, and what shell glue
//! gets emitted at initialization.
//!
//! # General Layout
//!
//! The configuration file is composed of four tables: `prompt`, `git`, `env`,
//! and `aliases`. Every table is optional, and every missing field falls back
//! to its default value. Thus, an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::{debug, instrument};

/// Oxiprompt configuration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Prompt rendering settings.
    pub prompt: PromptSettings,

    /// Git invocation settings.
    pub git: GitSettings,

    /// Environment variables to export at shell initialization.
    pub env: BTreeMap<String, String>,

    /// Aliases to define at shell initialization.
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from target path.
    ///
    /// A missing file is not an error when `required` is false, in which case
    /// the default configuration is returned.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists but cannot be read, or
    ///   if it is missing while being `required`.
    /// - Return [`ConfigError::Deserialize`] if file contents are invalid.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => {
                debug!("load configuration from {:?}", path.display());
                data.parse()
            }
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                debug!("no configuration at {:?}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on program path and exported values.
        config.git.program = expand(config.git.program.to_string_lossy().as_ref())?.into();
        for value in config.env.values_mut() {
            *value = expand(value)?;
        }

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Prompt rendering settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Top-level prompt template.
    pub template: String,

    /// Format of version control segment.
    pub vcs_format: String,

    /// Format of command duration segment.
    pub duration_format: String,

    /// Marker substituted for `{dirty}` when work tree has tracked changes.
    pub dirty_marker: String,

    /// Elapsed times below this threshold are not displayed.
    pub min_duration_ms: u64,
}

impl PromptSettings {
    /// Display threshold as a [`Duration`].
    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min_duration_ms)
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            template: "{cwd} {vcs}{duration}{newline}> ".into(),
            vcs_format: "({label}{dirty}) ".into(),
            duration_format: "took {duration} ".into(),
            dirty_marker: "*".into(),
            min_duration_ms: 0,
        }
    }
}

/// Git invocation settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitSettings {
    /// Git binary to invoke.
    pub program: PathBuf,

    /// Upper bound for each Git subprocess in milliseconds.
    pub timeout_ms: u64,
}

impl GitSettings {
    /// Per-subprocess timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: "git".into(),
            timeout_ms: 500,
        }
    }
}

fn expand(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)
        .map_err(ConfigError::ShellExpansion)?
        .into_owned())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
