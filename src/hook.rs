// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell integration.
//!
//! The host shell drives the prompt cycle. Oxiprompt only needs two hooks
//! from it: one that fires right before a command executes, and one that
//! fires right before the prompt is drawn. The first hook records a start
//! timestamp in `OXIPROMPT_START`. The second hook hands that timestamp back
//! to `oxiprompt prompt`, and then unsets it so an empty command line shows no
//! duration.
//!
//! Besides the hooks, the generated script also exports environment
//! variables, and defines aliases listed in the configuration file.
//!
//! # Usage
//!
//! ```text
//! # ~/.zshrc
//! eval "$(oxiprompt init zsh)"
//!
//! # ~/.bashrc
//! eval "$(oxiprompt init bash)"
//!
//! # ~/.config/fish/config.fish
//! oxiprompt init fish | source
//! ```

use crate::config::Config;

use std::{
    fmt::{Display, Formatter, Result as FmtResult, Write},
    path::Path,
};

/// Supported host shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Shell {
    Zsh,
    Bash,
    Fish,
}

impl Display for Shell {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::Fish => "fish",
        })
    }
}

/// Generate initialization script for target shell.
///
/// The script calls back into the binary at `exe`.
pub fn init_script(shell: Shell, exe: &Path, config: &Config) -> String {
    let exe = quote(shell, &exe.to_string_lossy());
    let mut script = String::new();

    for (name, value) in &config.env {
        let value = quote(shell, value);
        let _ = match shell {
            Shell::Zsh | Shell::Bash => writeln!(script, "export {name}={value}"),
            Shell::Fish => writeln!(script, "set -gx {name} {value}"),
        };
    }

    for (name, value) in &config.aliases {
        let value = quote(shell, value);
        let _ = match shell {
            Shell::Zsh | Shell::Bash => writeln!(script, "alias {name}={value}"),
            Shell::Fish => writeln!(script, "alias {name} {value}"),
        };
    }

    let hooks = match shell {
        Shell::Zsh => ZSH_HOOKS,
        Shell::Bash => BASH_HOOKS,
        Shell::Fish => FISH_HOOKS,
    };
    script.push_str(&hooks.replace("@OXIPROMPT@", &exe));

    script
}

/// Quote value as a single literal word for target shell.
pub fn quote(shell: Shell, value: &str) -> String {
    match shell {
        Shell::Zsh | Shell::Bash => format!("'{}'", value.replace('\'', r"'\''")),
        Shell::Fish => format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'")),
    }
}

// INVARIANT: PROMPT only refers to the rendered prompt, so repository data
// is never scanned for substitutions. The trailing dot survives command
// substitution, which would otherwise strip a final newline.
const ZSH_HOOKS: &str = r#"_oxiprompt_preexec() {
    OXIPROMPT_START="$(@OXIPROMPT@ now)"
}

_oxiprompt_precmd() {
    _oxiprompt_ps1="$(@OXIPROMPT@ prompt --shell zsh ${OXIPROMPT_START:+--start=$OXIPROMPT_START}; print -n .)"
    _oxiprompt_ps1="${_oxiprompt_ps1%.}"
    unset OXIPROMPT_START
}

autoload -Uz add-zsh-hook
add-zsh-hook preexec _oxiprompt_preexec
add-zsh-hook precmd _oxiprompt_precmd
setopt prompt_subst
PROMPT='${_oxiprompt_ps1}'
"#;

// INVARIANT: The DEBUG trap also fires for PROMPT_COMMAND. Only the first
// command after a prompt is drawn may record a start timestamp, so nothing
// is recorded before the first prompt.
const BASH_HOOKS: &str = r#"_oxiprompt_armed=

_oxiprompt_preexec() {
    [[ -n "$_oxiprompt_armed" && "$BASH_COMMAND" != _oxiprompt_precmd ]] || return 0
    _oxiprompt_armed=
    OXIPROMPT_START="$(@OXIPROMPT@ now)"
}

_oxiprompt_precmd() {
    _oxiprompt_armed=
    _oxiprompt_ps1="$(@OXIPROMPT@ prompt --shell bash ${OXIPROMPT_START:+--start=$OXIPROMPT_START}; printf .)"
    _oxiprompt_ps1="${_oxiprompt_ps1%.}"
    unset OXIPROMPT_START
}

_oxiprompt_arm() {
    _oxiprompt_armed=1
}

trap '_oxiprompt_preexec' DEBUG
PROMPT_COMMAND="_oxiprompt_precmd${PROMPT_COMMAND:+;$PROMPT_COMMAND};_oxiprompt_arm"
PS1='${_oxiprompt_ps1@P}'
"#;

const FISH_HOOKS: &str = r#"function __oxiprompt_preexec --on-event fish_preexec
    set -g OXIPROMPT_START (@OXIPROMPT@ now)
end

function fish_prompt
    if set -q OXIPROMPT_START
        @OXIPROMPT@ prompt --shell fish --start=$OXIPROMPT_START
    else
        @OXIPROMPT@ prompt --shell fish
    end
    set -e OXIPROMPT_START
end
"#;
