// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Prompt template rendering.
//!
//! Templates are plain strings with `{name}` placeholders. The top-level
//! template understands `{cwd}`, `{vcs}`, `{duration}`, and `{newline}`. The
//! version control segment has its own template with `{label}` and `{dirty}`,
//! and the duration segment has its own template with `{duration}`. A segment
//! with nothing to show renders as an empty string, template text included.
//!
//! Unknown placeholders are left as-is, so literal braces mostly survive.
//!
//! Literal template text is handed to the shell untouched, which lets users
//! embed their shell's own prompt escapes like `%~` in zsh or `\w` in bash.
//! Only the values we substitute in are escaped for the target shell.

use crate::{config::PromptSettings, hook::Shell, probe::RepoStatus};

/// Everything a single prompt needs to be rendered.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// Working directory for display.
    pub cwd: &'a str,

    /// Repository status of working directory.
    pub status: &'a RepoStatus,

    /// Formatted duration of the last command.
    pub duration: Option<&'a str>,
}

/// Render prompt for target shell.
pub fn render(settings: &PromptSettings, context: PromptContext<'_>, shell: Option<Shell>) -> String {
    let vcs = render_vcs(settings, context.status, shell);
    let duration = context
        .duration
        .map(|duration| {
            interpolate(&settings.duration_format, |key| match key {
                "duration" => Some(escape(duration, shell)),
                _ => None,
            })
        })
        .unwrap_or_default();

    interpolate(&settings.template, |key| match key {
        "cwd" => Some(escape(context.cwd, shell)),
        "vcs" => Some(vcs.clone()),
        "duration" => Some(duration.clone()),
        "newline" => Some("\n".into()),
        _ => None,
    })
}

fn render_vcs(settings: &PromptSettings, status: &RepoStatus, shell: Option<Shell>) -> String {
    if !status.in_repo || status.label.is_empty() {
        return String::new();
    }

    interpolate(&settings.vcs_format, |key| match key {
        "label" => Some(escape(&status.label, shell)),
        "dirty" if status.is_dirty => Some(settings.dirty_marker.clone()),
        "dirty" => Some(String::new()),
        _ => None,
    })
}

/// Substitute `{name}` placeholders through `lookup`.
///
/// Placeholders that `lookup` does not know are kept verbatim.
pub fn interpolate(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(['{', '}']).filter(|&idx| after[idx..].starts_with('}')) else {
            output.push('{');
            rest = after;
            continue;
        };

        let key = &after[..close];
        match lookup(key) {
            Some(value) => output.push_str(&value),
            None => {
                output.push('{');
                output.push_str(key);
                output.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    output.push_str(rest);

    output
}

/// Escape substituted value so target shell displays it literally.
pub fn escape(value: &str, shell: Option<Shell>) -> String {
    match shell {
        Some(Shell::Zsh) => value.replace('%', "%%"),
        // INVARIANT: Bash decodes prompt escapes, then expands inside double quotes.
        Some(Shell::Bash) => value
            .replace('\\', r"\\\\")
            .replace('$', r"\\$")
            .replace('`', r"\\`"),
        Some(Shell::Fish) | None => value.to_string(),
    }
}
