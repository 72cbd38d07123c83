// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the configuration file, and
//! shorten paths for display in the prompt.

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/oxiprompt/config.toml` as
/// the default location. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if configuration directory cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("oxiprompt").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Contract leading home directory of `path` into a tilde.
///
/// Paths outside of `home` are returned as-is.
pub fn contract_home(path: &Path, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.display().to_string();
    };

    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".into(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("/home/blah", "~"; "home itself")]
    #[test_case("/home/blah/src/foo", "~/src/foo"; "inside home")]
    #[test_case("/etc/blah", "/etc/blah"; "outside home")]
    #[test_case("/home/blahblah", "/home/blahblah"; "shared prefix")]
    #[test]
    fn contract_home_dir(path: &str, expect: &str) {
        let result = contract_home(Path::new(path), Some(Path::new("/home/blah")));
        pretty_assertions::assert_eq!(result, expect);
    }

    #[test]
    fn contract_without_home() {
        let result = contract_home(Path::new("/home/blah"), None);
        assert_eq!(result, "/home/blah");
    }
}
