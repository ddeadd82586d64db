// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! XDG base directory resolution.
//!
//! Determine the four XDG base paths (config, data, state, cache) for the
//! current user from environment variables, falling back to per-platform
//! defaults when a variable is unset or empty.

use std::path::{Path, PathBuf};

/// Operating system family the resolver targets.
///
/// Windows hosts map the XDG paths onto `AppData\Local`; everything else
/// gets the standard POSIX defaults. A POSIX-emulation shell on Windows
/// (MSYS) still counts as Windows, since the underlying filesystem layout
/// is the Windows one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Posix,
}

impl OsFamily {
    /// Detect the OS family of the running process.
    ///
    /// Windows if compiled for Windows, or if the `MSYSTEM` environment
    /// variable carries the MSYS emulation marker.
    pub fn detect() -> Self {
        let msys_marker = std::env::var("MSYSTEM")
            .map(|value| value.contains("MSYS"))
            .unwrap_or(false);

        if cfg!(windows) || msys_marker {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }
}

/// Resolved XDG base directory set.
///
/// Resolved once per invocation, immutable afterwards. No check is made
/// that the paths are writable; failures surface later when directories
/// get created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdgPaths {
    pub config_home: PathBuf,
    pub data_home: PathBuf,
    pub state_home: PathBuf,
    pub cache_home: PathBuf,
}

impl XdgPaths {
    /// Resolve XDG base paths from the live process environment.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory path cannot be determined.
    pub fn from_env() -> Result<Self> {
        let home = home_dir()?;
        Ok(Self::resolve(OsFamily::detect(), &home, |var| {
            std::env::var(var).ok()
        }))
    }

    /// Resolve XDG base paths from an explicit environment.
    ///
    /// Each base path uses the looked-up variable verbatim when it is set
    /// and non-empty, and the OS family default otherwise.
    pub fn resolve<F>(family: OsFamily, home: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, default: PathBuf| match lookup(var) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => default,
        };

        match family {
            OsFamily::Windows => Self {
                config_home: pick("XDG_CONFIG_HOME", home.join("AppData").join("Local")),
                data_home: pick("XDG_DATA_HOME", home.join("AppData").join("Local")),
                state_home: pick(
                    "XDG_STATE_HOME",
                    home.join("AppData").join("Local").join("State"),
                ),
                cache_home: pick(
                    "XDG_CACHE_HOME",
                    home.join("AppData").join("Local").join("Temp"),
                ),
            },
            OsFamily::Posix => Self {
                config_home: pick("XDG_CONFIG_HOME", home.join(".config")),
                data_home: pick("XDG_DATA_HOME", home.join(".local").join("share")),
                state_home: pick("XDG_STATE_HOME", home.join(".local").join("state")),
                cache_home: pick("XDG_CACHE_HOME", home.join(".cache")),
            },
        }
    }

    /// Expected value of each base XDG variable, config through cache.
    pub fn as_vars(&self) -> [(&'static str, &Path); 4] {
        [
            ("XDG_CONFIG_HOME", self.config_home.as_path()),
            ("XDG_DATA_HOME", self.data_home.as_path()),
            ("XDG_STATE_HOME", self.state_home.as_path()),
            ("XDG_CACHE_HOME", self.cache_home.as_path()),
        ]
    }
}

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
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test_case(
        OsFamily::Posix,
        &[".config", ".local/share", ".local/state", ".cache"];
        "posix defaults"
    )]
    #[test_case(
        OsFamily::Windows,
        &["AppData/Local", "AppData/Local", "AppData/Local/State", "AppData/Local/Temp"];
        "windows defaults"
    )]
    #[test]
    fn resolve_defaults_when_unset(family: OsFamily, expect: &[&str]) {
        let home = PathBuf::from("/home/ferris");
        let result = XdgPaths::resolve(family, &home, no_env);

        assert_eq!(result.config_home, home.join(expect[0]));
        assert_eq!(result.data_home, home.join(expect[1]));
        assert_eq!(result.state_home, home.join(expect[2]));
        assert_eq!(result.cache_home, home.join(expect[3]));
    }

    #[test_case(OsFamily::Posix; "posix")]
    #[test_case(OsFamily::Windows; "windows")]
    #[test]
    fn resolve_echoes_environment_verbatim(family: OsFamily) {
        let lookup = |var: &str| Some(format!("/custom/{}", var.to_lowercase()));
        let result = XdgPaths::resolve(family, Path::new("/home/ferris"), lookup);

        assert_eq!(result.config_home, PathBuf::from("/custom/xdg_config_home"));
        assert_eq!(result.data_home, PathBuf::from("/custom/xdg_data_home"));
        assert_eq!(result.state_home, PathBuf::from("/custom/xdg_state_home"));
        assert_eq!(result.cache_home, PathBuf::from("/custom/xdg_cache_home"));
    }

    #[test_case(OsFamily::Posix; "posix")]
    #[test_case(OsFamily::Windows; "windows")]
    #[test]
    fn resolve_treats_empty_value_as_unset(family: OsFamily) {
        let home = PathBuf::from("/home/ferris");
        let empty = |_: &str| Some(String::new());

        let result = XdgPaths::resolve(family, &home, empty);
        let expect = XdgPaths::resolve(family, &home, no_env);

        assert_eq!(result, expect);
    }

    #[test]
    fn as_vars_lists_config_through_cache() {
        let paths = XdgPaths::resolve(OsFamily::Posix, Path::new("/home/ferris"), no_env);
        let names = paths.as_vars().map(|(name, _)| name);

        assert_eq!(
            names,
            [
                "XDG_CONFIG_HOME",
                "XDG_DATA_HOME",
                "XDG_STATE_HOME",
                "XDG_CACHE_HOME"
            ]
        );
    }

    #[sealed_test(env = [("MSYSTEM", "MSYS")])]
    fn detect_treats_msys_marker_as_windows() {
        assert_eq!(OsFamily::detect(), OsFamily::Windows);
    }

    #[sealed_test]
    fn detect_without_emulation_marker_matches_build_target() {
        std::env::remove_var("MSYSTEM");
        let expect = if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Posix
        };

        assert_eq!(OsFamily::detect(), expect);
    }
}
