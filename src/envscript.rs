// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Environment script emission.
//!
//! Serialize the resolved XDG base paths and every tool's environment
//! variables into a shell script the user can source. The script is pure
//! `export` statements, so re-running it is always safe; directory
//! creation belongs to the migration executor, not here.

use crate::{path::XdgPaths, registry::Registry};

use std::{fs, path::{Path, PathBuf}};
use tracing::debug;

/// Default location of the generated script.
pub fn default_script_path(paths: &XdgPaths) -> PathBuf {
    paths.data_home.join("xdg-shift").join("xdg-env.sh")
}

/// Render the environment script for every registered tool.
pub fn render(paths: &XdgPaths, registry: &Registry) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        "# XDG Base Directory environment variables.".to_string(),
        "# Generated by xdg-migrate; sourcing twice is harmless.".to_string(),
        String::new(),
        "# XDG base paths".to_string(),
    ];

    for (var, value) in paths.as_vars() {
        lines.push(format!("export {}=\"{}\"", var, value.display()));
    }

    for tool in registry.iter() {
        if tool.env_vars.is_empty() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("# {}", tool.name));
        for (var, value) in &tool.env_vars {
            lines.push(format!("export {}=\"{}\"", var, value.display()));
        }
    }

    lines.push(String::new());
    lines.push("echo 'XDG environment variables set'".to_string());
    lines.push(
        "echo 'Restart your shell or source this file from your shell rc to persist'".to_string(),
    );
    lines.push(String::new());

    lines.join("\n")
}

/// Write the script and mark it executable on POSIX.
///
/// # Errors
///
/// - Return [`EnvScriptError::CreateDir`] if the parent directory cannot
///   be created.
/// - Return [`EnvScriptError::WriteScript`] if the script cannot be
///   written.
/// - Return [`EnvScriptError::SetPermissions`] if the execute bit cannot
///   be set.
pub fn write_to(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent).map_err(|err| EnvScriptError::CreateDir {
            source: err,
            path: parent.to_path_buf(),
        })?;
    }

    fs::write(path, content).map_err(|err| EnvScriptError::WriteScript {
        source: err,
        path: path.to_path_buf(),
    })?;

    set_executable(path)?;
    debug!("environment script rendered at {}", path.display());

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|err| {
        EnvScriptError::SetPermissions {
            source: err,
            path: path.to_path_buf(),
        }
    })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// All possible error types for script emission.
#[derive(Debug, thiserror::Error)]
pub enum EnvScriptError {
    /// Script directory cannot be created.
    #[error("failed to create script directory at {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Script file cannot be written to.
    #[error("failed to write environment script to {:?}", path.display())]
    WriteScript {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Execute permission cannot be set on script.
    #[error("failed to set execute permission on {:?}", path.display())]
    SetPermissions {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = EnvScriptError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::OsFamily;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture() -> (XdgPaths, Registry) {
        let home = PathBuf::from("/home/ferris");
        let paths = XdgPaths::resolve(OsFamily::Posix, &home, |_| None);
        let registry = Registry::builtin(&paths, &home);
        (paths, registry)
    }

    #[test]
    fn render_exports_base_and_tool_variables() {
        let (paths, registry) = fixture();

        let result = render(&paths, &registry);
        let expect = indoc! {r#"
            #!/bin/bash
            # XDG Base Directory environment variables.
            # Generated by xdg-migrate; sourcing twice is harmless.

            # XDG base paths
            export XDG_CONFIG_HOME="/home/ferris/.config"
            export XDG_DATA_HOME="/home/ferris/.local/share"
            export XDG_STATE_HOME="/home/ferris/.local/state"
            export XDG_CACHE_HOME="/home/ferris/.cache"

            # mycli
            export MYCLI_HISTFILE="/home/ferris/.local/state/mycli/history"
            export MYCLI_CONFIG_DIR="/home/ferris/.config/mycli"

            # pgcli
            export PGCLIRC="/home/ferris/.config/pgcli/config"
            export PGCLI_HISTFILE="/home/ferris/.local/state/pgcli/history"

            # docker
            export DOCKER_CONFIG="/home/ferris/.config/docker"
            export DOCKER_DATA_HOME="/home/ferris/.local/share/docker"

            # k9s
            export K9SCONFIG="/home/ferris/.config/k9s"
            export K9S_DATA_HOME="/home/ferris/.local/share/k9s"

            echo 'XDG environment variables set'
            echo 'Restart your shell or source this file from your shell rc to persist'
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn default_script_path_sits_under_data_home() {
        let (paths, _) = fixture();

        assert_eq!(
            default_script_path(&paths),
            PathBuf::from("/home/ferris/.local/share/xdg-shift/xdg-env.sh")
        );
    }

    #[test]
    fn write_creates_parent_directories() {
        let root = TempDir::new().unwrap();
        let script = root.path().join("generated").join("xdg-env.sh");

        write_to(&script, "#!/bin/bash\n").unwrap();

        assert_eq!(fs::read_to_string(&script).unwrap(), "#!/bin/bash\n");
    }

    #[cfg(unix)]
    #[test]
    fn write_marks_the_script_executable() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let script = root.path().join("xdg-env.sh");

        write_to(&script, "#!/bin/bash\n").unwrap();

        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
