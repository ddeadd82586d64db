// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Built-in tool migration descriptors.
//!
//! A __migration descriptor__ records everything needed to move one tool
//! from its legacy dotfile locations into the XDG Base Directory layout:
//! which legacy paths to inspect, which XDG directories to create, which
//! config template seeds a fresh install, whether the tool needs a
//! backward-compatibility symlink, and which environment variables make the
//! tool honor the new locations.
//!
//! The registry is static: exactly four tools are managed (mycli, pgcli,
//! docker, k9s). Supporting a new tool means adding a descriptor here, not
//! changing any algorithm.

use crate::path::XdgPaths;

use std::path::{Path, PathBuf};
use tracing::warn;

/// What the backward-compatibility symlink points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// The tool's canonical config file inside its XDG config directory.
    ConfigFile,

    /// The tool's whole XDG config directory.
    ConfigDir,
}

/// Migration descriptor for one managed tool.
///
/// Constructed once at startup from the resolved [`XdgPaths`]; never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Tool identifier, unique key in the registry.
    pub name: &'static str,

    /// Legacy filesystem locations to inspect, in order. Empty when the
    /// tool is already XDG-native.
    pub old_paths: Vec<PathBuf>,

    /// XDG config directory for the tool. Always present.
    pub config_dir: PathBuf,

    pub data_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,

    /// Canonical config file name inside `config_dir`.
    pub config_file: &'static str,

    /// Template file name used to seed a fresh config.
    pub template: &'static str,

    /// Whether a backward-compatibility symlink must be created at the
    /// first legacy location.
    pub requires_symlink: bool,

    /// What the symlink points at when one is required.
    pub link_target: LinkTarget,

    /// Whether the tool resolves XDG paths natively. Informational; only
    /// softens verifier messaging.
    pub native_xdg_support: bool,

    /// Environment variables the tool needs to honor the new layout, in
    /// emission order.
    pub env_vars: Vec<(&'static str, PathBuf)>,

    /// Extra directories to create beyond the four XDG paths.
    pub extra_subdirs: Vec<PathBuf>,
}

impl ToolSpec {
    /// Absolute path of the tool's canonical config file.
    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(self.config_file)
    }

    /// Every XDG directory the executor must create for this tool.
    pub fn xdg_dirs(&self) -> Vec<&Path> {
        let mut dirs = vec![self.config_dir.as_path()];
        dirs.extend(self.data_dir.as_deref());
        dirs.extend(self.state_dir.as_deref());
        dirs.extend(self.cache_dir.as_deref());
        dirs
    }

    /// Path the back-compat symlink (and the verifier) resolve to.
    pub fn link_target_path(&self) -> PathBuf {
        match self.link_target {
            LinkTarget::ConfigFile => self.config_file_path(),
            LinkTarget::ConfigDir => self.config_dir.clone(),
        }
    }
}

/// Static lookup from tool name to migration descriptor.
pub struct Registry {
    tools: Vec<ToolSpec>,
}

impl Registry {
    /// Construct descriptors for the four managed tools.
    pub fn builtin(paths: &XdgPaths, home: &Path) -> Self {
        let tools = vec![
            ToolSpec {
                name: "mycli",
                old_paths: vec![
                    home.join(".myclirc"),
                    home.join(".mycli.log"),
                    home.join(".mycli-history"),
                ],
                config_dir: paths.config_home.join("mycli"),
                data_dir: None,
                state_dir: Some(paths.state_home.join("mycli")),
                cache_dir: Some(paths.cache_home.join("mycli")),
                config_file: "myclirc",
                template: "mycli.template",
                requires_symlink: true,
                link_target: LinkTarget::ConfigFile,
                native_xdg_support: false,
                env_vars: vec![
                    ("MYCLI_HISTFILE", paths.state_home.join("mycli").join("history")),
                    ("MYCLI_CONFIG_DIR", paths.config_home.join("mycli")),
                ],
                extra_subdirs: vec![],
            },
            ToolSpec {
                name: "pgcli",
                // pgcli already reads XDG paths; the legacy entry only
                // matters for installs that predate that support.
                old_paths: vec![home.join(".config").join("pgcli")],
                config_dir: paths.config_home.join("pgcli"),
                data_dir: None,
                state_dir: Some(paths.state_home.join("pgcli")),
                cache_dir: Some(paths.cache_home.join("pgcli")),
                config_file: "config",
                template: "pgcli.template",
                requires_symlink: false,
                link_target: LinkTarget::ConfigDir,
                native_xdg_support: true,
                env_vars: vec![
                    ("PGCLIRC", paths.config_home.join("pgcli").join("config")),
                    ("PGCLI_HISTFILE", paths.state_home.join("pgcli").join("history")),
                ],
                extra_subdirs: vec![],
            },
            ToolSpec {
                name: "docker",
                old_paths: vec![home.join(".docker")],
                config_dir: paths.config_home.join("docker"),
                data_dir: Some(paths.data_home.join("docker")),
                state_dir: None,
                cache_dir: Some(paths.cache_home.join("docker")),
                config_file: "config.json",
                template: "docker.template",
                requires_symlink: true,
                link_target: LinkTarget::ConfigDir,
                native_xdg_support: false,
                env_vars: vec![
                    ("DOCKER_CONFIG", paths.config_home.join("docker")),
                    ("DOCKER_DATA_HOME", paths.data_home.join("docker")),
                ],
                extra_subdirs: vec![],
            },
            ToolSpec {
                name: "k9s",
                old_paths: vec![],
                config_dir: paths.config_home.join("k9s"),
                data_dir: Some(paths.data_home.join("k9s")),
                state_dir: None,
                cache_dir: Some(paths.cache_home.join("k9s")),
                config_file: "config.yaml",
                template: "k9s.template",
                requires_symlink: false,
                link_target: LinkTarget::ConfigDir,
                native_xdg_support: true,
                env_vars: vec![
                    ("K9SCONFIG", paths.config_home.join("k9s")),
                    ("K9S_DATA_HOME", paths.data_home.join("k9s")),
                ],
                extra_subdirs: vec![paths.data_home.join("k9s").join("skins")],
            },
        ];

        Self { tools }
    }

    /// Retrieve a descriptor by exact tool name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Names of every registered tool, in registry order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolSpec> {
        self.tools.iter()
    }

    /// Pick descriptors for the requested tool names.
    ///
    /// An empty request selects every registered tool. Unknown names are
    /// skipped with a logged warning, never a hard error.
    pub fn select(&self, requested: &[String]) -> Vec<&ToolSpec> {
        if requested.is_empty() {
            return self.tools.iter().collect();
        }

        let mut picked = Vec::new();
        for name in requested {
            match self.get(name) {
                Some(tool) => picked.push(tool),
                None => warn!("no migration descriptor for {name:?}, skipping"),
            }
        }

        picked
    }
}
