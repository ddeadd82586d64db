// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Migrate developer CLI tools to the XDG Base Directory layout.
//!
//! Four tools are managed: mycli, pgcli, docker, and k9s. For each one the
//! crate can resolve the expected XDG paths, create the directory
//! structure, back up and copy legacy dotfiles into place, seed a config
//! template, drop a backward-compatibility symlink, emit a shell script
//! exporting the matching environment variables, and verify the result.
//!
//! # See Also
//!
//! - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)

pub mod envscript;
pub mod migrate;
pub mod path;
pub mod probe;
pub mod registry;
pub mod template;
pub mod verify;

pub use migrate::{MigrateError, MigrationSummary, Migrator};
pub use path::{home_dir, OsFamily, XdgPaths};
pub use probe::{ToolProbe, VersionFlagProbe};
pub use registry::{Registry, ToolSpec};
pub use verify::{CheckStatus, ComplianceCheck, Verifier};
