// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Migration execution.
//!
//! The executor walks each requested tool through the same sequence:
//! create its XDG directories, back up and copy legacy paths into the new
//! layout, seed a config template when no config exists yet, and drop a
//! backward-compatibility symlink where the tool still expects its old
//! location.
//!
//! # Failure Semantics
//!
//! Filesystem errors are caught at the smallest possible scope. A failed
//! copy of one legacy path never stops the remaining paths, and a failed
//! tool never stops the remaining tools. A tool reports partial success as
//! a warning rather than a hard failure; only legacy-path migration errors
//! flip its success flag.
//!
//! # Backups
//!
//! Every legacy path is copied (never moved) to a sibling `.backup` path
//! before migration. When a backup already exists the suffix counts up:
//! `P.backup`, `P.backup.1`, `P.backup.2`, until a free name is found.

use crate::{
    envscript,
    path::{OsFamily, XdgPaths},
    probe::{ToolProbe, VersionFlagProbe},
    registry::{LinkTarget, Registry, ToolSpec},
    template,
};

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, warn};

/// Per-tool migration driver.
pub struct Migrator<P = VersionFlagProbe>
where
    P: ToolProbe,
{
    paths: XdgPaths,
    family: OsFamily,
    home: PathBuf,
    template_dir: Option<PathBuf>,
    dry_run: bool,
    probe: P,
}

impl Migrator {
    pub fn new(paths: XdgPaths, family: OsFamily, home: PathBuf) -> Self {
        Self::with_probe(paths, family, home, VersionFlagProbe::new())
    }
}

impl<P> Migrator<P>
where
    P: ToolProbe,
{
    pub fn with_probe(paths: XdgPaths, family: OsFamily, home: PathBuf, probe: P) -> Self {
        Self {
            paths,
            family,
            home,
            template_dir: None,
            dry_run: false,
            probe,
        }
    }

    /// Read config templates from `dir` instead of the embedded defaults.
    pub fn template_dir(mut self, dir: PathBuf) -> Self {
        self.template_dir = Some(dir);
        self
    }

    /// Log every planned operation without touching the filesystem.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Create the four base XDG directories themselves.
    pub fn init_base_dirs(&self) {
        info!("creating base XDG directories");
        for dir in [
            &self.paths.config_home,
            &self.paths.data_home,
            &self.paths.state_home,
            &self.paths.cache_home,
        ] {
            self.mkdir(dir);
        }
    }

    /// Migrate every selected tool and emit the environment script.
    ///
    /// # Errors
    ///
    /// - Return [`MigrateError::NoMatchingTools`] if a non-empty request
    ///   matched no registered tool.
    /// - Return [`MigrateError::Script`] if the environment script cannot
    ///   be written.
    pub fn run(
        &self,
        registry: &Registry,
        requested: &[String],
        script_out: Option<PathBuf>,
    ) -> Result<MigrationSummary> {
        let selected = registry.select(requested);
        if selected.is_empty() {
            return Err(MigrateError::NoMatchingTools {
                available: registry.names().iter().map(ToString::to_string).collect(),
            });
        }

        info!("resolved XDG base directories:");
        info!("  config: {}", self.paths.config_home.display());
        info!("  data:   {}", self.paths.data_home.display());
        info!("  state:  {}", self.paths.state_home.display());
        info!("  cache:  {}", self.paths.cache_home.display());

        let mut results = Vec::new();
        for tool in selected {
            results.push((tool.name.to_string(), self.migrate_tool(tool)));
        }

        let script_path =
            script_out.unwrap_or_else(|| envscript::default_script_path(&self.paths));
        if self.dry_run {
            info!("would write environment script to {}", script_path.display());
        } else {
            let script = envscript::render(&self.paths, registry);
            envscript::write_to(&script_path, &script)?;
            info!("environment script written to {}", script_path.display());
        }

        Ok(MigrationSummary {
            results,
            script_path,
        })
    }

    /// Run the full migration sequence for one tool.
    ///
    /// Returns the tool's overall success flag.
    pub fn migrate_tool(&self, tool: &ToolSpec) -> bool {
        info!("migrating {}", tool.name);

        if self.probe.is_invocable(tool.name) {
            info!("{} is installed, performing full migration", tool.name);
        } else {
            info!(
                "{} is not installed, scaffolding XDG directories and config template",
                tool.name
            );
        }

        let mut clean = self.create_tool_dirs(tool);

        for old in &tool.old_paths {
            if !old.exists() {
                debug!("legacy path absent, nothing to do: {}", old.display());
                continue;
            }

            // Safety copy first; migration proceeds even if it failed.
            self.backup(old);

            match self.route(tool, old) {
                Route::File(target) => {
                    if !self.migrate_path(old, &target) {
                        clean = false;
                    }
                }
                Route::DirContents(dir) => match fs::read_dir(old) {
                    Ok(entries) => {
                        for entry in entries.flatten() {
                            let target = dir.join(entry.file_name());
                            if !self.migrate_path(&entry.path(), &target) {
                                clean = false;
                            }
                        }
                    }
                    Err(err) => {
                        error!("cannot list legacy directory {}: {err}", old.display());
                        clean = false;
                    }
                },
            }
        }

        if !self.install_template(tool) {
            warn!("config template installation failed for {}", tool.name);
        }

        if tool.requires_symlink {
            self.install_symlink(tool);
        }

        info!("{} environment variables:", tool.name);
        for (var, value) in &tool.env_vars {
            info!("  export {}=\"{}\"", var, value.display());
        }

        if clean {
            info!("{} migration complete", tool.name);
        } else {
            warn!("{} migration partially succeeded, check the log", tool.name);
        }

        clean
    }

    fn create_tool_dirs(&self, tool: &ToolSpec) -> bool {
        let mut clean = true;
        let extras = tool.extra_subdirs.iter().map(PathBuf::as_path);

        for dir in tool.xdg_dirs().into_iter().chain(extras) {
            if !self.mkdir(dir) {
                clean = false;
            }
        }

        clean
    }

    fn mkdir(&self, dir: &Path) -> bool {
        if self.dry_run {
            info!("would create directory {}", dir.display());
            return true;
        }

        match mkdirp::mkdirp(dir) {
            Ok(_) => {
                info!("created directory {}", dir.display());
                true
            }
            Err(err) => {
                error!("cannot create directory {}: {err}", dir.display());
                false
            }
        }
    }

    /// Copy `old` to the next free `.backup` sibling.
    fn backup(&self, old: &Path) -> Option<PathBuf> {
        let destination = backup_destination(old);
        if self.dry_run {
            info!(
                "would back up {} -> {}",
                old.display(),
                destination.display()
            );
            return None;
        }

        match copy_recursive(old, &destination) {
            Ok(()) => {
                info!("backed up {} -> {}", old.display(), destination.display());
                Some(destination)
            }
            Err(err) => {
                error!("backup of {} failed: {err}", old.display());
                None
            }
        }
    }

    /// Decide where a legacy path lands in the XDG layout.
    fn route(&self, tool: &ToolSpec, old: &Path) -> Route {
        let name = old
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stripped = name.trim_start_matches('.').to_string();

        match tool.name {
            "mycli" => {
                let state = tool.state_dir.as_deref().unwrap_or(&tool.config_dir);
                let cache = tool.cache_dir.as_deref().unwrap_or(&tool.config_dir);

                if name.contains("myclirc") {
                    Route::File(tool.config_dir.join("myclirc"))
                } else if name.contains("history") {
                    Route::File(state.join("history"))
                } else if name.contains("log") {
                    Route::File(cache.join("mycli.log"))
                } else {
                    Route::File(tool.config_dir.join(stripped))
                }
            }
            "docker" if old.is_dir() => Route::DirContents(tool.config_dir.clone()),
            _ => Route::File(tool.config_dir.join(stripped)),
        }
    }

    /// Copy one legacy path to its target, never overwriting.
    fn migrate_path(&self, old: &Path, target: &Path) -> bool {
        if old.is_dir() && target.starts_with(old) {
            warn!(
                "refusing to migrate {} into itself, skipping",
                old.display()
            );
            return true;
        }

        if self.dry_run {
            info!("would migrate {} -> {}", old.display(), target.display());
            return true;
        }

        if target.exists() {
            warn!(
                "migration target already exists, leaving it in place: {}",
                target.display()
            );
            return true;
        }

        if let Some(parent) = target.parent() {
            if let Err(err) = mkdirp::mkdirp(parent) {
                error!("cannot create directory {}: {err}", parent.display());
                return false;
            }
        }

        match copy_recursive(old, target) {
            Ok(()) => {
                info!("migrated {} -> {}", old.display(), target.display());
                true
            }
            Err(err) => {
                error!(
                    "failed to migrate {} -> {}: {err}",
                    old.display(),
                    target.display()
                );
                false
            }
        }
    }

    /// Seed the tool's canonical config from its template, if absent.
    fn install_template(&self, tool: &ToolSpec) -> bool {
        let target = tool.config_file_path();
        if target.exists() {
            info!(
                "config already present, skipping template: {}",
                target.display()
            );
            return true;
        }

        let content = match &self.template_dir {
            Some(dir) => {
                let path = dir.join(tool.template);
                match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(err) => {
                        warn!("config template not readable at {}: {err}", path.display());
                        return false;
                    }
                }
            }
            None => match template::builtin(tool.name) {
                Some(content) => content.to_owned(),
                None => {
                    warn!("no built-in config template for {}", tool.name);
                    return false;
                }
            },
        };

        let rendered = template::render(&content, &self.paths, tool, self.family);

        if self.dry_run {
            info!("would install config template at {}", target.display());
            return true;
        }

        if let Some(parent) = target.parent() {
            if let Err(err) = mkdirp::mkdirp(parent) {
                error!("cannot create directory {}: {err}", parent.display());
                return false;
            }
        }

        match fs::write(&target, rendered) {
            Ok(()) => {
                info!("installed config template: {}", target.display());
                true
            }
            Err(err) => {
                error!(
                    "failed to install config template at {}: {err}",
                    target.display()
                );
                false
            }
        }
    }

    /// Create the backward-compatibility symlink at the legacy location.
    fn install_symlink(&self, tool: &ToolSpec) -> bool {
        let Some(link) = tool.old_paths.first() else {
            return true;
        };
        let target = tool.link_target_path();

        match tool.link_target {
            LinkTarget::ConfigFile => {
                // Nothing to point at yet; a dangling link helps nobody.
                if self.dry_run || target.exists() {
                    self.link_with_fallback(&target, link)
                } else {
                    debug!(
                        "no config at {}, skipping compatibility link",
                        target.display()
                    );
                    true
                }
            }
            LinkTarget::ConfigDir => {
                // A real legacy directory stays put; only a free slot or a
                // stale link gets replaced.
                if self.dry_run || !link.exists() || link.is_symlink() {
                    self.link_with_fallback(&target, link)
                } else {
                    debug!(
                        "legacy directory still present at {}, not replacing it with a link",
                        link.display()
                    );
                    true
                }
            }
        }
    }

    fn link_with_fallback(&self, target: &Path, link: &Path) -> bool {
        if link.is_symlink() && fs::read_link(link).ok().as_deref() == Some(target) {
            info!(
                "symlink already in place: {} -> {}",
                link.display(),
                target.display()
            );
            return true;
        }

        if self.dry_run {
            info!("would link {} -> {}", link.display(), target.display());
            return true;
        }

        // Move anything occupying the link location aside first.
        if link.is_symlink() {
            if let Err(err) = remove_symlink(link) {
                error!("cannot remove stale symlink {}: {err}", link.display());
                return false;
            }
        } else if link.exists() {
            let aside = backup_destination(link);
            match fs::rename(link, &aside) {
                Ok(()) => info!("moved {} aside to {}", link.display(), aside.display()),
                Err(err) => {
                    error!("cannot move {} aside: {err}", link.display());
                    return false;
                }
            }
        }

        match symlink(target, link) {
            Ok(()) => {
                info!("linked {} -> {}", link.display(), target.display());
                true
            }
            Err(err) => {
                error!(
                    "failed to link {} -> {}: {err}",
                    link.display(),
                    target.display()
                );
                // Best effort so XDG-unaware tools still find a config.
                if target.is_file() {
                    match fs::copy(target, link) {
                        Ok(_) => {
                            warn!("copied {} instead of linking", target.display());
                            true
                        }
                        Err(err) => {
                            error!("fallback copy failed: {err}");
                            false
                        }
                    }
                } else {
                    false
                }
            }
        }
    }
}

/// Where one legacy path migrates to.
enum Route {
    /// Copy the path itself to the target.
    File(PathBuf),

    /// Copy the directory's contents item by item into the target.
    DirContents(PathBuf),
}

/// Per-run migration outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Per-tool success flags, in migration order.
    pub results: Vec<(String, bool)>,

    /// Where the environment script was (or would be) written.
    pub script_path: PathBuf,
}

impl MigrationSummary {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|(_, success)| *success)
    }
}

/// Next free `.backup` sibling for `path`.
///
/// Yields `P.backup`, then `P.backup.1`, `P.backup.2`, counting up until a
/// free name is found.
pub fn backup_destination(path: &Path) -> PathBuf {
    let mut candidate = with_suffix(path, ".backup");
    let mut counter = 1;
    while candidate.exists() || candidate.is_symlink() {
        candidate = with_suffix(path, &format!(".backup.{counter}"));
        counter += 1;
    }

    candidate
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn copy_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dst)?;
    }

    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> std::io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> std::io::Result<()> {
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}

/// All possible error types for migration runs.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A non-empty tool request matched nothing in the registry.
    #[error("none of the requested tools can be migrated (available: {})", available.join(", "))]
    NoMatchingTools { available: Vec<String> },

    /// The environment script could not be produced.
    #[error(transparent)]
    Script(#[from] crate::envscript::EnvScriptError),
}

/// Friendly result alias :3
pub type Result<T, E = MigrateError> = std::result::Result<T, E>;
