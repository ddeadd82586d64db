// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! XDG compliance verification.
//!
//! An independent, read-only pass over the live environment and
//! filesystem. The verifier re-derives the expected XDG layout through the
//! same path resolution the migration executor uses, then reports
//! pass/warn/fail/skip per check without repairing anything.

use crate::{
    path::XdgPaths,
    probe::{ToolProbe, VersionFlagProbe},
    registry::{Registry, ToolSpec},
};

use serde::Serialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Outcome of a single compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

/// One pass/warn/fail/skip assertion about the XDG layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceCheck {
    pub tool: String,
    pub check_name: String,
    pub status: CheckStatus,
    pub message: String,
    pub details: Option<String>,
}

impl ComplianceCheck {
    fn new(
        tool: impl Into<String>,
        check_name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            check_name: check_name.into(),
            status,
            message: message.into(),
            details: None,
        }
    }
}

/// Aggregate check counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
    pub skip: usize,
}

/// Read-only compliance verifier.
pub struct Verifier<'a, P = VersionFlagProbe>
where
    P: ToolProbe,
{
    paths: &'a XdgPaths,
    registry: &'a Registry,
    probe: P,
    checks: Vec<ComplianceCheck>,
}

impl<'a> Verifier<'a> {
    pub fn new(paths: &'a XdgPaths, registry: &'a Registry) -> Self {
        Self::with_probe(paths, registry, VersionFlagProbe::new())
    }
}

impl<'a, P> Verifier<'a, P>
where
    P: ToolProbe,
{
    pub fn with_probe(paths: &'a XdgPaths, registry: &'a Registry, probe: P) -> Self {
        Self {
            paths,
            registry,
            probe,
            checks: Vec::new(),
        }
    }

    /// Run the base environment checks plus every requested tool's checks.
    ///
    /// An empty `tools` request checks every registered tool.
    pub fn run_checks(&mut self, tools: &[String]) {
        self.check_base_variables();
        let registry = self.registry;
        for tool in registry.select(tools) {
            self.check_tool(tool);
        }
    }

    fn check_base_variables(&mut self) {
        let paths = self.paths;
        for (var, expected) in paths.as_vars() {
            self.checks.push(var_check("system", var, expected));
        }
    }

    fn check_tool(&mut self, tool: &ToolSpec) {
        if !self.probe.is_invocable(tool.name) {
            self.checks.push(ComplianceCheck::new(
                tool.name,
                "tool installed",
                CheckStatus::Skip,
                format!("{} is not installed", tool.name),
            ));
            return;
        }

        let location = self.check_location(tool);
        self.checks.push(location);
        for (var, expected) in &tool.env_vars {
            self.checks.push(var_check(tool.name, var, expected));
        }
    }

    /// Where does the tool's config actually live?
    ///
    /// Present at the XDG location, or reachable through a correctly
    /// targeted symlink from the legacy location, is a pass. Present only
    /// at the legacy location is a fail. Present nowhere is a warn.
    fn check_location(&self, tool: &ToolSpec) -> ComplianceCheck {
        let target = tool.link_target_path();

        if target.exists() {
            return ComplianceCheck::new(
                tool.name,
                "config location",
                CheckStatus::Pass,
                format!("config present at XDG path: {}", target.display()),
            );
        }

        if tool.requires_symlink {
            if let Some(legacy) = tool.old_paths.first() {
                if legacy.exists() {
                    let linked = legacy.is_symlink()
                        && fs::read_link(legacy).ok().as_deref() == Some(target.as_path());
                    if linked {
                        return ComplianceCheck::new(
                            tool.name,
                            "config location",
                            CheckStatus::Pass,
                            format!(
                                "XDG path reachable through symlink: {} -> {}",
                                legacy.display(),
                                target.display()
                            ),
                        );
                    }

                    return ComplianceCheck::new(
                        tool.name,
                        "config location",
                        CheckStatus::Fail,
                        format!("config still at legacy path: {}", legacy.display()),
                    );
                }
            }
        }

        let message = if tool.native_xdg_support {
            format!(
                "XDG config not created yet: {} (tool resolves XDG paths natively)",
                target.display()
            )
        } else {
            format!("no config found for {}", tool.name)
        };

        ComplianceCheck::new(tool.name, "config location", CheckStatus::Warn, message)
    }

    pub fn checks(&self) -> &[ComplianceCheck] {
        &self.checks
    }

    /// Overall result: no check with fail status. Warnings do not fail
    /// the run.
    pub fn is_compliant(&self) -> bool {
        !self
            .checks
            .iter()
            .any(|check| check.status == CheckStatus::Fail)
    }

    pub fn summary(&self) -> Summary {
        let count = |status: CheckStatus| {
            self.checks
                .iter()
                .filter(|check| check.status == status)
                .count()
        };

        Summary {
            total: self.checks.len(),
            pass: count(CheckStatus::Pass),
            warn: count(CheckStatus::Warn),
            fail: count(CheckStatus::Fail),
            skip: count(CheckStatus::Skip),
        }
    }

    /// Print every check grouped by tool, then the aggregate counts.
    pub fn print_report(&self) {
        let mut current_tool: Option<&str> = None;
        for check in &self.checks {
            if current_tool != Some(check.tool.as_str()) {
                println!("\n{}:", check.tool);
                current_tool = Some(check.tool.as_str());
            }
            println!(
                "  [{}] {}: {}",
                check.status.label(),
                check.check_name,
                check.message
            );
        }

        let summary = self.summary();
        println!(
            "\nsummary: {} pass, {} warn, {} fail, {} skip",
            summary.pass, summary.warn, summary.fail, summary.skip
        );

        if summary.fail > 0 {
            println!(
                "found {} compliance problems, run xdg-migrate to repair the layout",
                summary.fail
            );
        } else if summary.warn > 0 {
            println!(
                "found {} warnings, the layout is usable but not fully tuned",
                summary.warn
            );
        } else {
            println!("all checks passed");
        }
    }

    /// Export the full report as JSON, preserving every check field.
    ///
    /// # Errors
    ///
    /// - Return [`VerifyError::Serialize`] if the report cannot be
    ///   serialized.
    /// - Return [`VerifyError::WriteReport`] if the report cannot be
    ///   written.
    pub fn export(&self, path: &Path) -> Result<()> {
        let report = Report {
            xdg_paths: ReportPaths {
                config: self.paths.config_home.display().to_string(),
                data: self.paths.data_home.display().to_string(),
                state: self.paths.state_home.display().to_string(),
                cache: self.paths.cache_home.display().to_string(),
            },
            checks: &self.checks,
            summary: self.summary(),
        };

        let rendered = serde_json::to_string_pretty(&report)?;
        fs::write(path, rendered).map_err(|err| VerifyError::WriteReport {
            source: err,
            path: path.to_path_buf(),
        })?;

        Ok(())
    }
}

fn var_check(tool: &str, var: &str, expected: &Path) -> ComplianceCheck {
    let check_name = format!("{var} environment variable");

    match env::var(var) {
        Ok(actual) if !actual.is_empty() => {
            if Path::new(&actual) == expected {
                ComplianceCheck::new(tool, check_name, CheckStatus::Pass, format!("{var}={actual}"))
            } else {
                ComplianceCheck::new(
                    tool,
                    check_name,
                    CheckStatus::Warn,
                    format!("{var}={actual} (expected {})", expected.display()),
                )
            }
        }
        _ => ComplianceCheck::new(
            tool,
            check_name,
            CheckStatus::Fail,
            format!("{var} is not set (expected {})", expected.display()),
        ),
    }
}

#[derive(Serialize)]
struct Report<'a> {
    xdg_paths: ReportPaths,
    checks: &'a [ComplianceCheck],
    summary: Summary,
}

#[derive(Serialize)]
struct ReportPaths {
    config: String,
    data: String,
    state: String,
    cache: String,
}

/// All possible error types for report exporting.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Report cannot be serialized to JSON.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// Report cannot be written to disk.
    #[error("failed to write report to {:?}", path.display())]
    WriteReport {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = VerifyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path::OsFamily, probe::StubProbe};
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs;

    fn fixture_from_cwd() -> (XdgPaths, PathBuf) {
        let home = env::current_dir().unwrap().join("home");
        fs::create_dir_all(&home).unwrap();
        let paths = XdgPaths::resolve(OsFamily::Posix, &home, |_| None);
        (paths, home)
    }

    fn clear_managed_vars() {
        for var in [
            "XDG_CONFIG_HOME",
            "XDG_DATA_HOME",
            "XDG_STATE_HOME",
            "XDG_CACHE_HOME",
            "MYCLI_HISTFILE",
            "MYCLI_CONFIG_DIR",
            "PGCLIRC",
            "PGCLI_HISTFILE",
            "DOCKER_CONFIG",
            "DOCKER_DATA_HOME",
            "K9SCONFIG",
            "K9S_DATA_HOME",
        ] {
            env::remove_var(var);
        }
    }

    #[sealed_test]
    fn base_variables_pass_once_the_emitted_script_is_sourced() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);

        // Source the emitter's output: apply every export line to the
        // live environment, exactly as a shell would.
        for line in crate::envscript::render(&paths, &registry).lines() {
            if let Some(assignment) = line.strip_prefix("export ") {
                if let Some((var, value)) = assignment.split_once('=') {
                    env::set_var(var, value.trim_matches('"'));
                }
            }
        }

        let mut verifier = Verifier::with_probe(&paths, &registry, StubProbe::nothing());
        verifier.run_checks(&[]);

        let statuses = verifier
            .checks()
            .iter()
            .filter(|check| check.tool == "system")
            .map(|check| check.status)
            .collect::<Vec<_>>();
        assert_eq!(statuses, vec![CheckStatus::Pass; 4]);
        assert!(verifier.is_compliant());
    }

    #[sealed_test]
    fn unset_docker_config_is_a_single_fail_for_docker() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);
        // Everything but DOCKER_CONFIG is sourced.
        for (var, value) in paths.as_vars() {
            env::set_var(var, value);
        }
        env::set_var("DOCKER_DATA_HOME", paths.data_home.join("docker"));

        let mut verifier =
            Verifier::with_probe(&paths, &registry, StubProbe::installed(&["docker"]));
        verifier.run_checks(&[]);

        let docker_fails = verifier
            .checks()
            .iter()
            .filter(|check| check.tool == "docker" && check.status == CheckStatus::Fail)
            .collect::<Vec<_>>();
        assert_eq!(docker_fails.len(), 1);
        assert!(docker_fails[0].check_name.contains("DOCKER_CONFIG"));
        assert!(!verifier.is_compliant());

        // Unrelated tools are unaffected: mycli was skipped, not failed.
        let mycli_statuses = verifier
            .checks()
            .iter()
            .filter(|check| check.tool == "mycli")
            .map(|check| check.status)
            .collect::<Vec<_>>();
        assert_eq!(mycli_statuses, vec![CheckStatus::Skip]);
    }

    #[sealed_test]
    fn mismatched_variable_warns_instead_of_failing() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);
        env::set_var("XDG_CONFIG_HOME", "/somewhere/else");

        let mut verifier = Verifier::with_probe(&paths, &registry, StubProbe::nothing());
        verifier.run_checks(&[]);

        let config_check = verifier
            .checks()
            .iter()
            .find(|check| check.check_name.starts_with("XDG_CONFIG_HOME"))
            .unwrap();
        assert_eq!(config_check.status, CheckStatus::Warn);
    }

    #[sealed_test]
    fn uninstalled_tool_is_skipped_entirely() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);

        let mut verifier = Verifier::with_probe(&paths, &registry, StubProbe::nothing());
        verifier.run_checks(&["mycli".to_string()]);

        let mycli_checks = verifier
            .checks()
            .iter()
            .filter(|check| check.tool == "mycli")
            .collect::<Vec<_>>();
        assert_eq!(mycli_checks.len(), 1);
        assert_eq!(mycli_checks[0].status, CheckStatus::Skip);
        assert!(verifier.is_compliant());
    }

    #[sealed_test]
    fn config_at_legacy_path_without_link_fails() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);
        fs::write(home.join(".myclirc"), "legacy settings").unwrap();

        let mut verifier =
            Verifier::with_probe(&paths, &registry, StubProbe::installed(&["mycli"]));
        verifier.run_checks(&["mycli".to_string()]);

        let location = verifier
            .checks()
            .iter()
            .find(|check| check.check_name == "config location")
            .unwrap();
        assert_eq!(location.status, CheckStatus::Fail);
    }

    #[sealed_test]
    fn config_at_xdg_path_passes() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);
        let config = paths.config_home.join("mycli").join("myclirc");
        fs::create_dir_all(config.parent().unwrap()).unwrap();
        fs::write(&config, "settings").unwrap();

        let mut verifier =
            Verifier::with_probe(&paths, &registry, StubProbe::installed(&["mycli"]));
        verifier.run_checks(&["mycli".to_string()]);

        let location = verifier
            .checks()
            .iter()
            .find(|check| check.check_name == "config location")
            .unwrap();
        assert_eq!(location.status, CheckStatus::Pass);
    }

    #[sealed_test]
    fn export_preserves_every_check_field() {
        clear_managed_vars();
        let (paths, home) = fixture_from_cwd();
        let registry = Registry::builtin(&paths, &home);

        let mut verifier = Verifier::with_probe(&paths, &registry, StubProbe::nothing());
        verifier.run_checks(&[]);
        let report_path = env::current_dir().unwrap().join("report.json");
        verifier.export(&report_path).unwrap();

        let raw = fs::read_to_string(&report_path).unwrap();
        let report: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let checks = report["checks"].as_array().unwrap();
        assert_eq!(checks.len(), verifier.checks().len());
        for check in checks {
            for field in ["tool", "check_name", "status", "message", "details"] {
                assert!(
                    check.as_object().unwrap().contains_key(field),
                    "missing {field}"
                );
            }
        }

        let summary = &report["summary"];
        assert_eq!(
            summary["total"].as_u64().unwrap() as usize,
            verifier.checks().len()
        );
        for key in ["config", "data", "state", "cache"] {
            assert!(report["xdg_paths"][key].is_string());
        }
    }
}
