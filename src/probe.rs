// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tool invocability probing.
//!
//! Both the migration executor and the compliance verifier need to know
//! whether a managed tool is actually installed. The probe runs the tool
//! with a version flag under a short timeout. A missing executable or a
//! hang counts as "not installed", never as an error.

use std::{
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Decide whether a tool binary responds on this machine.
pub trait ToolProbe {
    fn is_invocable(&self, tool: &str) -> bool;
}

/// Probe by running `<tool> --version`.
#[derive(Debug, Clone)]
pub struct VersionFlagProbe {
    timeout: Duration,
}

impl VersionFlagProbe {
    pub fn new() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for VersionFlagProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolProbe for VersionFlagProbe {
    fn is_invocable(&self, tool: &str) -> bool {
        let binary = match which::which(tool) {
            Ok(path) => path,
            Err(_) => {
                debug!("{tool} not found on PATH");
                return false;
            }
        };

        let child = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(err) => {
                debug!("failed to spawn {tool} version probe: {err}");
                return false;
            }
        };

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return status.success(),
                Ok(None) if Instant::now() >= deadline => {
                    debug!("{tool} version probe timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    debug!("{tool} version probe failed: {err}");
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
            }
        }
    }
}

/// Fixed-answer probe for tests.
#[cfg(test)]
pub(crate) struct StubProbe {
    installed: &'static [&'static str],
}

#[cfg(test)]
impl StubProbe {
    pub(crate) fn installed(installed: &'static [&'static str]) -> Self {
        Self { installed }
    }

    pub(crate) fn nothing() -> Self {
        Self { installed: &[] }
    }
}

#[cfg(test)]
impl ToolProbe for StubProbe {
    fn is_invocable(&self, tool: &str) -> bool {
        self.installed.contains(&tool)
    }
}
