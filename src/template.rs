// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Config template rendering.
//!
//! Templates seed a fresh config file for a tool that has none yet. They
//! are plain text with `{{PLACEHOLDER}}` tokens for the resolved XDG base
//! paths and the tool's own directories. Default templates for the four
//! managed tools are embedded in the binary; an on-disk template directory
//! can override them.

use crate::{
    path::{OsFamily, XdgPaths},
    registry::ToolSpec,
};

use std::path::Path;

/// How path values substitute into a template.
///
/// JSON-based configs cannot carry backslashes unescaped, so their path
/// values always use forward slashes. mycli and pgcli accept forward
/// slashes on Windows; everything else keeps the native separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    ForwardSlash,
    ForwardSlashOnWindows,
    Native,
}

impl PathStyle {
    pub fn for_tool(name: &str) -> Self {
        match name {
            "docker" => Self::ForwardSlash,
            "mycli" | "pgcli" => Self::ForwardSlashOnWindows,
            _ => Self::Native,
        }
    }

    fn format(&self, value: &Path, family: OsFamily) -> String {
        let raw = value.display().to_string();
        match self {
            Self::ForwardSlash => raw.replace('\\', "/"),
            Self::ForwardSlashOnWindows if family.is_windows() => raw.replace('\\', "/"),
            _ => raw,
        }
    }
}

/// Substitute every placeholder in `content` for the given tool.
///
/// Optional tool directories the descriptor does not define render as the
/// empty string.
pub fn render(content: &str, paths: &XdgPaths, tool: &ToolSpec, family: OsFamily) -> String {
    let style = PathStyle::for_tool(tool.name);
    let format_opt = |dir: Option<&Path>| {
        dir.map(|dir| style.format(dir, family)).unwrap_or_default()
    };

    let replacements = [
        ("{{XDG_CONFIG_HOME}}", style.format(&paths.config_home, family)),
        ("{{XDG_DATA_HOME}}", style.format(&paths.data_home, family)),
        ("{{XDG_STATE_HOME}}", style.format(&paths.state_home, family)),
        ("{{XDG_CACHE_HOME}}", style.format(&paths.cache_home, family)),
        ("{{TOOL_CONFIG_DIR}}", style.format(&tool.config_dir, family)),
        ("{{TOOL_DATA_DIR}}", format_opt(tool.data_dir.as_deref())),
        ("{{TOOL_STATE_DIR}}", format_opt(tool.state_dir.as_deref())),
        ("{{TOOL_CACHE_DIR}}", format_opt(tool.cache_dir.as_deref())),
    ];

    let mut rendered = content.to_owned();
    for (placeholder, value) in replacements {
        rendered = rendered.replace(placeholder, &value);
    }

    rendered
}

/// Embedded default template for a managed tool.
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "mycli" => Some(include_str!("../templates/mycli.template")),
        "pgcli" => Some(include_str!("../templates/pgcli.template")),
        "docker" => Some(include_str!("../templates/docker.template")),
        "k9s" => Some(include_str!("../templates/k9s.template")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn fixture() -> (XdgPaths, Registry) {
        let home = PathBuf::from("/home/ferris");
        let paths = XdgPaths::resolve(OsFamily::Posix, &home, |_| None);
        let registry = Registry::builtin(&paths, &home);
        (paths, registry)
    }

    #[test]
    fn render_substitutes_base_and_tool_placeholders() {
        let (paths, registry) = fixture();
        let mycli = registry.get("mycli").unwrap();

        let result = render(
            "config={{XDG_CONFIG_HOME}} cache={{TOOL_CACHE_DIR}}",
            &paths,
            mycli,
            OsFamily::Posix,
        );

        assert_eq!(
            result,
            "config=/home/ferris/.config cache=/home/ferris/.cache/mycli"
        );
    }

    #[test]
    fn render_leaves_absent_tool_directories_empty() {
        let (paths, registry) = fixture();
        let mycli = registry.get("mycli").unwrap();

        let result = render("data=[{{TOOL_DATA_DIR}}]", &paths, mycli, OsFamily::Posix);

        assert_eq!(result, "data=[]");
    }

    #[test]
    fn docker_paths_always_use_forward_slashes() {
        let home = PathBuf::from("C:\\Users\\ferris");
        let paths = XdgPaths::resolve(OsFamily::Windows, &home, |_| None);
        let registry = Registry::builtin(&paths, &home);
        let docker = registry.get("docker").unwrap();

        let result = render("{{TOOL_CONFIG_DIR}}", &paths, docker, OsFamily::Windows);

        assert!(!result.contains('\\'), "got {result:?}");
        assert!(result.contains("C:/Users/ferris"));
    }

    #[test]
    fn native_style_keeps_separators_on_posix() {
        let (paths, registry) = fixture();
        let k9s = registry.get("k9s").unwrap();

        let result = render("{{TOOL_DATA_DIR}}", &paths, k9s, OsFamily::Posix);

        assert_eq!(result, "/home/ferris/.local/share/k9s");
    }

    #[test]
    fn every_registered_tool_has_a_builtin_template() {
        let (_, registry) = fixture();

        for tool in registry.iter() {
            assert!(builtin(tool.name).is_some(), "missing template for {}", tool.name);
        }
    }
}
