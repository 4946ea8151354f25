//! Build context shared by every action
//!
//! Paths and computed values that jobs need are collected once at startup and
//! handed to each action when it is constructed, instead of being published
//! through process environment variables.

use std::path::{Path, PathBuf};

use crate::platform::Os;
use crate::types::{ConductorError, ConductorResult};

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub project_root: PathBuf,
    /// `target/debug` or `target/release` depending on the profile
    pub output_dir: PathBuf,
    pub dependencies_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub crate_version: Option<String>,
    pub release: bool,
    pub github_runner: bool,
    pub os: Os,
    /// Configured variables, expanded when commands are spawned
    pub env: Vec<(String, String)>,
}

impl BuildContext {
    pub fn new(project_root: PathBuf, release: bool, github_runner: bool) -> Self {
        let output_dir = project_root.join("target").join(profile_name(release));
        Self {
            dependencies_dir: project_root.join("dependencies"),
            artifacts_dir: project_root.join("artifacts"),
            output_dir,
            project_root,
            crate_version: None,
            release,
            github_runner,
            os: Os::current(),
            env: Vec::new(),
        }
    }

    pub fn with_crate_version(mut self, version: impl Into<String>) -> Self {
        self.crate_version = Some(version.into());
        self
    }

    /// Add configured variables; later values win over earlier ones
    pub fn with_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn profile(&self) -> &'static str {
        profile_name(self.release)
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(self.expand(path));
        if path.is_relative() {
            self.project_root.join(path)
        } else {
            path
        }
    }

    /// Substitute `{project_root}`, `{output_dir}`, `{crate_version}` and `{profile}`
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{project_root}", &forward_slashes(&self.project_root))
            .replace("{output_dir}", &forward_slashes(&self.output_dir))
            .replace(
                "{crate_version}",
                self.crate_version.as_deref().unwrap_or_default(),
            )
            .replace("{profile}", self.profile())
    }

    /// Variables exported to every spawned command.
    ///
    /// Paths always use forward slashes since the native tooling on Windows
    /// expects them.
    pub fn command_env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            (
                "PROJECT_ROOT".to_string(),
                forward_slashes(&self.project_root),
            ),
            (
                "RUST_OUTPUT_DIR".to_string(),
                forward_slashes(&self.output_dir),
            ),
            (
                "CRATE_VERSION".to_string(),
                self.crate_version.clone().unwrap_or_default(),
            ),
        ];

        if !self.os.is_windows() {
            let existing = std::env::var("LD_LIBRARY_PATH").unwrap_or_default();
            let bin_dir = self.artifacts_dir.join("bin");
            env.push((
                "LD_LIBRARY_PATH".to_string(),
                format!("{}:{}", existing, bin_dir.display()),
            ));
        }

        env.extend(
            self.env
                .iter()
                .map(|(name, value)| (name.clone(), self.expand(value))),
        );
        env
    }
}

fn profile_name(release: bool) -> &'static str {
    if release {
        "release"
    } else {
        "debug"
    }
}

fn forward_slashes(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Read `package.version` from a Cargo manifest
pub fn read_crate_version(manifest_path: &Path) -> ConductorResult<String> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| {
        ConductorError::Config(format!(
            "Failed to read version manifest {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    let manifest: toml::Value = toml::from_str(&content).map_err(|e| {
        ConductorError::Config(format!(
            "Failed to parse version manifest {}: {}",
            manifest_path.display(),
            e
        ))
    })?;

    manifest
        .get("package")
        .and_then(|package| package.get("version"))
        .and_then(|version| version.as_str())
        .map(|version| version.to_string())
        .ok_or_else(|| {
            ConductorError::Config(format!(
                "No package.version found in {}",
                manifest_path.display()
            ))
        })
}
