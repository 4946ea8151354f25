use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::configs::dependencies::DependencyConfig;
use crate::configs::tasks::{CleanConfig, ReleaseCheckConfig, TaskConfig};
use crate::resolver::ResolutionStrategy;
use crate::types::ConductorResult;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Cargo manifest whose `package.version` becomes the crate version
    pub version_manifest: Option<String>,
    pub ordering: Option<ResolutionStrategy>,
    /// Variables exported to every command; values may use context placeholders
    pub env: Option<BTreeMap<String, String>>,
    pub clean: Option<CleanConfig>,
    pub dependencies: Option<Vec<DependencyConfig>>,
    pub release_check: Option<ReleaseCheckConfig>,
    pub tasks: Option<Vec<TaskConfig>>,
}

pub fn parse_project_config(yaml_str: &str) -> ConductorResult<ProjectConfig> {
    let config: ProjectConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}
