use serde::{Deserialize, Serialize};

use crate::platform::Os;

/// An external repository materialized under the dependency storage area
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DependencyConfig {
    pub name: String,
    pub description: Option<String>,
    pub repository: String,
    pub commit: String,
    /// Bumped whenever the fetch recipe changes so stale copies are replaced
    pub version: u32,
    pub keep_git: Option<bool>,
    pub platforms: Option<Vec<Os>>,
}

impl DependencyConfig {
    /// Id of the job that materializes this dependency
    pub fn task_name(&self) -> String {
        format!("dep_{}", self.name)
    }

    pub fn is_enabled_on(&self, os: Os) -> bool {
        self.platforms
            .as_ref()
            .map(|platforms| platforms.contains(&os))
            .unwrap_or(true)
    }
}
