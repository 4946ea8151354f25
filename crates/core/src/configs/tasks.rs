use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Os;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Run through the platform shell
    Single(String),
    /// Program followed by its arguments, spawned directly
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    /// Prerequisite job ids, in the order they should be considered
    pub dependencies: Option<Vec<String>>,
    pub command: Option<Command>,
    pub commands: Option<Vec<Command>>,
    pub script: Option<String>,
    pub message: Option<String>,
    pub working_dir: Option<String>,
    /// Extra arguments appended to argv-style commands in release mode
    pub release_args: Option<Vec<String>>,
    /// Only register the job on these platforms
    pub platforms: Option<Vec<Os>>,
    /// Only register the job when running on a CI runner
    pub runner_only: Option<bool>,
    /// Jobs that gain this job as an extra prerequisite once it is registered
    pub required_by: Option<Vec<String>>,
    /// Variables exported to every command when this job is registered
    pub exports: Option<BTreeMap<String, String>>,
}

impl TaskConfig {
    pub fn is_enabled_on(&self, os: Os, github_runner: bool) -> bool {
        if self.runner_only.unwrap_or(false) && !github_runner {
            return false;
        }
        match &self.platforms {
            Some(platforms) => platforms.contains(&os),
            None => true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CleanConfig {
    pub description: Option<String>,
    /// Paths relative to the project root that are deleted
    pub paths: Option<Vec<String>>,
    pub commands: Option<Vec<Command>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReleaseCheckConfig {
    pub description: Option<String>,
    /// Location of a JSON document with a `version` field
    pub url: String,
}
