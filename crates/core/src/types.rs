use thiserror::Error;

/// The main error type for conductor operations
#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("There is no job named \"{name}\"")]
    UnknownTask { name: String, available: Vec<String> },

    #[error("Job '{0}' is registered more than once")]
    DuplicateTask(String),

    #[error("Job '{task}' depends on '{prerequisite}' which is not registered")]
    MissingPrerequisite { task: String, prerequisite: String },

    #[error("Circular job dependency detected: {0}")]
    DependencyCycle(String),

    #[error("The command \"{command}\" failed with exit code {code}")]
    ActionFailed { command: String, code: i32 },

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed {
        url: String,
        reason: String,
        code: Option<i32>,
    },

    #[error("Version check failed: {0}")]
    VersionCheck(String),
}

impl ConductorError {
    /// Process exit status that reports this error.
    ///
    /// Failures of external commands carry their own status through; every
    /// internally detected problem exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConductorError::ActionFailed { code, .. } => *code,
            ConductorError::FetchFailed {
                code: Some(code), ..
            } => *code,
            _ => 1,
        }
    }
}

/// Result type alias for conductor operations
pub type ConductorResult<T> = Result<T, ConductorError>;
