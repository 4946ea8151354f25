//! High-level project interface
//!
//! [`ProjectManager`] ties the pieces together: it reads `conductor.yml`,
//! prepares the [`BuildContext`], assembles the job registry and then plans
//! or runs a requested job.
//!
//! ```rust,no_run
//! use conductor_core::manager::{ProjectManager, ProjectManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> conductor_core::types::ConductorResult<()> {
//! let manager = ProjectManager::new(ProjectManagerConfig {
//!     project_root: PathBuf::from("."),
//!     release: false,
//!     github_runner: false,
//!     strategy: None,
//! })?;
//!
//! let plan = manager.plan("installer", false)?;
//! println!("{} steps", plan.len());
//! manager.run("installer", false)?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::actions::{
    CleanAction, CommandAction, FetchDependencyAction, MessageAction, ScriptAction,
    VersionCheckAction,
};
use crate::configs::project::{parse_project_config, ProjectConfig};
use crate::configs::tasks::{Command, TaskConfig};
use crate::context::{read_crate_version, BuildContext};
use crate::execution::TaskRunner;
use crate::registry::{Registry, RegistryBuilder, Task, CLEAN_TASK};
use crate::resolver::{resolve, ExecutionPlan, ResolutionStrategy};
use crate::types::{ConductorError, ConductorResult};

/// Name of the project file looked up in the project root
pub const PROJECT_FILE: &str = "conductor.yml";

/// Id of the job registered for `releaseCheck`
pub const VERSION_CHECK_TASK: &str = "check_version";

const DEFAULT_CLEAN_DESCRIPTION: &str = "Delete all artifacts and intermediate files";

pub struct ProjectManager {
    pub config: ProjectConfig,
    context: Arc<BuildContext>,
    registry: Registry,
    strategy: ResolutionStrategy,
}

/// Configuration for initializing a project manager
pub struct ProjectManagerConfig {
    pub project_root: PathBuf,
    pub release: bool,
    pub github_runner: bool,
    /// Overrides the `ordering` from the project file
    pub strategy: Option<ResolutionStrategy>,
}

impl ProjectManager {
    /// Load the project file from the project root and build the registry
    pub fn new(config: ProjectManagerConfig) -> ConductorResult<Self> {
        let project_config = Self::load_project_config(&config.project_root)?;
        Self::with_project_config(config, project_config)
    }

    /// Build a manager from an already parsed project file
    pub fn with_project_config(
        config: ProjectManagerConfig,
        project_config: ProjectConfig,
    ) -> ConductorResult<Self> {
        let mut context =
            BuildContext::new(config.project_root, config.release, config.github_runner);
        if let Some(manifest) = &project_config.version_manifest {
            let version = read_crate_version(&context.resolve(manifest))?;
            debug!(version = %version, "read crate version");
            context = context.with_crate_version(version);
        }

        let tasks = enabled_tasks(&context, &project_config);
        context = context.with_env(project_config.env.clone().unwrap_or_default());
        for task in &tasks {
            if let Some(exports) = &task.exports {
                debug!(job = %task.name, variables = ?exports.keys(), "exporting job variables");
                context = context.with_env(exports.clone());
            }
        }
        let context = Arc::new(context);

        let registry = build_registry(&context, &project_config, &tasks)?;
        let strategy = config
            .strategy
            .or(project_config.ordering)
            .unwrap_or_default();

        Ok(Self {
            config: project_config,
            context,
            registry,
            strategy,
        })
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Resolve the execution plan for a job
    pub fn plan(&self, task: &str, clean: bool) -> ConductorResult<ExecutionPlan> {
        resolve(&self.registry, task, clean, self.strategy)
    }

    /// Resolve and execute a job with all of its prerequisites
    pub fn run(&self, task: &str, clean: bool) -> ConductorResult<()> {
        let plan = self.plan(task, clean)?;
        self.execute(&plan)
    }

    /// Execute an already resolved plan
    pub fn execute(&self, plan: &ExecutionPlan) -> ConductorResult<()> {
        TaskRunner::new(&self.registry).execute(plan)
    }

    /// Every registered job id with its description, in registration order
    pub fn list_tasks(&self) -> Vec<(String, String)> {
        self.registry.listing()
    }

    fn load_project_config(project_root: &Path) -> ConductorResult<ProjectConfig> {
        let config_path = project_root.join(PROJECT_FILE);
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            ConductorError::Config(format!(
                "Failed to read project file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_project_config(&content).map_err(|e| {
            ConductorError::Config(format!(
                "Failed to parse project file {}: {}",
                config_path.display(),
                e
            ))
        })
    }
}

/// Register base jobs, then platform and runner specific jobs, then splice
/// in `requiredBy` prerequisites and validate.
fn build_registry(
    context: &Arc<BuildContext>,
    config: &ProjectConfig,
    tasks: &[&TaskConfig],
) -> ConductorResult<Registry> {
    let mut builder = RegistryBuilder::new().with_listing_task();

    let clean = config.clean.clone().unwrap_or_default();
    let clean_commands = clean.commands.unwrap_or_default();
    validate_commands(CLEAN_TASK, &clean_commands)?;
    builder.register(Task::new(
        CLEAN_TASK,
        clean
            .description
            .unwrap_or_else(|| DEFAULT_CLEAN_DESCRIPTION.to_string()),
        Vec::new(),
        CleanAction::new(
            context.clone(),
            clean_commands,
            clean.paths.unwrap_or_default(),
        ),
    ))?;

    for dependency in config.dependencies.iter().flatten() {
        if !dependency.is_enabled_on(context.os) {
            debug!(dependency = %dependency.name, os = %context.os, "skipping dependency");
            continue;
        }
        let description = dependency
            .description
            .clone()
            .unwrap_or_else(|| format!("Build the \"{}\" dependency", dependency.name));
        builder.register(Task::new(
            dependency.task_name(),
            description,
            Vec::new(),
            FetchDependencyAction::new(context.clone(), dependency.clone()),
        ))?;
    }

    if let Some(release_check) = &config.release_check {
        let description = release_check
            .description
            .clone()
            .unwrap_or_else(|| "Check that the version number was incremented".to_string());
        builder.register(Task::new(
            VERSION_CHECK_TASK,
            description,
            Vec::new(),
            VersionCheckAction::new(context.clone(), release_check.url.clone()),
        ))?;
    }

    for task in tasks {
        builder.register(task_from_config(context, task)?)?;
    }

    for task in tasks {
        for dependent in task.required_by.iter().flatten() {
            debug!(job = %task.name, dependent = %dependent, "adding prerequisite");
            builder.append_prerequisites(dependent, [task.name.clone()])?;
        }
    }

    builder.build()
}

/// Jobs from the project file that apply to this platform and runner mode
fn enabled_tasks<'a>(context: &BuildContext, config: &'a ProjectConfig) -> Vec<&'a TaskConfig> {
    config
        .tasks
        .iter()
        .flatten()
        .filter(|task| {
            let enabled = task.is_enabled_on(context.os, context.github_runner);
            if !enabled {
                debug!(job = %task.name, "job not enabled in this environment");
            }
            enabled
        })
        .collect()
}

fn validate_commands(owner: &str, commands: &[Command]) -> ConductorResult<()> {
    let has_empty_argv = commands
        .iter()
        .any(|command| matches!(command, Command::Multiple(argv) if argv.is_empty()));
    if has_empty_argv {
        return Err(ConductorError::Config(format!(
            "Job '{}' has a command without a program",
            owner
        )));
    }
    Ok(())
}

fn task_from_config(context: &Arc<BuildContext>, task: &TaskConfig) -> ConductorResult<Task> {
    let kinds = [
        task.command.is_some(),
        task.commands.is_some(),
        task.script.is_some(),
        task.message.is_some(),
    ];
    let kind_count = kinds.iter().filter(|set| **set).count();
    if kind_count != 1 {
        return Err(ConductorError::Config(format!(
            "Job '{}' must set exactly one of command, commands, script or message",
            task.name
        )));
    }

    let description = task.description.clone().unwrap_or_else(|| task.name.clone());
    let prerequisites = task.dependencies.clone().unwrap_or_default();

    let built = if let Some(script) = &task.script {
        Task::new(
            task.name.clone(),
            description,
            prerequisites,
            ScriptAction::new(context.clone(), script.clone(), task.working_dir.clone()),
        )
    } else if let Some(message) = &task.message {
        Task::new(
            task.name.clone(),
            description,
            prerequisites,
            MessageAction::new(context.clone(), message.clone()),
        )
    } else {
        let commands = match (&task.command, &task.commands) {
            (Some(command), _) => vec![command.clone()],
            (None, Some(commands)) => commands.clone(),
            (None, None) => Vec::new(),
        };
        if commands.is_empty() {
            return Err(ConductorError::Config(format!(
                "Job '{}' has an empty command list",
                task.name
            )));
        }
        validate_commands(&task.name, &commands)?;
        Task::new(
            task.name.clone(),
            description,
            prerequisites,
            CommandAction::new(context.clone(), commands)
                .in_dir(task.working_dir.clone())
                .with_release_args(task.release_args.clone().unwrap_or_default()),
        )
    };

    Ok(built)
}
