use std::sync::Arc;

use crate::actions::Action;
use crate::configs::tasks::Command;
use crate::context::BuildContext;
use crate::execution::CommandExecutor;
use crate::types::ConductorResult;

/// Runs one or more configured commands in order, stopping at the first failure
pub struct CommandAction {
    context: Arc<BuildContext>,
    commands: Vec<Command>,
    working_dir: Option<String>,
    release_args: Vec<String>,
}

impl CommandAction {
    pub fn new(context: Arc<BuildContext>, commands: Vec<Command>) -> Self {
        Self {
            context,
            commands,
            working_dir: None,
            release_args: Vec::new(),
        }
    }

    pub fn in_dir(mut self, working_dir: Option<String>) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// Arguments appended to every command when building in release mode
    pub fn with_release_args(mut self, release_args: Vec<String>) -> Self {
        self.release_args = release_args;
        self
    }
}

impl Action for CommandAction {
    fn run(&self) -> ConductorResult<()> {
        let mut executor = CommandExecutor::new(&self.context);
        if let Some(dir) = &self.working_dir {
            executor = executor.in_dir(self.context.resolve(dir));
        }

        let extra_args: &[String] = if self.context.release {
            &self.release_args
        } else {
            &[]
        };

        for command in &self.commands {
            executor.execute_task_command(command, extra_args)?;
        }
        Ok(())
    }
}

/// Runs a script file relative to the project root
pub struct ScriptAction {
    context: Arc<BuildContext>,
    script: String,
    working_dir: Option<String>,
}

impl ScriptAction {
    pub fn new(context: Arc<BuildContext>, script: String, working_dir: Option<String>) -> Self {
        Self {
            context,
            script,
            working_dir,
        }
    }
}

impl Action for ScriptAction {
    fn run(&self) -> ConductorResult<()> {
        let mut executor = CommandExecutor::new(&self.context);
        if let Some(dir) = &self.working_dir {
            executor = executor.in_dir(self.context.resolve(dir));
        }
        executor.execute_script(&self.script)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::ConductorError;

    fn context(root: &std::path::Path, release: bool) -> Arc<BuildContext> {
        Arc::new(BuildContext::new(root.to_path_buf(), release, false))
    }

    #[test]
    fn test_commands_run_in_order_and_stop_on_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let action = CommandAction::new(
            context(temp_dir.path(), false),
            vec![
                Command::Single("echo one >> log.txt".to_string()),
                Command::Single("exit 3".to_string()),
                Command::Single("echo three >> log.txt".to_string()),
            ],
        );

        let err = action.run().unwrap_err();
        assert!(matches!(err, ConductorError::ActionFailed { code: 3, .. }));
        let log = std::fs::read_to_string(temp_dir.path().join("log.txt")).unwrap();
        assert_eq!(log, "one\n");
    }

    #[test]
    fn test_release_args_only_in_release_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let command = vec![Command::Multiple(vec![
            "touch".to_string(),
            "debug.txt".to_string(),
        ])];

        CommandAction::new(context(temp_dir.path(), false), command.clone())
            .with_release_args(vec!["release.txt".to_string()])
            .run()
            .unwrap();
        assert!(temp_dir.path().join("debug.txt").exists());
        assert!(!temp_dir.path().join("release.txt").exists());

        CommandAction::new(context(temp_dir.path(), true), command)
            .with_release_args(vec!["release.txt".to_string()])
            .run()
            .unwrap();
        assert!(temp_dir.path().join("release.txt").exists());
    }

    #[test]
    fn test_working_dir_is_relative_to_project_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("components/frontend")).unwrap();

        CommandAction::new(
            context(temp_dir.path(), false),
            vec![Command::Single("touch built".to_string())],
        )
        .in_dir(Some("components/frontend".to_string()))
        .run()
        .unwrap();

        assert!(temp_dir.path().join("components/frontend/built").exists());
    }

    #[test]
    fn test_missing_script_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = ScriptAction::new(context(temp_dir.path(), false), "nope.sh".to_string(), None)
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
