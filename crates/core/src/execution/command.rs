//! Command execution utilities
//!
//! This module provides a unified interface for executing different types of commands
//! (shell commands, scripts, executable with args) with consistent error handling and logging.

use std::path::PathBuf;
use std::process::Command;

use colored::*;
use tracing::debug;

use crate::configs::tasks::Command as TaskCommand;
use crate::context::BuildContext;
use crate::types::{ConductorError, ConductorResult};

/// Unified command executor that handles common setup and execution patterns
pub struct CommandExecutor<'a> {
    context: &'a BuildContext,
    working_dir: PathBuf,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(context: &'a BuildContext) -> Self {
        Self {
            working_dir: context.project_root.clone(),
            context,
        }
    }

    pub fn in_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    /// Execute a command with common setup and error handling.
    ///
    /// Blocks until the process exits; a non-zero status becomes
    /// [`ConductorError::ActionFailed`] carrying that status.
    pub fn execute_command(&self, command: &mut Command, label: &str) -> ConductorResult<()> {
        command.current_dir(&self.working_dir);
        command.envs(self.context.command_env());

        debug!(command = %label, working_dir = ?self.working_dir, "spawning process");

        let status = command.status().map_err(|e| {
            println!(
                "{} The command \"{}\" could not be started: {}",
                "ERROR:".red().bold(),
                label,
                e
            );
            ConductorError::ActionFailed {
                command: label.to_string(),
                code: 1,
            }
        })?;

        if !status.success() {
            let code = status.code().unwrap_or(1);
            println!(
                "{} The command \"{}\" failed with exit code {}.",
                "ERROR:".red().bold(),
                label,
                code
            );
            return Err(ConductorError::ActionFailed {
                command: label.to_string(),
                code,
            });
        }

        Ok(())
    }

    /// Execute a script file
    pub fn execute_script(&self, script_path: &str) -> ConductorResult<()> {
        let full_script_path = self.context.resolve(script_path);

        if !full_script_path.exists() {
            return Err(ConductorError::Config(format!(
                "Script file '{}' not found",
                full_script_path.display()
            )));
        }

        let mut command = Command::new(&full_script_path);
        self.execute_command(&mut command, &full_script_path.display().to_string())
    }

    /// Execute a command with arguments
    pub fn execute_command_with_args(&self, program: &str, args: &[String]) -> ConductorResult<()> {
        let program = self.context.expand(program);
        let args: Vec<String> = args.iter().map(|arg| self.context.expand(arg)).collect();

        let mut label = program.clone();
        for arg in &args {
            label.push(' ');
            label.push_str(arg);
        }

        let mut command = Command::new(&program);
        command.args(&args);
        self.execute_command(&mut command, &label)
    }

    /// Execute a single shell command
    pub fn execute_shell_command(&self, cmd: &str) -> ConductorResult<()> {
        let cmd = self.context.expand(cmd);
        let (shell, flag) = self.context.os.shell();
        let mut command = Command::new(shell);
        command.arg(flag).arg(&cmd);
        self.execute_command(&mut command, &cmd)
    }

    /// Execute a configured command, appending `extra_args` to argv-style commands
    pub fn execute_task_command(
        &self,
        command: &TaskCommand,
        extra_args: &[String],
    ) -> ConductorResult<()> {
        match command {
            TaskCommand::Single(cmd) => {
                if extra_args.is_empty() {
                    self.execute_shell_command(cmd)
                } else {
                    self.execute_shell_command(&format!("{} {}", cmd, extra_args.join(" ")))
                }
            }
            TaskCommand::Multiple(cmds) => {
                let Some((program, args)) = cmds.split_first() else {
                    return Err(ConductorError::Config(
                        "Commands must name a program to run".to_string(),
                    ));
                };
                let mut args = args.to_vec();
                args.extend_from_slice(extra_args);
                self.execute_command_with_args(program, &args)
            }
        }
    }
}
