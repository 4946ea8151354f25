use std::fs;
use std::sync::Arc;

use tracing::{debug, info};

use crate::actions::Action;
use crate::cache::DependencyCache;
use crate::configs::tasks::Command;
use crate::context::BuildContext;
use crate::execution::CommandExecutor;
use crate::registry::format_listing;
use crate::types::ConductorResult;

/// Prints every registered job with its description
pub struct ListTasksAction {
    entries: Vec<(String, String)>,
}

impl ListTasksAction {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }
}

impl Action for ListTasksAction {
    fn run(&self) -> ConductorResult<()> {
        print!("{}", format_listing(&self.entries));
        Ok(())
    }
}

/// Prints a message with context placeholders expanded
pub struct MessageAction {
    context: Arc<BuildContext>,
    message: String,
}

impl MessageAction {
    pub fn new(context: Arc<BuildContext>, message: String) -> Self {
        Self { context, message }
    }

    pub fn rendered(&self) -> String {
        self.context.expand(&self.message)
    }
}

impl Action for MessageAction {
    fn run(&self) -> ConductorResult<()> {
        println!("{}", self.rendered());
        Ok(())
    }
}

/// Deletes build outputs, artifacts and the dependency storage area
pub struct CleanAction {
    context: Arc<BuildContext>,
    commands: Vec<Command>,
    paths: Vec<String>,
}

impl CleanAction {
    pub fn new(context: Arc<BuildContext>, commands: Vec<Command>, paths: Vec<String>) -> Self {
        Self {
            context,
            commands,
            paths,
        }
    }
}

impl Action for CleanAction {
    fn run(&self) -> ConductorResult<()> {
        let executor = CommandExecutor::new(&self.context);
        for command in &self.commands {
            executor.execute_task_command(command, &[])?;
        }

        let mut targets: Vec<_> = self
            .paths
            .iter()
            .map(|path| self.context.resolve(path))
            .collect();
        targets.push(self.context.artifacts_dir.clone());

        for target in targets {
            if target.is_dir() {
                debug!(path = ?target, "removing directory");
                fs::remove_dir_all(&target)?;
            } else if target.exists() {
                debug!(path = ?target, "removing file");
                fs::remove_file(&target)?;
            }
        }

        let cache = DependencyCache::new(&self.context.dependencies_dir);
        for name in cache.list_dependencies()? {
            info!(dependency = %name, "removing dependency");
        }
        cache.clear()
    }
}
