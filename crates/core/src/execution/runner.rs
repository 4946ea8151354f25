//! Sequential plan runner
//!
//! Walks an [`ExecutionPlan`] in order, announcing each step before running
//! its action. The first failing action stops the run; nothing after it is
//! started and nothing before it is rolled back.

use colored::*;
use tracing::debug;

use crate::registry::Registry;
use crate::resolver::ExecutionPlan;
use crate::types::ConductorResult;

const BANNER_WIDTH: usize = 80;

pub struct TaskRunner<'a> {
    registry: &'a Registry,
}

impl<'a> TaskRunner<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Print the numbered list of steps a plan will take
    pub fn print_plan(&self, plan: &ExecutionPlan) -> ConductorResult<()> {
        println!("{}", "The following steps will be taken:".bold());
        for (index, id) in plan.steps().iter().enumerate() {
            let task = self.registry.lookup(id)?;
            println!("{}. {}", index + 1, task.description);
        }
        Ok(())
    }

    /// Run every step of the plan in order, stopping at the first failure
    pub fn execute(&self, plan: &ExecutionPlan) -> ConductorResult<()> {
        self.print_plan(plan)?;

        for (index, id) in plan.steps().iter().enumerate() {
            let task = self.registry.lookup(id)?;
            let step = index + 1;

            let rule = "=".repeat(BANNER_WIDTH);
            println!("{}", rule.bright_black());
            println!(
                "{}",
                format!("PERFORMING STEP {}: {}", step, task.description).bold()
            );
            println!("{}", rule.bright_black());

            debug!(step, job = %task.id, "running job");
            if let Err(err) = task.run() {
                debug!(step, job = %task.id, error = %err, "job failed");
                println!(
                    "{}",
                    format!("Step {} ({}) failed.", step, task.description).red()
                );
                return Err(err);
            }
        }

        println!("{}", "All steps completed successfully!".green().bold());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::registry::{RegistryBuilder, Task};
    use crate::resolver::{resolve, ResolutionStrategy};
    use crate::types::ConductorError;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log, id: &'static str, fail_with: Option<i32>) -> Task {
        let log = log.clone();
        Task::new(
            id,
            format!("Run {}", id),
            Vec::new(),
            move || -> ConductorResult<()> {
                log.lock().unwrap().push(id.to_string());
                match fail_with {
                    Some(code) => Err(ConductorError::ActionFailed {
                        command: format!("{} command", id),
                        code,
                    }),
                    None => Ok(()),
                }
            },
        )
    }

    fn registry(log: &Log, failing: Option<(&'static str, i32)>) -> Registry {
        let mut builder = RegistryBuilder::new();
        for id in ["fetch_lib", "build_lib", "package"] {
            let fail_with = failing.filter(|(name, _)| *name == id).map(|(_, code)| code);
            builder.register(recording(log, id, fail_with)).unwrap();
        }
        builder
            .append_prerequisites("build_lib", vec!["fetch_lib".to_string()])
            .unwrap();
        builder
            .append_prerequisites("package", vec!["build_lib".to_string()])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_runs_every_step_in_order() {
        let log: Log = Arc::default();
        let registry = registry(&log, None);
        let plan = resolve(&registry, "package", false, ResolutionStrategy::Topological).unwrap();
        assert_eq!(plan.steps(), ["fetch_lib", "build_lib", "package"]);

        TaskRunner::new(&registry).execute(&plan).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["fetch_lib", "build_lib", "package"]
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let log: Log = Arc::default();
        let registry = registry(&log, Some(("build_lib", 2)));
        let plan = resolve(&registry, "package", false, ResolutionStrategy::Topological).unwrap();

        let err = TaskRunner::new(&registry).execute(&plan).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["fetch_lib", "build_lib"]);
    }

    #[test]
    fn test_print_plan_rejects_unknown_steps() {
        let log: Log = Arc::default();
        let registry = registry(&log, None);
        let other = {
            let mut builder = RegistryBuilder::new();
            builder.register(recording(&log, "elsewhere", None)).unwrap();
            builder.build().unwrap()
        };
        let plan = resolve(&other, "elsewhere", false, ResolutionStrategy::Topological).unwrap();

        let err = TaskRunner::new(&registry).print_plan(&plan).unwrap_err();
        assert!(matches!(err, ConductorError::UnknownTask { .. }));
        assert!(log.lock().unwrap().is_empty());
    }
}
