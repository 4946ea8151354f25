use anyhow::Result;
use colored::*;
use conductor_core::manager::ProjectManager;
use conductor_core::registry::format_listing;
use conductor_core::resolver::ExecutionPlan;
use conductor_core::types::ConductorError;

pub fn execute(manager: &ProjectManager, job: &str, clean: bool) -> Result<()> {
    let plan = plan_or_list(manager, job, clean)?;
    manager.execute(&plan)?;
    Ok(())
}

/// Resolve a job, or report it and print the available jobs when it does not exist
pub fn plan_or_list(manager: &ProjectManager, job: &str, clean: bool) -> Result<ExecutionPlan> {
    match manager.plan(job, clean) {
        Ok(plan) => Ok(plan),
        Err(err @ ConductorError::UnknownTask { .. }) => {
            eprintln!("{} {}", "ERROR:".red().bold(), err);
            print!("{}", format_listing(&manager.list_tasks()));
            std::process::exit(err.exit_code());
        }
        Err(err) => Err(err.into()),
    }
}
