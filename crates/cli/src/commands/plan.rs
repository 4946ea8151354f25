use anyhow::Result;
use colored::*;
use conductor_core::execution::TaskRunner;
use conductor_core::manager::ProjectManager;

use super::run::plan_or_list;

pub fn execute(manager: &ProjectManager, job: &str, clean: bool) -> Result<()> {
    let plan = plan_or_list(manager, job, clean)?;

    println!(
        "{} {} {}",
        "Execution plan for".bold(),
        job.cyan(),
        format!("({} steps)", plan.len()).dimmed()
    );
    TaskRunner::new(manager.registry()).print_plan(&plan)?;

    Ok(())
}
