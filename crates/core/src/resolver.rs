//! Execution plan resolution
//!
//! Expands a requested job into the ordered, deduplicated list of jobs that
//! have to run. Two orderings are available:
//!
//! - [`ResolutionStrategy::Topological`] visits prerequisites depth first in
//!   their declared order and emits each job after all of its prerequisites.
//! - [`ResolutionStrategy::ReverseDedup`] reproduces the historical behaviour:
//!   collect every prerequisite breadth first (duplicates included), reverse
//!   the list and keep the first occurrence of each job. Every occurrence of a
//!   job is expanded, so the working list can grow exponentially on graphs
//!   with many shared prerequisites.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::{Registry, CLEAN_TASK};
use crate::types::ConductorResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    #[default]
    Topological,
    ReverseDedup,
}

/// Ordered job ids; every job appears once, after all of its prerequisites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    steps: Vec<String>,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step == id)
    }
}

/// Resolve `requested` into an execution plan.
///
/// When `do_clean` is set the clean job is the first step of the plan.
pub fn resolve(
    registry: &Registry,
    requested: &str,
    do_clean: bool,
    strategy: ResolutionStrategy,
) -> ConductorResult<ExecutionPlan> {
    registry.lookup(requested)?;
    if do_clean {
        registry.lookup(CLEAN_TASK)?;
    }

    let steps = match strategy {
        ResolutionStrategy::Topological => resolve_topological(registry, requested, do_clean)?,
        ResolutionStrategy::ReverseDedup => resolve_reverse_dedup(registry, requested, do_clean)?,
    };

    debug!(requested = %requested, ?strategy, steps = ?steps, "resolved execution plan");
    Ok(ExecutionPlan { steps })
}

fn resolve_topological(
    registry: &Registry,
    requested: &str,
    do_clean: bool,
) -> ConductorResult<Vec<String>> {
    let mut visited = HashSet::new();
    let mut steps = Vec::new();

    if do_clean {
        visit(registry, CLEAN_TASK, &mut visited, &mut steps)?;
    }
    visit(registry, requested, &mut visited, &mut steps)?;

    Ok(steps)
}

/// Depth-first post-order visit. The registry rejects cycles when it is
/// built, so the visited set alone is enough to terminate.
fn visit(
    registry: &Registry,
    id: &str,
    visited: &mut HashSet<String>,
    steps: &mut Vec<String>,
) -> ConductorResult<()> {
    if !visited.insert(id.to_string()) {
        return Ok(());
    }

    let task = registry.lookup(id)?;
    for prerequisite in &task.prerequisites {
        visit(registry, prerequisite, visited, steps)?;
    }
    steps.push(id.to_string());
    Ok(())
}

fn resolve_reverse_dedup(
    registry: &Registry,
    requested: &str,
    do_clean: bool,
) -> ConductorResult<Vec<String>> {
    let mut order = vec![requested.to_string()];
    let mut index = 0;
    while index < order.len() {
        let task = registry.lookup(&order[index])?;
        order.extend(task.prerequisites.iter().cloned());
        index += 1;
    }

    if do_clean {
        order.push(CLEAN_TASK.to_string());
    }
    order.reverse();

    // Remove duplicates while preserving dependency relationships.
    let mut seen = HashSet::new();
    Ok(order
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect())
}
