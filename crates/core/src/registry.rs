//! Job registry
//!
//! The registry is assembled once at startup through [`RegistryBuilder`]: base
//! jobs are registered first, platform or CI specific jobs are added after
//! that, and extra prerequisites can be spliced into jobs that already exist.
//! [`RegistryBuilder::build`] validates the result and freezes it into an
//! immutable [`Registry`].

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::actions::{Action, ListTasksAction};
use crate::types::{ConductorError, ConductorResult};

/// Id of the job that wipes build outputs and dependency storage
pub const CLEAN_TASK: &str = "clean";

/// Id of the built-in job that prints the registry
pub const LIST_TASK: &str = "jobs";

const LISTING_WIDTH: usize = 20;

/// A named unit of work with prerequisites and an action
pub struct Task {
    pub id: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    action: Box<dyn Action>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        prerequisites: Vec<String>,
        action: impl Action + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            prerequisites,
            action: Box::new(action),
        }
    }

    pub fn run(&self) -> ConductorResult<()> {
        self.action.run()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from job id to job, in registration order
#[derive(Debug)]
pub struct Registry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn lookup(&self, id: &str) -> ConductorResult<&Task> {
        self.index
            .get(id)
            .map(|&position| &self.tasks[position])
            .ok_or_else(|| ConductorError::UnknownTask {
                name: id.to_string(),
                available: self.all_ids(),
            })
    }

    /// Every registered id in registration order
    pub fn all_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|task| task.id.clone()).collect()
    }

    pub fn listing(&self) -> Vec<(String, String)> {
        self.tasks
            .iter()
            .map(|task| (task.id.clone(), task.description.clone()))
            .collect()
    }
}

/// Render `id: description` lines with the ids padded to a fixed column
pub fn format_listing(entries: &[(String, String)]) -> String {
    let mut output = String::from("Available jobs are as follows:\n");
    for (id, description) in entries {
        let padding = LISTING_WIDTH.saturating_sub(id.len());
        output.push_str(&format!(
            "{}: {}{}\n",
            id,
            " ".repeat(padding),
            description
        ));
    }
    output
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    with_listing: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in `jobs` task ahead of everything else
    pub fn with_listing_task(mut self) -> Self {
        self.with_listing = true;
        self
    }

    pub fn register(&mut self, task: Task) -> ConductorResult<&mut Self> {
        if self.index.contains_key(&task.id) || (self.with_listing && task.id == LIST_TASK) {
            return Err(ConductorError::DuplicateTask(task.id));
        }
        self.index.insert(task.id.clone(), self.tasks.len());
        self.tasks.push(task);
        Ok(self)
    }

    /// Append extra prerequisites to a job that is already registered
    pub fn append_prerequisites(
        &mut self,
        id: &str,
        extra: impl IntoIterator<Item = String>,
    ) -> ConductorResult<&mut Self> {
        let position = match self.index.get(id) {
            Some(&position) => position,
            None => {
                return Err(ConductorError::UnknownTask {
                    name: id.to_string(),
                    available: self.tasks.iter().map(|task| task.id.clone()).collect(),
                })
            }
        };
        self.tasks[position].prerequisites.extend(extra);
        Ok(self)
    }

    /// Validate prerequisites and freeze the registry
    pub fn build(self) -> ConductorResult<Registry> {
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);

        if self.with_listing {
            let description = "Print available jobs";
            let mut entries = vec![(LIST_TASK.to_string(), description.to_string())];
            entries.extend(
                self.tasks
                    .iter()
                    .map(|task| (task.id.clone(), task.description.clone())),
            );
            tasks.push(Task::new(
                LIST_TASK,
                description,
                Vec::new(),
                ListTasksAction::new(entries),
            ));
        }
        tasks.extend(self.tasks);

        let index: HashMap<String, usize> = tasks
            .iter()
            .enumerate()
            .map(|(position, task)| (task.id.clone(), position))
            .collect();

        for task in &tasks {
            for prerequisite in &task.prerequisites {
                if !index.contains_key(prerequisite) {
                    return Err(ConductorError::MissingPrerequisite {
                        task: task.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        let cycles = find_cycles(&tasks, &index);
        if !cycles.is_empty() {
            let message = cycles
                .into_iter()
                .map(|cycle| {
                    let mut cycle_path = cycle.clone();
                    if let Some(first) = cycle_path.first().cloned() {
                        cycle_path.push(first);
                    }
                    cycle_path.join(" -> ")
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConductorError::DependencyCycle(message));
        }

        Ok(Registry { tasks, index })
    }
}

/// Strongly connected components of the prerequisite graph that form cycles
fn find_cycles(tasks: &[Task], index: &HashMap<String, usize>) -> Vec<Vec<String>> {
    let mut graph = DiGraph::<String, ()>::new();
    let nodes: Vec<NodeIndex> = tasks
        .iter()
        .map(|task| graph.add_node(task.id.clone()))
        .collect();

    for (position, task) in tasks.iter().enumerate() {
        for prerequisite in &task.prerequisites {
            if let Some(&target) = index.get(prerequisite) {
                graph.add_edge(nodes[position], nodes[target], ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> ConductorResult<()> {
        Ok(())
    }

    fn task(id: &str, prerequisites: &[&str]) -> Task {
        Task::new(
            id,
            format!("Run {}", id),
            prerequisites.iter().map(|p| p.to_string()).collect(),
            noop,
        )
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("clean", &[])).unwrap();
        builder.register(task("deps", &[])).unwrap();
        builder.register(task("clib", &["deps"])).unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(registry.all_ids(), vec!["clean", "deps", "clib"]);
        assert_eq!(registry.lookup("clib").unwrap().prerequisites, vec!["deps"]);
    }

    #[test]
    fn test_unknown_lookup_lists_available_tasks() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("clean", &[])).unwrap();
        let registry = builder.build().unwrap();

        match registry.lookup("frobnicate") {
            Err(ConductorError::UnknownTask { name, available }) => {
                assert_eq!(name, "frobnicate");
                assert_eq!(available, vec!["clean"]);
            }
            other => panic!("expected UnknownTask, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("clib", &[])).unwrap();
        let err = builder.register(task("clib", &[])).unwrap_err();
        assert!(matches!(err, ConductorError::DuplicateTask(id) if id == "clib"));
    }

    #[test]
    fn test_listing_task_is_reserved() {
        let mut builder = RegistryBuilder::new().with_listing_task();
        let err = builder.register(task(LIST_TASK, &[])).unwrap_err();
        assert!(matches!(err, ConductorError::DuplicateTask(_)));
    }

    #[test]
    fn test_append_prerequisites_splices_into_existing_task() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(task("remove_juce_splash", &[]))
            .unwrap()
            .register(task("juce_frontend", &["remove_juce_splash"]))
            .unwrap()
            .register(task("juce6", &["remove_juce_splash"]))
            .unwrap();
        builder
            .append_prerequisites("juce_frontend", vec!["juce6".to_string()])
            .unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(
            registry.lookup("juce_frontend").unwrap().prerequisites,
            vec!["remove_juce_splash", "juce6"]
        );
    }

    #[test]
    fn test_append_prerequisites_to_missing_task() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .append_prerequisites("juce_frontend", vec!["juce6".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConductorError::UnknownTask { .. }));
    }

    #[test]
    fn test_missing_prerequisite_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("clib", &["deps"])).unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ConductorError::MissingPrerequisite { task, prerequisite }
                if task == "clib" && prerequisite == "deps"
        ));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("a", &["b"])).unwrap();
        builder.register(task("b", &["a"])).unwrap();
        let err = builder.build().unwrap_err();
        match err {
            ConductorError::DependencyCycle(message) => assert_eq!(message, "a -> b -> a"),
            other => panic!("expected DependencyCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut builder = RegistryBuilder::new();
        builder.register(task("loop", &["loop"])).unwrap();
        assert!(matches!(
            builder.build(),
            Err(ConductorError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_listing_task_comes_first() {
        let mut builder = RegistryBuilder::new().with_listing_task();
        builder.register(task("clean", &[])).unwrap();
        let registry = builder.build().unwrap();

        assert_eq!(registry.all_ids(), vec!["jobs", "clean"]);
        assert_eq!(
            registry.lookup("jobs").unwrap().description,
            "Print available jobs"
        );
    }

    #[test]
    fn test_format_listing_pads_ids() {
        let output = format_listing(&[
            ("clean".to_string(), "Delete all artifacts".to_string()),
            (
                "a_very_long_job_name_indeed".to_string(),
                "Long".to_string(),
            ),
        ]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Available jobs are as follows:");
        assert_eq!(lines[1], format!("clean: {}Delete all artifacts", " ".repeat(15)));
        assert_eq!(lines[2], "a_very_long_job_name_indeed: Long");
    }
}
