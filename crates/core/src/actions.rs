//! Job actions
//!
//! Every job owns exactly one [`Action`]: a parameterless operation that
//! either completes or fails. Anything an action needs (paths, versions,
//! profile) is captured when the action is constructed.

pub mod builtin;
pub mod command;
pub mod dependency;
pub mod version_check;

pub use builtin::{CleanAction, ListTasksAction, MessageAction};
pub use command::{CommandAction, ScriptAction};
pub use dependency::FetchDependencyAction;
pub use version_check::VersionCheckAction;

use crate::types::ConductorResult;

pub trait Action: Send + Sync {
    fn run(&self) -> ConductorResult<()>;
}

impl<F> Action for F
where
    F: Fn() -> ConductorResult<()> + Send + Sync,
{
    fn run(&self) -> ConductorResult<()> {
        self()
    }
}
