//! Job execution
//!
//! This module handles the actual execution of a resolved plan: spawning
//! external commands and walking the plan step by step.

pub mod command;
pub mod runner;

pub use command::CommandExecutor;
pub use runner::TaskRunner;
