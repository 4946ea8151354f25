//! Conductor Core Library
//!
//! This is the core library for the conductor build orchestrator. It turns a
//! registry of named jobs into an ordered execution plan and runs that plan
//! one step at a time.
//!
//! ## Architecture
//!
//! - [`manager`] - High-level interface: loads `conductor.yml`, builds the registry, plans and runs jobs
//! - [`registry`] - Job registry and its builder
//! - [`resolver`] - Expands a requested job into an ordered, deduplicated plan
//! - [`execution`] - Sequential plan runner and process spawning
//! - [`actions`] - The work a job performs (commands, scripts, dependency fetches, ...)
//! - [`cache`] - On-disk version stamps for materialized dependencies
//! - [`fetch`] - Temporary git checkouts of pinned commits
//! - [`context`] - Paths and values shared with every action
//! - [`configs`] - Project file parsing
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use conductor_core::manager::{ProjectManager, ProjectManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> conductor_core::types::ConductorResult<()> {
//! let manager = ProjectManager::new(ProjectManagerConfig {
//!     project_root: PathBuf::from("."),
//!     release: true,
//!     github_runner: false,
//!     strategy: None,
//! })?;
//!
//! manager.run("installer", true)?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod cache;
pub mod configs;
pub mod context;
pub mod execution;
pub mod fetch;
pub mod manager;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod types;

pub use manager::{ProjectManager, ProjectManagerConfig};
pub use registry::{Registry, RegistryBuilder, Task};
pub use resolver::{resolve, ExecutionPlan, ResolutionStrategy};
pub use types::{ConductorError, ConductorResult};
