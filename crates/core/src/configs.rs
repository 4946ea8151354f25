//! Configuration parsing for `conductor.yml`

pub mod dependencies;
pub mod project;
pub mod tasks;
