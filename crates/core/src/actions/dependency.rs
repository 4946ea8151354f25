use std::sync::Arc;

use colored::*;
use tracing::{debug, info};

use crate::actions::Action;
use crate::cache::DependencyCache;
use crate::configs::dependencies::DependencyConfig;
use crate::context::BuildContext;
use crate::fetch::RemoteCheckout;
use crate::types::ConductorResult;

/// Clones a pinned repository into dependency storage unless it is already
/// there at the configured version
pub struct FetchDependencyAction {
    cache: DependencyCache,
    dependency: DependencyConfig,
}

impl FetchDependencyAction {
    pub fn new(context: Arc<BuildContext>, dependency: DependencyConfig) -> Self {
        Self {
            cache: DependencyCache::new(&context.dependencies_dir),
            dependency,
        }
    }
}

impl Action for FetchDependencyAction {
    fn run(&self) -> ConductorResult<()> {
        let name = &self.dependency.name;
        let version = self.dependency.version;

        if self.cache.is_satisfied(name, version) {
            println!("{}", "Skipping dependency as it is already set up.".dimmed());
            return Ok(());
        }

        let checkout = RemoteCheckout::fetch(&self.dependency.repository, &self.dependency.commit)?;
        let url = checkout.url().to_string();
        let commit = checkout.commit().to_string();
        let target = self.cache.dependency_dir(name);
        debug!(from = ?checkout.path(), to = ?target, "installing checkout");
        checkout.install(&target, self.dependency.keep_git.unwrap_or(false))?;

        // Only stamp once the checkout is fully in place.
        self.cache.mark_satisfied(name, version)?;
        info!(dependency = %name, version, url = %url, commit = %commit, "dependency set up");
        Ok(())
    }
}
