//! Remote fetch helper
//!
//! Clones a git repository into a fresh temporary directory and pins it to a
//! single commit. The temporary directory is owned by [`RemoteCheckout`] and is
//! removed when the checkout is dropped, so a failed clone, checkout or install
//! never leaves it behind. [`RemoteCheckout::install`] hands the working copy
//! over to its permanent location.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use colored::*;
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::types::{ConductorError, ConductorResult};

/// A temporary working copy of a repository pinned to one commit
#[derive(Debug)]
pub struct RemoteCheckout {
    dir: TempDir,
    url: String,
    commit: String,
}

impl RemoteCheckout {
    /// Clone `url` into a temporary directory and check out `commit`
    pub fn fetch(url: &str, commit: &str) -> ConductorResult<Self> {
        Self::fetch_in(&std::env::temp_dir(), url, commit)
    }

    /// Same as [`RemoteCheckout::fetch`], with the temporary directory created below `parent`
    pub fn fetch_in(parent: &Path, url: &str, commit: &str) -> ConductorResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("git_")
            .tempdir_in(parent)
            .map_err(|e| ConductorError::FetchFailed {
                url: url.to_string(),
                reason: format!("could not create temporary directory: {}", e),
                code: None,
            })?;

        println!("{} {}", "Cloning".bold(), url);
        let mut clone = Command::new("git");
        clone.arg("clone").arg(url).arg(dir.path());
        run_git(&mut clone, url, "clone")?;

        println!("\n{} {}", "Switching to commit".bold(), commit);
        let mut checkout = Command::new("git");
        checkout
            .args(["checkout", "-q", commit])
            .current_dir(dir.path());
        run_git(&mut checkout, url, "checkout")?;

        info!(url = %url, commit = %commit, path = ?dir.path(), "repository checked out");

        Ok(Self {
            dir,
            url: url.to_string(),
            commit: commit.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Move the working copy to `target`, replacing whatever was there.
    ///
    /// Falls back to a recursive copy when a rename is not possible (for
    /// example across filesystems). The `.git` directory is dropped unless
    /// `keep_git` is set.
    pub fn install(self, target: &Path, keep_git: bool) -> ConductorResult<PathBuf> {
        if target.exists() {
            fs::remove_dir_all(target)?;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Err(e) = fs::rename(self.dir.path(), target) {
            debug!(error = %e, "rename failed, copying checkout instead");
            copy_dir(self.dir.path(), target)?;
        }

        if !keep_git {
            let git_dir = target.join(".git");
            if git_dir.exists() {
                fs::remove_dir_all(&git_dir)?;
            }
        }

        debug!(url = %self.url, target = ?target, "checkout installed");
        Ok(target.to_path_buf())
    }
}

fn run_git(command: &mut Command, url: &str, step: &str) -> ConductorResult<()> {
    let status = command.status().map_err(|e| ConductorError::FetchFailed {
        url: url.to_string(),
        reason: format!("could not run git {}: {}", step, e),
        code: None,
    })?;

    if !status.success() {
        return Err(ConductorError::FetchFailed {
            url: url.to_string(),
            reason: format!("git {} exited with {}", step, status),
            code: status.code(),
        });
    }
    Ok(())
}

/// Recursively copy `source` into `target`
pub fn copy_dir(source: &Path, target: &Path) -> ConductorResult<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ConductorError::Config(e.to_string()))?;
        let destination = target.join(relative);

        if entry.path_is_symlink() {
            copy_symlink(entry.path(), &destination)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

/// Recreate the link itself; its target may be relative, a directory or missing
#[cfg(unix)]
fn copy_symlink(source: &Path, destination: &Path) -> ConductorResult<()> {
    let link = fs::read_link(source)?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(link, destination)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, _destination: &Path) -> ConductorResult<()> {
    debug!(path = ?source, "skipping symlink");
    Ok(())
}
