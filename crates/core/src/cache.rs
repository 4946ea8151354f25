//! Version-stamped dependency cache
//!
//! Each dependency owns a directory below the storage root containing a single
//! `__dependency__.txt` file with the decimal version stamp of the recipe that
//! produced it. A dependency is satisfied at version `V` only when that file
//! exists and holds exactly `V`. Any read or parse problem counts as a miss so
//! that a damaged cache costs a rebuild instead of skipping required work.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{ConductorError, ConductorResult};

const STAMP_FILE: &str = "__dependency__.txt";

/// Tracks which external dependencies are already materialized on disk
#[derive(Debug, Clone)]
pub struct DependencyCache {
    root: PathBuf,
}

impl DependencyCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the materialized dependency
    pub fn dependency_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn stamp_path(&self, name: &str) -> PathBuf {
        self.dependency_dir(name).join(STAMP_FILE)
    }

    /// Returns true if the dependency is already set up at `version`.
    ///
    /// The dependency directory is created as a side effect. This never fails:
    /// a missing or corrupt stamp is reported as "not satisfied".
    pub fn is_satisfied(&self, name: &str, version: u32) -> bool {
        if let Err(e) = fs::create_dir_all(self.dependency_dir(name)) {
            debug!(dependency = %name, error = %e, "could not create dependency directory");
        }

        match self.read_stamp(name) {
            Ok(current) => {
                debug!(dependency = %name, current, wanted = version, "read dependency stamp");
                current == version
            }
            Err(e) => {
                debug!(dependency = %name, error = %e, "dependency stamp unavailable");
                false
            }
        }
    }

    fn read_stamp(&self, name: &str) -> ConductorResult<u32> {
        let path = self.stamp_path(name);
        let content = fs::read_to_string(&path)?;
        content.trim().parse::<u32>().map_err(|e| {
            ConductorError::Config(format!(
                "Invalid dependency stamp in {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Record that `name` is fully set up at `version`.
    ///
    /// Only call this after the dependency has been completely materialized.
    pub fn mark_satisfied(&self, name: &str, version: u32) -> ConductorResult<()> {
        let dir = self.dependency_dir(name);
        fs::create_dir_all(&dir)?;
        fs::write(self.stamp_path(name), version.to_string())?;
        debug!(dependency = %name, version, "marked dependency complete");
        Ok(())
    }

    /// Names of every dependency directory currently present
    pub fn list_dependencies(&self) -> ConductorResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.root.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Remove the entire dependency storage area
    pub fn clear(&self) -> ConductorResult<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                ConductorError::Config(format!(
                    "Failed to clear dependency storage {}: {}",
                    self.root.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> (tempfile::TempDir, DependencyCache) {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = DependencyCache::new(temp_dir.path().join("dependencies"));
        (temp_dir, cache)
    }

    #[test]
    fn test_unknown_dependency_is_not_satisfied() {
        let (_temp_dir, cache) = cache();
        assert!(!cache.is_satisfied("juce", 1));
        // The check creates the directory but still reports a miss
        assert!(cache.dependency_dir("juce").is_dir());
        assert!(!cache.is_satisfied("juce", 1));
    }

    #[test]
    fn test_mark_then_check() {
        let (_temp_dir, cache) = cache();
        cache.mark_satisfied("juce", 1).unwrap();
        assert!(cache.is_satisfied("juce", 1));
        assert!(!cache.is_satisfied("juce", 2));
    }

    #[test]
    fn test_mark_overwrites_previous_stamp() {
        let (_temp_dir, cache) = cache();
        cache.mark_satisfied("juce", 1).unwrap();
        cache.mark_satisfied("juce", 3).unwrap();
        assert!(!cache.is_satisfied("juce", 1));
        assert!(cache.is_satisfied("juce", 3));

        let stamp = fs::read_to_string(cache.dependency_dir("juce").join(STAMP_FILE)).unwrap();
        assert_eq!(stamp, "3");
    }

    #[test]
    fn test_corrupt_stamp_degrades_to_miss() {
        let (_temp_dir, cache) = cache();
        fs::create_dir_all(cache.dependency_dir("juce")).unwrap();
        fs::write(cache.dependency_dir("juce").join(STAMP_FILE), "not a number").unwrap();
        assert!(!cache.is_satisfied("juce", 1));
    }

    #[test]
    fn test_stamp_with_trailing_newline_is_accepted() {
        let (_temp_dir, cache) = cache();
        fs::create_dir_all(cache.dependency_dir("juce")).unwrap();
        fs::write(cache.dependency_dir("juce").join(STAMP_FILE), "4\n").unwrap();
        assert!(cache.is_satisfied("juce", 4));
    }

    #[test]
    fn test_list_and_clear() {
        let (_temp_dir, cache) = cache();
        assert!(cache.list_dependencies().unwrap().is_empty());

        cache.mark_satisfied("juce", 1).unwrap();
        cache.mark_satisfied("fftw", 2).unwrap();
        assert_eq!(cache.list_dependencies().unwrap(), vec!["fftw", "juce"]);

        cache.clear().unwrap();
        assert!(!cache.root().exists());
        assert!(!cache.is_satisfied("juce", 1));
    }
}
