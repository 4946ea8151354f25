use std::sync::Arc;

use colored::*;
use serde::Deserialize;
use tracing::debug;

use crate::actions::Action;
use crate::context::BuildContext;
use crate::types::{ConductorError, ConductorResult};

/// Published release metadata, e.g. `{"version": "0.3.0"}`
#[derive(Debug, Deserialize)]
struct PublishedVersion {
    version: String,
}

/// Fails unless the crate version is a release after the published one
pub struct VersionCheckAction {
    context: Arc<BuildContext>,
    url: String,
}

impl VersionCheckAction {
    pub fn new(context: Arc<BuildContext>, url: String) -> Self {
        Self { context, url }
    }

    fn fetch_published(&self) -> ConductorResult<String> {
        let response = reqwest::blocking::get(self.url.as_str())
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                ConductorError::VersionCheck(format!("Failed to download {}: {}", self.url, e))
            })?;

        let body = response.text().map_err(|e| {
            ConductorError::VersionCheck(format!("Failed to read {}: {}", self.url, e))
        })?;
        parse_published(&body).map_err(|e| {
            ConductorError::VersionCheck(format!("Invalid version document at {}: {}", self.url, e))
        })
    }
}

impl Action for VersionCheckAction {
    fn run(&self) -> ConductorResult<()> {
        let crate_version = self.context.crate_version.as_deref().ok_or_else(|| {
            ConductorError::Config(
                "check_version needs a versionManifest to read the crate version from".to_string(),
            )
        })?;

        let published = self.fetch_published()?;
        debug!(published = %published, current = %crate_version, "comparing versions");

        if is_incremented(&parse_version(crate_version)?, &parse_version(&published)?) {
            println!("{}", "Version has been incremented correctly.".green());
            Ok(())
        } else {
            println!("{}", "Version number was not incremented correctly.".red());
            Err(ConductorError::VersionCheck(format!(
                "Last version was {} but the crate version is {}",
                published, crate_version
            )))
        }
    }
}

fn parse_published(body: &str) -> Result<String, serde_json::Error> {
    let published: PublishedVersion = serde_json::from_str(body)?;
    Ok(published.version)
}

/// Split a dotted version into its numeric components
pub fn parse_version(version: &str) -> ConductorResult<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                ConductorError::VersionCheck(format!("'{}' is not a numeric version", version))
            })
        })
        .collect()
}

/// True when some component of `current` is exactly one more than the
/// matching component of `last`
pub fn is_incremented(current: &[u64], last: &[u64]) -> bool {
    current
        .iter()
        .zip(last)
        .any(|(current, last)| last.checked_add(1) == Some(*current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("0.3.12").unwrap(), vec![0, 3, 12]);
        assert!(parse_version("0.3.x").is_err());
        assert!(parse_version("").is_err());
    }

    #[test]
    fn test_parse_published_document() {
        assert_eq!(
            parse_published(r#"{"version": "0.3.0", "notes": "x"}"#).unwrap(),
            "0.3.0"
        );
        assert!(parse_published(r#"{"name": "audiobench"}"#).is_err());
    }

    #[test]
    fn test_increment_rules() {
        assert!(is_incremented(&[0, 3, 1], &[0, 3, 0]));
        assert!(is_incremented(&[0, 4, 0], &[0, 3, 7]));
        assert!(is_incremented(&[1, 0, 0], &[0, 9, 9]));
        assert!(!is_incremented(&[0, 3, 0], &[0, 3, 0]));
        assert!(!is_incremented(&[0, 3, 2], &[0, 3, 0]));
    }

    #[test]
    fn test_largest_published_component_does_not_overflow() {
        let published = parse_version("18446744073709551615.0.0").unwrap();
        assert!(!is_incremented(&[0, 3, 1], &published));
        assert!(is_incremented(&[0, 1, 0], &published));
    }

    #[test]
    fn test_missing_crate_version_is_a_config_error() {
        let context = Arc::new(BuildContext::new(std::path::PathBuf::from("/work"), false, false));
        let action = VersionCheckAction::new(context, "http://127.0.0.1:9/latest.json".to_string());
        assert!(matches!(action.run(), Err(ConductorError::Config(_))));
    }
}
