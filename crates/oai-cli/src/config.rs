//! Backend configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use oai_core::BackendConfig;

/// Default configuration file location.
fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "oai-backend").map(|dirs| dirs.config_dir().join("config.json"))
}

/// Load the backend configuration.
///
/// An explicit path must exist. The default location is optional; when it is
/// absent the built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<BackendConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No configuration file, using defaults");
                return Ok(BackendConfig::default());
            }
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: BackendConfig = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oai_core::DeletedRecordsSupport;
    use tempfile::TempDir;

    #[test]
    fn loads_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "page_size": 5, "deleted_records": "no" }"#).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.deleted_records, DeletedRecordsSupport::No);
        assert_eq!(config.metadata_formats.len(), 1);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "page_size": 0 }"#).unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("page_size"));
    }
}
