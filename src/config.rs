//! Configuration file support for comaudit.
//!
//! Provides YAML-based configuration through `comaudit.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use comaudit::shared::Result;

pub const CONFIG_FILENAME: &str = "comaudit.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub format: Option<String>,
    pub fail_on: Option<String>,
    pub color: Option<bool>,
    pub known_folders: Option<KnownFoldersConfig>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Folder overrides for trust classification. Unset lists fall back to the environment.
#[derive(Debug, Deserialize, Default)]
pub struct KnownFoldersConfig {
    pub system: Option<Vec<String>>,
    pub program_files: Option<Vec<String>>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    let Some(folders) = &config.known_folders else {
        return Ok(());
    };

    let lists = [
        ("system", folders.system.as_deref()),
        ("program_files", folders.program_files.as_deref()),
    ];
    for (name, entries) in lists {
        for (i, entry) in entries.unwrap_or_default().iter().enumerate() {
            if entry.trim().is_empty() {
                bail!(
                    "Invalid config: known_folders.{}[{}] must not be empty.\n\n\
                     💡 Hint: Each folder entry must be an absolute path (e.g., \"C:\\Windows\\System32\").",
                    name,
                    i
                );
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "unknown config field");
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
format: json
fail_on: high
color: false
known_folders:
  system:
    - 'D:\Windows\System32'
  program_files:
    - 'D:\Apps'
    - 'D:\Apps (x86)'
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.format.as_deref(), Some("json"));
        assert_eq!(config.fail_on.as_deref(), Some("high"));
        assert_eq!(config.color, Some(false));
        let folders = config.known_folders.unwrap();
        assert_eq!(
            folders.system.as_deref(),
            Some(&[r"D:\Windows\System32".to_string()][..])
        );
        assert_eq!(folders.program_files.unwrap().len(), 2);
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "format: text\n").unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.format.as_deref(), Some("text"));
        assert!(config.known_folders.is_none());
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config_from_path(Path::new("/nonexistent/config.yml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_empty_folder_entry_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
known_folders:
  program_files:
    - 'C:\Program Files'
    - "   "
"#,
        )
        .unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("known_folders.program_files[1]"));
        assert!(message.contains("must not be empty"));
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
format: json
check_cve: true
exclude_packages: []
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("check_cve"));
        assert!(config.unknown_fields.contains_key("exclude_packages"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.format.is_none());
        assert!(config.fail_on.is_none());
        assert!(config.color.is_none());
        assert!(config.known_folders.is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
