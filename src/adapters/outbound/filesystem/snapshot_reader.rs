use crate::adapters::outbound::registry::{InMemoryRegistry, SnapshotDocument};
use crate::shared::error::AuditError;
use crate::shared::security::{validate_input_file, MAX_SNAPSHOT_SIZE};
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Serialization of a snapshot file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SnapshotFormat::Json),
            "yml" | "yaml" => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }
}

/// SnapshotReader adapter that loads a registry snapshot from disk
///
/// The file is checked before it is read: symbolic links, non-regular files
/// and files above [`MAX_SNAPSHOT_SIZE`] are rejected.
pub struct SnapshotReader;

impl SnapshotReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads and parses a snapshot into an in-memory registry
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist (`SnapshotNotFound`)
    /// - The file fails the safety checks or cannot be read (`FileReadError`)
    /// - The extension is not `.json`, `.yml` or `.yaml`, or the content does
    ///   not parse (`SnapshotParseError`)
    pub fn read(&self, path: &Path) -> Result<InMemoryRegistry> {
        if fs::symlink_metadata(path).is_err() {
            return Err(AuditError::SnapshotNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let read_error = |details: String| AuditError::FileReadError {
            path: path.to_path_buf(),
            details,
        };
        validate_input_file(path, "registry snapshot", MAX_SNAPSHOT_SIZE)
            .map_err(|e| read_error(e.to_string()))?;
        let content = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;

        let document = Self::parse(path, &content)?;
        let registry = InMemoryRegistry::from_document(document);
        tracing::info!(
            path = %path.display(),
            keys = registry.key_count(),
            "loaded registry snapshot"
        );
        Ok(registry)
    }

    fn parse(path: &Path, content: &str) -> Result<SnapshotDocument> {
        let parse_error = |details: String| AuditError::SnapshotParseError {
            path: path.to_path_buf(),
            details,
        };

        let document = match SnapshotFormat::from_path(path) {
            Some(SnapshotFormat::Json) => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
            Some(SnapshotFormat::Yaml) => {
                serde_yaml_ng::from_str(content).map_err(|e| parse_error(e.to_string()))?
            }
            None => {
                return Err(parse_error(
                    "unsupported file extension (expected .json, .yml or .yaml)".to_string(),
                )
                .into())
            }
        };
        Ok(document)
    }
}

impl Default for SnapshotReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{RegistryStore, RegistryValue};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a.JSON")),
            Some(SnapshotFormat::Json)
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a.yaml")),
            Some(SnapshotFormat::Yaml)
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a.yml")),
            Some(SnapshotFormat::Yaml)
        );
        assert_eq!(SnapshotFormat::from_path(Path::new("a.reg")), None);
        assert_eq!(SnapshotFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_read_json_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snap.json");
        fs::write(
            &path,
            r#"{"HKCR": {"subkeys": {"CLSID": {"subkeys": {"{A}": {"default": "Alpha"}}}}}}"#,
        )
        .unwrap();

        let registry = SnapshotReader::new().read(&path).unwrap();
        assert_eq!(
            registry.default_value(r"HKCR\CLSID\{A}").unwrap(),
            Some(RegistryValue::String("Alpha".to_string()))
        );
    }

    #[test]
    fn test_read_yaml_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snap.yml");
        fs::write(
            &path,
            "HKEY_LOCAL_MACHINE:\n  subkeys:\n    SOFTWARE:\n      subkeys:\n        Microsoft:\n          subkeys:\n            Ole:\n              values:\n                DefaultAccessLevel: 2\n",
        )
        .unwrap();

        let registry = SnapshotReader::new().read(&path).unwrap();
        assert_eq!(
            registry
                .value(r"HKLM\SOFTWARE\Microsoft\Ole", "DefaultAccessLevel")
                .unwrap(),
            Some(RegistryValue::Dword(2))
        );
    }

    #[test]
    fn test_missing_snapshot() {
        let err = SnapshotReader::new()
            .read(&PathBuf::from("/nonexistent/snap.json"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::SnapshotNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_snapshot_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snap.json");
        fs::write(&path, "{ not json").unwrap();

        let err = SnapshotReader::new().read(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::SnapshotParseError { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snap.reg");
        fs::write(&path, "Windows Registry Editor Version 5.00").unwrap();

        let err = SnapshotReader::new().read(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported file extension"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = SnapshotReader::new().read(temp_dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::FileReadError { .. })
        ));
    }
}
