use crate::com_audit::domain::SecurityDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root of the component registrations, keyed by CLSID
pub const CLSID_ROOT: &str = r"HKCR\CLSID";
/// Root of the application identities, keyed by the same ids as `CLSID_ROOT`
pub const APPID_ROOT: &str = r"HKCR\AppID";
/// Root of the type-library registrations
pub const TYPELIB_ROOT: &str = r"HKCR\TypeLib";
/// Machine-wide DCOM settings
pub const OLE_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Ole";
pub const DEFAULT_ACCESS_LEVEL_VALUE: &str = "DefaultAccessLevel";

/// Joins a parent key path and a child name with a backslash
pub fn key_path(parent: &str, child: &str) -> String {
    format!(r"{}\{}", parent.trim_end_matches('\\'), child)
}

/// Errors from a single store read
///
/// None of these are fatal inside a unit of work; callers turn them into
/// absent fields, defaults or empty lists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("registry key not found: {path}")]
    NotFound { path: String },

    #[error("access denied reading registry key: {path}")]
    AccessDenied { path: String },

    #[error("failed to read registry key {path}: {details}")]
    Read { path: String, details: String },
}

impl StoreError {
    pub fn path(&self) -> &str {
        match self {
            StoreError::NotFound { path }
            | StoreError::AccessDenied { path }
            | StoreError::Read { path, .. } => path,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Treats a missing key as an absent value instead of an error
pub trait OptionalKey<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalKey<T> for StoreResult<Option<T>> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Err(StoreError::NotFound { .. }) => Ok(None),
            other => other,
        }
    }
}

/// A registry value as stored under a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryValue {
    Dword(u32),
    Qword(u64),
    String(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
}

impl RegistryValue {
    /// Textual form of string and numeric values
    pub fn as_string(&self) -> Option<String> {
        match self {
            RegistryValue::String(s) => Some(s.clone()),
            RegistryValue::Dword(n) => Some(n.to_string()),
            RegistryValue::Qword(n) => Some(n.to_string()),
            RegistryValue::MultiString(items) => Some(items.join("\n")),
            RegistryValue::Binary(_) => None,
        }
    }

    /// Integer form; strings are parsed after trimming
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RegistryValue::Dword(n) => Some(i64::from(*n)),
            RegistryValue::Qword(n) => i64::try_from(*n).ok(),
            RegistryValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Truthiness: non-zero numbers and a case-insensitive `"true"`
    pub fn as_bool(&self) -> bool {
        match self {
            RegistryValue::Dword(n) => *n != 0,
            RegistryValue::Qword(n) => *n != 0,
            RegistryValue::String(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s.parse::<i64>().map(|n| n != 0).unwrap_or(false)
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RegistryValue::String(s) => s.is_empty(),
            RegistryValue::MultiString(items) => items.is_empty(),
            RegistryValue::Binary(bytes) => bytes.is_empty(),
            RegistryValue::Dword(_) | RegistryValue::Qword(_) => false,
        }
    }
}

impl From<&str> for RegistryValue {
    fn from(value: &str) -> Self {
        RegistryValue::String(value.to_string())
    }
}

impl From<String> for RegistryValue {
    fn from(value: String) -> Self {
        RegistryValue::String(value)
    }
}

impl From<u32> for RegistryValue {
    fn from(value: u32) -> Self {
        RegistryValue::Dword(value)
    }
}

/// RegistryStore port for read-only access to a hierarchical key store
///
/// Paths are backslash-separated and start with a hive (`HKCR`, `HKLM` or
/// their long forms). Lookups ignore case. Implementations never mutate the
/// store.
pub trait RegistryStore: Send + Sync {
    /// Lists the names of a key's direct children
    ///
    /// # Errors
    /// Returns `NotFound` if the key does not exist, `AccessDenied` if it
    /// cannot be opened
    fn subkey_names(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Checks whether a key exists
    ///
    /// # Returns
    /// `Ok(false)` for a missing key; existence does not require read access
    fn key_exists(&self, path: &str) -> StoreResult<bool>;

    /// Reads a key's default (unnamed) value
    ///
    /// # Returns
    /// `Ok(None)` when the key exists but has no default value
    fn default_value(&self, path: &str) -> StoreResult<Option<RegistryValue>>;

    /// Reads a named value
    ///
    /// # Returns
    /// `Ok(None)` when the key exists but has no such value
    fn value(&self, path: &str, name: &str) -> StoreResult<Option<RegistryValue>>;

    /// Reads the owner and access-control entries attached to a key
    fn security_descriptor(&self, path: &str) -> StoreResult<SecurityDescriptor>;

    /// Reads a key's last-write timestamp
    fn last_write_time(&self, path: &str) -> StoreResult<Option<DateTime<Utc>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path() {
        assert_eq!(key_path(CLSID_ROOT, "{A}"), r"HKCR\CLSID\{A}");
        assert_eq!(key_path(r"HKCR\CLSID\", "{A}"), r"HKCR\CLSID\{A}");
    }

    #[test]
    fn test_value_deserialization_shapes() {
        let v: RegistryValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, RegistryValue::Dword(3));
        let v: RegistryValue = serde_json::from_str("8589934592").unwrap();
        assert_eq!(v, RegistryValue::Qword(8_589_934_592));
        let v: RegistryValue = serde_json::from_str(r#""Apartment""#).unwrap();
        assert_eq!(v, RegistryValue::String("Apartment".to_string()));
        let v: RegistryValue = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(
            v,
            RegistryValue::MultiString(vec!["a".to_string(), "b".to_string()])
        );
        let v: RegistryValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, RegistryValue::Binary(vec![1, 2]));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(RegistryValue::Dword(6).as_i64(), Some(6));
        assert_eq!(RegistryValue::String(" 4 ".to_string()).as_i64(), Some(4));
        assert_eq!(RegistryValue::String("abc".to_string()).as_i64(), None);
        assert_eq!(RegistryValue::Binary(vec![1]).as_i64(), None);
    }

    #[test]
    fn test_as_bool() {
        assert!(RegistryValue::Dword(1).as_bool());
        assert!(!RegistryValue::Dword(0).as_bool());
        assert!(RegistryValue::String("TRUE".to_string()).as_bool());
        assert!(!RegistryValue::String("false".to_string()).as_bool());
        assert!(!RegistryValue::String("yes".to_string()).as_bool());
    }

    #[test]
    fn test_is_empty() {
        assert!(RegistryValue::String(String::new()).is_empty());
        assert!(!RegistryValue::String("x".to_string()).is_empty());
        assert!(!RegistryValue::Dword(0).is_empty());
    }

    #[test]
    fn test_optional_maps_only_not_found() {
        let missing: StoreResult<Option<u32>> = Err(StoreError::NotFound {
            path: "x".to_string(),
        });
        assert_eq!(missing.optional(), Ok(None));

        let denied: StoreResult<Option<u32>> = Err(StoreError::AccessDenied {
            path: "x".to_string(),
        });
        assert!(denied.optional().is_err());

        let present: StoreResult<Option<u32>> = Ok(Some(1));
        assert_eq!(present.optional(), Ok(Some(1)));
    }

    #[test]
    fn test_store_error_path() {
        let err = StoreError::AccessDenied {
            path: r"HKCR\AppID\{A}".to_string(),
        };
        assert_eq!(err.path(), r"HKCR\AppID\{A}");
        assert!(err.to_string().contains("access denied"));
    }
}
