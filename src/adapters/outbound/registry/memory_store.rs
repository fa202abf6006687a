use super::snapshot::{SnapshotDocument, SnapshotNode};
use crate::com_audit::domain::SecurityDescriptor;
use crate::ports::outbound::{RegistryStore, RegistryValue, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Maps short hive aliases to their long names
fn canonical_hive(segment: &str) -> String {
    match segment.to_ascii_uppercase().as_str() {
        "HKCR" | "HKEY_CLASSES_ROOT" => "HKEY_CLASSES_ROOT".to_string(),
        "HKLM" | "HKEY_LOCAL_MACHINE" => "HKEY_LOCAL_MACHINE".to_string(),
        "HKCU" | "HKEY_CURRENT_USER" => "HKEY_CURRENT_USER".to_string(),
        "HKU" | "HKEY_USERS" => "HKEY_USERS".to_string(),
        other => other.to_string(),
    }
}

/// Splits a path into lookup segments with the hive canonicalized
fn segments(path: &str) -> Vec<String> {
    let mut parts = path.split('\\').filter(|s| !s.is_empty());
    let mut out = Vec::new();
    if let Some(hive) = parts.next() {
        out.push(canonical_hive(hive));
    }
    out.extend(parts.map(str::to_string));
    out
}

#[derive(Debug, Clone, Default)]
struct RegistryNode {
    name: String,
    default: Option<RegistryValue>,
    /// Lowercased name -> (original name, value)
    values: BTreeMap<String, (String, RegistryValue)>,
    /// Lowercased name -> child
    children: BTreeMap<String, RegistryNode>,
    security: Option<SecurityDescriptor>,
    last_write_time: Option<DateTime<Utc>>,
    access_denied: bool,
}

impl RegistryNode {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn child_or_insert(&mut self, name: &str) -> &mut RegistryNode {
        self.children
            .entry(name.to_lowercase())
            .or_insert_with(|| RegistryNode::named(name))
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(RegistryNode::count).sum::<usize>()
    }

    fn from_snapshot(name: &str, snapshot: SnapshotNode) -> Self {
        let mut node = RegistryNode::named(name);
        node.default = snapshot.default;
        node.security = snapshot.security;
        node.last_write_time = snapshot.last_write_time;
        node.access_denied = snapshot.access_denied;
        for (value_name, value) in snapshot.values {
            node.values
                .insert(value_name.to_lowercase(), (value_name, value));
        }
        for (child_name, child) in snapshot.subkeys {
            let child = RegistryNode::from_snapshot(&child_name, child);
            node.children.insert(child_name.to_lowercase(), child);
        }
        node
    }
}

/// InMemoryRegistry adapter holding a full key tree in memory
///
/// Built from a snapshot document or programmatically through
/// [`InMemoryRegistry::builder`]. Reads never modify the tree, so a single
/// instance can back any number of audit runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    root: RegistryNode,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryRegistryBuilder {
        InMemoryRegistryBuilder {
            registry: InMemoryRegistry::new(),
        }
    }

    pub fn from_document(document: SnapshotDocument) -> Self {
        let mut registry = InMemoryRegistry::new();
        for (hive, node) in document.hives {
            let hive = canonical_hive(&hive);
            let node = RegistryNode::from_snapshot(&hive, node);
            registry.root.children.insert(hive.to_lowercase(), node);
        }
        registry
    }

    /// Total number of keys, hives included
    pub fn key_count(&self) -> usize {
        self.root.count() - 1
    }

    fn find(&self, path: &str) -> Option<&RegistryNode> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.children.get(&segment.to_lowercase())?;
        }
        Some(node)
    }

    /// Resolves a key that the caller wants to read from
    fn open(&self, path: &str) -> StoreResult<&RegistryNode> {
        let node = self.find(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        if node.access_denied {
            return Err(StoreError::AccessDenied {
                path: path.to_string(),
            });
        }
        Ok(node)
    }

    fn find_or_create(&mut self, path: &str) -> &mut RegistryNode {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.child_or_insert(&segment);
        }
        node
    }
}

impl RegistryStore for InMemoryRegistry {
    fn subkey_names(&self, path: &str) -> StoreResult<Vec<String>> {
        let node = self.open(path)?;
        Ok(node.children.values().map(|c| c.name.clone()).collect())
    }

    fn key_exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.find(path).is_some())
    }

    fn default_value(&self, path: &str) -> StoreResult<Option<RegistryValue>> {
        Ok(self.open(path)?.default.clone())
    }

    fn value(&self, path: &str, name: &str) -> StoreResult<Option<RegistryValue>> {
        let node = self.open(path)?;
        Ok(node
            .values
            .get(&name.to_lowercase())
            .map(|(_, value)| value.clone()))
    }

    fn security_descriptor(&self, path: &str) -> StoreResult<SecurityDescriptor> {
        Ok(self.open(path)?.security.clone().unwrap_or_default())
    }

    fn last_write_time(&self, path: &str) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.open(path)?.last_write_time)
    }
}

/// Attributes applied to one key by [`InMemoryRegistryBuilder::key`]
#[derive(Debug, Clone, Default)]
pub struct KeySpec {
    default: Option<RegistryValue>,
    values: Vec<(String, RegistryValue)>,
    security: Option<SecurityDescriptor>,
    last_write_time: Option<DateTime<Utc>>,
    access_denied: bool,
}

impl KeySpec {
    pub fn default_value(mut self, value: impl Into<RegistryValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<RegistryValue>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    pub fn security(mut self, descriptor: SecurityDescriptor) -> Self {
        self.security = Some(descriptor);
        self
    }

    pub fn last_write_time(mut self, time: DateTime<Utc>) -> Self {
        self.last_write_time = Some(time);
        self
    }

    pub fn access_denied(mut self) -> Self {
        self.access_denied = true;
        self
    }
}

/// Builder for [`InMemoryRegistry`]; missing intermediate keys are created
pub struct InMemoryRegistryBuilder {
    registry: InMemoryRegistry,
}

impl InMemoryRegistryBuilder {
    /// Creates (or extends) the key at `path`
    pub fn key<F>(mut self, path: &str, configure: F) -> Self
    where
        F: FnOnce(KeySpec) -> KeySpec,
    {
        let spec = configure(KeySpec::default());
        let node = self.registry.find_or_create(path);
        if spec.default.is_some() {
            node.default = spec.default;
        }
        for (name, value) in spec.values {
            node.values.insert(name.to_lowercase(), (name, value));
        }
        if spec.security.is_some() {
            node.security = spec.security;
        }
        if spec.last_write_time.is_some() {
            node.last_write_time = spec.last_write_time;
        }
        node.access_denied |= spec.access_denied;
        self
    }

    /// Creates an empty key at `path`
    pub fn empty_key(self, path: &str) -> Self {
        self.key(path, |k| k)
    }

    pub fn build(self) -> InMemoryRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::com_audit::domain::{AccessControlEntry, AccessRights};

    fn sample() -> InMemoryRegistry {
        InMemoryRegistry::builder()
            .key(r"HKCR\CLSID\{B}", |k| k.default_value("Beta"))
            .key(r"HKCR\CLSID\{A}", |k| {
                k.default_value("Alpha")
                    .security(SecurityDescriptor::new(
                        Some("Administrators".to_string()),
                        vec![AccessControlEntry::allow("Everyone", AccessRights::READ_KEY)],
                    ))
            })
            .key(r"HKCR\CLSID\{A}\InprocServer32", |k| {
                k.default_value(r"C:\a.dll").value("ThreadingModel", "Both")
            })
            .key(r"HKCR\CLSID\{Locked}", |k| k.access_denied())
            .build()
    }

    #[test]
    fn test_subkey_names_preserve_case_and_sort() {
        let registry = sample();
        let names = registry.subkey_names(r"HKCR\CLSID").unwrap();
        assert_eq!(names, vec!["{A}", "{B}", "{Locked}"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_accepts_aliases() {
        let registry = sample();
        let value = registry
            .default_value(r"HKEY_CLASSES_ROOT\clsid\{a}\inprocserver32")
            .unwrap();
        assert_eq!(value, Some(RegistryValue::String(r"C:\a.dll".to_string())));
        let model = registry
            .value(r"hkcr\CLSID\{A}\InprocServer32", "threadingmodel")
            .unwrap();
        assert_eq!(model, Some(RegistryValue::String("Both".to_string())));
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let registry = sample();
        let err = registry.default_value(r"HKCR\CLSID\{Z}").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(!registry.key_exists(r"HKCR\CLSID\{Z}").unwrap());
    }

    #[test]
    fn test_access_denied_key() {
        let registry = sample();
        assert!(registry.key_exists(r"HKCR\CLSID\{Locked}").unwrap());
        assert!(matches!(
            registry.default_value(r"HKCR\CLSID\{Locked}"),
            Err(StoreError::AccessDenied { .. })
        ));
        assert!(matches!(
            registry.security_descriptor(r"HKCR\CLSID\{Locked}"),
            Err(StoreError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_missing_descriptor_defaults_to_empty() {
        let registry = sample();
        let sd = registry.security_descriptor(r"HKCR\CLSID\{B}").unwrap();
        assert!(sd.owner.is_none());
        assert!(sd.entries.is_empty());

        let sd = registry.security_descriptor(r"HKCR\CLSID\{A}").unwrap();
        assert_eq!(sd.owner.as_deref(), Some("Administrators"));
        assert_eq!(sd.entries.len(), 1);
    }

    #[test]
    fn test_builder_extends_existing_key() {
        let registry = InMemoryRegistry::builder()
            .key(r"HKLM\SOFTWARE\Microsoft\Ole", |k| k.value("A", 1u32))
            .key(r"HKLM\SOFTWARE\Microsoft\Ole", |k| k.value("B", 2u32))
            .build();
        let path = r"HKLM\SOFTWARE\Microsoft\Ole";
        assert_eq!(registry.value(path, "A").unwrap(), Some(RegistryValue::Dword(1)));
        assert_eq!(registry.value(path, "B").unwrap(), Some(RegistryValue::Dword(2)));
        assert_eq!(registry.value(path, "C").unwrap(), None);
    }

    #[test]
    fn test_key_count() {
        // HKCR, CLSID, {A}, {B}, {Locked}, InprocServer32
        assert_eq!(sample().key_count(), 6);
    }
}
