use chrono::{DateTime, Utc};
use comaudit::com_audit::domain::SecurityDescriptor;
use comaudit::ports::outbound::{RegistryValue, StoreError, StoreResult};
use comaudit::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock RegistryStore wrapping an in-memory registry
///
/// Counts every read and fails any read of a path registered with
/// `fail_path`, regardless of what the wrapped registry holds.
pub struct MockRegistryStore {
    inner: InMemoryRegistry,
    failures: HashMap<String, StoreError>,
    reads: AtomicUsize,
}

impl MockRegistryStore {
    pub fn new(inner: InMemoryRegistry) -> Self {
        Self {
            inner,
            failures: HashMap::new(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn fail_path(mut self, path: &str, details: &str) -> Self {
        self.failures.insert(
            path.to_lowercase(),
            StoreError::Read {
                path: path.to_string(),
                details: details.to_string(),
            },
        );
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self, path: &str) -> StoreResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.failures.get(&path.to_lowercase()) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl RegistryStore for MockRegistryStore {
    fn subkey_names(&self, path: &str) -> StoreResult<Vec<String>> {
        self.check(path)?;
        self.inner.subkey_names(path)
    }

    fn key_exists(&self, path: &str) -> StoreResult<bool> {
        self.check(path)?;
        self.inner.key_exists(path)
    }

    fn default_value(&self, path: &str) -> StoreResult<Option<RegistryValue>> {
        self.check(path)?;
        self.inner.default_value(path)
    }

    fn value(&self, path: &str, name: &str) -> StoreResult<Option<RegistryValue>> {
        self.check(path)?;
        self.inner.value(path, name)
    }

    fn security_descriptor(&self, path: &str) -> StoreResult<SecurityDescriptor> {
        self.check(path)?;
        self.inner.security_descriptor(path)
    }

    fn last_write_time(&self, path: &str) -> StoreResult<Option<DateTime<Utc>>> {
        self.check(path)?;
        self.inner.last_write_time(path)
    }
}
