use super::{Analyzer, StageContext, StageRun};
use crate::com_audit::domain::{ComponentMap, ComponentRecord, ServerInfo, ServerType};
use crate::ports::outbound::registry_store::{key_path, CLSID_ROOT, TYPELIB_ROOT};
use crate::ports::outbound::{OptionalKey, ProgressInfo, RegistryStore, StoreResult};
use crate::shared::error::AuditError;
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Span};

const OPERATION: &str = "Analyzing COM Objects";

/// Registry stage: walks the component root and builds one record per id
pub struct RegistryAnalyzer<S> {
    store: Arc<S>,
    span: Span,
}

impl<S: RegistryStore> RegistryAnalyzer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            span: info_span!("stage", name = "Registry"),
        }
    }

    /// Builds the record for one component id
    ///
    /// # Returns
    /// `Ok(None)` when the key vanished or has no usable name
    ///
    /// # Errors
    /// Any other store failure; the caller omits the component
    pub fn inspect(&self, id: &str) -> Result<Option<ComponentRecord>> {
        let key = key_path(CLSID_ROOT, id);

        let name = match self.store.default_value(&key).optional()? {
            Some(value) => value.as_string().filter(|n| !n.trim().is_empty()),
            None => None,
        };
        let Some(name) = name else {
            return Ok(None);
        };

        let server = self.resolve_server(&key)?;
        let is_elevated = self.store.key_exists(&key_path(&key, "Elevation"))?;
        let prog_id = self
            .read_text(&key_path(&key, "ProgID"))?
            .filter(|p| !p.trim().is_empty());
        let type_lib_path = self.resolve_type_lib(&key);
        let last_modified = self.store.last_write_time(&key).unwrap_or_else(|e| {
            debug!(id, error = %e, "last-write time unavailable");
            None
        });

        ComponentRecord::builder(id, name)
            .server(server)
            .elevated(is_elevated)
            .prog_id(prog_id)
            .type_lib_path(type_lib_path)
            .last_modified(last_modified)
            .build()
            .map(Some)
    }

    /// Default value of a key as text; a missing key reads as `None`
    fn read_text(&self, path: &str) -> StoreResult<Option<String>> {
        Ok(self
            .store
            .default_value(path)
            .optional()?
            .and_then(|v| v.as_string()))
    }

    /// Probes server keys in priority order; the first with a non-blank path wins
    fn resolve_server(&self, component_key: &str) -> StoreResult<ServerInfo> {
        for server_type in ServerType::PROBE_ORDER {
            let server_key = key_path(component_key, server_type.key_name());
            let Some(path) = self.read_text(&server_key)? else {
                continue;
            };
            if path.trim().is_empty() {
                continue;
            }
            let threading_model = self
                .store
                .value(&server_key, "ThreadingModel")?
                .and_then(|v| v.as_string());
            return Ok(ServerInfo {
                server_type: Some(server_type),
                server_path: Some(path),
                threading_model,
            });
        }
        Ok(ServerInfo::default())
    }

    /// Resolves the win32 path of the component's type library
    ///
    /// Versions are compared as plain strings, so "9.0" is chosen over "10.0".
    /// Every failure yields `None`.
    fn resolve_type_lib(&self, component_key: &str) -> Option<String> {
        let lookup = || -> StoreResult<Option<String>> {
            let Some(type_lib_id) = self
                .read_text(&key_path(component_key, "TypeLib"))?
                .filter(|t| !t.trim().is_empty())
            else {
                return Ok(None);
            };

            let root = key_path(TYPELIB_ROOT, &type_lib_id);
            let Some(version) = self.store.subkey_names(&root)?.into_iter().max() else {
                return Ok(None);
            };

            self.read_text(&key_path(&key_path(&root, &version), "win32"))
        };

        lookup().unwrap_or_else(|e| {
            debug!(key = component_key, error = %e, "type library unresolved");
            None
        })
    }
}

#[async_trait]
impl<S: RegistryStore> Analyzer for RegistryAnalyzer<S> {
    type Output = ComponentMap;

    fn name(&self) -> &'static str {
        "Registry"
    }

    fn description(&self) -> &'static str {
        "Analyzes COM object registry entries"
    }

    async fn analyze(&self, ctx: StageContext<'_>) -> Result<StageRun<ComponentMap>> {
        let ids = self.store.subkey_names(CLSID_ROOT).map_err(|e| {
            warn!(parent: &self.span, error = %e, "cannot enumerate component root");
            AuditError::EnumerationFailed {
                stage: self.name().to_string(),
                path: CLSID_ROOT.to_string(),
                details: e.to_string(),
            }
        })?;

        let total = ids.len();
        let mut components = ComponentMap::new();
        let mut omitted = 0;

        for (index, id) in ids.iter().enumerate() {
            ctx.checkpoint(self.name()).await?;
            ctx.progress
                .report_progress(&ProgressInfo::new(OPERATION, index + 1, total).with_extra(id));

            match self.span.in_scope(|| self.inspect(id)) {
                Ok(Some(record)) => {
                    components.insert(id.clone(), record);
                }
                Ok(None) => {
                    debug!(parent: &self.span, id = %id, "skipped unnamed or missing component");
                    omitted += 1;
                }
                Err(e) => {
                    warn!(parent: &self.span, id = %id, error = %e, "error analyzing COM object");
                    omitted += 1;
                }
            }
        }

        debug!(parent: &self.span, processed = components.len(), omitted, "registry walk finished");
        Ok(StageRun {
            processed: components.len(),
            omitted,
            output: components,
        })
    }
}
