use crate::com_audit::domain::{
    AccessPermission, AuthenticationLevel, Capabilities, ComponentRecord, ImpersonationLevel,
    LaunchPermission, SecurityInfo, TrustLevel, UNKNOWN_OWNER,
};
use crate::com_audit::policies::PermissionRiskPolicy;
use crate::ports::outbound::registry_store::{
    key_path, APPID_ROOT, CLSID_ROOT, DEFAULT_ACCESS_LEVEL_VALUE, OLE_KEY,
};
use crate::ports::outbound::{RegistryStore, RegistryValue};
use std::sync::Arc;
use tracing::debug;

/// Reads ACLs and DCOM settings for components
///
/// Every read is independent and fails soft: an unreadable owner becomes
/// `"Unknown"`, unreadable ACLs become empty lists, and unreadable settings
/// fall back to their defaults.
pub struct AccessControlEvaluator<S> {
    store: Arc<S>,
}

impl<S: RegistryStore> AccessControlEvaluator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Builds the security aggregate for a component
    ///
    /// Trust level is left at `Custom` and risks empty; the security stage
    /// fills both in.
    pub fn evaluate(&self, id: &str, record: &ComponentRecord) -> SecurityInfo {
        SecurityInfo {
            id: id.to_string(),
            object_name: record.name().to_string(),
            owner: self.owner(id),
            server_type: record.server_type(),
            access_permissions: self.access_permissions(id),
            launch_permissions: self.launch_permissions(id),
            authentication_level: self.authentication_level(id),
            impersonation_level: self.impersonation_level(id),
            capabilities: self.capabilities(id),
            trust_level: TrustLevel::Custom,
            risks: Vec::new(),
        }
    }

    pub fn owner(&self, id: &str) -> String {
        let key = key_path(CLSID_ROOT, id);
        match self.store.security_descriptor(&key) {
            Ok(sd) => sd
                .owner
                .filter(|o| !o.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
            Err(e) => {
                debug!(id, error = %e, "owner unavailable");
                UNKNOWN_OWNER.to_string()
            }
        }
    }

    /// Every rule on the component key, inherited ones included, in descriptor order
    pub fn access_permissions(&self, id: &str) -> Vec<AccessPermission> {
        let key = key_path(CLSID_ROOT, id);
        match self.store.security_descriptor(&key) {
            Ok(sd) => sd.entries.iter().map(PermissionRiskPolicy::evaluate).collect(),
            Err(e) => {
                debug!(id, error = %e, "access rules unavailable");
                Vec::new()
            }
        }
    }

    /// Rules on the application-identity key that grant remote or local launch
    pub fn launch_permissions(&self, id: &str) -> Vec<LaunchPermission> {
        let key = key_path(APPID_ROOT, id);
        match self.store.security_descriptor(&key) {
            Ok(sd) => sd
                .entries
                .iter()
                .filter_map(PermissionRiskPolicy::launch_permission)
                .collect(),
            Err(e) => {
                debug!(id, error = %e, "launch rules unavailable");
                Vec::new()
            }
        }
    }

    pub fn authentication_level(&self, id: &str) -> AuthenticationLevel {
        self.app_id_value(id, "AuthenticationLevel")
            .and_then(|v| v.as_i64())
            .map(AuthenticationLevel::from_code)
            .unwrap_or_default()
    }

    pub fn impersonation_level(&self, id: &str) -> ImpersonationLevel {
        self.app_id_value(id, "ImpersonationLevel")
            .and_then(|v| v.as_i64())
            .map(ImpersonationLevel::from_code)
            .unwrap_or_default()
    }

    pub fn capabilities(&self, id: &str) -> Capabilities {
        let mut capabilities = Capabilities::NONE;

        if self.app_id_value(id, "RemoteServerName").is_some() {
            capabilities |= Capabilities::REMOTE_ACTIVATION;
        }
        if self.app_id_value(id, "DllSurrogate").is_some() {
            capabilities |= Capabilities::SURROGATE;
        }
        if self
            .app_id_value(id, "RunAs")
            .is_some_and(|v| !v.is_empty())
        {
            capabilities |= Capabilities::RUN_AS;
        }
        if self
            .app_id_value(id, "EnableAppContainer")
            .is_some_and(|v| v.as_bool())
        {
            capabilities |= Capabilities::APP_CONTAINER;
        }

        capabilities
    }

    /// Machine-wide default authentication level, independent of any component
    pub fn machine_default_access_level(&self) -> AuthenticationLevel {
        match self.store.value(OLE_KEY, DEFAULT_ACCESS_LEVEL_VALUE) {
            Ok(value) => value
                .and_then(|v| v.as_i64())
                .map(AuthenticationLevel::from_code)
                .unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "machine default access level unavailable");
                AuthenticationLevel::Default
            }
        }
    }

    /// Reads one named value from the application-identity key; failures read as absent
    fn app_id_value(&self, id: &str, name: &str) -> Option<RegistryValue> {
        let key = key_path(APPID_ROOT, id);
        self.store.value(&key, name).unwrap_or_else(|e| {
            debug!(id, value = name, error = %e, "application setting unavailable");
            None
        })
    }
}
