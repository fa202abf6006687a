use crate::com_audit::domain::SecurityDescriptor;
use crate::ports::outbound::RegistryValue;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// On-disk form of a registry snapshot: hive name -> key tree
///
/// ```yaml
/// HKCR:
///   subkeys:
///     CLSID:
///       subkeys:
///         "{0000-...}":
///           default: Sample Object
///           security:
///             owner: Administrators
///             entries:
///               - principal: Everyone
///                 rights: [ReadKey]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SnapshotDocument {
    pub hives: BTreeMap<String, SnapshotNode>,
}

/// One key in a snapshot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotNode {
    #[serde(default)]
    pub default: Option<RegistryValue>,
    #[serde(default)]
    pub values: BTreeMap<String, RegistryValue>,
    #[serde(default)]
    pub subkeys: BTreeMap<String, SnapshotNode>,
    #[serde(default)]
    pub security: Option<SecurityDescriptor>,
    #[serde(default)]
    pub last_write_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_denied: bool,
}
