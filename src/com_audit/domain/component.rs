use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Map of component id to its discovered record, as produced by the registry stage
pub type ComponentMap = BTreeMap<String, ComponentRecord>;

/// How a COM server is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServerType {
    /// DLL loaded into the client process
    #[serde(rename = "InprocServer32")]
    InProcess,
    /// Separate executable
    #[serde(rename = "LocalServer32")]
    LocalProcess,
}

impl ServerType {
    /// Probe order used when resolving a component's server; the first hit wins
    pub const PROBE_ORDER: [ServerType; 2] = [ServerType::InProcess, ServerType::LocalProcess];

    /// Name of the child key that describes this server type
    pub fn key_name(&self) -> &'static str {
        match self {
            ServerType::InProcess => "InprocServer32",
            ServerType::LocalProcess => "LocalServer32",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// Server resolution result: all three fields are present or all are absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_type: Option<ServerType>,
    pub server_path: Option<String>,
    pub threading_model: Option<String>,
}

/// One registered COM component discovered under the component root
///
/// Records are immutable once built. A record without a usable name is never
/// produced; [`ComponentRecord::builder`] rejects blank names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_type: Option<ServerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    threading_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_lib_path: Option<String>,
    is_elevated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
}

impl ComponentRecord {
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ComponentRecordBuilder {
        ComponentRecordBuilder {
            id: id.into(),
            name: name.into(),
            server: ServerInfo::default(),
            type_lib_path: None,
            is_elevated: false,
            prog_id: None,
            last_modified: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server_type(&self) -> Option<ServerType> {
        self.server_type
    }

    pub fn server_path(&self) -> Option<&str> {
        self.server_path.as_deref()
    }

    pub fn threading_model(&self) -> Option<&str> {
        self.threading_model.as_deref()
    }

    pub fn type_lib_path(&self) -> Option<&str> {
        self.type_lib_path.as_deref()
    }

    pub fn is_elevated(&self) -> bool {
        self.is_elevated
    }

    pub fn prog_id(&self) -> Option<&str> {
        self.prog_id.as_deref()
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// Builder for [`ComponentRecord`]
#[derive(Debug, Clone)]
pub struct ComponentRecordBuilder {
    id: String,
    name: String,
    server: ServerInfo,
    type_lib_path: Option<String>,
    is_elevated: bool,
    prog_id: Option<String>,
    last_modified: Option<DateTime<Utc>>,
}

impl ComponentRecordBuilder {
    pub fn server(mut self, server: ServerInfo) -> Self {
        self.server = server;
        self
    }

    pub fn type_lib_path(mut self, path: Option<String>) -> Self {
        self.type_lib_path = path;
        self
    }

    pub fn elevated(mut self, is_elevated: bool) -> Self {
        self.is_elevated = is_elevated;
        self
    }

    pub fn prog_id(mut self, prog_id: Option<String>) -> Self {
        self.prog_id = prog_id;
        self
    }

    pub fn last_modified(mut self, last_modified: Option<DateTime<Utc>>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Finalizes the record
    ///
    /// # Errors
    /// Returns an error if the id is empty or the name is blank
    pub fn build(self) -> Result<ComponentRecord> {
        if self.id.trim().is_empty() {
            anyhow::bail!("Component id cannot be empty");
        }
        if self.name.trim().is_empty() {
            anyhow::bail!("Component {} has no name", self.id);
        }

        Ok(ComponentRecord {
            id: self.id,
            name: self.name,
            server_type: self.server.server_type,
            server_path: self.server.server_path,
            threading_model: self.server.threading_model,
            type_lib_path: self.type_lib_path,
            is_elevated: self.is_elevated,
            prog_id: self.prog_id,
            last_modified: self.last_modified,
        })
    }
}
