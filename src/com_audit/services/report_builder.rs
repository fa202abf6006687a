use crate::com_audit::domain::{
    AuditReport, ComponentMap, MachineSecurity, ReportMetadata, SecurityInfo,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// ReportBuilder assembles the final audit report from stage outputs
pub struct ReportBuilder;

impl ReportBuilder {
    /// Generates run metadata with the current timestamp and a fresh run id
    pub fn generate_metadata(tool_name: &str, tool_version: &str) -> ReportMetadata {
        ReportMetadata {
            analysis_time: Utc::now().to_rfc3339(),
            tool_name: tool_name.to_string(),
            tool_version: tool_version.to_string(),
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Metadata naming this crate and its compile-time version
    pub fn default_metadata() -> ReportMetadata {
        Self::generate_metadata(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    pub fn build(
        metadata: ReportMetadata,
        machine: MachineSecurity,
        components: ComponentMap,
        security: BTreeMap<String, SecurityInfo>,
    ) -> AuditReport {
        AuditReport {
            metadata,
            machine,
            components,
            security: security
                .into_iter()
                .map(|(id, info)| (id, info.into()))
                .collect(),
        }
    }
}
