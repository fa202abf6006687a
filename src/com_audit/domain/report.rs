use super::access::RiskLevel;
use super::component::{ComponentMap, ComponentRecord};
use super::security_info::{AuthenticationLevel, SecurityInfo, TrustLevel};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Identifies the run that produced a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub analysis_time: String,
    pub tool_name: String,
    pub tool_version: String,
    pub run_id: String,
}

/// Machine-wide settings read once per run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSecurity {
    pub default_access_level: AuthenticationLevel,
}

/// Security result as reported, with the system-object flag attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfoResult {
    #[serde(flatten)]
    pub info: SecurityInfo,
    pub is_system_object: bool,
}

impl From<SecurityInfo> for SecurityInfoResult {
    fn from(info: SecurityInfo) -> Self {
        let is_system_object = info.trust_level == TrustLevel::System;
        Self {
            info,
            is_system_object,
        }
    }
}

/// Complete output of one audit run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub metadata: ReportMetadata,
    pub machine: MachineSecurity,
    pub components: ComponentMap,
    pub security: BTreeMap<String, SecurityInfoResult>,
}

impl AuditReport {
    /// Component record for a security entry, if the registry stage produced one
    pub fn component(&self, id: &str) -> Option<&ComponentRecord> {
        self.components.get(id)
    }

    /// Number of findings at or above `threshold`
    pub fn findings_at_or_above(&self, threshold: RiskLevel) -> usize {
        self.security
            .values()
            .flat_map(|s| s.info.risks.iter())
            .filter(|r| r.level >= threshold)
            .count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_report(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTypeCount {
    pub server_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCount {
    pub level: RiskLevel,
    pub count: usize,
}

/// Aggregate counts over a report
///
/// Server types are ordered by descending count (ties by name) and risk
/// counts by descending level, which is the order the text report prints them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_objects: usize,
    pub elevated_objects: usize,
    pub server_types: Vec<ServerTypeCount>,
    pub security_risks: Vec<RiskCount>,
    pub risky_objects: usize,
}

impl ReportSummary {
    pub fn from_report(report: &AuditReport) -> Self {
        let mut type_counts: HashMap<String, usize> = HashMap::new();
        for record in report.components.values() {
            let key = record
                .server_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            *type_counts.entry(key).or_insert(0) += 1;
        }
        let mut server_types: Vec<ServerTypeCount> = type_counts
            .into_iter()
            .map(|(server_type, count)| ServerTypeCount { server_type, count })
            .collect();
        server_types.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.server_type.cmp(&b.server_type))
        });

        let mut risk_counts: BTreeMap<RiskLevel, usize> = BTreeMap::new();
        for finding in report.security.values().flat_map(|s| s.info.risks.iter()) {
            *risk_counts.entry(finding.level).or_insert(0) += 1;
        }
        let security_risks = risk_counts
            .into_iter()
            .rev()
            .map(|(level, count)| RiskCount { level, count })
            .collect();

        Self {
            total_objects: report.components.len(),
            elevated_objects: report
                .components
                .values()
                .filter(|r| r.is_elevated())
                .count(),
            server_types,
            security_risks,
            risky_objects: report
                .security
                .values()
                .filter(|s| !s.info.risks.is_empty())
                .count(),
        }
    }
}
