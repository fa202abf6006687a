pub mod access;
pub mod component;
pub mod report;
pub mod security_info;

pub use access::{
    AccessControlEntry, AccessEffect, AccessPermission, AccessRights, LaunchPermission, RiskLevel,
    SecurityDescriptor,
};
pub use component::{ComponentMap, ComponentRecord, ComponentRecordBuilder, ServerInfo, ServerType};
pub use report::{
    AuditReport, MachineSecurity, ReportMetadata, ReportSummary, RiskCount, SecurityInfoResult,
    ServerTypeCount,
};
pub use security_info::{
    AuthenticationLevel, Capabilities, ImpersonationLevel, SecurityFinding, SecurityInfo,
    TrustLevel, UNKNOWN_OWNER,
};
