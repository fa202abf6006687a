mod permission_risk;
mod trust_policy;

pub use permission_risk::PermissionRiskPolicy;
pub use trust_policy::{KnownFolders, TrustClassifier};
