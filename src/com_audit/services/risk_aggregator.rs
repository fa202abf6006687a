use crate::com_audit::domain::{
    Capabilities, RiskLevel, SecurityFinding, SecurityInfo, TrustLevel,
};

/// RiskAggregator turns an evaluated component into findings
///
/// Pure and deterministic: the same input always yields the same findings in
/// the same order (dangerous permissions in permission order, then remote
/// activation, then elevation).
pub struct RiskAggregator;

impl RiskAggregator {
    pub fn aggregate(info: &SecurityInfo) -> Vec<SecurityFinding> {
        let mut findings: Vec<SecurityFinding> = info
            .access_permissions
            .iter()
            .filter(|p| p.risk_level >= RiskLevel::High)
            .map(|p| {
                SecurityFinding::new(
                    p.risk_level,
                    format!("Dangerous permissions granted to {}", p.principal),
                    p.principal.clone(),
                    format!("Review and restrict permissions for {}", p.principal),
                )
            })
            .collect();

        let remote_launch = info
            .launch_permissions
            .iter()
            .any(|p| p.allow_remote_launch);
        if info.capabilities.contains(Capabilities::REMOTE_ACTIVATION) && remote_launch {
            findings.push(SecurityFinding::new(
                RiskLevel::High,
                "COM object allows remote activation",
                "Multiple",
                "Review and restrict remote launch permissions",
            ));
        }

        if info.trust_level == TrustLevel::Elevated {
            findings.push(SecurityFinding::new(
                RiskLevel::High,
                "COM object runs with elevated privileges",
                "System",
                "Review necessity of elevation and consider alternatives",
            ));
        }

        findings
    }
}
