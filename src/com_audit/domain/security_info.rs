use super::access::{AccessPermission, LaunchPermission, RiskLevel};
use super::component::ServerType;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Owner sentinel used when a descriptor owner cannot be read
pub const UNKNOWN_OWNER: &str = "Unknown";

/// DCOM authentication level, integer-coded in the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum AuthenticationLevel {
    #[default]
    Default,
    None,
    Connect,
    Call,
    Packet,
    PacketIntegrity,
    PacketPrivacy,
}

impl AuthenticationLevel {
    /// Maps a registry integer to a level; anything outside 0..=6 is `Default`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AuthenticationLevel::None,
            2 => AuthenticationLevel::Connect,
            3 => AuthenticationLevel::Call,
            4 => AuthenticationLevel::Packet,
            5 => AuthenticationLevel::PacketIntegrity,
            6 => AuthenticationLevel::PacketPrivacy,
            _ => AuthenticationLevel::Default,
        }
    }
}

impl fmt::Display for AuthenticationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// DCOM impersonation level, integer-coded in the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ImpersonationLevel {
    #[default]
    Default,
    Anonymous,
    Identify,
    Impersonate,
    Delegate,
}

impl ImpersonationLevel {
    /// Maps a registry integer to a level; anything outside 0..=4 is `Default`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ImpersonationLevel::Anonymous,
            2 => ImpersonationLevel::Identify,
            3 => ImpersonationLevel::Impersonate,
            4 => ImpersonationLevel::Delegate,
            _ => ImpersonationLevel::Default,
        }
    }
}

impl fmt::Display for ImpersonationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Activation capabilities declared on the application-identity node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const REMOTE_ACTIVATION: Capabilities = Capabilities(1);
    pub const SURROGATE: Capabilities = Capabilities(2);
    pub const RUN_AS: Capabilities = Capabilities(4);
    pub const APP_CONTAINER: Capabilities = Capabilities(8);
    pub const ACTIVATION_IN_PACKAGE: Capabilities = Capabilities(16);

    const NAMED: [(&'static str, Capabilities); 5] = [
        ("RemoteActivation", Self::REMOTE_ACTIVATION),
        ("Surrogate", Self::SURROGATE),
        ("RunAs", Self::RUN_AS),
        ("AppContainer", Self::APP_CONTAINER),
        ("ActivationInPackage", Self::ACTIVATION_IN_PACKAGE),
    ];

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Capabilities) {
        self.0 |= other.0;
    }

    /// Names of the set bits, lowest bit first
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        Capabilities(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Capabilities) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        f.write_str(&self.names().join(", "))
    }
}

impl Serialize for Capabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Coarse trust classification of where a component's server lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TrustLevel {
    #[default]
    Custom,
    ProgramFiles,
    System,
    Elevated,
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One actionable risk raised against a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFinding {
    pub level: RiskLevel,
    pub description: String,
    pub affected_account: String,
    pub remediation: String,
}

impl SecurityFinding {
    pub fn new(
        level: RiskLevel,
        description: impl Into<String>,
        affected_account: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            level,
            description: description.into(),
            affected_account: affected_account.into(),
            remediation: remediation.into(),
        }
    }
}

/// Per-component security aggregate produced by the security stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub id: String,
    pub object_name: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_type: Option<ServerType>,
    pub access_permissions: Vec<AccessPermission>,
    pub launch_permissions: Vec<LaunchPermission>,
    pub authentication_level: AuthenticationLevel,
    pub impersonation_level: ImpersonationLevel,
    pub capabilities: Capabilities,
    pub trust_level: TrustLevel,
    pub risks: Vec<SecurityFinding>,
}

impl SecurityInfo {
    /// Highest finding level, if any finding was raised
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.risks.iter().map(|r| r.level).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_level_codes() {
        assert_eq!(AuthenticationLevel::from_code(0), AuthenticationLevel::Default);
        assert_eq!(AuthenticationLevel::from_code(2), AuthenticationLevel::Connect);
        assert_eq!(
            AuthenticationLevel::from_code(6),
            AuthenticationLevel::PacketPrivacy
        );
        assert_eq!(AuthenticationLevel::from_code(7), AuthenticationLevel::Default);
        assert_eq!(AuthenticationLevel::from_code(-1), AuthenticationLevel::Default);
    }

    #[test]
    fn test_impersonation_level_codes() {
        assert_eq!(ImpersonationLevel::from_code(3), ImpersonationLevel::Impersonate);
        assert_eq!(ImpersonationLevel::from_code(4), ImpersonationLevel::Delegate);
        assert_eq!(ImpersonationLevel::from_code(99), ImpersonationLevel::Default);
    }

    #[test]
    fn test_capabilities_bits_and_names() {
        let caps = Capabilities::REMOTE_ACTIVATION | Capabilities::RUN_AS;
        assert_eq!(caps.bits(), 5);
        assert!(caps.contains(Capabilities::REMOTE_ACTIVATION));
        assert!(!caps.contains(Capabilities::SURROGATE));
        assert_eq!(caps.names(), vec!["RemoteActivation", "RunAs"]);
        assert_eq!(caps.to_string(), "RemoteActivation, RunAs");
        assert_eq!(Capabilities::NONE.to_string(), "None");
    }

    #[test]
    fn test_capabilities_serialize_as_names() {
        let json = serde_json::to_string(&Capabilities::SURROGATE).unwrap();
        assert_eq!(json, r#"["Surrogate"]"#);
    }

    #[test]
    fn test_highest_risk() {
        let mut info = SecurityInfo {
            id: "{A}".to_string(),
            object_name: "A".to_string(),
            owner: UNKNOWN_OWNER.to_string(),
            server_type: None,
            access_permissions: vec![],
            launch_permissions: vec![],
            authentication_level: AuthenticationLevel::Default,
            impersonation_level: ImpersonationLevel::Default,
            capabilities: Capabilities::NONE,
            trust_level: TrustLevel::Custom,
            risks: vec![],
        };
        assert_eq!(info.highest_risk(), None);

        info.risks.push(SecurityFinding::new(RiskLevel::High, "a", "b", "c"));
        info.risks
            .push(SecurityFinding::new(RiskLevel::Critical, "a", "b", "c"));
        assert_eq!(info.highest_risk(), Some(RiskLevel::Critical));
    }
}
