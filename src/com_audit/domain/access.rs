use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Registry access rights bitmask attached to an access-control entry
///
/// Composite rights are ORs of their constituent bits, so every check is a
/// containment test (`rights & X == X`), never an equality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessRights(u32);

impl AccessRights {
    pub const NONE: AccessRights = AccessRights(0);
    pub const QUERY_VALUES: AccessRights = AccessRights(0x0001);
    pub const SET_VALUE: AccessRights = AccessRights(0x0002);
    pub const CREATE_SUB_KEY: AccessRights = AccessRights(0x0004);
    pub const ENUMERATE_SUB_KEYS: AccessRights = AccessRights(0x0008);
    pub const NOTIFY: AccessRights = AccessRights(0x0010);
    pub const CREATE_LINK: AccessRights = AccessRights(0x0020);
    pub const DELETE: AccessRights = AccessRights(0x0001_0000);
    pub const READ_PERMISSIONS: AccessRights = AccessRights(0x0002_0000);
    pub const CHANGE_PERMISSIONS: AccessRights = AccessRights(0x0004_0000);
    pub const TAKE_OWNERSHIP: AccessRights = AccessRights(0x0008_0000);

    pub const READ_KEY: AccessRights = AccessRights(
        Self::READ_PERMISSIONS.0 | Self::QUERY_VALUES.0 | Self::ENUMERATE_SUB_KEYS.0 | Self::NOTIFY.0,
    );
    /// Registry keys have no distinct execute bits; execute is read
    pub const EXECUTE_KEY: AccessRights = Self::READ_KEY;
    pub const WRITE_KEY: AccessRights =
        AccessRights(Self::READ_PERMISSIONS.0 | Self::SET_VALUE.0 | Self::CREATE_SUB_KEY.0);
    pub const FULL_CONTROL: AccessRights = AccessRights(
        Self::QUERY_VALUES.0
            | Self::SET_VALUE.0
            | Self::CREATE_SUB_KEY.0
            | Self::ENUMERATE_SUB_KEYS.0
            | Self::NOTIFY.0
            | Self::CREATE_LINK.0
            | Self::DELETE.0
            | Self::READ_PERMISSIONS.0
            | Self::CHANGE_PERMISSIONS.0
            | Self::TAKE_OWNERSHIP.0,
    );

    const NAMED: [(&'static str, AccessRights); 14] = [
        ("FullControl", Self::FULL_CONTROL),
        ("ReadKey", Self::READ_KEY),
        ("WriteKey", Self::WRITE_KEY),
        ("ExecuteKey", Self::EXECUTE_KEY),
        ("QueryValues", Self::QUERY_VALUES),
        ("SetValue", Self::SET_VALUE),
        ("CreateSubKey", Self::CREATE_SUB_KEY),
        ("EnumerateSubKeys", Self::ENUMERATE_SUB_KEYS),
        ("Notify", Self::NOTIFY),
        ("CreateLink", Self::CREATE_LINK),
        ("Delete", Self::DELETE),
        ("ReadPermissions", Self::READ_PERMISSIONS),
        ("ChangePermissions", Self::CHANGE_PERMISSIONS),
        ("TakeOwnership", Self::TAKE_OWNERSHIP),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        AccessRights(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is present in `self`
    pub const fn contains(&self, other: AccessRights) -> bool {
        self.0 & other.0 == other.0
    }

    /// Resolves a right by its registry name (case-insensitive)
    pub fn from_name(name: &str) -> Option<AccessRights> {
        Self::NAMED
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name.trim()))
            .map(|(_, rights)| *rights)
    }
}

impl BitOr for AccessRights {
    type Output = AccessRights;

    fn bitor(self, rhs: AccessRights) -> AccessRights {
        AccessRights(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessRights {
    fn bitor_assign(&mut self, rhs: AccessRights) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl Serialize for AccessRights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for AccessRights {
    /// Accepts a raw mask (`983103`) or a list of right names (`["ReadKey", "Delete"]`)
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRights {
            Mask(u32),
            Names(Vec<String>),
        }

        match RawRights::deserialize(deserializer)? {
            RawRights::Mask(bits) => Ok(AccessRights(bits)),
            RawRights::Names(names) => {
                let mut rights = AccessRights::NONE;
                for name in names {
                    rights |= AccessRights::from_name(&name).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown access right '{}'", name))
                    })?;
                }
                Ok(rights)
            }
        }
    }
}

/// Whether an ACE grants or denies its rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessEffect {
    #[default]
    Allow,
    Deny,
}

/// One raw rule from a key's access-control list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlEntry {
    pub principal: String,
    pub rights: AccessRights,
    #[serde(default)]
    pub effect: AccessEffect,
    #[serde(default)]
    pub inherited: bool,
}

impl AccessControlEntry {
    pub fn allow(principal: impl Into<String>, rights: AccessRights) -> Self {
        Self {
            principal: principal.into(),
            rights,
            effect: AccessEffect::Allow,
            inherited: false,
        }
    }

    pub fn deny(principal: impl Into<String>, rights: AccessRights) -> Self {
        Self {
            effect: AccessEffect::Deny,
            ..Self::allow(principal, rights)
        }
    }

    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }
}

/// Owner plus ordered rule set attached to a registry key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDescriptor {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub entries: Vec<AccessControlEntry>,
}

impl SecurityDescriptor {
    pub fn new(owner: Option<String>, entries: Vec<AccessControlEntry>) -> Self {
        Self { owner, entries }
    }
}

/// Severity assigned to a permission or finding
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(format!(
                "Invalid risk level: {}. Please specify 'low', 'medium', 'high' or 'critical'",
                s
            )),
        }
    }
}

/// An ACE on the component key together with its computed risk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPermission {
    pub principal: String,
    pub access_mask: AccessRights,
    pub access_type: AccessEffect,
    pub is_inherited: bool,
    pub risk_level: RiskLevel,
}

/// An ACE on the application-identity key read as activation rights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchPermission {
    #[serde(flatten)]
    pub permission: AccessPermission,
    pub allow_remote_launch: bool,
    pub allow_local_launch: bool,
}
