use crate::com_audit::domain::{
    AccessControlEntry, AccessPermission, AccessRights, LaunchPermission, RiskLevel,
};

/// Principals that match nearly every caller on a host
const BROAD_GROUPS: [&str; 2] = ["everyone", "authenticated users"];

/// PermissionRiskPolicy scores access-control entries
///
/// Rules, first match wins:
/// 1. Broad group with full control => Critical
/// 2. Broad group with write access => High
/// 3. Anyone who can change permissions or take ownership => High
/// 4. Everything else => Low
///
/// The effect (allow or deny) is not considered; a deny rule is scored like
/// the equivalent allow rule.
pub struct PermissionRiskPolicy;

impl PermissionRiskPolicy {
    /// True when the principal names a broad group (case-insensitive substring)
    pub fn is_broad_group(principal: &str) -> bool {
        let principal = principal.to_lowercase();
        BROAD_GROUPS.iter().any(|group| principal.contains(group))
    }

    pub fn score(principal: &str, rights: AccessRights) -> RiskLevel {
        let broad = Self::is_broad_group(principal);

        if broad && rights.contains(AccessRights::FULL_CONTROL) {
            RiskLevel::Critical
        } else if broad && rights.contains(AccessRights::WRITE_KEY) {
            RiskLevel::High
        } else if rights.contains(AccessRights::CHANGE_PERMISSIONS)
            || rights.contains(AccessRights::TAKE_OWNERSHIP)
        {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// Converts a raw entry into a scored access permission
    pub fn evaluate(entry: &AccessControlEntry) -> AccessPermission {
        AccessPermission {
            principal: entry.principal.clone(),
            access_mask: entry.rights,
            access_type: entry.effect,
            is_inherited: entry.inherited,
            risk_level: Self::score(&entry.principal, entry.rights),
        }
    }

    /// Reads an application-identity entry as launch rights
    ///
    /// # Returns
    /// `None` when the entry grants neither remote nor local launch
    pub fn launch_permission(entry: &AccessControlEntry) -> Option<LaunchPermission> {
        let full = entry.rights.contains(AccessRights::FULL_CONTROL);
        let allow_remote_launch = full || entry.rights.contains(AccessRights::READ_KEY);
        let allow_local_launch = full || entry.rights.contains(AccessRights::EXECUTE_KEY);

        if !allow_remote_launch && !allow_local_launch {
            return None;
        }

        Some(LaunchPermission {
            permission: Self::evaluate(entry),
            allow_remote_launch,
            allow_local_launch,
        })
    }
}
