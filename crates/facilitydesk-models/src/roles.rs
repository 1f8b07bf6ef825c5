//! Role and permission domain models and DTOs.
//!
//! A role is a named privilege tier: its `level` orders roles (lower is more
//! privileged) and its permission set lists the `(module, action)` pairs it
//! grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::{PermissionId, RoleId};

/// Generate a slug from a name
/// Converts to lowercase, replaces spaces and hyphens with underscores,
/// collapses runs of separators and trims them from both ends.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            slug.push(c);
            pending_separator = false;
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub module: String,
    pub action: String,
    /// `module:action`
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn new(module: &str, action: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: PermissionId::new(),
            module: module.to_string(),
            action: action.to_string(),
            name: facilitydesk_core::permissions::permission_name(module, action),
            description: Some(facilitydesk_core::permissions::describe(module, action)),
            created_at: now,
        }
    }

    pub fn matches(&self, module: &str, action: &str) -> bool {
        self.module == module && self.action == action
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// Unique slug, e.g. `manager`.
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Privilege level; 1 is the most privileged.
    pub level: u8,
    /// Granted permissions, kept in catalog order without duplicates.
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn has_permission_id(&self, id: &PermissionId) -> bool {
        self.permission_ids.contains(id)
    }

    /// True when this role is at least as privileged as `other`.
    pub fn at_least(&self, other: &Role) -> bool {
        self.level <= other.level
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub display_name: String,
    /// Slug override; derived from `display_name` when absent.
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 99, message = "Level must be between 1 and 99"))]
    pub level: u8,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub display_name: Option<String>,
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 99, message = "Level must be between 1 and 99"))]
    pub level: Option<u8>,
    /// Replaces the whole permission set when present.
    pub permission_ids: Option<Vec<PermissionId>>,
}

/// The roles seeded into every new data directory.
///
/// System roles cannot be deleted or renamed, but their permission sets and
/// descriptions may be edited like any other role.
pub mod system_roles {
    use facilitydesk_core::permissions::{
        ACTIONS, ADMINISTRATIVE_MODULES, MODULES, OPERATIONAL_MODULES, actions,
    };

    pub mod names {
        pub const ADMIN: &str = "admin";
        pub const MANAGER: &str = "manager";
        pub const STAFF: &str = "staff";
        pub const VIEWER: &str = "viewer";
    }

    /// Static description of a seeded role.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SystemRole {
        pub name: &'static str,
        pub display_name: &'static str,
        pub description: &'static str,
        pub level: u8,
    }

    pub const ADMIN: SystemRole = SystemRole {
        name: names::ADMIN,
        display_name: "Administrator",
        description: "Full access, including user and role administration",
        level: 1,
    };

    pub const MANAGER: SystemRole = SystemRole {
        name: names::MANAGER,
        display_name: "Facility Manager",
        description: "Manages every facility module; read-only on administration",
        level: 2,
    };

    pub const STAFF: SystemRole = SystemRole {
        name: names::STAFF,
        display_name: "Staff",
        description: "Creates and edits operational records",
        level: 3,
    };

    pub const VIEWER: SystemRole = SystemRole {
        name: names::VIEWER,
        display_name: "Viewer",
        description: "Read-only access",
        level: 4,
    };

    /// All system roles, most privileged first.
    pub fn all() -> [SystemRole; 4] {
        [ADMIN, MANAGER, STAFF, VIEWER]
    }

    pub fn is_system_role_name(name: &str) -> bool {
        all().iter().any(|r| r.name == name)
    }

    pub fn get(name: &str) -> Option<SystemRole> {
        all().into_iter().find(|r| r.name == name)
    }

    /// The `(module, action)` pairs a system role is seeded with.
    pub fn default_grants(role: &SystemRole) -> Vec<(&'static str, &'static str)> {
        let mut grants = Vec::new();
        for module in MODULES {
            for action in ACTIONS {
                let granted = match role.name {
                    names::ADMIN => true,
                    names::MANAGER => {
                        !ADMINISTRATIVE_MODULES.contains(module) || *action == actions::READ
                    }
                    names::STAFF => {
                        *action == actions::READ
                            || (OPERATIONAL_MODULES.contains(module)
                                && (*action == actions::CREATE || *action == actions::UPDATE))
                    }
                    names::VIEWER => *action == actions::READ,
                    _ => false,
                };
                if granted {
                    grants.push((*module, *action));
                }
            }
        }
        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facilitydesk_core::permissions::{ACTIONS, MODULES, actions, modules};

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Facility Manager"), "facility_manager");
        assert_eq!(generate_slug("HVAC-Tech"), "hvac_tech");
        assert_eq!(generate_slug("  Night   Shift  "), "night_shift");
        assert_eq!(generate_slug("Level 2 Support!"), "level_2_support");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn test_create_role_dto_validation() {
        let valid = CreateRoleDto {
            display_name: "Contractor".to_string(),
            name: None,
            description: Some("External contractors".to_string()),
            level: 5,
            permission_ids: vec![],
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateRoleDto {
            display_name: "".to_string(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let zero_level = CreateRoleDto { level: 0, ..valid };
        assert!(zero_level.validate().is_err());
    }

    #[test]
    fn test_update_role_dto_validation() {
        let long_description = UpdateRoleDto {
            description: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(long_description.validate().is_err());
        assert!(UpdateRoleDto::default().validate().is_ok());
    }

    #[test]
    fn test_system_roles_are_ordered_by_level() {
        let levels: Vec<u8> = system_roles::all().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4]);
        assert!(system_roles::is_system_role_name("manager"));
        assert!(!system_roles::is_system_role_name("contractor"));
    }

    #[test]
    fn test_admin_gets_everything() {
        let grants = system_roles::default_grants(&system_roles::ADMIN);
        assert_eq!(grants.len(), MODULES.len() * ACTIONS.len());
    }

    #[test]
    fn test_manager_cannot_administer_users() {
        let grants = system_roles::default_grants(&system_roles::MANAGER);
        assert!(grants.contains(&(modules::DEVICES, actions::DELETE)));
        assert!(grants.contains(&(modules::USERS, actions::READ)));
        assert!(!grants.contains(&(modules::USERS, actions::CREATE)));
        assert!(!grants.contains(&(modules::ROLES, actions::DELETE)));
    }

    #[test]
    fn test_staff_and_viewer_grants() {
        let staff = system_roles::default_grants(&system_roles::STAFF);
        assert!(staff.contains(&(modules::DEVICES, actions::UPDATE)));
        assert!(staff.contains(&(modules::WORK_ORDERS, actions::CREATE)));
        assert!(!staff.contains(&(modules::DEVICES, actions::DELETE)));
        assert!(!staff.contains(&(modules::PROCUREMENT, actions::CREATE)));

        let viewer = system_roles::default_grants(&system_roles::VIEWER);
        assert_eq!(viewer.len(), MODULES.len());
        assert!(viewer.iter().all(|(_, a)| *a == actions::READ));
    }

    #[test]
    fn test_permission_matches_exact_pair() {
        let p = Permission::new(modules::DEVICES, actions::UPDATE, Utc::now());
        assert_eq!(p.name, "devices:update");
        assert!(p.matches("devices", "update"));
        assert!(!p.matches("devices", "delete"));
        assert!(!p.matches("Devices", "update"));
    }
}
