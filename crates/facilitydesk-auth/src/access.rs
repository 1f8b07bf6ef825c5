//! Role and permission checks.
//!
//! These are pure functions over already-loaded records. Callers resolve the
//! current user's role first; an unresolvable role means "deny".

use facilitydesk_models::{Permission, Role};

/// True when `role` holds the permission for exactly `(module, action)`.
///
/// The pair is looked up in the permission `catalog`; a grant pointing at a
/// permission id that no longer exists grants nothing.
pub fn role_grants(role: &Role, catalog: &[Permission], module: &str, action: &str) -> bool {
    catalog
        .iter()
        .filter(|p| p.matches(module, action))
        .any(|p| role.has_permission_id(&p.id))
}

/// Check if a role has a specific role name
pub fn check_role(role: &Role, required_role: &str) -> bool {
    role.name == required_role
}

/// Check if a role matches any of the given role names
pub fn check_any_role(role: &Role, required_roles: &[&str]) -> bool {
    required_roles.iter().any(|r| role.name == *r)
}

/// Check if `role` is at or above `minimum` in the hierarchy.
///
/// Levels run upwards from 1 (most privileged), so "at or above" means a
/// numerically lower or equal level.
pub fn check_role_level(role: &Role, minimum: &Role) -> bool {
    role.at_least(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use facilitydesk_models::RoleId;

    fn role(name: &str, level: u8, permission_ids: Vec<facilitydesk_models::PermissionId>) -> Role {
        let now = Utc::now();
        Role {
            id: RoleId::new(),
            name: name.to_string(),
            display_name: name.to_string(),
            description: None,
            level,
            permission_ids,
            is_system_role: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_grants_exact_pair_only() {
        let now = Utc::now();
        let update = Permission::new("devices", "update", now);
        let read = Permission::new("devices", "read", now);
        let catalog = vec![update.clone(), read.clone()];

        let editor = role("editor", 3, vec![update.id]);
        assert!(role_grants(&editor, &catalog, "devices", "update"));
        assert!(!role_grants(&editor, &catalog, "devices", "read"));
        assert!(!role_grants(&editor, &catalog, "rooms", "update"));
    }

    #[test]
    fn test_dangling_grant_is_ignored() {
        let now = Utc::now();
        let orphan = Permission::new("devices", "delete", now);
        let r = role("editor", 3, vec![orphan.id]);
        assert!(!role_grants(&r, &[], "devices", "delete"));
    }

    #[test]
    fn test_check_role_names() {
        let staff = role("staff", 3, vec![]);
        assert!(check_role(&staff, "staff"));
        assert!(!check_role(&staff, "Staff"));
        assert!(check_any_role(&staff, &["manager", "staff"]));
        assert!(!check_any_role(&staff, &[]));
    }

    #[test]
    fn test_check_role_level() {
        let admin = role("admin", 1, vec![]);
        let manager = role("manager", 2, vec![]);
        let viewer = role("viewer", 4, vec![]);

        assert!(check_role_level(&admin, &manager));
        assert!(check_role_level(&manager, &manager));
        assert!(!check_role_level(&viewer, &manager));
    }
}
