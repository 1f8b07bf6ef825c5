use std::collections::HashSet;

use anyhow::anyhow;
use facilitydesk_core::AppError;
use facilitydesk_core::permissions::parse_permission_name;
use facilitydesk_models::{
    CreateRoleDto, Permission, PermissionId, Role, RoleId, RoleWithPermissions, UpdateRoleDto,
    generate_slug,
};
use tracing::{info, instrument};

use crate::state::AppState;
use crate::validator::validate_dto;

// ============ Permission Services ============

/// The catalog in generation order, optionally narrowed to one module.
pub fn list_permissions(state: &AppState, module: Option<&str>) -> Vec<Permission> {
    state
        .permissions()
        .iter()
        .filter(|p| module.is_none_or(|m| p.module == m))
        .cloned()
        .collect()
}

/// Looks a permission up by its `module:action` name.
pub fn get_permission_by_name(state: &AppState, name: &str) -> Result<Permission, AppError> {
    let (module, action) = parse_permission_name(name)
        .ok_or_else(|| AppError::bad_request(anyhow!("'{}' is not a module:action pair", name)))?;
    state
        .permissions()
        .iter()
        .find(|p| p.matches(module, action))
        .cloned()
        .ok_or_else(|| AppError::not_found(anyhow!("Permission '{}' not found", name)))
}

/// Checks every id against the catalog and returns them deduplicated, in
/// catalog order.
fn normalize_permission_ids(
    state: &AppState,
    ids: &[PermissionId],
) -> Result<Vec<PermissionId>, AppError> {
    let requested: HashSet<PermissionId> = ids.iter().copied().collect();
    let known: HashSet<PermissionId> = state.permissions().iter().map(|p| p.id).collect();

    if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::bad_request(anyhow!(
            "Permission {} does not exist",
            missing
        )));
    }

    Ok(state
        .permissions()
        .iter()
        .map(|p| p.id)
        .filter(|id| requested.contains(id))
        .collect())
}

// ============ Role Services ============

pub fn list_roles(state: &AppState) -> Vec<Role> {
    state.roles().to_vec()
}

fn with_permissions(state: &AppState, role: &Role) -> RoleWithPermissions {
    let permissions = state
        .permissions()
        .iter()
        .filter(|p| role.has_permission_id(&p.id))
        .cloned()
        .collect();
    RoleWithPermissions {
        role: role.clone(),
        permissions,
    }
}

pub fn get_role(state: &AppState, id: RoleId) -> Result<RoleWithPermissions, AppError> {
    state
        .role(id)
        .map(|r| with_permissions(state, r))
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

pub fn get_role_by_name(state: &AppState, name: &str) -> Result<RoleWithPermissions, AppError> {
    state
        .role_by_name(name)
        .map(|r| with_permissions(state, r))
        .ok_or_else(|| AppError::not_found(anyhow!("Role '{}' not found", name)))
}

pub fn role_permissions(state: &AppState, id: RoleId) -> Result<Vec<Permission>, AppError> {
    get_role(state, id).map(|r| r.permissions)
}

fn slug_for(display_name: &str, name: Option<&str>) -> Result<String, AppError> {
    let slug = generate_slug(name.unwrap_or(display_name));
    if slug.is_empty() {
        return Err(AppError::unprocessable(anyhow!(
            "Role name must contain letters or digits"
        )));
    }
    Ok(slug)
}

#[instrument(skip(state, dto), fields(display_name = %dto.display_name))]
pub fn create_role(state: &mut AppState, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    validate_dto(&dto)?;

    let name = slug_for(&dto.display_name, dto.name.as_deref())?;
    if state.role_by_name(&name).is_some() {
        return Err(AppError::conflict(anyhow!("Role '{}' already exists", name)));
    }
    let permission_ids = normalize_permission_ids(state, &dto.permission_ids)?;

    let now = state.now();
    let role = Role {
        id: RoleId::new(),
        name,
        display_name: dto.display_name.trim().to_string(),
        description: dto.description,
        level: dto.level,
        permission_ids,
        is_system_role: false,
        created_at: now,
        updated_at: now,
    };
    let id = role.id;

    let mut roles = state.roles().to_vec();
    roles.push(role);
    state.commit_roles(roles)?;

    info!(role_id = %id, "Role created");
    get_role(state, id)
}

#[instrument(skip(state, dto))]
pub fn update_role(
    state: &mut AppState,
    id: RoleId,
    dto: UpdateRoleDto,
) -> Result<RoleWithPermissions, AppError> {
    validate_dto(&dto)?;

    let mut roles = state.roles().to_vec();
    let index = roles
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    let new_name = match &dto.name {
        Some(name) => {
            let slug = slug_for(name, Some(name))?;
            if slug != roles[index].name {
                if roles[index].is_system_role {
                    return Err(AppError::bad_request(anyhow!(
                        "System roles cannot be renamed"
                    )));
                }
                if roles.iter().any(|r| r.name == slug) {
                    return Err(AppError::conflict(anyhow!("Role '{}' already exists", slug)));
                }
            }
            Some(slug)
        }
        None => None,
    };
    let permission_ids = match &dto.permission_ids {
        Some(ids) => Some(normalize_permission_ids(state, ids)?),
        None => None,
    };

    let role = &mut roles[index];
    if let Some(name) = new_name {
        role.name = name;
    }
    if let Some(display_name) = dto.display_name {
        role.display_name = display_name.trim().to_string();
    }
    if let Some(description) = dto.description {
        role.description = Some(description).filter(|d| !d.trim().is_empty());
    }
    if let Some(level) = dto.level {
        role.level = level;
    }
    if let Some(ids) = permission_ids {
        role.permission_ids = ids;
    }
    role.updated_at = state.now();

    state.commit_roles(roles)?;
    info!(role_id = %id, "Role updated");
    get_role(state, id)
}

/// Refused for system roles and for roles still assigned to a user.
#[instrument(skip(state))]
pub fn delete_role(state: &mut AppState, id: RoleId) -> Result<(), AppError> {
    let role = state
        .role(id)
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

    if role.is_system_role {
        return Err(AppError::bad_request(anyhow!(
            "System roles cannot be deleted"
        )));
    }

    let holders = state.users().iter().filter(|u| u.role_id == id).count();
    if holders > 0 {
        return Err(AppError::bad_request(anyhow!(
            "Role '{}' is assigned to {} user(s)",
            role.name,
            holders
        )));
    }

    let roles = state.roles().iter().filter(|r| r.id != id).cloned().collect();
    state.commit_roles(roles)?;

    info!(role_id = %id, "Role deleted");
    Ok(())
}

#[instrument(skip(state))]
pub fn grant_permissions(
    state: &mut AppState,
    id: RoleId,
    permission_ids: &[PermissionId],
) -> Result<RoleWithPermissions, AppError> {
    let current = get_role(state, id)?.role.permission_ids;
    let merged: Vec<PermissionId> = current.iter().chain(permission_ids).copied().collect();
    update_role(
        state,
        id,
        UpdateRoleDto {
            permission_ids: Some(merged),
            ..Default::default()
        },
    )
}

#[instrument(skip(state))]
pub fn revoke_permissions(
    state: &mut AppState,
    id: RoleId,
    permission_ids: &[PermissionId],
) -> Result<RoleWithPermissions, AppError> {
    let current = get_role(state, id)?.role.permission_ids;
    let remaining: Vec<PermissionId> = current
        .into_iter()
        .filter(|p| !permission_ids.contains(p))
        .collect();
    update_role(
        state,
        id,
        UpdateRoleDto {
            permission_ids: Some(remaining),
            ..Default::default()
        },
    )
}
