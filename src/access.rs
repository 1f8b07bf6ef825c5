//! Guards for callers that must refuse work rather than branch on a bool.
//!
//! Each guard resolves the session first (expiring it if needed) and fails
//! with `Unauthorized` when nobody is logged in, `Forbidden` otherwise.

use facilitydesk_core::AppError;
use facilitydesk_core::permissions::permission_name;
use facilitydesk_models::UserProfile;

pub use facilitydesk_auth::{check_any_role, check_role, check_role_level};

use crate::modules::AuthService;
use crate::state::AppState;

pub fn require_login(state: &mut AppState) -> Result<UserProfile, AppError> {
    AuthService::current_user(state).ok_or_else(|| AppError::unauthorized("Authentication required"))
}

pub fn require_permission(
    state: &mut AppState,
    module: &str,
    action: &str,
) -> Result<UserProfile, AppError> {
    let user = require_login(state)?;
    if !AuthService::has_permission(state, module, action) {
        return Err(AppError::forbidden(format!(
            "Missing permission {}",
            permission_name(module, action)
        )));
    }
    Ok(user)
}

pub fn require_role(state: &mut AppState, role_name: &str) -> Result<UserProfile, AppError> {
    let user = require_login(state)?;
    if !AuthService::has_role(state, role_name) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}",
            role_name
        )));
    }
    Ok(user)
}

/// Passes when the current role is at least as privileged as `role_name`.
pub fn require_access(state: &mut AppState, role_name: &str) -> Result<UserProfile, AppError> {
    let user = require_login(state)?;
    if !AuthService::can_access(state, role_name) {
        return Err(AppError::forbidden(format!(
            "Access denied. Requires {} level or higher",
            role_name
        )));
    }
    Ok(user)
}
