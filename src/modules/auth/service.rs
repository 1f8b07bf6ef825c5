use anyhow::anyhow;
use facilitydesk_auth::{issue_session, role_grants};
use facilitydesk_core::{AppError, hash_password_with_cost, verify_password};
use facilitydesk_models::{
    ChangePasswordDto, LoginRequest, LoginResponse, RegisterRequest, Role, Session,
    UpdateProfileDto, User, UserId, UserProfile, normalize_optional,
};
use facilitydesk_observability::{track_login_failure, track_login_success, track_session_expired};
use tracing::{error, info, instrument, warn};

use crate::modules::users::service::{
    NewUser, ensure_email_available, insert_user, parse_email, profile_of,
};
use crate::state::AppState;
use crate::validator::validate_dto;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService;

impl AuthService {
    /// Starts a new session, replacing any existing one.
    ///
    /// Unknown, inactive and wrong-password attempts all fail with the same
    /// message.
    #[instrument(skip(state, dto), fields(identifier = %dto.identifier))]
    pub fn login(state: &mut AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        let Some(index) = state
            .users()
            .iter()
            .position(|u| u.is_active && u.matches_identifier(&dto.identifier))
        else {
            warn!("Login failed: no active user matches");
            track_login_failure("user_not_found");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let password_ok = match verify_password(&dto.password, &state.users()[index].password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                error!(error = %e, "Stored password hash is unreadable");
                false
            }
        };
        if !password_ok {
            warn!("Login failed: wrong password");
            track_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let now = state.now();
        let mut users = state.users().to_vec();
        users[index].last_login_at = Some(now);
        let user_id = users[index].id;
        state.commit_users(users)?;

        let session = issue_session(user_id, now, state.session_ttl());
        state.commit_session(Some(session.clone()))?;

        let user = profile_of(state, &state.users()[index]);
        track_login_success(user.role_name.as_deref().unwrap_or("unknown"));
        info!(user_id = %user_id, expires_at = %session.expires_at, "User logged in");

        Ok(LoginResponse { session, user })
    }

    /// Idempotent.
    #[instrument(skip(state))]
    pub fn logout(state: &mut AppState) -> Result<(), AppError> {
        let had_session = state.raw_session().is_some();
        state.commit_session(None)?;
        if had_session {
            info!("User logged out");
        }
        Ok(())
    }

    pub fn current_user(state: &mut AppState) -> Option<UserProfile> {
        let id = resolve_session(state)?;
        state.user(id).map(|u| profile_of(state, u))
    }

    /// The live session, after expiry has been applied.
    pub fn session_info(state: &mut AppState) -> Option<Session> {
        resolve_session(state)?;
        state.raw_session().cloned()
    }

    pub fn has_permission(state: &mut AppState, module: &str, action: &str) -> bool {
        current_role(state)
            .is_some_and(|role| role_grants(&role, state.permissions(), module, action))
    }

    pub fn has_role(state: &mut AppState, role_name: &str) -> bool {
        current_role(state).is_some_and(|role| role.name == role_name)
    }

    /// True when the current role is at least as privileged as `required_role`.
    /// An unknown required role denies.
    pub fn can_access(state: &mut AppState, required_role: &str) -> bool {
        let Some(role) = current_role(state) else {
            return false;
        };
        state
            .role_by_name(required_role)
            .is_some_and(|required| role.at_least(required))
    }

    /// Self-registration. The account gets the configured default role and
    /// is not logged in.
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub fn register(state: &mut AppState, dto: RegisterRequest) -> Result<UserProfile, AppError> {
        validate_dto(&dto)?;

        let default_role = state.config.auth.default_role.clone();
        let role_id = state
            .role_by_name(&default_role)
            .map(|r| r.id)
            .ok_or_else(|| {
                AppError::bad_request(anyhow!("Default role '{}' does not exist", default_role))
            })?;

        insert_user(
            state,
            NewUser {
                username: dto.username,
                email: dto.email,
                full_name: dto.full_name,
                password: dto.password,
                role_id,
                department: dto.department,
                phone: dto.phone,
                position: dto.position,
                is_active: true,
            },
        )
    }

    #[instrument(skip(state, dto))]
    pub fn change_password(state: &mut AppState, dto: ChangePasswordDto) -> Result<(), AppError> {
        let id = require_session(state)?;
        validate_dto(&dto)?;

        let mut users = state.users().to_vec();
        let user = find_mut(&mut users, id)?;
        if !verify_password(&dto.current_password, &user.password_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        user.password_hash = hash_password_with_cost(&dto.new_password, state.bcrypt_cost())?;
        user.updated_at = state.now();
        state.commit_users(users)?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    #[instrument(skip(state, dto))]
    pub fn update_profile(
        state: &mut AppState,
        dto: UpdateProfileDto,
    ) -> Result<UserProfile, AppError> {
        let id = require_session(state)?;
        validate_dto(&dto)?;

        let mut users = state.users().to_vec();
        let email = match &dto.email {
            Some(email) => {
                ensure_email_available(&users, email, Some(id))?;
                Some(parse_email(email)?)
            }
            None => None,
        };

        let now = state.now();
        let user = find_mut(&mut users, id)?;
        if let Some(full_name) = dto.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(department) = dto.department {
            user.department = normalize_optional(&department);
        }
        if let Some(phone) = dto.phone {
            user.phone = normalize_optional(&phone);
        }
        if let Some(position) = dto.position {
            user.position = normalize_optional(&position);
        }
        user.updated_at = now;

        state.commit_users(users)?;
        info!(user_id = %id, "Profile updated");

        state
            .user(id)
            .map(|u| profile_of(state, u))
            .ok_or_else(|| AppError::internal(anyhow!("User vanished during update")))
    }
}

/// Returns the session holder's id, clearing the session when it has expired
/// or no longer points at an active user.
pub(crate) fn resolve_session(state: &mut AppState) -> Option<UserId> {
    let session = state.raw_session()?;
    let user_id = session.user_id;

    if session.is_expired_at(state.now()) {
        info!(user_id = %user_id, "Session expired");
        track_session_expired();
        state.end_session("expired");
        return None;
    }

    match state.user(user_id).map(|u| u.is_active) {
        Some(true) => Some(user_id),
        Some(false) => {
            warn!(user_id = %user_id, "Session user is inactive");
            state.end_session("user inactive");
            None
        }
        None => {
            warn!(user_id = %user_id, "Session user no longer exists");
            state.end_session("user missing");
            None
        }
    }
}

/// The current user's role, if someone is logged in and the role resolves.
pub(crate) fn current_role(state: &mut AppState) -> Option<Role> {
    let id = resolve_session(state)?;
    let user = state.user(id)?;
    state.role(user.role_id).cloned()
}

pub(crate) fn require_session(state: &mut AppState) -> Result<UserId, AppError> {
    resolve_session(state).ok_or_else(|| AppError::unauthorized("Authentication required"))
}

fn find_mut(users: &mut [User], id: UserId) -> Result<&mut User, AppError> {
    users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
}
