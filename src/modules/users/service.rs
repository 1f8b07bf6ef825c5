use anyhow::anyhow;
use facilitydesk_core::{AppError, hash_password_with_cost};
use facilitydesk_models::{
    CreateUserDto, Email, ResetPasswordDto, RoleId, UpdateUserDto, User, UserId, UserProfile,
    normalize_optional,
};
use facilitydesk_observability::track_user_created;
use tracing::{info, instrument};

use crate::state::AppState;
use crate::validator::validate_dto;

/// Fields shared by every path that creates a user.
pub(crate) struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role_id: RoleId,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
}

impl From<CreateUserDto> for NewUser {
    fn from(dto: CreateUserDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            password: dto.password,
            role_id: dto.role_id,
            department: dto.department,
            phone: dto.phone,
            position: dto.position,
            is_active: dto.is_active,
        }
    }
}

pub struct UserService;

impl UserService {
    #[instrument(skip(state, dto), fields(username = %dto.username))]
    pub fn create_user(state: &mut AppState, dto: CreateUserDto) -> Result<UserProfile, AppError> {
        validate_dto(&dto)?;
        insert_user(state, dto.into())
    }

    #[instrument(skip(state, dto))]
    pub fn update_user(
        state: &mut AppState,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<UserProfile, AppError> {
        validate_dto(&dto)?;

        let mut users = state.users().to_vec();
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if let Some(username) = &dto.username {
            ensure_username_available(&users, username, Some(id))?;
        }
        let email = match &dto.email {
            Some(email) => {
                ensure_email_available(&users, email, Some(id))?;
                Some(parse_email(email)?)
            }
            None => None,
        };
        if let Some(role_id) = dto.role_id {
            ensure_role_exists(state, role_id)?;
        }

        let now = state.now();
        let user = &mut users[index];
        if let Some(username) = dto.username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(full_name) = dto.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(role_id) = dto.role_id {
            user.role_id = role_id;
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
        if let Some(is_active) = dto.is_active {
            user.is_active = is_active;
        }
        user.updated_at = now;

        let deactivated = !user.is_active;
        state.commit_users(users)?;
        if deactivated {
            end_session_of(state, id, "user deactivated");
        }

        info!(user_id = %id, "User updated");
        Self::get_user(state, id)
    }

    /// Hard delete. Removing the session holder also ends the session.
    #[instrument(skip(state))]
    pub fn delete_user(state: &mut AppState, id: UserId) -> Result<(), AppError> {
        let mut users = state.users().to_vec();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        state.commit_users(users)?;
        end_session_of(state, id, "user deleted");

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub fn list_users(state: &AppState) -> Vec<UserProfile> {
        state.users().iter().map(|u| profile_of(state, u)).collect()
    }

    pub fn get_user(state: &AppState, id: UserId) -> Result<UserProfile, AppError> {
        state
            .user(id)
            .map(|u| profile_of(state, u))
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Looks a user up by exact username, or by email ignoring case.
    pub fn find_user(state: &AppState, identifier: &str) -> Result<UserProfile, AppError> {
        let identifier = identifier.trim();
        state
            .users()
            .iter()
            .find(|u| u.username == identifier)
            .or_else(|| state.users().iter().find(|u| u.email.eq_ignore_case(identifier)))
            .map(|u| profile_of(state, u))
            .ok_or_else(|| AppError::not_found(anyhow!("User '{}' not found", identifier)))
    }

    #[instrument(skip(state))]
    pub fn set_user_active(
        state: &mut AppState,
        id: UserId,
        active: bool,
    ) -> Result<UserProfile, AppError> {
        Self::update_user(
            state,
            id,
            UpdateUserDto {
                is_active: Some(active),
                ..Default::default()
            },
        )
    }

    #[instrument(skip(state, dto))]
    pub fn reset_password(
        state: &mut AppState,
        id: UserId,
        dto: ResetPasswordDto,
    ) -> Result<(), AppError> {
        validate_dto(&dto)?;

        let mut users = state.users().to_vec();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        user.password_hash = hash_password_with_cost(&dto.new_password, state.bcrypt_cost())?;
        user.updated_at = state.now();

        state.commit_users(users)?;
        info!(user_id = %id, "Password reset");
        Ok(())
    }
}

/// Validated creation shared by administration, self-registration and the
/// bootstrap admin command.
pub(crate) fn insert_user(state: &mut AppState, new: NewUser) -> Result<UserProfile, AppError> {
    ensure_username_available(state.users(), &new.username, None)?;
    ensure_email_available(state.users(), &new.email, None)?;
    let role_name = ensure_role_exists(state, new.role_id)?;
    let email = parse_email(&new.email)?;

    let password_hash = hash_password_with_cost(&new.password, state.bcrypt_cost())?;
    let now = state.now();
    let user = User {
        id: UserId::new(),
        username: new.username,
        email,
        full_name: new.full_name.trim().to_string(),
        password_hash,
        role_id: new.role_id,
        department: new.department.as_deref().and_then(normalize_optional),
        phone: new.phone.as_deref().and_then(normalize_optional),
        position: new.position.as_deref().and_then(normalize_optional),
        is_active: new.is_active,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    };
    let id = user.id;

    let mut users = state.users().to_vec();
    users.push(user);
    state.commit_users(users)?;

    track_user_created(&role_name);
    info!(user_id = %id, role = %role_name, "User created");
    UserService::get_user(state, id)
}

pub(crate) fn profile_of(state: &AppState, user: &User) -> UserProfile {
    user.profile(state.role(user.role_id))
}

pub(crate) fn ensure_username_available(
    users: &[User],
    username: &str,
    exclude: Option<UserId>,
) -> Result<(), AppError> {
    let taken = users
        .iter()
        .any(|u| Some(u.id) != exclude && u.username == username);
    if taken {
        return Err(AppError::conflict(anyhow!("Username already exists")));
    }
    Ok(())
}

pub(crate) fn ensure_email_available(
    users: &[User],
    email: &str,
    exclude: Option<UserId>,
) -> Result<(), AppError> {
    let taken = users
        .iter()
        .any(|u| Some(u.id) != exclude && u.email.eq_ignore_case(email));
    if taken {
        return Err(AppError::conflict(anyhow!("Email already exists")));
    }
    Ok(())
}

fn ensure_role_exists(state: &AppState, role_id: RoleId) -> Result<String, AppError> {
    state
        .role(role_id)
        .map(|r| r.name.clone())
        .ok_or_else(|| AppError::bad_request(anyhow!("Role {} does not exist", role_id)))
}

pub(crate) fn parse_email(email: &str) -> Result<Email, AppError> {
    Email::new(email).map_err(AppError::unprocessable)
}

fn end_session_of(state: &mut AppState, id: UserId, reason: &str) {
    if state.raw_session().is_some_and(|s| s.user_id == id) {
        state.end_session(reason);
    }
}
