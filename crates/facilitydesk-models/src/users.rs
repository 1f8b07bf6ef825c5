//! User domain models and DTOs.

use chrono::{DateTime, Utc};
use facilitydesk_core::serde::deserialize_optional_trimmed;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::{RoleId, UserId};
use crate::roles::Role;
use crate::value_types::{Email, validate_full_name, validate_phone, validate_username};

/// A user record as persisted.
///
/// Carries the bcrypt hash, so it is never printed or returned to callers
/// directly; use [`User::profile`] for anything user-facing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub password_hash: String,
    pub role_id: RoleId,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub position: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Exact, case-sensitive match on username or email.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email.as_str() == identifier
    }

    pub fn profile(&self, role: Option<&Role>) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role_id: self.role_id,
            role_name: role.map(|r| r.name.clone()),
            role_display_name: role.map(|r| r.display_name.clone()),
            department: self.department.clone(),
            phone: self.phone.clone(),
            position: self.position.clone(),
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// User-facing view of a [`User`], with the role resolved and no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub role_id: RoleId,
    pub role_name: Option<String>,
    pub role_display_name: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a user through administration.
#[derive(Clone, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,
    // bcrypt ignores everything past 72 bytes
    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub password: String,
    pub role_id: RoleId,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl std::fmt::Debug for CreateUserDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserDto")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// DTO for administrative edits. `None` leaves a field untouched; for the
/// optional profile fields an empty string clears the value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: Option<String>,
    pub role_id: Option<RoleId>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for a user editing their own profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileDto {
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
}

/// DTO for an administrator setting a new password for someone else.
#[derive(Clone, Deserialize, Validate)]
pub struct ResetPasswordDto {
    #[validate(length(min = 8, max = 72, message = "Password must be between 8 and 72 characters"))]
    pub new_password: String,
}

impl std::fmt::Debug for ResetPasswordDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResetPasswordDto { .. }")
    }
}

/// Normalises an optional profile field edit: blank input clears the field.
pub fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
