//! # Facilitydesk Models
//!
//! Domain models and DTOs for Facilitydesk.
//!
//! # Modules
//!
//! - [`auth`]: Login, registration and session records
//! - [`ids`]: Strongly-typed UUID identifiers
//! - [`roles`]: Roles, permissions and the seeded system roles
//! - [`users`]: User records, profiles and administrative DTOs
//! - [`value_types`]: Validated primitives such as [`Email`]
//!
//! # Example
//!
//! ```ignore
//! use facilitydesk_models::roles::system_roles;
//!
//! if system_roles::is_system_role_name(&role.name) {
//!     println!("{} cannot be deleted", role.display_name);
//! }
//! ```

pub mod auth;
pub mod ids;
pub mod roles;
pub mod users;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use auth::{ChangePasswordDto, LoginRequest, LoginResponse, RegisterRequest, Session};
pub use ids::{PermissionId, RoleId, UserId};
pub use roles::{
    CreateRoleDto, Permission, Role, RoleWithPermissions, UpdateRoleDto, generate_slug,
    system_roles,
};
pub use users::{
    CreateUserDto, ResetPasswordDto, UpdateProfileDto, UpdateUserDto, User, UserProfile,
    normalize_optional,
};
pub use value_types::{Email, ValueTypeError};
