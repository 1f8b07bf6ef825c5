//! # Facilitydesk Core
//!
//! Core types, errors, and utilities shared by every Facilitydesk crate.
//!
//! - [`errors`]: Application error type carrying an [`ErrorKind`]
//! - [`password`]: bcrypt password hashing and verification
//! - [`permissions`]: The fixed module/action permission catalog
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use facilitydesk_core::errors::AppError;
//! use facilitydesk_core::password::{hash_password, verify_password};
//! use facilitydesk_core::permissions::{self, modules, actions};
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//!
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash)?);
//!
//! let name = permissions::permission_name(modules::DEVICES, actions::UPDATE);
//! assert_eq!(name, "devices:update");
//! ```

pub mod errors;
pub mod password;
pub mod permissions;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind};
pub use password::{hash_password, hash_password_with_cost, verify_password};
