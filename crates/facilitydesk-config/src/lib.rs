//! # Facilitydesk Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`auth`]: Session lifetime, password hashing cost and self-registration role
//! - [`storage`]: Data directory and storage key layout
//!
//! # Example
//!
//! ```ignore
//! use facilitydesk_config::{AuthConfig, StorageConfig};
//!
//! let auth_config = AuthConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod auth;
pub mod storage;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use storage::{StorageConfig, StorageKeys};

/// Reads `key` through `lookup` and parses it, falling back to `default` when the
/// variable is missing or malformed.
pub(crate) fn parsed_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
