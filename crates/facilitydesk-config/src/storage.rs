//! Storage configuration.
//!
//! Facilitydesk keeps its state as four JSON blobs in a key-value store. This
//! module decides where the store lives and what the keys are called.

use std::env;
use std::path::PathBuf;

/// Storage configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `FACILITYDESK_DATA_DIR`: Directory holding the blobs (default: `.facilitydesk`)
/// - `STORAGE_PREFIX`: Prefix for all storage keys (default: `facilitydesk`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory the file-backed store writes into.
    pub data_dir: PathBuf,

    /// Prefix for all keys to avoid collisions with other tenants of the same store.
    pub key_prefix: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_dir: lookup("FACILITYDESK_DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            key_prefix: lookup("STORAGE_PREFIX")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.key_prefix),
        }
    }

    /// Build a prefixed storage key.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = StorageConfig::default();
    /// assert_eq!(config.prefixed_key("users"), "facilitydesk_users");
    /// ```
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}_{}", self.key_prefix, key)
    }

    pub fn keys(&self) -> StorageKeys {
        StorageKeys {
            users: self.prefixed_key("users"),
            roles: self.prefixed_key("roles"),
            permissions: self.prefixed_key("permissions"),
            session: self.prefixed_key("session"),
        }
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".facilitydesk"),
            key_prefix: "facilitydesk".into(),
        }
    }
}

/// The four fixed keys the application state is persisted under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub users: String,
    pub roles: String,
    pub permissions: String,
    pub session: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        StorageConfig::default().keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = StorageKeys::default();
        assert_eq!(keys.users, "facilitydesk_users");
        assert_eq!(keys.roles, "facilitydesk_roles");
        assert_eq!(keys.permissions, "facilitydesk_permissions");
        assert_eq!(keys.session, "facilitydesk_session");
    }

    #[test]
    fn test_custom_prefix_and_dir() {
        let config = StorageConfig::from_lookup(|key| match key {
            "FACILITYDESK_DATA_DIR" => Some("/var/lib/facilitydesk".to_string()),
            "STORAGE_PREFIX" => Some("site_b".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/facilitydesk"));
        assert_eq!(config.keys().session, "site_b_session");
        assert_eq!(config.log_dir(), PathBuf::from("/var/lib/facilitydesk/logs"));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = StorageConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, StorageConfig::default());
    }
}
