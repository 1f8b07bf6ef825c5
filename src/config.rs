use facilitydesk_config::{AuthConfig, StorageConfig};

/// Everything the application reads from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            auth: AuthConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            auth: AuthConfig::from_lookup(&lookup),
            storage: StorageConfig::from_lookup(&lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_reads_both_sections() {
        let vars: HashMap<&str, &str> = [
            ("SESSION_TTL_SECONDS", "60"),
            ("STORAGE_PREFIX", "site_b"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.auth.session_ttl_seconds, 60);
        assert_eq!(config.storage.keys().users, "site_b_users");
    }
}
