use std::env;

use crate::parsed_or;

/// Default session lifetime: 8 hours.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 8 * 60 * 60;

/// Default bcrypt cost, matching `bcrypt::DEFAULT_COST`.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Role given to self-registered accounts.
pub const DEFAULT_REGISTRATION_ROLE: &str = "viewer";

/// Authentication configuration.
///
/// # Environment Variables
///
/// - `SESSION_TTL_SECONDS`: Lifetime of a login session (default: `28800`)
/// - `BCRYPT_COST`: Work factor for password hashes (default: `12`)
/// - `DEFAULT_ROLE`: Role name assigned on self-registration (default: `viewer`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub session_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    pub default_role: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_ttl_seconds =
            parsed_or(&lookup, "SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL_SECONDS);

        Self {
            session_ttl_seconds: if session_ttl_seconds > 0 {
                session_ttl_seconds
            } else {
                DEFAULT_SESSION_TTL_SECONDS
            },
            // bcrypt only accepts costs in 4..=31
            bcrypt_cost: parsed_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST).clamp(4, 31),
            default_role: lookup("DEFAULT_ROLE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_REGISTRATION_ROLE.to_string()),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            default_role: DEFAULT_REGISTRATION_ROLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AuthConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.session_ttl_seconds, 28_800);
    }

    #[test]
    fn test_reads_overrides() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("SESSION_TTL_SECONDS", "3600"),
            ("BCRYPT_COST", "10"),
            ("DEFAULT_ROLE", "staff"),
        ]));
        assert_eq!(config.session_ttl_seconds, 3600);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.default_role, "staff");
    }

    #[test]
    fn test_rejects_nonsense_values() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("SESSION_TTL_SECONDS", "-5"),
            ("BCRYPT_COST", "99"),
            ("DEFAULT_ROLE", "  "),
        ]));
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.bcrypt_cost, 31);
        assert_eq!(config.default_role, DEFAULT_REGISTRATION_ROLE);

        let config = AuthConfig::from_lookup(lookup_from(&[("SESSION_TTL_SECONDS", "eight")]));
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
    }
}
