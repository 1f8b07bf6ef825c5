//! Application state: the in-memory collections and where they persist.
//!
//! Every mutation follows the same pattern: the service builds the new
//! collection on a copy, hands it to one of the `commit_*` methods, and the
//! copy only replaces the in-memory collection once the store accepted it.
//! A failed write therefore leaves both memory and store as they were.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use facilitydesk_auth::Clock;
use facilitydesk_config::StorageKeys;
use facilitydesk_core::AppError;
use facilitydesk_core::permissions;
use facilitydesk_models::{Permission, Role, RoleId, Session, User, UserId, system_roles};
use facilitydesk_store::{KeyValueStore, load_json, save_json};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;

pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    pub config: AppConfig,
    keys: StorageKeys,
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    session: Option<Session>,
    /// Keys whose stored blob could not be read. They are never overwritten.
    unreadable: BTreeSet<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("keys", &self.keys)
            .field("users", &self.users.len())
            .field("roles", &self.roles.len())
            .field("permissions", &self.permissions.len())
            .field("session", &self.session)
            .field("unreadable", &self.unreadable)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Loads the four blobs and seeds the permission catalog and system
    /// roles when their keys have never been written. Running it against an
    /// already-initialized store changes nothing.
    ///
    /// A collection whose blob cannot be parsed loads as empty and is marked
    /// unreadable: it is not re-seeded, and writes to it are refused until
    /// the blob is repaired.
    #[instrument(skip(store, clock, config))]
    pub fn bootstrap(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> Result<Self, AppError> {
        let keys = config.storage.keys();

        let users = load_stored::<Vec<User>>(store.as_ref(), &keys.users);
        let roles = load_stored::<Vec<Role>>(store.as_ref(), &keys.roles);
        let permissions = load_stored::<Vec<Permission>>(store.as_ref(), &keys.permissions);
        let session = load_stored::<Session>(store.as_ref(), &keys.session).into_value();

        let mut unreadable = BTreeSet::new();
        for (key, stored) in [
            (&keys.users, users.is_unreadable()),
            (&keys.roles, roles.is_unreadable()),
            (&keys.permissions, permissions.is_unreadable()),
        ] {
            if stored {
                unreadable.insert(key.clone());
            }
        }
        let seed_permissions = permissions.is_missing();
        let seed_roles = roles.is_missing();

        let mut state = Self {
            store,
            clock,
            config,
            keys,
            users: users.into_value().unwrap_or_default(),
            roles: roles.into_value().unwrap_or_default(),
            permissions: permissions.into_value().unwrap_or_default(),
            session,
            unreadable,
        };

        if seed_permissions {
            let now = state.now();
            let catalog = permissions::catalog()
                .into_iter()
                .map(|(module, action)| Permission::new(module, action, now))
                .collect();
            state.commit_permissions(catalog)?;
            info!(count = state.permissions.len(), "Generated permission catalog");
        }

        if seed_roles {
            let roles = state.system_role_records();
            state.commit_roles(roles)?;
            info!(count = state.roles.len(), "Seeded system roles");
        }

        if !state.unreadable.is_empty() {
            warn!(
                keys = ?state.unreadable,
                "Unreadable collections are read-only until repaired"
            );
        }

        Ok(state)
    }

    fn system_role_records(&self) -> Vec<Role> {
        let now = self.now();
        system_roles::all()
            .iter()
            .map(|seed| {
                let permission_ids = system_roles::default_grants(seed)
                    .into_iter()
                    .filter_map(|(module, action)| {
                        self.permissions
                            .iter()
                            .find(|p| p.matches(module, action))
                            .map(|p| p.id)
                    })
                    .collect();
                Role {
                    id: RoleId::new(),
                    name: seed.name.to_string(),
                    display_name: seed.display_name.to_string(),
                    description: Some(seed.description.to_string()),
                    level: seed.level,
                    permission_ids,
                    is_system_role: true,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.config.auth.session_ttl_seconds)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.config.auth.bcrypt_cost
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// The stored session as-is, without any expiry check.
    pub fn raw_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// True when a collection blob failed to parse at bootstrap.
    pub fn is_unreadable(&self, key: &str) -> bool {
        self.unreadable.contains(key)
    }

    fn ensure_writable(&self, key: &str) -> Result<(), AppError> {
        if self.is_unreadable(key) {
            return Err(AppError::storage(anyhow!(
                "Stored data under '{}' is unreadable; refusing to overwrite it",
                key
            )));
        }
        Ok(())
    }

    pub(crate) fn commit_users(&mut self, users: Vec<User>) -> Result<(), AppError> {
        self.ensure_writable(&self.keys.users)?;
        save_json(self.store.as_ref(), &self.keys.users, &users).map_err(AppError::storage)?;
        self.users = users;
        Ok(())
    }

    pub(crate) fn commit_roles(&mut self, roles: Vec<Role>) -> Result<(), AppError> {
        self.ensure_writable(&self.keys.roles)?;
        save_json(self.store.as_ref(), &self.keys.roles, &roles).map_err(AppError::storage)?;
        self.roles = roles;
        Ok(())
    }

    fn commit_permissions(&mut self, permissions: Vec<Permission>) -> Result<(), AppError> {
        self.ensure_writable(&self.keys.permissions)?;
        save_json(self.store.as_ref(), &self.keys.permissions, &permissions)
            .map_err(AppError::storage)?;
        self.permissions = permissions;
        Ok(())
    }

    pub(crate) fn commit_session(&mut self, session: Option<Session>) -> Result<(), AppError> {
        let written = match &session {
            Some(s) => save_json(self.store.as_ref(), &self.keys.session, s),
            None => self.store.remove(&self.keys.session),
        };
        written.map_err(AppError::storage)?;
        self.session = session;
        Ok(())
    }

    /// Drops the session in memory even if the store refuses the delete, so a
    /// session that must end can never be honored again by this process.
    pub(crate) fn end_session(&mut self, reason: &str) {
        if let Err(e) = self.commit_session(None) {
            error!(reason, error = %e, "Failed to remove session from storage");
            self.session = None;
        }
    }
}

/// Outcome of reading one blob.
enum Stored<T> {
    Found(T),
    Missing,
    Unreadable,
}

impl<T> Stored<T> {
    fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable)
    }

    fn into_value(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Unreadable => None,
        }
    }
}

fn load_stored<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Stored<T> {
    match load_json::<T, _>(store, key) {
        Ok(Some(value)) => Stored::Found(value),
        Ok(None) => {
            debug!(key, "No stored records");
            Stored::Missing
        }
        Err(e) => {
            error!(key, error = %e, "Failed to load stored data, starting empty");
            Stored::Unreadable
        }
    }
}
