//! # Facilitydesk
//!
//! Role-based authentication and authorization for the facility-management
//! application: one local login session, permission and role checks, and
//! administration of users and roles. State lives in a key-value store as
//! four JSON blobs (users, roles, permissions, session).
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── access.rs         # Guards returning Unauthorized / Forbidden
//! ├── cli/              # The `facilitydesk` command and demo-data seeder
//! ├── config.rs         # Environment-driven configuration
//! ├── modules/
//! │   ├── auth/        # Login, logout, session, permission checks, self-service
//! │   ├── users/       # User administration
//! │   └── roles/       # Role administration and the permission catalog
//! ├── state.rs          # In-memory collections and their persistence
//! └── validator.rs      # DTO validation helpers
//! ```
//!
//! ## System Roles
//!
//! | Role | Level | Grants |
//! |------|-------|--------|
//! | admin | 1 | Everything |
//! | manager | 2 | Everything except writes on users, roles and settings |
//! | staff | 3 | Read everywhere, create/update on operational modules |
//! | viewer | 4 | Read everywhere |
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use facilitydesk::{AppConfig, AppState, AuthService};
//! use facilitydesk_auth::SystemClock;
//! use facilitydesk_models::LoginRequest;
//! use facilitydesk_store::LocalFileStore;
//!
//! let config = AppConfig::from_env();
//! let store = Arc::new(LocalFileStore::new(&config.storage.data_dir));
//! let mut state = AppState::bootstrap(store, Arc::new(SystemClock), config)?;
//!
//! AuthService::login(&mut state, LoginRequest::new("admin", "correct horse"))?;
//! assert!(AuthService::has_permission(&mut state, "devices", "update"));
//! ```

pub mod access;
pub mod cli;
pub mod config;
pub mod modules;
pub mod state;
pub mod validator;

pub use config::AppConfig;
pub use modules::{AuthService, UserService, roles};
pub use state::AppState;

// Re-export workspace crates for convenience
pub use facilitydesk_auth;
pub use facilitydesk_config;
pub use facilitydesk_core;
pub use facilitydesk_models;
pub use facilitydesk_store;
