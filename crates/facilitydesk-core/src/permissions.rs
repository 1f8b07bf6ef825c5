//! Permission catalog for Facilitydesk.
//!
//! A permission is a `(module, action)` pair. The catalog is the full cross
//! product of [`MODULES`] and [`ACTIONS`]; it is generated once when a data
//! directory is initialised and never changes afterwards.
//!
//! # Example
//!
//! ```ignore
//! use facilitydesk_core::permissions::{self, actions, modules};
//!
//! if state.has_permission(modules::WORK_ORDERS, actions::UPDATE) {
//!     // edit the work order
//! }
//!
//! assert_eq!(permissions::catalog().len(), MODULES.len() * ACTIONS.len());
//! ```

// =============================================================================
// Modules
// =============================================================================

pub mod modules {
    pub const DASHBOARD: &str = "dashboard";
    pub const DEVICES: &str = "devices";
    pub const ROOMS: &str = "rooms";
    pub const WORK_ORDERS: &str = "work_orders";
    pub const TASKS: &str = "tasks";
    pub const DOCUMENTS: &str = "documents";
    pub const PROCUREMENT: &str = "procurement";
    pub const QR_CODES: &str = "qr_codes";
    pub const USERS: &str = "users";
    pub const ROLES: &str = "roles";
    pub const SETTINGS: &str = "settings";
}

// =============================================================================
// Actions
// =============================================================================

pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const EXPORT: &str = "export";
}

/// Every module a permission can target, in catalog order.
pub const MODULES: &[&str] = &[
    modules::DASHBOARD,
    modules::DEVICES,
    modules::ROOMS,
    modules::WORK_ORDERS,
    modules::TASKS,
    modules::DOCUMENTS,
    modules::PROCUREMENT,
    modules::QR_CODES,
    modules::USERS,
    modules::ROLES,
    modules::SETTINGS,
];

/// Every action a permission can grant, in catalog order.
pub const ACTIONS: &[&str] = &[
    actions::CREATE,
    actions::READ,
    actions::UPDATE,
    actions::DELETE,
    actions::EXPORT,
];

/// Modules that only administrators may mutate.
pub const ADMINISTRATIVE_MODULES: &[&str] = &[modules::USERS, modules::ROLES, modules::SETTINGS];

/// Day-to-day facility modules staff members may create and edit in.
pub const OPERATIONAL_MODULES: &[&str] = &[
    modules::DEVICES,
    modules::ROOMS,
    modules::WORK_ORDERS,
    modules::TASKS,
    modules::DOCUMENTS,
];

/// Canonical `module:action` name of a permission.
pub fn permission_name(module: &str, action: &str) -> String {
    format!("{}:{}", module, action)
}

/// Splits a `module:action` name. Returns `None` when the separator is missing
/// or either side is empty.
pub fn parse_permission_name(name: &str) -> Option<(&str, &str)> {
    let (module, action) = name.split_once(':')?;
    if module.is_empty() || action.is_empty() {
        return None;
    }
    Some((module, action))
}

pub fn is_known_module(module: &str) -> bool {
    MODULES.contains(&module)
}

pub fn is_known_action(action: &str) -> bool {
    ACTIONS.contains(&action)
}

/// The full `(module, action)` cross product, modules outermost.
pub fn catalog() -> Vec<(&'static str, &'static str)> {
    MODULES
        .iter()
        .flat_map(|module| ACTIONS.iter().map(move |action| (*module, *action)))
        .collect()
}

/// Human readable description used when the catalog is materialised.
pub fn describe(module: &str, action: &str) -> String {
    let subject = module.replace('_', " ");
    match action {
        actions::CREATE => format!("Create {}", subject),
        actions::READ => format!("View {}", subject),
        actions::UPDATE => format!("Edit {}", subject),
        actions::DELETE => format!("Delete {}", subject),
        actions::EXPORT => format!("Export {}", subject),
        other => format!("{} {}", other, subject),
    }
}
