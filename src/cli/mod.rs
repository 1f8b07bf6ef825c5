//! The `facilitydesk` command line.
//!
//! Each invocation bootstraps the state from the data directory, runs one
//! command and exits. The login session persists between invocations, so
//! `facilitydesk login` followed by `facilitydesk user list` behaves like a
//! signed-in console.

pub mod seeder;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use facilitydesk_core::AppError;
use facilitydesk_core::permissions::{actions, is_known_action, is_known_module, modules};
use facilitydesk_models::{
    ChangePasswordDto, CreateRoleDto, CreateUserDto, LoginRequest, PermissionId, RegisterRequest,
    ResetPasswordDto, RoleId, RoleWithPermissions, UpdateRoleDto, UpdateUserDto, UserId,
    UserProfile, system_roles,
};
use serde::Serialize;

use crate::access::{require_login, require_permission};
use crate::modules::{AuthService, UserService, roles};
use crate::state::AppState;

use self::seeder::{SeedConfig, seed_users};

#[derive(Parser, Debug)]
#[command(name = "facilitydesk")]
#[command(about = "Facilitydesk - users, roles and access for the facility desk", long_about = None)]
pub struct Cli {
    /// Data directory (overrides FACILITYDESK_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory (permission catalog and system roles)
    Init,
    /// Create an administrator account
    CreateAdmin(NewAccountArgs),
    /// Register a new account with the default role
    Register(NewAccountArgs),
    /// Log in and start a session
    Login {
        /// Username or email
        identifier: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change your own password
    Passwd,
    /// Check whether the current user holds a permission
    Can { module: String, action: String },
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage roles
    #[command(subcommand)]
    Role(RoleCommand),
    /// Inspect the permission catalog
    #[command(subcommand)]
    Permission(PermissionCommand),
    /// Generate demo users
    Seed {
        /// Number of users to create
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,

        /// Role given to every seeded user
        #[arg(short = 'r', long, default_value = system_roles::names::STAFF)]
        role: String,

        /// Shared password for the seeded users
        #[arg(short = 'p', long, default_value = "password123")]
        password: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct NewAccountArgs {
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    #[arg(short = 'e', long)]
    pub email: Option<String>,

    #[arg(short = 'n', long)]
    pub full_name: Option<String>,

    /// Password (will be prompted securely if not provided)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub position: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List all users
    List,
    /// Show one user (id, username or email)
    Show { user: String },
    /// Create a user
    Create {
        #[command(flatten)]
        account: NewAccountArgs,

        /// Role name
        #[arg(short = 'r', long, default_value = system_roles::names::VIEWER)]
        role: String,

        /// Create the account disabled
        #[arg(long)]
        inactive: bool,
    },
    /// Edit a user; an empty string clears department, phone or position
    Update {
        user: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        /// Role name
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        position: Option<String>,
    },
    /// Permanently delete a user
    Delete {
        user: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Re-enable a disabled user
    Activate { user: String },
    /// Disable a user without deleting it
    Deactivate { user: String },
    /// Set a new password for a user
    ResetPassword {
        user: String,
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// List all roles
    List,
    /// Show a role and its permissions
    Show { role: String },
    /// Create a role
    Create {
        display_name: String,
        /// Slug; derived from the display name when omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Privilege level, 1 is the most privileged
        #[arg(short = 'l', long)]
        level: u8,
        /// Permissions as module:action
        #[arg(short = 'g', long = "grant")]
        permissions: Vec<String>,
    },
    /// Edit a role
    Update {
        role: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 'l', long)]
        level: Option<u8>,
    },
    /// Delete a role that nobody holds
    Delete {
        role: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Add permissions (module:action) to a role
    Grant {
        role: String,
        #[arg(required = true)]
        permissions: Vec<String>,
    },
    /// Remove permissions (module:action) from a role
    Revoke {
        role: String,
        #[arg(required = true)]
        permissions: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PermissionCommand {
    /// List the permission catalog
    List {
        /// Only this module
        #[arg(short = 'm', long)]
        module: Option<String>,
    },
}

/// Runs one parsed command against `state`.
pub fn run(state: &mut AppState, cli: Cli) -> Result<(), AppError> {
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Init => handle_init(state, &out),
        Commands::CreateAdmin(args) => handle_create_admin(state, &out, args),
        Commands::Register(args) => handle_register(state, &out, args),
        Commands::Login {
            identifier,
            password,
        } => handle_login(state, &out, identifier, password),
        Commands::Logout => {
            AuthService::logout(state)?;
            out.message("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let user = require_login(state)?;
            let session = AuthService::session_info(state);
            out.value(&user, || {
                print_user(&user);
                if let Some(session) = &session {
                    println!("   Session expires: {}", session.expires_at);
                }
            })
        }
        Commands::Passwd => handle_passwd(state, &out),
        Commands::Can { module, action } => {
            if !is_known_module(&module) || !is_known_action(&action) {
                return Err(AppError::bad_request(anyhow!(
                    "Unknown permission {}:{}",
                    module,
                    action
                )));
            }
            require_permission(state, &module, &action)?;
            out.message(&format!("Allowed: {}:{}", module, action));
            Ok(())
        }
        Commands::User(command) => handle_user(state, &out, command),
        Commands::Role(command) => handle_role(state, &out, command),
        Commands::Permission(PermissionCommand::List { module }) => {
            require_permission(state, modules::ROLES, actions::READ)?;
            let permissions = roles::list_permissions(state, module.as_deref());
            out.value(&permissions, || {
                for p in &permissions {
                    println!(
                        "{:<28} {}",
                        p.name,
                        p.description.as_deref().unwrap_or_default()
                    );
                }
            })
        }
        Commands::Seed {
            count,
            role,
            password,
        } => {
            require_permission(state, modules::USERS, actions::CREATE)?;
            let role_id = resolve_role(state, &role)?.role.id;
            let report = seed_users(
                state,
                &SeedConfig {
                    count,
                    role_id,
                    password: password.clone(),
                },
            )?;
            out.message(&format!(
                "Seeded {} users ({} skipped). Password for all: {}",
                report.created, report.skipped, password
            ));
            Ok(())
        }
    }
}

fn handle_init(state: &mut AppState, out: &Output) -> Result<(), AppError> {
    out.message(&format!(
        "Data directory ready: {} permissions, {} roles, {} users",
        state.permissions().len(),
        state.roles().len(),
        state.users().len()
    ));
    Ok(())
}

fn handle_create_admin(
    state: &mut AppState,
    out: &Output,
    args: NewAccountArgs,
) -> Result<(), AppError> {
    let role_id = resolve_role(state, system_roles::names::ADMIN)?.role.id;
    let dto = CreateUserDto {
        username: text_or_prompt(args.username, "Username")?,
        email: text_or_prompt(args.email, "Email address")?,
        full_name: text_or_prompt(args.full_name, "Full name")?,
        password: password_or_prompt(args.password, "Password")?,
        role_id,
        department: args.department,
        phone: args.phone,
        position: args.position,
        is_active: true,
    };
    let user = UserService::create_user(state, dto)?;
    out.value(&user, || {
        println!("✅ Administrator created");
        print_user(&user);
    })
}

fn handle_register(
    state: &mut AppState,
    out: &Output,
    args: NewAccountArgs,
) -> Result<(), AppError> {
    let dto = RegisterRequest {
        username: text_or_prompt(args.username, "Username")?,
        email: text_or_prompt(args.email, "Email address")?,
        full_name: text_or_prompt(args.full_name, "Full name")?,
        password: password_or_prompt(args.password, "Password")?,
        department: args.department,
        phone: args.phone,
        position: args.position,
    };
    let user = AuthService::register(state, dto)?;
    out.value(&user, || {
        println!("✅ Account registered");
        print_user(&user);
    })
}

fn handle_login(
    state: &mut AppState,
    out: &Output,
    identifier: Option<String>,
    password: Option<String>,
) -> Result<(), AppError> {
    let identifier = text_or_prompt(identifier, "Username or email")?;
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password", false)?,
    };

    let response = AuthService::login(state, LoginRequest::new(identifier, password))?;
    out.value(&response.user, || {
        println!(
            "✅ Logged in as {} ({})",
            response.user.username,
            response.user.role_display_name.as_deref().unwrap_or("no role")
        );
        println!("   Session expires: {}", response.session.expires_at);
    })
}

fn handle_passwd(state: &mut AppState, out: &Output) -> Result<(), AppError> {
    require_login(state)?;
    let dto = ChangePasswordDto {
        current_password: prompt_password("Current password", false)?,
        new_password: prompt_password("New password", true)?,
    };
    AuthService::change_password(state, dto)?;
    out.message("Password changed");
    Ok(())
}

fn handle_user(state: &mut AppState, out: &Output, command: UserCommand) -> Result<(), AppError> {
    match command {
        UserCommand::List => {
            require_permission(state, modules::USERS, actions::READ)?;
            let users = UserService::list_users(state);
            out.value(&users, || {
                for u in &users {
                    println!(
                        "{:<24} {:<32} {:<12} {}",
                        u.username,
                        u.email.as_str(),
                        u.role_name.as_deref().unwrap_or("-"),
                        if u.is_active { "active" } else { "inactive" }
                    );
                }
            })
        }
        UserCommand::Show { user } => {
            require_permission(state, modules::USERS, actions::READ)?;
            let user = resolve_user(state, &user)?;
            out.value(&user, || print_user(&user))
        }
        UserCommand::Create {
            account,
            role,
            inactive,
        } => {
            require_permission(state, modules::USERS, actions::CREATE)?;
            let role_id = resolve_role(state, &role)?.role.id;
            let dto = CreateUserDto {
                username: text_or_prompt(account.username, "Username")?,
                email: text_or_prompt(account.email, "Email address")?,
                full_name: text_or_prompt(account.full_name, "Full name")?,
                password: password_or_prompt(account.password, "Password")?,
                role_id,
                department: account.department,
                phone: account.phone,
                position: account.position,
                is_active: !inactive,
            };
            let user = UserService::create_user(state, dto)?;
            out.value(&user, || {
                println!("✅ User created");
                print_user(&user);
            })
        }
        UserCommand::Update {
            user,
            username,
            email,
            full_name,
            role,
            department,
            phone,
            position,
        } => {
            require_permission(state, modules::USERS, actions::UPDATE)?;
            let id = resolve_user(state, &user)?.id;
            let role_id = match role {
                Some(role) => Some(resolve_role(state, &role)?.role.id),
                None => None,
            };
            let dto = UpdateUserDto {
                username,
                email,
                full_name,
                role_id,
                department,
                phone,
                position,
                is_active: None,
            };
            let user = UserService::update_user(state, id, dto)?;
            out.value(&user, || print_user(&user))
        }
        UserCommand::Delete { user, yes } => {
            require_permission(state, modules::USERS, actions::DELETE)?;
            let user = resolve_user(state, &user)?;
            if !yes && !confirm(&format!("Delete user '{}' permanently?", user.username))? {
                out.message("Aborted");
                return Ok(());
            }
            UserService::delete_user(state, user.id)?;
            out.message(&format!("Deleted user {}", user.username));
            Ok(())
        }
        UserCommand::Activate { user } => set_active(state, out, &user, true),
        UserCommand::Deactivate { user } => set_active(state, out, &user, false),
        UserCommand::ResetPassword { user, password } => {
            require_permission(state, modules::USERS, actions::UPDATE)?;
            let user = resolve_user(state, &user)?;
            let new_password = password_or_prompt(password, "New password")?;
            UserService::reset_password(state, user.id, ResetPasswordDto { new_password })?;
            out.message(&format!("Password reset for {}", user.username));
            Ok(())
        }
    }
}

fn set_active(state: &mut AppState, out: &Output, user: &str, active: bool) -> Result<(), AppError> {
    require_permission(state, modules::USERS, actions::UPDATE)?;
    let id = resolve_user(state, user)?.id;
    let user = UserService::set_user_active(state, id, active)?;
    out.value(&user, || {
        println!(
            "{} {}",
            user.username,
            if active { "activated" } else { "deactivated" }
        );
    })
}

fn handle_role(state: &mut AppState, out: &Output, command: RoleCommand) -> Result<(), AppError> {
    match command {
        RoleCommand::List => {
            require_permission(state, modules::ROLES, actions::READ)?;
            let roles = roles::list_roles(state);
            out.value(&roles, || {
                for r in &roles {
                    println!(
                        "{:<20} {:<24} level {:<3} {} permissions{}",
                        r.name,
                        r.display_name,
                        r.level,
                        r.permission_ids.len(),
                        if r.is_system_role { " (system)" } else { "" }
                    );
                }
            })
        }
        RoleCommand::Show { role } => {
            require_permission(state, modules::ROLES, actions::READ)?;
            let role = resolve_role(state, &role)?;
            out.value(&role, || print_role(&role))
        }
        RoleCommand::Create {
            display_name,
            name,
            description,
            level,
            permissions,
        } => {
            require_permission(state, modules::ROLES, actions::CREATE)?;
            let permission_ids = resolve_permissions(state, &permissions)?;
            let role = roles::create_role(
                state,
                CreateRoleDto {
                    display_name,
                    name,
                    description,
                    level,
                    permission_ids,
                },
            )?;
            out.value(&role, || {
                println!("✅ Role created");
                print_role(&role);
            })
        }
        RoleCommand::Update {
            role,
            display_name,
            name,
            description,
            level,
        } => {
            require_permission(state, modules::ROLES, actions::UPDATE)?;
            let id = resolve_role(state, &role)?.role.id;
            let role = roles::update_role(
                state,
                id,
                UpdateRoleDto {
                    display_name,
                    name,
                    description,
                    level,
                    permission_ids: None,
                },
            )?;
            out.value(&role, || print_role(&role))
        }
        RoleCommand::Delete { role, yes } => {
            require_permission(state, modules::ROLES, actions::DELETE)?;
            let role = resolve_role(state, &role)?.role;
            if !yes && !confirm(&format!("Delete role '{}'?", role.name))? {
                out.message("Aborted");
                return Ok(());
            }
            roles::delete_role(state, role.id)?;
            out.message(&format!("Deleted role {}", role.name));
            Ok(())
        }
        RoleCommand::Grant { role, permissions } => {
            require_permission(state, modules::ROLES, actions::UPDATE)?;
            let id = resolve_role(state, &role)?.role.id;
            let ids = resolve_permissions(state, &permissions)?;
            let role = roles::grant_permissions(state, id, &ids)?;
            out.value(&role, || print_role(&role))
        }
        RoleCommand::Revoke { role, permissions } => {
            require_permission(state, modules::ROLES, actions::UPDATE)?;
            let id = resolve_role(state, &role)?.role.id;
            let ids = resolve_permissions(state, &permissions)?;
            let role = roles::revoke_permissions(state, id, &ids)?;
            out.value(&role, || print_role(&role))
        }
    }
}

/// Accepts a user id, username or email.
fn resolve_user(state: &AppState, reference: &str) -> Result<UserProfile, AppError> {
    match reference.parse::<UserId>() {
        Ok(id) => UserService::get_user(state, id),
        Err(_) => UserService::find_user(state, reference),
    }
}

/// Accepts a role id or role name.
fn resolve_role(state: &AppState, reference: &str) -> Result<RoleWithPermissions, AppError> {
    match reference.parse::<RoleId>() {
        Ok(id) => roles::get_role(state, id),
        Err(_) => roles::get_role_by_name(state, reference),
    }
}

fn resolve_permissions(state: &AppState, names: &[String]) -> Result<Vec<PermissionId>, AppError> {
    names
        .iter()
        .map(|name| roles::get_permission_by_name(state, name).map(|p| p.id))
        .collect()
}

struct Output {
    json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<(), AppError> {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::internal(anyhow!("Failed to render JSON: {}", e)))?;
            println!("{}", rendered);
        } else {
            human();
        }
        Ok(())
    }

    fn message(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": message }));
        } else {
            println!("{}", message);
        }
    }
}

fn print_user(user: &UserProfile) {
    println!("   Username: {}", user.username);
    println!("   Email: {}", user.email);
    println!("   Name: {}", user.full_name);
    println!(
        "   Role: {}",
        user.role_display_name.as_deref().unwrap_or("(missing role)")
    );
    if let Some(department) = &user.department {
        println!("   Department: {}", department);
    }
    if let Some(position) = &user.position {
        println!("   Position: {}", position);
    }
    if let Some(phone) = &user.phone {
        println!("   Phone: {}", phone);
    }
    println!("   Active: {}", user.is_active);
    if let Some(last_login) = user.last_login_at {
        println!("   Last login: {}", last_login);
    }
    println!("   ID: {}", user.id);
}

fn print_role(role: &RoleWithPermissions) {
    println!("   Name: {}", role.role.name);
    println!("   Display name: {}", role.role.display_name);
    if let Some(description) = &role.role.description {
        println!("   Description: {}", description);
    }
    println!("   Level: {}", role.role.level);
    println!("   System role: {}", role.role.is_system_role);
    println!("   Permissions ({}):", role.permissions.len());
    for p in &role.permissions {
        println!("     - {}", p.name);
    }
}

fn text_or_prompt(value: Option<String>, label: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v),
        None => Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .map_err(|e| AppError::internal(anyhow!("Failed to read {}: {}", label, e))),
    }
}

fn password_or_prompt(value: Option<String>, label: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v),
        None => prompt_password(label, true),
    }
}

fn prompt_password(label: &str, confirm: bool) -> Result<String, AppError> {
    let mut prompt = Password::new().with_prompt(label);
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords don't match");
    }
    prompt
        .interact()
        .map_err(|e| AppError::internal(anyhow!("Failed to read password: {}", e)))
}

fn confirm(question: &str) -> Result<bool, AppError> {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(anyhow!("Failed to read answer: {}", e)))
}
