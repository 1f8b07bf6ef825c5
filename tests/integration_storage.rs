mod common;

use std::sync::Arc;

use common::{TEST_PASSWORD, start_time, test_config, user_dto};
use facilitydesk::facilitydesk_auth::ManualClock;
use facilitydesk::facilitydesk_models::{LoginRequest, User};
use facilitydesk::facilitydesk_store::{KeyValueStore, LocalFileStore};
use facilitydesk::{AppConfig, AppState, AuthService, UserService};
use tempfile::TempDir;

fn open(dir: &TempDir, config: AppConfig) -> (AppState, Arc<LocalFileStore>) {
    let store = Arc::new(LocalFileStore::new(dir.path()));
    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::bootstrap(store.clone(), clock, config).unwrap();
    (state, store)
}

#[test]
fn test_state_round_trips_through_files() {
    let dir = TempDir::new().unwrap();
    let (mut state, _) = open(&dir, test_config());

    let staff = state.role_by_name("staff").unwrap().id;
    for name in ["alpha", "bravo", "charlie"] {
        let email = format!("{}@example.com", name);
        UserService::create_user(&mut state, user_dto(name, &email, staff)).unwrap();
    }
    AuthService::login(&mut state, LoginRequest::new("bravo", TEST_PASSWORD)).unwrap();

    let (reloaded, _) = open(&dir, test_config());
    assert_eq!(reloaded.users(), state.users());
    assert_eq!(reloaded.roles(), state.roles());
    assert_eq!(reloaded.permissions(), state.permissions());
    assert_eq!(reloaded.raw_session(), state.raw_session());

    let usernames: Vec<_> = reloaded.users().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(usernames, vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn test_blobs_use_prefixed_keys() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.storage.key_prefix = "site_a".to_string();
    let (mut state, store) = open(&dir, config);

    let viewer = state.role_by_name("viewer").unwrap().id;
    UserService::create_user(&mut state, user_dto("auditor", "auditor@example.com", viewer))
        .unwrap();

    assert_eq!(
        store.keys().unwrap(),
        vec!["site_a_permissions", "site_a_roles", "site_a_users"]
    );
    assert!(dir.path().join("site_a_users.json").exists());
}

#[test]
fn test_stored_users_never_contain_plain_passwords() {
    let dir = TempDir::new().unwrap();
    let (mut state, store) = open(&dir, test_config());
    let viewer = state.role_by_name("viewer").unwrap().id;
    UserService::create_user(&mut state, user_dto("auditor", "auditor@example.com", viewer))
        .unwrap();

    let blob = store.get(&state.keys().users).unwrap().unwrap();
    assert!(!blob.contains(TEST_PASSWORD));
    let users: Vec<User> = serde_json::from_str(&blob).unwrap();
    assert!(users[0].password_hash.starts_with("$2"));
}

#[test]
fn test_corrupt_blob_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let (mut state, store) = open(&dir, test_config());
    let viewer = state.role_by_name("viewer").unwrap().id;
    UserService::create_user(&mut state, user_dto("auditor", "auditor@example.com", viewer))
        .unwrap();

    store.set(&state.keys().users, "{not json").unwrap();
    store.set(&state.keys().session, "42").unwrap();

    let (reloaded, _) = open(&dir, test_config());
    assert!(reloaded.users().is_empty());
    assert!(reloaded.raw_session().is_none());
    assert_eq!(reloaded.roles(), state.roles());
}

#[test]
fn test_session_for_missing_user_is_discarded() {
    let dir = TempDir::new().unwrap();
    let (mut state, store) = open(&dir, test_config());
    let viewer = state.role_by_name("viewer").unwrap().id;
    UserService::create_user(&mut state, user_dto("auditor", "auditor@example.com", viewer))
        .unwrap();
    AuthService::login(&mut state, LoginRequest::new("auditor", TEST_PASSWORD)).unwrap();

    store.set(&state.keys().users, "[]").unwrap();

    let (mut reloaded, _) = open(&dir, test_config());
    assert!(AuthService::current_user(&mut reloaded).is_none());
    assert!(store.get(&state.keys().session).unwrap().is_none());
}

#[test]
fn test_corrupt_permissions_blob_is_not_reseeded() {
    let mut app = common::TestApp::new();
    app.login_as("admin");
    let key = app.state.keys().permissions.clone();
    let original = app.stored(&key).unwrap();

    app.store.set(&key, "{truncated").unwrap();
    let mut reloaded = app.reload();

    assert!(reloaded.is_unreadable(&key));
    assert!(reloaded.permissions().is_empty());
    assert_eq!(app.stored(&key).as_deref(), Some("{truncated"));
    assert_eq!(reloaded.roles(), app.state.roles());
    assert!(!AuthService::has_permission(&mut reloaded, "users", "update"));

    // once repaired, the original grants resolve again
    app.store.set(&key, &original).unwrap();
    let mut repaired = app.reload();
    assert!(!repaired.is_unreadable(&key));
    assert!(AuthService::has_permission(&mut repaired, "users", "update"));
}

#[test]
fn test_corrupt_roles_blob_is_kept_and_read_only() {
    let mut app = common::TestApp::new();
    let custom = facilitydesk::roles::create_role(
        &mut app.state,
        facilitydesk::facilitydesk_models::CreateRoleDto {
            display_name: "Contractor".to_string(),
            name: None,
            description: None,
            level: 5,
            permission_ids: vec![],
        },
    )
    .unwrap()
    .role;
    let staff = app.create_user("staff");
    let key = app.state.keys().roles.clone();
    let original = app.stored(&key).unwrap();

    app.store.set(&key, "[{\"id\":").unwrap();
    let mut reloaded = app.reload();

    assert!(reloaded.is_unreadable(&key));
    assert!(reloaded.roles().is_empty());
    assert_eq!(app.stored(&key).as_deref(), Some("[{\"id\":"));

    let err = facilitydesk::roles::create_role(
        &mut reloaded,
        facilitydesk::facilitydesk_models::CreateRoleDto {
            display_name: "Night Shift".to_string(),
            name: None,
            description: None,
            level: 5,
            permission_ids: vec![],
        },
    )
    .unwrap_err();
    assert!(err.is(facilitydesk::facilitydesk_core::ErrorKind::Storage));
    assert_eq!(app.stored(&key).as_deref(), Some("[{\"id\":"));

    app.store.set(&key, &original).unwrap();
    let repaired = app.reload();
    let user = repaired.user(staff.id).unwrap();
    assert_eq!(repaired.role(user.role_id).unwrap().name, "staff");
    assert_eq!(repaired.role(custom.id), Some(&custom));
}

#[test]
fn test_corrupt_users_blob_refuses_writes() {
    let mut app = common::TestApp::new();
    app.create_user("staff");
    let key = app.state.keys().users.clone();

    app.store.set(&key, "not json").unwrap();
    let mut reloaded = app.reload();
    assert!(reloaded.users().is_empty());

    let viewer = reloaded.role_by_name("viewer").unwrap().id;
    let err = UserService::create_user(
        &mut reloaded,
        user_dto("late.comer", "late@example.com", viewer),
    )
    .unwrap_err();
    assert!(err.is(facilitydesk::facilitydesk_core::ErrorKind::Storage));
    assert!(reloaded.users().is_empty());
    assert_eq!(app.stored(&key).as_deref(), Some("not json"));
}
