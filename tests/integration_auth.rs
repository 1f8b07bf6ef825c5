mod common;

use chrono::Duration;
use common::{TEST_PASSWORD, TestApp, start_time, unique_username};
use facilitydesk::facilitydesk_core::ErrorKind;
use facilitydesk::facilitydesk_models::{
    ChangePasswordDto, LoginRequest, RegisterRequest, UpdateProfileDto,
};
use facilitydesk::{AuthService, UserService};

#[test]
fn test_login_by_username_and_email() {
    let mut app = TestApp::new();
    let user = app.create_user("staff");

    let response = AuthService::login(
        &mut app.state,
        LoginRequest::new(user.username.clone(), TEST_PASSWORD),
    )
    .unwrap();
    assert_eq!(response.user.id, user.id);
    assert_eq!(response.user.role_name.as_deref(), Some("staff"));
    assert_eq!(response.session.expires_at, start_time() + Duration::hours(8));
    assert_eq!(response.user.last_login_at, Some(start_time()));

    let by_email =
        AuthService::login(&mut app.state, LoginRequest::new(user.email.clone(), TEST_PASSWORD));
    assert!(by_email.is_ok());
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let mut app = TestApp::new();
    let user = app.create_user("staff");
    let inactive = app.create_user("viewer");
    UserService::set_user_active(&mut app.state, inactive.id, false).unwrap();

    let attempts = [
        LoginRequest::new(user.username.clone(), "wrong-password"),
        LoginRequest::new("nobody", TEST_PASSWORD),
        LoginRequest::new(inactive.username.clone(), TEST_PASSWORD),
        LoginRequest::new(user.username.to_uppercase(), TEST_PASSWORD),
        LoginRequest::new("", ""),
    ];

    for attempt in attempts {
        let err = AuthService::login(&mut app.state, attempt).unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
        assert_eq!(err.message(), "Invalid username or password");
    }
    assert!(app.state.raw_session().is_none());
}

#[test]
fn test_login_persists_session_and_last_login() {
    let mut app = TestApp::new();
    let user = app.login_as("manager");

    let mut reloaded = app.reload();
    let current = AuthService::current_user(&mut reloaded).unwrap();
    assert_eq!(current.id, user.id);
    assert_eq!(current.last_login_at, Some(start_time()));
}

#[test]
fn test_logout_clears_current_user() {
    let mut app = TestApp::new();
    app.login_as("staff");
    assert!(AuthService::current_user(&mut app.state).is_some());

    AuthService::logout(&mut app.state).unwrap();
    assert!(AuthService::current_user(&mut app.state).is_none());
    assert!(app.stored(&app.state.keys().session.clone()).is_none());

    // idempotent
    AuthService::logout(&mut app.state).unwrap();
    let mut reloaded = app.reload();
    assert!(AuthService::current_user(&mut reloaded).is_none());
}

#[test]
fn test_session_expires_after_ttl() {
    let mut app = TestApp::new();
    app.login_as("viewer");

    app.clock.advance(Duration::hours(8));
    assert!(AuthService::current_user(&mut app.state).is_some());
    assert!(AuthService::has_permission(&mut app.state, "devices", "read"));

    app.clock.advance(Duration::seconds(1));
    assert!(AuthService::current_user(&mut app.state).is_none());
    assert!(app.state.raw_session().is_none());
    assert!(app.stored(&app.state.keys().session.clone()).is_none());
    assert!(!AuthService::has_permission(&mut app.state, "devices", "read"));
}

#[test]
fn test_new_login_replaces_session() {
    let mut app = TestApp::new();
    let first = app.login_as("staff");
    let first_token = app.state.raw_session().unwrap().token.clone();

    let second = app.login_as("viewer");
    let session = AuthService::session_info(&mut app.state).unwrap();
    assert_eq!(session.user_id, second.id);
    assert_ne!(session.token, first_token);
    assert_ne!(session.user_id, first.id);
}

#[test]
fn test_has_permission_requires_exact_pair() {
    let mut app = TestApp::new();
    assert!(!AuthService::has_permission(&mut app.state, "devices", "read"));

    app.login_as("staff");
    assert!(AuthService::has_permission(&mut app.state, "devices", "update"));
    assert!(!AuthService::has_permission(&mut app.state, "devices", "delete"));
    assert!(!AuthService::has_permission(&mut app.state, "procurement", "update"));
    assert!(!AuthService::has_permission(&mut app.state, "Devices", "update"));

    app.login_as("viewer");
    assert!(!AuthService::has_permission(&mut app.state, "devices", "update"));
    assert!(AuthService::has_permission(&mut app.state, "devices", "read"));
}

#[test]
fn test_has_role_and_can_access() {
    let mut app = TestApp::new();
    assert!(!AuthService::has_role(&mut app.state, "viewer"));
    assert!(!AuthService::can_access(&mut app.state, "viewer"));

    app.login_as("manager");
    assert!(AuthService::has_role(&mut app.state, "manager"));
    assert!(!AuthService::has_role(&mut app.state, "admin"));
    assert!(AuthService::can_access(&mut app.state, "staff"));
    assert!(AuthService::can_access(&mut app.state, "manager"));
    assert!(!AuthService::can_access(&mut app.state, "admin"));
    assert!(!AuthService::can_access(&mut app.state, "no_such_role"));
}

#[test]
fn test_deactivating_session_holder_ends_session() {
    let mut app = TestApp::new();
    let user = app.login_as("staff");

    UserService::set_user_active(&mut app.state, user.id, false).unwrap();
    assert!(AuthService::current_user(&mut app.state).is_none());
    assert!(app.state.raw_session().is_none());
}

#[test]
fn test_register_uses_default_role() {
    let mut app = TestApp::new();
    let username = unique_username("reg");
    let request = RegisterRequest {
        username: username.clone(),
        email: format!("{}@example.com", username),
        full_name: "New Person".to_string(),
        password: TEST_PASSWORD.to_string(),
        department: Some("  ".to_string()),
        phone: None,
        position: None,
    };

    let profile = AuthService::register(&mut app.state, request.clone()).unwrap();
    assert_eq!(profile.role_name.as_deref(), Some("viewer"));
    assert!(profile.is_active);
    assert_eq!(profile.department, None);
    assert!(app.state.raw_session().is_none());

    let err = AuthService::register(&mut app.state, request).unwrap_err();
    assert!(err.is(ErrorKind::Conflict));
}

#[test]
fn test_change_password() {
    let mut app = TestApp::new();
    let mut user = app.login_as("staff");

    let wrong = ChangePasswordDto {
        current_password: "not-it".to_string(),
        new_password: "brand-new-pass".to_string(),
    };
    assert!(
        AuthService::change_password(&mut app.state, wrong)
            .unwrap_err()
            .is(ErrorKind::BadRequest)
    );

    let dto = ChangePasswordDto {
        current_password: TEST_PASSWORD.to_string(),
        new_password: "brand-new-pass".to_string(),
    };
    AuthService::change_password(&mut app.state, dto).unwrap();

    user.password = "brand-new-pass".to_string();
    AuthService::logout(&mut app.state).unwrap();
    app.login(&user);
}

#[test]
fn test_change_password_requires_login() {
    let mut app = TestApp::new();
    let dto = ChangePasswordDto {
        current_password: TEST_PASSWORD.to_string(),
        new_password: "brand-new-pass".to_string(),
    };
    let err = AuthService::change_password(&mut app.state, dto).unwrap_err();
    assert!(err.is(ErrorKind::Unauthorized));
}

#[test]
fn test_update_profile() {
    let mut app = TestApp::new();
    let other = app.create_user("viewer");
    app.login_as("staff");

    let taken = UpdateProfileDto {
        email: Some(other.email.to_uppercase()),
        ..Default::default()
    };
    assert!(
        AuthService::update_profile(&mut app.state, taken)
            .unwrap_err()
            .is(ErrorKind::Conflict)
    );

    let dto = UpdateProfileDto {
        full_name: Some("Renamed Person".to_string()),
        position: Some("Supervisor".to_string()),
        ..Default::default()
    };
    let profile = AuthService::update_profile(&mut app.state, dto).unwrap();
    assert_eq!(profile.full_name, "Renamed Person");
    assert_eq!(profile.position.as_deref(), Some("Supervisor"));
}
