#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use facilitydesk::facilitydesk_auth::ManualClock;
use facilitydesk::facilitydesk_core::password::MIN_COST;
use facilitydesk::facilitydesk_models::{CreateUserDto, LoginRequest, RoleId, UserId, UserProfile};
use facilitydesk::facilitydesk_store::{KeyValueStore, MemoryStore, StorageError};
use facilitydesk::{AppConfig, AppState, AuthService, UserService};

pub const TEST_PASSWORD: &str = "correct-horse-42";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap()
}

/// Config with the cheapest bcrypt cost so tests stay fast.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.bcrypt_cost = MIN_COST;
    config
}

/// In-memory store whose writes can be switched off to simulate a full disk.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Poisoned);
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<FlakyStore>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::default());
        let clock = Arc::new(ManualClock::new(start_time()));
        let state = AppState::bootstrap(store.clone(), clock.clone(), test_config()).unwrap();
        Self { state, store, clock }
    }

    /// A fresh state loaded from the same store, as the next process would see it.
    pub fn reload(&self) -> AppState {
        AppState::bootstrap(self.store.clone(), self.clock.clone(), test_config()).unwrap()
    }

    pub fn role_id(&self, name: &str) -> RoleId {
        self.state.role_by_name(name).unwrap().id
    }

    pub fn create_user(&mut self, role: &str) -> TestUser {
        let username = unique_username(role);
        let email = format!("{}@example.com", username);
        let role_id = self.role_id(role);
        let profile = UserService::create_user(
            &mut self.state,
            user_dto(&username, &email, role_id),
        )
        .unwrap();
        TestUser {
            id: profile.id,
            username,
            email,
            password: TEST_PASSWORD.to_string(),
        }
    }

    /// Creates a user with `role` and logs them in.
    pub fn login_as(&mut self, role: &str) -> TestUser {
        let user = self.create_user(role);
        self.login(&user);
        user
    }

    pub fn login(&mut self, user: &TestUser) -> UserProfile {
        AuthService::login(
            &mut self.state,
            LoginRequest::new(user.username.clone(), user.password.clone()),
        )
        .unwrap()
        .user
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }
}

pub fn user_dto(username: &str, email: &str, role_id: RoleId) -> CreateUserDto {
    CreateUserDto {
        username: username.to_string(),
        email: email.to_string(),
        full_name: "Test User".to_string(),
        password: TEST_PASSWORD.to_string(),
        role_id,
        department: None,
        phone: None,
        position: None,
        is_active: true,
    }
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn unique_username(prefix: &str) -> String {
    format!("{}.{}", prefix, COUNTER.fetch_add(1, Ordering::SeqCst))
}
