pub mod auth;
pub mod roles;
pub mod users;

pub use self::auth::AuthService;
pub use self::users::UserService;
