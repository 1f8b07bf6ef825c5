//! Session token minting.
//!
//! Tokens are opaque: 32 random bytes, URL-safe base64 without padding. They
//! identify the local session but carry no claims, so there is nothing to
//! verify beyond comparing against the stored session.

use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE64URL_NOPAD;
use facilitydesk_models::{Session, UserId};
use rand::RngCore;

pub const TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64URL_NOPAD.encode(&bytes)
}

/// Creates a session for `user_id` that expires `ttl` after `now`.
pub fn issue_session(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Session {
    Session {
        user_id,
        token: generate_token(),
        issued_at: now,
        expires_at: now + ttl,
    }
}
