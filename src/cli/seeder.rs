//! Demo data for trying the CLI against a fresh data directory.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::anyhow;
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use facilitydesk_core::password::MIN_COST;
use facilitydesk_core::{AppError, hash_password_with_cost};
use facilitydesk_models::{Email, ResetPasswordDto, RoleId, User, UserId};
use rayon::prelude::*;
use tracing::info;

use crate::state::AppState;
use crate::validator::validate_dto;

const DEPARTMENTS: [&str; 5] = ["Maintenance", "Operations", "Security", "Housekeeping", "IT"];
const POSITIONS: [&str; 4] = ["Technician", "Coordinator", "Supervisor", "Inspector"];
const EMAIL_DOMAIN: &str = "facilitydesk.test";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub count: usize,
    pub role_id: RoleId,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

struct UserSeed {
    username: String,
    full_name: String,
    department: &'static str,
    position: &'static str,
}

/// Generates fake users in parallel and appends them in a single write.
///
/// All seeded users share one password, hashed once at the lowest bcrypt
/// cost. The password must satisfy the usual 8 to 72 character rule. Generated names that collide with existing usernames or emails are
/// skipped.
pub fn seed_users(state: &mut AppState, config: &SeedConfig) -> Result<SeedReport, AppError> {
    if state.role(config.role_id).is_none() {
        return Err(AppError::bad_request(anyhow!(
            "Role {} does not exist",
            config.role_id
        )));
    }

    // same length rule as every other password path
    validate_dto(&ResetPasswordDto {
        new_password: config.password.clone(),
    })?;

    let start = Instant::now();
    let password_hash = hash_password_with_cost(&config.password, MIN_COST)?;
    let seeds = generate_seeds(config.count);

    let mut taken: HashSet<String> = state
        .users()
        .iter()
        .flat_map(|u| [u.username.clone(), u.email.as_str().to_lowercase()])
        .collect();

    let now = state.now();
    let mut users = state.users().to_vec();
    let mut skipped = 0;
    for seed in seeds {
        let email_raw = format!("{}@{}", seed.username, EMAIL_DOMAIN);
        if taken.contains(&seed.username) || taken.contains(&email_raw) {
            skipped += 1;
            continue;
        }
        let email = Email::new(email_raw.as_str()).map_err(AppError::internal)?;
        taken.insert(seed.username.clone());
        taken.insert(email_raw);

        users.push(User {
            id: UserId::new(),
            username: seed.username,
            email,
            full_name: seed.full_name,
            password_hash: password_hash.clone(),
            role_id: config.role_id,
            department: Some(seed.department.to_string()),
            phone: None,
            position: Some(seed.position.to_string()),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        });
    }

    let created = users.len() - state.users().len();
    state.commit_users(users)?;

    info!(created, skipped, elapsed = ?start.elapsed(), "Seeded demo users");
    Ok(SeedReport { created, skipped })
}

fn generate_seeds(count: usize) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|index| {
            let first: String = FirstName().fake();
            let last: String = LastName().fake();
            UserSeed {
                username: seed_username(&first, &last, index),
                full_name: format!("{} {}", first, last),
                department: DEPARTMENTS[index % DEPARTMENTS.len()],
                position: POSITIONS[index % POSITIONS.len()],
            }
        })
        .collect()
}

/// `first.last<index>`, lower-case ASCII, within the username length limit.
fn seed_username(first: &str, last: &str, index: usize) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    let suffix = index.to_string();
    let mut base = format!("{}.{}", clean(first), clean(last));
    base.truncate(32 - suffix.len());
    let base = base.trim_matches('.');
    let base = if base.is_empty() { "user" } else { base };
    format!("{}{}", base, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facilitydesk_models::value_types::validate_username;

    #[test]
    fn test_seed_username_is_valid() {
        assert_eq!(seed_username("Mary-Jane", "O'Neil", 7), "maryjane.oneil7");
        assert_eq!(seed_username("", "", 0), "user0");

        let long = seed_username(&"a".repeat(40), "b", 12345);
        assert!(long.len() <= 32);
        assert!(validate_username(&long).is_ok());
    }

    #[test]
    fn test_generate_seeds_count() {
        let seeds = generate_seeds(10);
        assert_eq!(seeds.len(), 10);
        assert!(seeds.iter().all(|s| validate_username(&s.username).is_ok()));
    }
}
