//! Business counters.
//!
//! Recorded through the `metrics` facade. Without an installed recorder every
//! call is a no-op, which is the normal case for one-shot CLI invocations; a
//! host embedding the library can install whichever exporter it uses.

use metrics::counter;

use crate::logging::is_observability_enabled;

pub const LOGINS_TOTAL: &str = "facilitydesk_logins_total";
pub const USERS_CREATED_TOTAL: &str = "facilitydesk_users_created_total";
pub const SESSIONS_EXPIRED_TOTAL: &str = "facilitydesk_sessions_expired_total";

pub fn track_login_success(role: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!(LOGINS_TOTAL, "outcome" => "success", "role" => role.to_string()).increment(1);
}

pub fn track_login_failure(reason: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!(LOGINS_TOTAL, "outcome" => "failure", "reason" => reason.to_string()).increment(1);
}

pub fn track_user_created(role: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!(USERS_CREATED_TOTAL, "role" => role.to_string()).increment(1);
}

pub fn track_session_expired() {
    if !is_observability_enabled() {
        return;
    }
    counter!(SESSIONS_EXPIRED_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_without_recorder_is_noop() {
        track_login_success("admin");
        track_login_failure("invalid_credentials");
        track_user_created("viewer");
        track_session_expired();
    }
}
