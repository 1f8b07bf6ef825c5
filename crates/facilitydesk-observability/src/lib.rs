//! Facilitydesk Observability
//!
//! Console logging is always available. With the `observability` feature
//! (default) this crate also writes rolling log files and records business
//! counters through the `metrics` facade; without it the tracking functions
//! compile to no-ops so callers never need their own `cfg`.
//!
//! At runtime, file logging and metrics can be switched off with
//! `OBSERVABILITY_ENABLED=false`.

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::{console_filter, init_basic_console_logging};

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled};
#[cfg(feature = "observability")]
pub use metrics::{
    track_login_failure, track_login_success, track_session_expired, track_user_created,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use std::path::Path;

    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Falls back to console-only logging.
    pub fn init_tracing(_log_dir: &Path) {
        super::init_basic_console_logging();
    }

    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_user_created(_role: &str) {}
    pub fn track_session_expired() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
