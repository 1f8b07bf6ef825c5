//! # Facilitydesk Auth
//!
//! Building blocks for the single local session:
//!
//! - [`clock`]: the [`Clock`] seam used for every timestamp and expiry check
//! - [`session`]: opaque session token minting
//! - [`access`]: pure role and permission checks over loaded records
//!
//! Nothing in here touches storage; the services in the root crate load the
//! records and pass them in.

pub mod access;
pub mod clock;
pub mod session;

pub use access::{check_any_role, check_role, check_role_level, role_grants};
#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use session::{TOKEN_BYTES, generate_token, issue_session};
