//! Host authentication.
//!
//! - `Session`: the signed-in host's backend session, persisted to disk
//!   and expiring after the lifetime the backend reported
//! - `CredentialStore`: OS keychain storage for the host's password
//!
//! Guests never sign in; the RSVP wizard runs with the public anon key.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
