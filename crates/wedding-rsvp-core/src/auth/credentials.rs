use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

/// Keychain service name used when none is configured.
pub const DEFAULT_SERVICE: &str = "wedding-rsvp";

/// Keeps the host's dashboard password in the OS keychain, keyed by email.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl CredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, email: &str) -> Result<Entry> {
        Entry::new(&self.service, email).context("Failed to open keychain entry")
    }

    pub fn remember(&self, email: &str, password: &str) -> Result<()> {
        self.entry(email)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Stored password for this email, if the keychain has one.
    pub fn password_for(&self, email: &str) -> Option<String> {
        match self.entry(email).and_then(|e| Ok(e.get_password()?)) {
            Ok(password) => Some(password),
            Err(e) => {
                debug!(error = %e, "No stored password");
                None
            }
        }
    }

    pub fn forget(&self, email: &str) -> Result<()> {
        match self.entry(email)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}
