//! Credential providers for the mail session.
//!
//! The session never asks for a password on its own; it is handed a
//! [`CredentialProvider`]. The binary uses [`KeyringCredentials`] wrapping a
//! [`PromptCredentials`] fallback, tests use a fixed in-memory provider.

use keyring::Entry;
use tracing::{debug, info, warn};

use crate::error::{DownloadError, Result};

/// Default keyring service name for stored passwords.
pub const DEFAULT_KEYRING_SERVICE: &str = "gmail_attachment_downloader";

/// Something that can produce a password for an account identity.
pub trait CredentialProvider {
    /// Return the password for `identity`.
    fn credential(&self, identity: &str) -> Result<String>;

    /// Called when the server rejected the password returned by
    /// [`CredentialProvider::credential`]. Providers that cache should forget it.
    fn reject(&self, _identity: &str) {}
}

/// Ask the user on the terminal, without echoing the input.
#[derive(Debug, Clone, Default)]
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn credential(&self, identity: &str) -> Result<String> {
        info!("Password not stored, asking user");
        let password = rpassword::prompt_password(format!("Password for {identity}: "))
            .map_err(|e| DownloadError::Credential {
                identity: identity.to_string(),
                reason: e.to_string(),
            })?;
        if password.is_empty() {
            return Err(DownloadError::Credential {
                identity: identity.to_string(),
                reason: "empty password".to_string(),
            });
        }
        Ok(password)
    }
}

/// Look the password up in the system keyring, falling back to another
/// provider on a miss and remembering what it returns.
///
/// Keyring failures (no Secret Service on a headless box, locked keychain)
/// are logged and treated like a miss.
#[derive(Debug, Clone)]
pub struct KeyringCredentials<P> {
    service: String,
    fallback: P,
}

impl<P: CredentialProvider> KeyringCredentials<P> {
    /// Store entries under `service`, asking `fallback` when nothing is stored.
    pub fn new(service: impl Into<String>, fallback: P) -> Self {
        Self {
            service: service.into(),
            fallback,
        }
    }

    fn entry(&self, identity: &str) -> Option<Entry> {
        match Entry::new(&self.service, identity) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Keyring unavailable");
                None
            }
        }
    }
}

impl<P: CredentialProvider> CredentialProvider for KeyringCredentials<P> {
    fn credential(&self, identity: &str) -> Result<String> {
        let entry = self.entry(identity);

        if let Some(entry) = &entry {
            match entry.get_password() {
                Ok(password) => {
                    info!(email = %identity, "Retrieved password from keyring");
                    return Ok(password);
                }
                Err(keyring::Error::NoEntry) => {
                    debug!(email = %identity, "No password stored in keyring");
                }
                Err(e) => warn!(error = %e, "Failed to read keyring"),
            }
        }

        let password = self.fallback.credential(identity)?;

        if let Some(entry) = &entry {
            match entry.set_password(&password) {
                Ok(()) => debug!(email = %identity, "Stored password in keyring"),
                Err(e) => warn!(error = %e, "Failed to store password in keyring"),
            }
        }
        Ok(password)
    }

    fn reject(&self, identity: &str) {
        if let Some(entry) = self.entry(identity) {
            match entry.delete_credential() {
                Ok(()) => info!(email = %identity, "Removed rejected password from keyring"),
                Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(error = %e, "Failed to remove password from keyring"),
            }
        }
        self.fallback.reject(identity);
    }
}
