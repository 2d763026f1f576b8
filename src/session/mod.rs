//! Mail session: the one network connection a run holds.
//!
//! [`Connector`] logs in and hands back a [`MailSession`]; [`open`] wraps it
//! in a [`SessionGuard`] that logs out on every exit path, including early
//! returns and unwinding.

pub mod imap;

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::credentials::CredentialProvider;
use crate::error::{DownloadError, Result};
use crate::model::MessageRef;

/// An authenticated connection to a mail server.
pub trait MailSession {
    /// Select `mailbox` read-only.
    ///
    /// Returns [`DownloadError::MailboxNotFound`] if the server does not know it.
    fn select(&mut self, mailbox: &str) -> Result<()>;

    /// Run a provider search in the selected mailbox.
    fn search(&mut self, query: &str) -> Result<Vec<MessageRef>>;

    /// Fetch the full raw message (headers + body).
    fn fetch(&mut self, message: MessageRef) -> Result<Vec<u8>>;

    /// Log out and close the connection.
    fn logout(&mut self) -> Result<()>;
}

/// Opens authenticated sessions.
pub trait Connector {
    /// Session type produced on successful login.
    type Session: MailSession;

    /// Connect and log in. Rejected credentials must map to
    /// [`DownloadError::Authentication`].
    fn connect(&self, identity: &str, password: &str) -> Result<Self::Session>;
}

/// Obtain a credential for `identity` and log in.
///
/// When the server rejects the credential the provider is told via
/// [`CredentialProvider::reject`], so a cached password is not reused.
pub fn open<C, P>(connector: &C, credentials: &P, identity: &str) -> Result<SessionGuard<C::Session>>
where
    C: Connector,
    P: CredentialProvider + ?Sized,
{
    let password = credentials.credential(identity)?;
    match connector.connect(identity, &password) {
        Ok(session) => Ok(SessionGuard::new(session)),
        Err(e @ DownloadError::Authentication { .. }) => {
            credentials.reject(identity);
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Owns a session and logs out when dropped.
pub struct SessionGuard<S: MailSession> {
    session: S,
    closed: bool,
}

impl<S: MailSession> SessionGuard<S> {
    /// Take ownership of an open session.
    pub fn new(session: S) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    /// Log out now and report the outcome instead of logging it.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.session.logout()
    }
}

impl<S: MailSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: MailSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: MailSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.session.logout() {
            Ok(()) => debug!("Session closed"),
            Err(e) => warn!(error = %e, "Failed to log out cleanly"),
        }
    }
}
