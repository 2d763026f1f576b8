//! IMAP implementation of the mail session (blocking, implicit TLS).
//!
//! Searches go through Gmail's `X-GM-RAW` extension so the provider's own
//! query syntax (`has:attachment`, `is:unread`, ...) can be used as-is.

use std::net::TcpStream;

use native_tls::{TlsConnector, TlsStream};
use tracing::{debug, info};

use super::{Connector, MailSession};
use crate::error::{DownloadError, Result};
use crate::model::MessageRef;
use crate::search::query::imap_quote;

/// Default IMAP host.
pub const DEFAULT_HOST: &str = "imap.gmail.com";

/// Default IMAPS port.
pub const DEFAULT_PORT: u16 = 993;

/// Fetch item that returns the whole message.
const FETCH_FULL_MESSAGE: &str = "RFC822";

/// Connects to an IMAP server over TLS.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    host: String,
    port: u16,
}

impl ImapConnector {
    /// Connector for `host:port` (implicit TLS).
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Connector for ImapConnector {
    type Session = ImapSession;

    fn connect(&self, identity: &str, password: &str) -> Result<ImapSession> {
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| DownloadError::Connection(e.to_string()))?;

        debug!(host = %self.host, port = self.port, "Connecting to IMAP server");
        let client = ::imap::connect((self.host.as_str(), self.port), &self.host, &tls)
            .map_err(|e| DownloadError::Connection(format!("{}:{}: {e}", self.host, self.port)))?;

        info!("Connected to IMAP server, attempting login");
        let session = client
            .login(identity, password)
            .map_err(|(e, _client)| match e {
                ::imap::error::Error::No(reason) | ::imap::error::Error::Bad(reason) => {
                    DownloadError::Authentication {
                        identity: identity.to_string(),
                        reason,
                    }
                }
                other => DownloadError::Connection(other.to_string()),
            })?;

        Ok(ImapSession { session })
    }
}

/// A logged-in IMAP session.
pub struct ImapSession {
    session: ::imap::Session<TlsStream<TcpStream>>,
}

impl MailSession for ImapSession {
    fn select(&mut self, mailbox: &str) -> Result<()> {
        info!(mailbox, "Selecting mailbox (read-only)");
        let status = self.session.examine(mailbox).map_err(|e| match e {
            ::imap::error::Error::No(reason) | ::imap::error::Error::Bad(reason) => {
                DownloadError::MailboxNotFound {
                    mailbox: mailbox.to_string(),
                    reason,
                }
            }
            other => DownloadError::Connection(other.to_string()),
        })?;
        debug!(mailbox, exists = status.exists, "Mailbox selected");
        Ok(())
    }

    fn search(&mut self, query: &str) -> Result<Vec<MessageRef>> {
        let command = format!("X-GM-RAW {}", imap_quote(query));
        let uids = self
            .session
            .uid_search(&command)
            .map_err(|e| DownloadError::Connection(format!("search failed: {e}")))?;

        // SEARCH answers in ascending UID order; the set type loses that.
        let mut messages: Vec<MessageRef> = uids.into_iter().map(MessageRef).collect();
        messages.sort_unstable();
        Ok(messages)
    }

    fn fetch(&mut self, message: MessageRef) -> Result<Vec<u8>> {
        let fetches = self
            .session
            .uid_fetch(message.to_string(), FETCH_FULL_MESSAGE)
            .map_err(|e| DownloadError::fetch(message, e.to_string()))?;

        fetches
            .iter()
            .find_map(|f| f.body())
            .map(<[u8]>::to_vec)
            .ok_or_else(|| DownloadError::fetch(message, "server returned no message body"))
    }

    fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .map_err(|e| DownloadError::Connection(format!("logout failed: {e}")))
    }
}
