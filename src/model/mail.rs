//! Message references and the per-run summary.

use std::fmt;
use std::path::PathBuf;

/// Opaque reference to a message returned by the search step.
///
/// Backed by the IMAP UID of the message in the selected mailbox. It has no
/// meaning outside the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageRef(pub u32);

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    /// Messages returned by the search.
    pub messages_found: usize,
    /// Messages that could not be fetched or parsed.
    pub messages_failed: usize,
    /// Attachments written to disk.
    pub attachments_saved: usize,
    /// Attachments rejected by the extension or MIME filter.
    pub attachments_filtered: usize,
    /// Attachments that passed the filters but could not be written.
    pub attachments_failed: usize,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Every file written, in write order.
    pub saved: Vec<PathBuf>,
}
