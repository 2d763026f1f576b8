//! The run itself: prepare the destination, log in, search, and save every
//! matching attachment.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::cli::QueryParams;
use crate::credentials::CredentialProvider;
use crate::error::{DownloadError, Result};
use crate::export::{prepare_destination, save_attachment};
use crate::model::{MessageRef, Summary};
use crate::parser::extract_attachments;
use crate::search::{build_provider_query, AttachmentFilter};
use crate::session::{self, Connector, MailSession};

/// Run one download from start to finish.
///
/// The destination folder is created before any network activity. Fatal
/// errors (credentials, authentication, unknown mailbox, search failure)
/// abort; a message that cannot be fetched or an attachment that cannot be
/// written is logged, counted in the [`Summary`], and skipped.
///
/// `progress` receives `(processed, total)` messages.
pub fn run<C, P>(
    connector: &C,
    credentials: &P,
    params: &QueryParams,
    progress: &dyn Fn(usize, usize),
) -> Result<Summary>
where
    C: Connector,
    P: CredentialProvider + ?Sized,
{
    let destination = prepare_destination(&params.folder)?;

    let mut session = session::open(connector, credentials, &params.email)?;
    session.select(&params.inbox)?;

    let query = build_provider_query(&params.search);
    info!(query = %query, "Applying search");
    let messages = session.search(&query)?;
    info!(count = messages.len(), "Messages found");

    let summary = if messages.is_empty() {
        info!("No messages match the search, nothing to download");
        Summary::default()
    } else {
        process_messages(
            &mut *session,
            &messages,
            &destination,
            &params.filter(),
            progress,
        )
    };

    if let Err(e) = session.close() {
        warn!(error = %e, "Failed to log out cleanly");
    }
    Ok(summary)
}

/// Fetch each message in order and save the attachments that pass `filter`.
pub fn process_messages<S: MailSession + ?Sized>(
    session: &mut S,
    messages: &[MessageRef],
    destination: &Path,
    filter: &AttachmentFilter,
    progress: &dyn Fn(usize, usize),
) -> Summary {
    let total = messages.len();
    let mut summary = Summary {
        messages_found: total,
        ..Summary::default()
    };

    for (i, &message) in messages.iter().enumerate() {
        progress(i, total);
        if let Err(e) = process_message(session, message, destination, filter, &mut summary) {
            warn!(message = %message, error = %e, "Skipping message");
            summary.messages_failed += 1;
        }
    }
    progress(total, total);

    summary
}

/// Handle one message. Only fetch/parse failures are returned; write
/// failures are recorded per attachment.
fn process_message<S: MailSession + ?Sized>(
    session: &mut S,
    message: MessageRef,
    destination: &Path,
    filter: &AttachmentFilter,
    summary: &mut Summary,
) -> Result<()> {
    let raw = session.fetch(message)?;
    let parts = extract_attachments(&raw).map_err(|e| DownloadError::fetch(message, e.to_string()))?;
    debug!(message = %message, attachments = parts.len(), "Fetched message");

    for part in &parts {
        if !filter.matches(part) {
            debug!(
                filename = %part.filename,
                content_type = %part.content_type,
                "Attachment filtered out"
            );
            summary.attachments_filtered += 1;
            continue;
        }

        match save_attachment(destination, part) {
            Ok(path) => {
                info!(filename = %part.filename, path = %path.display(), "Saved attachment");
                summary.attachments_saved += 1;
                summary.bytes_written += part.size();
                summary.saved.push(path);
            }
            Err(e) => {
                warn!(filename = %part.filename, error = %e, "Failed to save attachment");
                summary.attachments_failed += 1;
            }
        }
    }
    Ok(())
}
