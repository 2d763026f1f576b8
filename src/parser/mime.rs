//! MIME message parsing: walk a fetched message and pull out its attachment parts.

use mail_parser::{ContentType, Message, MessageParser, MessagePart, MimeHeaders};

use crate::model::AttachmentPart;

/// Content type assumed when a part declares none (RFC 2045 §5.2 default for
/// non-text parts).
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// How many levels of forwarded messages are searched for attachments.
pub const MAX_DEPTH: usize = 10;

/// Reasons a raw message yields no attachment list.
#[derive(Debug, thiserror::Error)]
pub enum MimeError {
    /// The message was empty.
    #[error("empty message")]
    Empty,

    /// `mail-parser` could not make sense of the bytes.
    #[error("malformed MIME message")]
    Malformed,
}

/// Parse a complete raw message (headers + body) and return every attachment part.
///
/// A part counts as an attachment when it is a leaf (not multipart) and
/// declares a filename, either through `Content-Disposition: ...; filename=`
/// or `Content-Type: ...; name=`. Forwarded `message/rfc822` parts are
/// searched too, up to [`MAX_DEPTH`] levels. Payloads are returned decoded.
pub fn extract_attachments(raw_message: &[u8]) -> Result<Vec<AttachmentPart>, MimeError> {
    if raw_message.iter().all(u8::is_ascii_whitespace) {
        return Err(MimeError::Empty);
    }

    let parser = MessageParser::default();
    let msg = parser.parse(raw_message).ok_or(MimeError::Malformed)?;

    let mut result = Vec::new();
    collect_attachments(&msg, 0, &mut result);
    Ok(result)
}

fn collect_attachments(msg: &Message<'_>, depth: usize, out: &mut Vec<AttachmentPart>) {
    for part in msg.attachments() {
        let filename = part.attachment_name().filter(|n| !n.trim().is_empty());

        if let Some(nested) = part.message() {
            if depth + 1 < MAX_DEPTH {
                collect_attachments(nested, depth + 1, out);
            } else {
                tracing::warn!(depth, "Nested message too deep, not searched");
            }
        }

        let Some(filename) = filename else {
            if !part.is_message() {
                tracing::debug!("Skipping unnamed attachment part");
            }
            continue;
        };

        out.push(AttachmentPart {
            filename: filename.to_string(),
            content_type: content_type_of(part),
            data: part.contents().to_vec(),
        });
    }
}

fn content_type_of(part: &MessagePart<'_>) -> String {
    part.content_type()
        .map(|ct: &ContentType| match ct.subtype() {
            Some(sub) => format!("{}/{sub}", ct.ctype()),
            None => ct.ctype().to_string(),
        })
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
