//! Attachment parts extracted from a fetched message.
//!
//! Parts only live while their message is being processed; the payload is
//! written to disk and dropped before the next message is fetched.

/// A named, typed payload embedded in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    /// Filename as declared in the MIME headers (`filename=` or `name=`).
    pub filename: String,

    /// Declared MIME content type, lowercased (e.g. `"application/pdf"`).
    pub content_type: String,

    /// Decoded payload (transfer encoding already removed).
    pub data: Vec<u8>,
}

impl AttachmentPart {
    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
