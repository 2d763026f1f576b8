//! Email parsing: attachment extraction from raw RFC 5322 messages.

pub mod mime;

pub use mime::extract_attachments;
