//! Core data model: message references, attachment parts, and the run summary.

pub mod attachment;
pub mod mail;

pub use attachment::AttachmentPart;
pub use mail::{MessageRef, Summary};
