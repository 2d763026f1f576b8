//! Writing attachments into the destination folder.

pub mod attachment;

pub use attachment::{prepare_destination, save_attachment};
