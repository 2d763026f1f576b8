//! `gmail-attachment-dl` — download every attachment matching a Gmail search.
//!
//! The crate is a thin client over IMAP: it logs in, runs a provider-side
//! search restricted to messages with attachments, and writes the attachment
//! parts that pass the extension/MIME filters into a local folder.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod processor;
pub mod search;
pub mod session;
