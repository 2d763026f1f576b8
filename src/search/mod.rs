//! Search: the provider query sent to the server and the local attachment filter.

pub mod filter;
pub mod query;

pub use filter::AttachmentFilter;
pub use query::{build_provider_query, ATTACHMENT_PREDICATE};
