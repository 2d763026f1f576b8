//! Provider search query construction.
//!
//! The query language belongs to the mail provider (Gmail search syntax such
//! as `is:unread` or `from:bank`). It is never parsed or validated here: the
//! user's expression is appended to the attachment predicate verbatim and
//! sent as one opaque string.

/// Predicate that restricts the provider search to messages with attachments.
pub const ATTACHMENT_PREDICATE: &str = "has:attachment";

/// Build the provider query for a user search expression.
///
/// An empty (or all-whitespace) expression yields just [`ATTACHMENT_PREDICATE`].
pub fn build_provider_query(expression: &str) -> String {
    let expression = expression.trim();
    if expression.is_empty() {
        ATTACHMENT_PREDICATE.to_string()
    } else {
        format!("{ATTACHMENT_PREDICATE} {expression}")
    }
}

/// Quote a string as an IMAP quoted string (RFC 3501 `quoted`).
///
/// Backslashes and double quotes are escaped. CR and LF cannot appear in a
/// quoted string, so they are replaced with spaces.
pub fn imap_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
