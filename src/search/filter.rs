//! Extension and MIME filters applied to each attachment part.

use crate::model::AttachmentPart;

/// Which attachments to keep.
///
/// Both filters are optional; an unset filter accepts everything. When both
/// are set an attachment must pass both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentFilter {
    /// Lowercased extension without the leading dot.
    extension: Option<String>,
    /// Lowercased MIME type.
    mime_type: Option<String>,
}

impl AttachmentFilter {
    /// Build a filter. A leading dot on the extension is ignored, and empty
    /// strings are treated as "no filter".
    pub fn new(extension: Option<&str>, mime_type: Option<&str>) -> Self {
        let extension = extension
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty());
        let mime_type = mime_type
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());
        Self {
            extension,
            mime_type,
        }
    }

    /// The extension filter, if any.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// The MIME filter, if any.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// `true` if the filename ends with `.<extension>`, ignoring case.
    pub fn matches_extension(&self, filename: &str) -> bool {
        match &self.extension {
            None => true,
            Some(ext) => filename
                .to_lowercase()
                .rsplit_once('.')
                .is_some_and(|(_, suffix)| suffix == ext),
        }
    }

    /// `true` if the declared type equals the MIME filter (ASCII case-insensitive).
    pub fn matches_mime(&self, content_type: &str) -> bool {
        match &self.mime_type {
            None => true,
            Some(mime) => content_type.trim().eq_ignore_ascii_case(mime),
        }
    }

    /// `true` if the attachment passes every configured filter.
    pub fn matches(&self, part: &AttachmentPart) -> bool {
        self.matches_extension(&part.filename) && self.matches_mime(&part.content_type)
    }
}

/// Best-guess MIME type for a bare extension (`"pdf"` or `".pdf"`).
pub fn guess_mime_type(extension: &str) -> Option<String> {
    let ext = extension.trim().trim_start_matches('.');
    if ext.is_empty() {
        return None;
    }
    mime_guess::from_ext(ext)
        .first()
        .map(|m| m.essence_str().to_string())
}
