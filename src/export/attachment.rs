//! Save attachment payloads to disk.
//!
//! Collision policy: never overwrite. When `name.ext` is taken the file is
//! written as `name_1.ext`, `name_2.ext`, ... using the first free name.
//! Files are opened with `create_new`, so a file that appears between the
//! check and the write is not clobbered either.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};
use crate::model::AttachmentPart;

/// Stem used when the declared filename is unusable.
const FALLBACK_STEM: &str = "attachment";

/// Longest filename (in bytes) written to disk; longer names keep their
/// extension and lose the tail of the stem.
const MAX_FILENAME_LEN: usize = 200;

/// Give up after this many `_N` candidates.
const MAX_COLLISIONS: usize = 10_000;

/// Create the destination folder (and parents) if needed.
///
/// Runs before any network activity: if nothing can be written there is no
/// point in logging in.
pub fn prepare_destination(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DownloadError::destination(dir, e))?;

    let meta = std::fs::metadata(dir).map_err(|e| DownloadError::destination(dir, e))?;
    if !meta.is_dir() {
        return Err(DownloadError::destination(
            dir,
            std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    tracing::debug!(path = %dir.display(), "Destination folder ready");
    Ok(dir.to_path_buf())
}

/// Write one attachment into `dir` and return the path actually used.
pub fn save_attachment(dir: &Path, part: &AttachmentPart) -> Result<PathBuf> {
    let filename = sanitize_filename(&part.filename)
        .unwrap_or_else(|| fallback_filename(&part.content_type));

    for candidate in candidate_names(&filename).take(MAX_COLLISIONS) {
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                write_payload(file, &path, &part.data)?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(DownloadError::write(&path, e)),
        }
    }

    Err(DownloadError::write(
        dir.join(&filename),
        std::io::Error::new(ErrorKind::AlreadyExists, "no free filename left"),
    ))
}

/// Write `data` into the freshly created `path`, removing it again if the
/// write fails so no truncated file is left behind.
fn write_payload(mut file: impl Write, path: &Path, data: &[u8]) -> Result<()> {
    let written = file.write_all(data).and_then(|()| file.flush());
    drop(file);

    if let Err(e) = written {
        if let Err(rm) = std::fs::remove_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %rm,
                "Failed to remove partially written file"
            );
        }
        return Err(DownloadError::write(path, e));
    }
    Ok(())
}

/// Make a declared filename safe to join onto the destination folder.
///
/// Path separators, control characters and `<>:"|?*` become `_`; everything
/// else is kept verbatim. Returns `None` if nothing usable is left (empty or
/// dots only).
pub fn sanitize_filename(name: &str) -> Option<String> {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        return None;
    }
    Some(truncate_filename(&sanitized, MAX_FILENAME_LEN))
}

/// `attachment.<ext>` with the extension guessed from the MIME type.
fn fallback_filename(content_type: &str) -> String {
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!("{FALLBACK_STEM}.{ext}"))
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

/// `name.ext`, then `name_1.ext`, `name_2.ext`, ...
fn candidate_names(filename: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, ext) = split_extension(filename);
    std::iter::once(filename.to_string()).chain((1..).map(move |i| match ext {
        Some(ext) => format!("{stem}_{i}.{ext}"),
        None => format!("{stem}_{i}"),
    }))
}

/// Split at the last dot, treating a leading dot as part of the stem.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < filename.len() => {
            (&filename[..pos], Some(&filename[pos + 1..]))
        }
        _ => (filename, None),
    }
}

/// Cut the stem so the whole name fits in `max_len` bytes, keeping the extension.
fn truncate_filename(filename: &str, max_len: usize) -> String {
    if filename.len() <= max_len {
        return filename.to_string();
    }
    let (stem, ext) = split_extension(filename);
    let reserved = ext.map_or(0, |e| e.len() + 1);
    let budget = max_len.saturating_sub(reserved);

    let mut cut = budget.min(stem.len());
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    match ext {
        Some(ext) if reserved < max_len => format!("{}.{ext}", &stem[..cut]),
        _ => {
            let mut cut = max_len;
            while !filename.is_char_boundary(cut) {
                cut -= 1;
            }
            filename[..cut].to_string()
        }
    }
}
