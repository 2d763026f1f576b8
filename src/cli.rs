//! Command-line arguments and their resolution into [`QueryParams`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Config;
use crate::error::{DownloadError, Result};
use crate::search::filter::{guess_mime_type, AttachmentFilter};

/// Multi-letter short flag kept for compatibility; rewritten to `--file-ext`.
const LEGACY_EXT_FLAG: &str = "-ext";

/// Download every attachment matching a Gmail search into a local folder.
#[derive(Parser, Debug)]
#[command(name = "gmail-attachment-dl", version, about)]
pub struct Cli {
    /// The email address used to log in and retrieve attachments
    #[arg(
        short,
        long,
        value_name = "ADDRESS",
        required_unless_present_any = ["completions", "manpage"]
    )]
    pub email: Option<String>,

    /// Name of the mailbox containing your email [default: Inbox]
    #[arg(short, long, value_name = "MAILBOX")]
    pub inbox: Option<String>,

    /// Gmail search box expression (attachments are always required)
    #[arg(short, long, value_name = "QUERY", default_value = "", hide_default_value = true)]
    pub search: String,

    /// Folder where attachments will be saved (created if missing)
    #[arg(
        short,
        long,
        value_name = "DIR",
        required_unless_present_any = ["completions", "manpage"]
    )]
    pub folder: Option<PathBuf>,

    /// Only save attachments with this file extension (also `-ext`)
    #[arg(long = "file-ext", alias = "file_ext", value_name = "EXT")]
    pub file_ext: Option<String>,

    /// Only save attachments with this MIME type (guessed from the extension by default)
    #[arg(short, long = "mime-type", alias = "mime_type", value_name = "TYPE")]
    pub mime_type: Option<String>,

    /// IMAP server host [default: imap.gmail.com]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// IMAP server port, implicit TLS [default: 993]
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Never read or store the password in the system keyring
    #[arg(long)]
    pub no_keyring: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,

    /// Print a man page and exit
    #[arg(long)]
    pub manpage: bool,
}

/// Everything a run needs, resolved from flags and config. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Account identity used to log in.
    pub email: String,
    /// Mailbox to search.
    pub inbox: String,
    /// Provider search expression (may be empty).
    pub search: String,
    /// Destination directory.
    pub folder: PathBuf,
    /// Extension filter.
    pub file_ext: Option<String>,
    /// MIME filter, explicit or guessed from `file_ext`.
    pub mime_type: Option<String>,
}

impl QueryParams {
    /// Attachment filter for these parameters.
    pub fn filter(&self) -> AttachmentFilter {
        AttachmentFilter::new(self.file_ext.as_deref(), self.mime_type.as_deref())
    }
}

impl Cli {
    /// Parse `args` after rewriting the legacy `-ext` flag.
    pub fn parse_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(args))
    }

    /// Fallible variant of [`Cli::parse_args`].
    pub fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// Resolve flags against the config into run parameters.
    ///
    /// A missing MIME type is guessed from the extension; an extension with
    /// no known mapping leaves MIME filtering off.
    pub fn resolve(&self, config: &Config) -> Result<QueryParams> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DownloadError::Usage("--email is required".to_string()))?
            .to_string();

        let folder = self
            .folder
            .clone()
            .filter(|f| !f.as_os_str().is_empty())
            .ok_or_else(|| DownloadError::Usage("--folder is required".to_string()))?;

        let inbox = self
            .inbox
            .clone()
            .unwrap_or_else(|| config.download.default_inbox.clone());

        let file_ext = non_empty(self.file_ext.as_deref());
        let mut mime_type = non_empty(self.mime_type.as_deref());

        if mime_type.is_none() {
            if let Some(ext) = &file_ext {
                mime_type = guess_mime_type(ext);
                match &mime_type {
                    Some(mime) => tracing::info!(ext = %ext, mime = %mime, "Guessed MIME type from extension"),
                    None => tracing::info!(ext = %ext, "No MIME type known for extension, MIME filter disabled"),
                }
            }
        }

        Ok(QueryParams {
            email,
            inbox,
            search: self.search.clone(),
            folder,
            file_ext,
            mime_type,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Rewrite `-ext VALUE` / `-ext=VALUE` to `--file-ext`.
///
/// Clap would otherwise read `-ext` as `-e xt`. Arguments after a bare `--`
/// are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for arg in args.into_iter().map(Into::into) {
        if passthrough {
            out.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("--") => {
                passthrough = true;
                out.push(arg);
            }
            Some(LEGACY_EXT_FLAG) => out.push(OsString::from("--file-ext")),
            Some(s) if s.starts_with("-ext=") => {
                out.push(OsString::from(format!("--file-ext={}", &s[LEGACY_EXT_FLAG.len() + 1..])));
            }
            _ => out.push(arg),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_args(std::iter::once("gmail-attachment-dl").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn test_legacy_ext_flag() {
        let cli = parse(&["-e", "me@example.com", "-f", "out", "-ext", "pdf"]);
        assert_eq!(cli.file_ext.as_deref(), Some("pdf"));
        assert_eq!(cli.email.as_deref(), Some("me@example.com"));

        let cli = parse(&["-e", "me@example.com", "-f", "out", "-ext=PDF"]);
        assert_eq!(cli.file_ext.as_deref(), Some("PDF"));
    }

    #[test]
    fn test_long_forms_and_aliases() {
        let cli = parse(&[
            "--email",
            "me@example.com",
            "--folder",
            "out",
            "--file_ext",
            "csv",
            "--mime_type",
            "text/csv",
        ]);
        assert_eq!(cli.file_ext.as_deref(), Some("csv"));
        assert_eq!(cli.mime_type.as_deref(), Some("text/csv"));
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-e", "me@example.com", "-f", "out"]);
        let params = cli.resolve(&Config::default()).unwrap();
        assert_eq!(params.inbox, "Inbox");
        assert_eq!(params.search, "");
        assert_eq!(params.file_ext, None);
        assert_eq!(params.mime_type, None);
        assert_eq!(params.filter(), AttachmentFilter::default());
    }

    #[test]
    fn test_missing_folder_is_a_usage_error() {
        let err = Cli::try_parse_args(["gmail-attachment-dl", "-e", "me@example.com"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_missing_email_is_a_usage_error() {
        let err = Cli::try_parse_args(["gmail-attachment-dl", "-f", "out"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_completions_do_not_need_required_args() {
        let cli = parse(&["--completions", "bash"]);
        assert!(cli.completions.is_some());
    }

    #[test]
    fn test_mime_guessed_from_extension() {
        let cli = parse(&["-e", "me@example.com", "-f", "out", "-ext", "pdf"]);
        let params = cli.resolve(&Config::default()).unwrap();
        assert_eq!(params.mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_explicit_mime_wins() {
        let cli = parse(&[
            "-e",
            "me@example.com",
            "-f",
            "out",
            "-ext",
            "pdf",
            "-m",
            "application/octet-stream",
        ]);
        let params = cli.resolve(&Config::default()).unwrap();
        assert_eq!(params.mime_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_unmapped_extension_leaves_mime_off() {
        let cli = parse(&["-e", "me@example.com", "-f", "out", "-ext", "zzqx"]);
        let params = cli.resolve(&Config::default()).unwrap();
        assert_eq!(params.file_ext.as_deref(), Some("zzqx"));
        assert_eq!(params.mime_type, None);
    }

    #[test]
    fn test_config_default_inbox() {
        let mut config = Config::default();
        config.download.default_inbox = "[Gmail]/All Mail".to_string();
        let cli = parse(&["-e", "me@example.com", "-f", "out"]);
        assert_eq!(cli.resolve(&config).unwrap().inbox, "[Gmail]/All Mail");

        let cli = parse(&["-e", "me@example.com", "-f", "out", "-i", "Test"]);
        assert_eq!(cli.resolve(&config).unwrap().inbox, "Test");
    }

    #[test]
    fn test_blank_email_rejected_on_resolve() {
        let cli = parse(&["-e", "  ", "-f", "out"]);
        let err = cli.resolve(&Config::default()).unwrap_err();
        assert!(matches!(err, DownloadError::Usage(_)));
    }

    #[test]
    fn test_normalize_stops_at_double_dash() {
        let args = normalize_args(["prog", "-ext", "pdf", "--", "-ext"]);
        assert_eq!(args, ["prog", "--file-ext", "pdf", "--", "-ext"]);
    }
}
