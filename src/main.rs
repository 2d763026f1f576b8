//! CLI entry point for `gmail-attachment-dl`.

use clap::CommandFactory;
use indicatif::{ProgressBar, ProgressStyle};

use gmail_attachment_dl::cli::Cli;
use gmail_attachment_dl::config::{self, Config};
use gmail_attachment_dl::credentials::{CredentialProvider, KeyringCredentials, PromptCredentials};
use gmail_attachment_dl::model::Summary;
use gmail_attachment_dl::processor;
use gmail_attachment_dl::session::imap::ImapConnector;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args(std::env::args_os());

    if let Some(shell) = cli.completions {
        return cmd_completions(shell);
    }
    if cli.manpage {
        return cmd_manpage();
    }

    let (config, config_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    setup_logging(config.effective_log_level(cli.verbose), &config);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Ignoring config file, using defaults");
    }

    tracing::info!(
        arguments = ?std::env::args().skip(1).collect::<Vec<_>>(),
        "Started"
    );

    let params = cli.resolve(&config)?;

    let connector = ImapConnector::new(
        cli.host.clone().unwrap_or_else(|| config.server.host.clone()),
        cli.port.unwrap_or(config.server.port),
    );

    let prompt = PromptCredentials;
    let keyring;
    let credentials: &dyn CredentialProvider = if config.credentials.use_keyring && !cli.no_keyring {
        keyring = KeyringCredentials::new(config.credentials.keyring_service.clone(), prompt.clone());
        &keyring
    } else {
        &prompt
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Downloading [{bar:40.cyan/blue}] {pos}/{len} messages")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let summary = processor::run(&connector, credentials, &params, &|current, total| {
        pb.set_length(total as u64);
        pb.set_position(current as u64);
    })?;

    pb.finish_and_clear();
    print_summary(&summary, &params.folder);

    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::log_file_name());
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "gmail-attachment-dl", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn print_summary(summary: &Summary, folder: &std::path::Path) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<25} {}", "Messages found", summary.messages_found);
    if summary.messages_failed > 0 {
        println!("  {:<25} {}", "Messages skipped", summary.messages_failed);
    }
    println!(
        "  {:<25} {} ({})",
        "Attachments saved",
        summary.attachments_saved,
        format_size(summary.bytes_written, BINARY)
    );
    if summary.attachments_filtered > 0 {
        println!("  {:<25} {}", "Filtered out", summary.attachments_filtered);
    }
    if summary.attachments_failed > 0 {
        println!("  {:<25} {}", "Failed to save", summary.attachments_failed);
    }
    println!("  {:<25} {}", "Destination", folder.display());
    println!();
}
