use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use potranslate::CancellationToken;
use potranslate::progress::{ConsoleProgress, NoProgress, Progress};
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(
    name = "potranslate",
    version,
    about = "Translate missing strings in the PO files of a directory"
)]
struct Cli {
    /// Directory holding <domain>.pot and <domain>_<lang>.po files
    directory: PathBuf,

    /// Shorter pause between translation calls
    #[arg(long = "fast")]
    fast: bool,

    /// Regenerate each PO file from the template, dropping obsolete entries
    #[arg(long = "rewrite")]
    rewrite: bool,

    /// Source language, used when the template header has no Language field
    #[arg(short = 's', long = "source-lang")]
    source_lang: Option<String>,

    /// Catalog domain (default from settings: default)
    #[arg(short = 'd', long = "domain")]
    domain: Option<String>,

    /// Create <domain>_<lang>.po from the template and translate it
    #[arg(short = 'a', long = "add-lang")]
    add_lang: Option<String>,

    /// Translation provider (google, openai)
    #[arg(short = 'p', long = "provider")]
    provider: Option<String>,

    /// Model name for LLM providers
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "settings")]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = potranslate::logging::init(cli.verbose) {
        eprintln!("failed to initialise logging: {:#}", err);
    }

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    let progress: Box<dyn Progress> = if io::stderr().is_terminal() {
        Box::new(ConsoleProgress::new())
    } else {
        Box::new(NoProgress)
    };

    let config = potranslate::Config {
        directory: cli.directory,
        fast: cli.fast,
        rewrite: cli.rewrite,
        source_lang: cli.source_lang,
        domain: cli.domain,
        add_lang: cli.add_lang,
        provider: cli.provider,
        model: cli.model,
        key: cli.key,
        settings_path: cli.settings,
    };

    match potranslate::run(config, &cancel, progress.as_ref()).await {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::from(summary.exit_code())
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Interrupt received; stopping after the current step");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!("SIGTERM handler unavailable: {}", err);
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            return;
        }
    };
    tokio::select! {
        Ok(()) = tokio::signal::ctrl_c() => {}
        Some(()) = terminate.recv() => {}
        else => std::future::pending::<()>().await,
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
