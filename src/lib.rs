use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub mod bootstrap;
pub mod cancel;
pub mod catalog;
pub mod discovery;
pub mod languages;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod providers;
pub mod rewrite;
pub mod settings;
pub mod sync;

pub use cancel::CancellationToken;
pub use catalog::{Catalog, Entry};
pub use pipeline::FileReport;
pub use providers::{Provider, ProviderKind, TranslationRequest};

use languages::LanguageCode;
use orchestrator::Orchestrator;
use pipeline::Pipeline;
use progress::Progress;
use settings::Settings;

pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("template not found: {}", .0.display())]
    MissingTemplate(PathBuf),
    #[error("no Language field in {} and no --source-lang given", .0.display())]
    MissingSourceLanguage(PathBuf),
    #[error("invalid language code '{0}' (expected two letters, e.g. de)")]
    InvalidLanguageCode(String),
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub directory: PathBuf,
    pub fast: bool,
    pub rewrite: bool,
    pub source_lang: Option<String>,
    pub domain: Option<String>,
    pub add_lang: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub key: Option<String>,
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub failed_files: Vec<PathBuf>,
    pub created: Option<PathBuf>,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn translated(&self) -> usize {
        self.files.iter().map(|file| file.translated).sum()
    }

    pub fn added(&self) -> usize {
        self.files.iter().map(|file| file.added).sum()
    }

    pub fn removed(&self) -> usize {
        self.files.iter().map(|file| file.removed).sum()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().map(|file| file.failed).sum()
    }

    pub fn exit_code(&self) -> u8 {
        if self.interrupted { EXIT_INTERRUPTED } else { 0 }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interrupted {
            writeln!(
                f,
                "Interrupted. Partially completed: {} translation(s) saved",
                self.translated()
            )?;
        } else {
            writeln!(f, "Complete! Translated {} string(s) total", self.translated())?;
        }
        write!(
            f,
            "files: {}, added: {}, removed: {}, failed translations: {}, failed files: {}",
            self.files.len(),
            self.added(),
            self.removed(),
            self.failed(),
            self.failed_files.len()
        )
    }
}

pub async fn run(
    config: Config,
    cancel: &CancellationToken,
    progress: &dyn Progress,
) -> Result<RunSummary> {
    let settings = settings::load_settings(config.settings_path.as_deref())?;
    let kind = ProviderKind::from_name(config.provider.as_deref().unwrap_or(&settings.provider))?;
    let model = config.model.as_deref().or(settings.model.as_deref());
    let provider = providers::build_provider(kind, config.key.as_deref(), model)?;
    info!("Using provider: {}", kind.as_str());
    run_with_provider(&config, &settings, provider, cancel, progress).await
}

pub async fn run_with_provider<P: Provider>(
    config: &Config,
    settings: &Settings,
    provider: P,
    cancel: &CancellationToken,
    progress: &dyn Progress,
) -> Result<RunSummary> {
    let domain = config
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
        .unwrap_or(&settings.domain);
    let add_lang = config
        .add_lang
        .as_deref()
        .map(LanguageCode::parse)
        .transpose()?;
    let template_path = discovery::template_path(&config.directory, domain)?;
    let destination = add_lang
        .as_ref()
        .map(|lang| discovery::po_path(&config.directory, domain, lang.as_str()));
    if let Some(destination) = &destination
        && destination.exists()
    {
        return Err(SetupError::DestinationExists(destination.clone()).into());
    }
    info!("Processing domain: {}", domain);
    info!("Template: {}", template_path.display());

    let source_lang =
        pipeline::resolve_source_language(&template_path, config.source_lang.as_deref())?;
    info!("Source language: {}", source_lang);

    let template_text = std::fs::read_to_string(&template_path)
        .with_context(|| format!("failed to read template: {}", template_path.display()))?;
    let template = Catalog::parse(&template_text);
    let delay = if config.fast {
        settings.fast_delay
    } else {
        settings.delay
    };
    let pipeline = Pipeline::new(
        &template,
        &source_lang,
        domain,
        Orchestrator::new(provider, delay),
        cancel,
        progress,
    );

    let mut summary = RunSummary::default();
    if let (Some(lang), Some(destination)) = (add_lang, destination) {
        bootstrap::create_language_file(
            &template_path,
            &destination,
            &lang,
            bootstrap::local_now(),
        )?;
        info!("Created: {}", destination.display());
        summary.files.push(pipeline.sync_file(&destination).await?);
        summary.created = Some(destination);
        summary.interrupted = cancel.is_cancelled();
        return Ok(summary);
    }

    let files = discovery::find_po_files(&config.directory, domain)?;
    if files.is_empty() {
        info!("No PO files found for domain '{}'", domain);
        return Ok(summary);
    }
    info!("Found {} PO file(s)", files.len());

    for path in files {
        if cancel.is_cancelled() {
            break;
        }
        match process_file(&pipeline, &path, config.rewrite).await {
            Ok(report) => summary.files.push(report),
            Err(err) => {
                warn!("Error processing {}: {:#}", path.display(), err);
                summary.failed_files.push(path);
            }
        }
    }
    summary.interrupted = cancel.is_cancelled();
    Ok(summary)
}

async fn process_file<P: Provider>(
    pipeline: &Pipeline<'_, P>,
    path: &Path,
    rewrite: bool,
) -> Result<FileReport> {
    if rewrite {
        pipeline.rewrite_file(path).await
    } else {
        pipeline.sync_file(path).await
    }
}
