use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::SetupError;
use crate::cancel::CancellationToken;
use crate::catalog::Catalog;
use crate::catalog::header::{self, LANGUAGE};
use crate::languages;
use crate::orchestrator::{Orchestrator, TranslationOutcome};
use crate::progress::Progress;
use crate::providers::Provider;
use crate::{rewrite, sync};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub target_lang: String,
    pub added: usize,
    pub removed: usize,
    pub translated: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl FileReport {
    fn new(path: &Path, target_lang: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &TranslationOutcome) {
        self.translated = outcome.translated();
        self.failed = outcome.failed;
        self.cancelled = outcome.cancelled;
    }
}

pub struct Pipeline<'a, P: Provider> {
    template: &'a Catalog,
    source_lang: &'a str,
    domain: &'a str,
    orchestrator: Orchestrator<P>,
    cancel: &'a CancellationToken,
    progress: &'a dyn Progress,
}

impl<'a, P: Provider> Pipeline<'a, P> {
    pub fn new(
        template: &'a Catalog,
        source_lang: &'a str,
        domain: &'a str,
        orchestrator: Orchestrator<P>,
        cancel: &'a CancellationToken,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            template,
            source_lang,
            domain,
            orchestrator,
            cancel,
            progress,
        }
    }

    pub async fn sync_file(&self, path: &Path) -> Result<FileReport> {
        let text = read_catalog(path)?;
        let target = Catalog::parse(&text);
        let target_lang = self.target_language(path, &target)?;
        let mut report = FileReport::new(path, &target_lang);
        info!("Processing {} (target: {})", display_name(path), target_lang);

        let plan = sync::plan(self.template, &target);
        if plan.is_empty() {
            debug!("{} is up to date", display_name(path));
            return Ok(report);
        }
        report.added = plan.to_add.len();
        if report.added > 0 {
            info!("Added {} missing entries from the template", report.added);
        }

        let outcome = self.translate(path, &plan.to_translate, &target_lang).await;
        report.record(&outcome);

        let patched = sync::append_entries(&text, &plan.to_add);
        let patched = sync::apply_translations(&patched, &outcome.translations);
        if patched != text {
            write_atomic(path, &patched)?;
        }
        info!("Translated {} string(s)", report.translated);
        Ok(report)
    }

    pub async fn rewrite_file(&self, path: &Path) -> Result<FileReport> {
        let text = read_catalog(path)?;
        let target = Catalog::parse(&text);
        let target_lang = self.target_language(path, &target)?;
        let mut report = FileReport::new(path, &target_lang);
        info!(
            "Rewriting {} (target: {})",
            display_name(path),
            target_lang
        );

        let plan = rewrite::plan(self.template, &text);
        report.added = self
            .template
            .entries()
            .iter()
            .filter(|entry| plan.existing_translation(&entry.key).is_none())
            .count();
        report.removed = plan.removed;

        let outcome = self.translate(path, &plan.to_translate, &target_lang).await;
        report.record(&outcome);

        let rendered = rewrite::render(self.template, &plan, &outcome.translations);
        if rendered != text {
            write_atomic(path, &rendered)?;
        }
        if report.removed > 0 {
            info!("Removed {} obsolete entries", report.removed);
        }
        info!("Translated {} string(s)", report.translated);
        Ok(report)
    }

    fn target_language(&self, path: &Path, target: &Catalog) -> Result<String> {
        languages::target_language(path, self.domain, target).ok_or_else(|| {
            anyhow!(
                "could not determine target language for {}",
                path.display()
            )
        })
    }

    async fn translate(&self, path: &Path, keys: &[String], target_lang: &str) -> TranslationOutcome {
        if keys.is_empty() {
            return TranslationOutcome::default();
        }
        self.progress.start(&display_name(path), keys.len());
        let outcome = self
            .orchestrator
            .translate_all(keys, self.source_lang, target_lang, self.cancel, self.progress)
            .await;
        self.progress.finish();
        outcome
    }
}

pub fn resolve_source_language(template_path: &Path, requested: Option<&str>) -> Result<String> {
    let text = read_catalog(template_path)?;
    let template = Catalog::parse(&text);
    let requested = requested.map(str::trim).filter(|lang| !lang.is_empty());

    match (template.language(), requested) {
        (Some(found), Some(requested)) if !found.eq_ignore_ascii_case(requested) => {
            warn!(
                "Using source language from the template ({}) instead of --source-lang ({})",
                found, requested
            );
            Ok(found.to_string())
        }
        (Some(found), _) => Ok(found.to_string()),
        (None, Some(requested)) => {
            match header::rewrite_fields(&text, &[(LANGUAGE, requested.to_string())], true) {
                Some(updated) => {
                    write_atomic(template_path, &updated)?;
                    info!("Updated template with source language: {}", requested);
                }
                None => warn!(
                    "{} has no header; source language not recorded",
                    template_path.display()
                ),
            }
            Ok(requested.to_string())
        }
        (None, None) => Err(SetupError::MissingSourceLanguage(template_path.to_path_buf()).into()),
    }
}

fn read_catalog(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;
    if let Ok(meta) = fs::metadata(path) {
        let _ = fs::set_permissions(file.path(), meta.permissions());
    }
    file.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
