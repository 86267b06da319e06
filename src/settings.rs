use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub delay: Duration,
    pub fast_delay: Duration,
    pub domain: String,
    pub provider: String,
    pub model: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            fast_delay: Duration::from_millis(100),
            domain: "default".to_string(),
            provider: "google".to_string(),
            model: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    translate: Option<TranslateSettings>,
    provider: Option<ProviderSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TranslateSettings {
    delay_ms: Option<u64>,
    fast_delay_ms: Option<u64>,
    domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderSettings {
    name: Option<String>,
    model: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    settings.merge_str(DEFAULT_SETTINGS_TOML, Path::new("<built-in settings.toml>"))?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.is_file() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings.merge_str(&content, &path)?;
        }
    }
    Ok(settings)
}

impl Settings {
    fn merge_str(&mut self, content: &str, origin: &Path) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)
            .with_context(|| format!("failed to parse settings: {}", origin.display()))?;
        self.merge(parsed);
        Ok(())
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(translate) = incoming.translate {
            if let Some(ms) = translate.delay_ms {
                self.delay = Duration::from_millis(ms);
            }
            if let Some(ms) = translate.fast_delay_ms {
                self.fast_delay = Duration::from_millis(ms);
            }
            if let Some(domain) = translate.domain
                && !domain.trim().is_empty()
            {
                self.domain = domain.trim().to_string();
            }
        }
        if let Some(provider) = incoming.provider {
            if let Some(name) = provider.name
                && !name.trim().is_empty()
            {
                self.provider = name.trim().to_string();
            }
            if let Some(model) = provider.model
                && !model.trim().is_empty()
            {
                self.model = Some(model.trim().to_string());
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".potranslate"))
        }
    })
}
