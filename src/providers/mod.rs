use anyhow::{Result, anyhow};
use std::future::Future;
use std::pin::Pin;

mod google;
mod openai;
mod retry;

pub use google::Google;
pub use openai::OpenAI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gtranslate" => Ok(ProviderKind::Google),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(anyhow!(
                "unknown provider '{}' (expected google or openai)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

pub type ProviderFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

pub trait Provider: Clone + Send + Sync {
    fn translate(&self, request: TranslationRequest) -> ProviderFuture;
}

#[derive(Debug, Clone)]
pub enum ProviderImpl {
    Google(Google),
    OpenAI(OpenAI),
}

impl Provider for ProviderImpl {
    fn translate(&self, request: TranslationRequest) -> ProviderFuture {
        match self {
            ProviderImpl::Google(provider) => provider.translate(request),
            ProviderImpl::OpenAI(provider) => provider.translate(request),
        }
    }
}

pub fn build_provider(
    provider: ProviderKind,
    key: Option<&str>,
    model: Option<&str>,
) -> Result<ProviderImpl> {
    match provider {
        ProviderKind::Google => Ok(ProviderImpl::Google(Google::new())),
        ProviderKind::OpenAI => {
            let key = resolve_key(provider, key)?;
            let mut openai = OpenAI::new(key);
            if let Some(model) = model {
                openai = openai.with_model(model);
            }
            Ok(ProviderImpl::OpenAI(openai))
        }
    }
}

pub fn resolve_key(provider: ProviderKind, override_key: Option<&str>) -> Result<String> {
    if let Some(key) = override_key.filter(|key| !key.trim().is_empty()) {
        return Ok(key.to_string());
    }

    match provider {
        ProviderKind::Google => Some(String::new()),
        ProviderKind::OpenAI => get_env("OPENAI_API_KEY"),
    }
    .ok_or_else(|| anyhow!("API key not found for provider {}", provider.as_str()))
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!(ProviderKind::from_name("Google").expect("google"), ProviderKind::Google);
        assert_eq!(ProviderKind::from_name("openai").expect("openai"), ProviderKind::OpenAI);
        assert!(ProviderKind::from_name("deepl").is_err());
    }

    #[test]
    fn explicit_key_wins() {
        let key = resolve_key(ProviderKind::OpenAI, Some("sk-test")).expect("key");
        assert_eq!(key, "sk-test");
    }
}
