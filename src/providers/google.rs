use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::retry::{Backoff, is_rate_limited, retry_after};
use super::{Provider, ProviderFuture, TranslationRequest};

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

#[derive(Debug, Clone, Default)]
pub struct Google {
    client: reqwest::Client,
}

impl Google {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Provider for Google {
    fn translate(&self, request: TranslationRequest) -> ProviderFuture {
        let client = self.client.clone();
        Box::pin(async move { call_translate(client, request).await })
    }
}

fn base_url() -> String {
    std::env::var("GOOGLE_TRANSLATE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

async fn call_translate(client: reqwest::Client, request: TranslationRequest) -> Result<String> {
    let url = format!("{}/translate_a/single", base_url());
    let query = [
        ("client", "gtx"),
        ("sl", request.source_lang.as_str()),
        ("tl", request.target_lang.as_str()),
        ("dt", "t"),
        ("q", request.text.as_str()),
    ];

    let mut backoff = Backoff::new("Google");
    loop {
        let response = client.get(&url).query(&query).send().await?;

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            return extract_translation(&text);
        }
        if is_rate_limited(status, &text) && backoff.wait(retry_after).await {
            continue;
        }
        return Err(anyhow!("Google Translate error ({}): {}", status, text.trim()));
    }
}

fn extract_translation(text: &str) -> Result<String> {
    let payload: Value =
        serde_json::from_str(text).with_context(|| "failed to parse Google Translate response")?;
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("no translation segments in Google Translate response"))?;

    let translation: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if translation.is_empty() {
        return Err(anyhow!("Google Translate returned an empty translation"));
    }
    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_translated_segments() {
        let payload = r#"[[["Hola. ","Hello. ",null,null,10],["¿Cómo estás?","How are you?",null,null,10]],null,"en"]"#;
        assert_eq!(
            extract_translation(payload).expect("translation"),
            "Hola. ¿Cómo estás?"
        );
    }

    #[test]
    fn rejects_unexpected_payloads() {
        assert!(extract_translation("{}").is_err());
        assert!(extract_translation("[[]]").is_err());
        assert!(extract_translation("not json").is_err());
    }
}
