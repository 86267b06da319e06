use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;

use super::retry::{Backoff, is_rate_limited, retry_after};
use super::{Provider, ProviderFuture, TranslationRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TOOL_NAME: &str = "deliver_translation";

#[derive(Debug, Clone)]
pub struct OpenAI {
    key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAI {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }
}

impl Provider for OpenAI {
    fn translate(&self, request: TranslationRequest) -> ProviderFuture {
        let provider = self.clone();
        Box::pin(async move { call_with_chat_completions(provider, request).await })
    }
}

fn base_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn system_prompt(request: &TranslationRequest) -> String {
    format!(
        "You translate user interface strings from a gettext catalog. \
         Translate the user's message from '{}' to '{}'. \
         Keep placeholders (%s, %d, {{name}}), markup, leading and trailing whitespace \
         and line breaks exactly as they are. \
         Reply only by calling {} with the translation.",
        request.source_lang, request.target_lang, TOOL_NAME
    )
}

async fn call_with_chat_completions(
    provider: OpenAI,
    request: TranslationRequest,
) -> Result<String> {
    let url = format!("{}/chat/completions", base_url());
    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "system", "content": system_prompt(&request)},
            {"role": "user", "content": request.text}
        ],
        "tools": [
            {
                "type": "function",
                "function": {
                    "name": TOOL_NAME,
                    "description": "Return the translated text.",
                    "parameters": {
                        "type": "object",
                        "properties": {"translation": {"type": "string"}},
                        "required": ["translation"]
                    }
                }
            }
        ],
        "tool_choice": {"type": "function", "function": {"name": TOOL_NAME}}
    });

    let mut backoff = Backoff::new("OpenAI");
    loop {
        let response = provider
            .client
            .post(&url)
            .bearer_auth(&provider.key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            return extract_translation(&text, TOOL_NAME);
        }
        if is_rate_limited(status, &text) && backoff.wait(retry_after).await {
            continue;
        }
        return Err(anyhow!(
            "OpenAI API error ({}): {}",
            status,
            extract_openai_error(&text).unwrap_or(text)
        ));
    }
}

fn extract_translation(text: &str, tool_name: &str) -> Result<String> {
    let payload: OpenAIResponse =
        serde_json::from_str(text).with_context(|| "failed to parse OpenAI response JSON")?;
    let tool_call = payload
        .choices
        .first()
        .and_then(|choice| choice.message.tool_calls.first())
        .ok_or_else(|| anyhow!("no tool call returned from OpenAI"))?;

    if tool_call.function.name != tool_name {
        return Err(anyhow!(
            "unexpected tool name '{}' from OpenAI",
            tool_call.function.name
        ));
    }

    let args: ToolArgs = serde_json::from_str(&tool_call.function.arguments)
        .with_context(|| "failed to parse OpenAI tool arguments")?;
    if args.translation.trim().is_empty() {
        return Err(anyhow!("OpenAI returned an empty translation"));
    }
    Ok(args.translation)
}

fn extract_openai_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<OpenAIError>,
    }

    #[derive(Deserialize)]
    struct OpenAIError {
        message: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        code: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let parts: Vec<String> = [
        error.message,
        error.kind.map(|kind| format!("type: {}", kind)),
        error.code.map(|code| format!("code: {}", code)),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect();
    if parts.is_empty() {
        Some("unknown error".to_string())
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct ToolArgs {
    translation: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}
