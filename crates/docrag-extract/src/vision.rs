//! Image-to-text through an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use anyhow::{anyhow, Context};
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use docrag_core::config::Settings;
use docrag_core::traits::VisionDescriber;
use docrag_core::ExtractError;

pub struct OpenAiVision {
    client: Client,
    endpoint: String,
    model: String,
    prompt: String,
}

impl OpenAiVision {
    pub fn new(api_key: &str, base_url: &str, model: &str, prompt: &str, timeout: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth).context("invalid OpenAI API key")?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build vision HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            prompt: prompt.to_string(),
        })
    }
}

/// `data:` URL carrying `image` inline.
pub fn data_url(image: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);
    format!("data:{mime_type};base64,{encoded}")
}

impl VisionDescriber for OpenAiVision {
    fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractError> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": self.prompt },
                    { "type": "image_url", "image_url": { "url": data_url(image, mime_type) } }
                ]
            }]
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| ExtractError::Vision(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ExtractError::Vision(format!("vision request failed ({status}): {text}")));
        }
        let parsed: ChatResponse = resp.json().map_err(|e| ExtractError::Vision(format!("bad vision response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ExtractError::Vision("vision response had no content".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Rejects every image; images then contribute no text.
pub struct DisabledVision;

impl VisionDescriber for DisabledVision {
    fn describe(&self, _image: &[u8], _mime_type: &str) -> Result<String, ExtractError> {
        Err(ExtractError::Vision("image description disabled".to_string()))
    }
}

/// `DisabledVision` under `APP_USE_FAKE_EMBEDDINGS`, otherwise the hosted
/// model sharing the embedding service's endpoint and key.
pub fn get_default_vision(settings: &Settings) -> anyhow::Result<Box<dyn VisionDescriber>> {
    let offline = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if offline {
        info!("image description disabled in offline mode");
        return Ok(Box::new(DisabledVision));
    }
    let emb = &settings.embedding;
    let api_key = std::env::var(&emb.api_key_env).map_err(|_| anyhow!("{} not found in environment", emb.api_key_env))?;
    let vision = OpenAiVision::new(
        &api_key,
        &emb.base_url,
        &settings.vision.model,
        &settings.vision.prompt,
        Duration::from_secs(emb.timeout_secs),
    )?;
    Ok(Box::new(vision))
}
