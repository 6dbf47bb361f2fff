use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use super::{GenerationConfig, GenerationEngine};
use crate::chat::{ChatMessage, ChatRole};
use crate::config::AppConfig;
use crate::error::AppError;

/// OpenAI-compatible chat completions engine.
/// Works with Gemini's OpenAI endpoint, OpenRouter, Together, Groq, DeepSeek,
/// and anything else speaking the chat completions format.
pub struct OpenAiCompatEngine {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

impl OpenAiCompatEngine {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL for a well-known provider preset.
    pub fn provider_base_url(provider: &str) -> &'static str {
        match provider {
            "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai",
            "openrouter" => "https://openrouter.ai/api/v1",
            "together" => "https://api.together.xyz/v1",
            "groq" => "https://api.groq.com/openai/v1",
            "deepseek" => "https://api.deepseek.com/v1",
            "openai" => "https://api.openai.com/v1",
            _ => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let api_key = config.require_api_key()?.to_string();
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Self::provider_base_url(&config.provider).to_string());
        Ok(Self::new(api_key, base_url, config.timeout()))
    }

    fn normalize_model(&self, model: &str) -> String {
        let raw = model.trim();
        if self.base_url.contains("openrouter.ai") && raw.starts_with("gemini-") {
            format!("google/{raw}")
        } else {
            raw.to_string()
        }
    }

    fn next_request_id() -> u64 {
        NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
    }

    fn response_request_id(headers: &reqwest::header::HeaderMap) -> String {
        const CANDIDATES: [&str; 4] = ["x-request-id", "request-id", "x-correlation-id", "trace-id"];
        for key in CANDIDATES {
            if let Some(value) = headers.get(key).and_then(|v| v.to_str().ok()) {
                if !value.trim().is_empty() {
                    return value.to_string();
                }
            }
        }
        "n/a".to_string()
    }
}

/// Chat completions request body: system prompt first, then the history.
pub fn build_request_body(
    model: &str,
    system_prompt: &str,
    messages: &[ChatMessage],
    config: &GenerationConfig,
) -> Value {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    wire.push(json!({ "role": "system", "content": system_prompt }));
    for message in messages {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
        };
        wire.push(json!({ "role": role, "content": message.text }));
    }
    json!({
        "model": model,
        "messages": wire,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    })
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn parse_completion(json: &Value) -> Result<String, AppError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| AppError::Generation(format!("Response has no message content: {json}")))
}

impl GenerationEngine for OpenAiCompatEngine {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, AppError> {
        let body = build_request_body(
            &self.normalize_model(&config.model),
            system_prompt,
            messages,
            config,
        );

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Request failed: {e}")))?;
        let status = response.status();
        let upstream_request_id = Self::response_request_id(response.headers());
        let local_request_id = Self::next_request_id();
        let latency_ms = started.elapsed().as_millis();
        crate::app_log!(
            "[generation-http] provider=openai_compat request_id={} upstream_request_id={} status={} latency_ms={}",
            local_request_id, upstream_request_id, status, latency_ms
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("API error ({status}): {body}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse response: {e}")))?;

        parse_completion(&json)
    }

    fn provider_name(&self) -> &str {
        "OpenAI Compatible"
    }
}
