use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use base64::Engine as _;
use serde_json::{json, Value};

use super::{SpeechAudio, SpeechConfig, SpeechEngine};
use crate::audio::PcmFormat;
use crate::config::AppConfig;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini text-to-speech via `generateContent` with an AUDIO response modality.
/// Audio comes back as base64 PCM in an `inlineData` part.
pub struct GeminiTtsEngine {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

impl GeminiTtsEngine {
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key,
            base_url,
            client,
        }
    }

    /// The OpenAI-compatible `NOTEBOOK_BASE_URL` does not apply here.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(api_key, None, config.timeout()))
    }

    fn next_request_id() -> u64 {
        NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
    }
}

fn voice_config(voice: &str) -> Value {
    json!({ "prebuiltVoiceConfig": { "voiceName": voice } })
}

pub fn build_request_body(script: &str, config: &SpeechConfig) -> Value {
    let speech_config = match config.voices.as_slice() {
        [] => json!({}),
        [single] => json!({ "voiceConfig": voice_config(&single.voice) }),
        voices => {
            let speakers: Vec<Value> = voices
                .iter()
                .map(|v| json!({ "speaker": v.speaker, "voiceConfig": voice_config(&v.voice) }))
                .collect();
            json!({ "multiSpeakerVoiceConfig": { "speakerVoiceConfigs": speakers } })
        }
    };

    json!({
        "contents": [{ "parts": [{ "text": script }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": speech_config,
        }
    })
}

/// Find the first inline audio part and decode it.
pub fn parse_audio_response(json: &Value) -> Result<SpeechAudio, AppError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AppError::Synthesis("Response has no content parts".into()))?;

    let inline = parts
        .iter()
        .map(|part| &part["inlineData"])
        .find(|inline| inline["data"].is_string())
        .ok_or_else(|| AppError::Synthesis("Response has no inline audio data".into()))?;

    let mime = inline["mimeType"].as_str().unwrap_or("audio/L16");
    let format = PcmFormat::from_mime(mime)?;
    let data = inline["data"].as_str().unwrap_or_default();
    let pcm = base64::engine::general_purpose::STANDARD.decode(data)?;

    Ok(SpeechAudio { pcm, format })
}

impl SpeechEngine for GeminiTtsEngine {
    async fn synthesize(&self, script: &str, config: &SpeechConfig) -> Result<SpeechAudio, AppError> {
        if script.trim().is_empty() {
            return Err(AppError::InvalidArgument("Speech script must not be empty".into()));
        }
        let body = build_request_body(script, config);

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, config.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Synthesis(format!("TTS request failed: {e}")))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to read response: {e}")))?;
        let latency_ms = started.elapsed().as_millis();
        let local_request_id = Self::next_request_id();
        crate::app_log!(
            "[tts-http] provider=gemini request_id={} status={} latency_ms={} bytes={}",
            local_request_id,
            status,
            latency_ms,
            body_text.len()
        );

        if !status.is_success() {
            return Err(AppError::Synthesis(format!(
                "Gemini TTS API error ({status}): {body_text}"
            )));
        }

        let json: Value = serde_json::from_str(&body_text)?;
        parse_audio_response(&json)
    }

    fn provider_name(&self) -> &str {
        "Gemini TTS"
    }
}
