use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Process-wide settings, read once at start-up and handed to whatever
/// builds an outbound client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Generative-AI API key (`GEMINI_API_KEY`, falling back to `API_KEY`).
    pub api_key: Option<String>,
    /// Chat/studio provider preset (e.g. "gemini", "openai", "openrouter").
    pub provider: String,
    /// Optional OpenAI-compatible endpoint overriding the provider preset.
    pub base_url: Option<String>,
    /// Chat/studio model.
    pub model: String,
    /// Text-to-speech model.
    pub tts_model: String,
    /// Cloud request timeout seconds, clamped to 5..=180.
    pub timeout_secs: u64,
    /// Where audio overviews are written.
    pub output_dir: Option<PathBuf>,
    /// Response language for studio content.
    pub language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: DEFAULT_PROVIDER.into(),
            base_url: None,
            model: DEFAULT_MODEL.into(),
            tts_model: DEFAULT_TTS_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: None,
            language: "English".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get("GEMINI_API_KEY").or_else(|| get("API_KEY"));
        if let Some(provider) = get("NOTEBOOK_PROVIDER") {
            config.provider = provider.to_ascii_lowercase();
        }
        config.base_url = get("NOTEBOOK_BASE_URL").map(|v| v.trim_end_matches('/').to_string());
        if let Some(model) = get("NOTEBOOK_MODEL") {
            config.model = model;
        }
        if let Some(model) = get("NOTEBOOK_TTS_MODEL") {
            config.tts_model = model;
        }
        if let Some(timeout) = get("NOTEBOOK_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            config.timeout_secs = timeout.clamp(5, 180);
        }
        config.output_dir = get("NOTEBOOK_OUTPUT_DIR").map(PathBuf::from);
        if let Some(language) = get("NOTEBOOK_LANGUAGE") {
            config.language = language;
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("No API key configured (set GEMINI_API_KEY)".into()))
    }

    /// Output directory for overviews, `~/Documents/NotebookStudio/overviews` by default.
    pub fn resolve_output_dir(&self) -> Result<PathBuf, AppError> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }

        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| AppError::Config("Cannot determine home directory".into()))?;

        Ok(home
            .join("Documents")
            .join("NotebookStudio")
            .join("overviews"))
    }
}
