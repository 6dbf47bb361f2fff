pub mod gemini_tts;

use serde::{Deserialize, Serialize};

use crate::audio::PcmFormat;
use crate::config::AppConfig;
use crate::error::AppError;

/// Maps a speaker label in the script to a prebuilt voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerVoice {
    pub speaker: String,
    pub voice: String,
}

impl SpeakerVoice {
    pub fn new(speaker: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            voice: voice.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub model: String,
    pub voices: Vec<SpeakerVoice>,
}

impl SpeechConfig {
    /// Two-host setup matching the audio-script prompt.
    pub fn two_hosts(config: &AppConfig) -> Self {
        Self {
            model: config.tts_model.clone(),
            voices: vec![
                SpeakerVoice::new("Host A", "Kore"),
                SpeakerVoice::new("Host B", "Puck"),
            ],
        }
    }
}

/// Raw synthesized speech plus the parameters needed to play it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    pub format: PcmFormat,
}

/// Trait for text-to-speech backends that return raw 16-bit PCM.
#[allow(async_fn_in_trait)]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, script: &str, config: &SpeechConfig) -> Result<SpeechAudio, AppError>;
    fn provider_name(&self) -> &str;
}
