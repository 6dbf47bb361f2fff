use std::sync::Mutex;

use crate::audio::PcmFormat;
use crate::chat::ChatMessage;
use crate::error::AppError;
use crate::generation::{GenerationConfig, GenerationEngine};
use crate::speech::{SpeechAudio, SpeechConfig, SpeechEngine};

/// Records the system prompts it sees and replies with a canned result.
pub struct FakeEngine {
    reply: Result<String, String>,
    pub seen_system: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            seen_system: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            seen_system: Mutex::new(Vec::new()),
        }
    }
}

impl GenerationEngine for FakeEngine {
    async fn generate(
        &self,
        system_prompt: &str,
        _messages: &[ChatMessage],
        _config: &GenerationConfig,
    ) -> Result<String, AppError> {
        self.seen_system.lock().unwrap().push(system_prompt.to_string());
        self.reply.clone().map_err(AppError::Generation)
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

pub struct FakeSpeech {
    pcm: Vec<u8>,
    format: PcmFormat,
    pub scripts: Mutex<Vec<String>>,
}

impl FakeSpeech {
    pub fn returning(pcm: Vec<u8>, format: PcmFormat) -> Self {
        Self {
            pcm,
            format,
            scripts: Mutex::new(Vec::new()),
        }
    }
}

impl SpeechEngine for FakeSpeech {
    async fn synthesize(&self, script: &str, _config: &SpeechConfig) -> Result<SpeechAudio, AppError> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(SpeechAudio {
            pcm: self.pcm.clone(),
            format: self.format,
        })
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}
