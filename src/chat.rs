use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::generation::{build_grounded_system_prompt, GenerationConfig, GenerationEngine};
use crate::sources::{require_sources, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A conversation pinned to a fixed set of sources.
pub struct ChatSession {
    system_prompt: String,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(sources: &[Source]) -> Result<Self, AppError> {
        require_sources(sources)?;
        Ok(Self {
            system_prompt: build_grounded_system_prompt(sources, None),
            history: Vec::new(),
        })
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Ask one question. On failure the history is left as it was.
    pub async fn ask<E: GenerationEngine>(
        &mut self,
        engine: &E,
        question: &str,
        config: &GenerationConfig,
    ) -> Result<String, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidArgument("Question must not be empty".into()));
        }

        self.history.push(ChatMessage::user(question));
        crate::app_log!(
            "[chat] ask provider={} turns={}",
            engine.provider_name(),
            self.history.len()
        );
        match engine.generate(&self.system_prompt, &self.history, config).await {
            Ok(answer) => {
                self.history.push(ChatMessage::model(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                self.history.pop();
                crate::app_log!("[chat] request failed: {e}");
                Err(e)
            }
        }
    }
}
