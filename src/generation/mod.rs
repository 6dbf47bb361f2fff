pub mod openai_compat;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::sources::{build_source_context, require_sources, Source, DEFAULT_MAX_CHARS_PER_SOURCE};

/// Artifacts the studio panel can generate from the notebook's sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioContentKind {
    Summary,
    Flashcards,
    Quiz,
    MindMap,
    AudioScript,
}

impl fmt::Display for StudioContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StudioContentKind::Summary => "summary",
            StudioContentKind::Flashcards => "flashcards",
            StudioContentKind::Quiz => "quiz",
            StudioContentKind::MindMap => "mind-map",
            StudioContentKind::AudioScript => "audio-script",
        };
        f.write_str(label)
    }
}

impl FromStr for StudioContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "summary" => Ok(StudioContentKind::Summary),
            "flashcards" => Ok(StudioContentKind::Flashcards),
            "quiz" => Ok(StudioContentKind::Quiz),
            "mind-map" | "mindmap" => Ok(StudioContentKind::MindMap),
            "audio-script" => Ok(StudioContentKind::AudioScript),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown studio content kind: {other}"
            ))),
        }
    }
}

/// Per-request model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub language: String,
}

impl GenerationConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: 0.4,
            max_tokens: 8192,
            language: config.language.clone(),
        }
    }
}

/// Trait for chat-style LLM backends.
#[allow(async_fn_in_trait)]
pub trait GenerationEngine: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, AppError>;
    fn provider_name(&self) -> &str;
}

const GROUNDING_PREAMBLE: &str = "You are a study assistant for a notebook of user-provided sources. \
Answer only from the sources below. If they do not contain the answer, say so plainly. \
Cite sources by their number, e.g. [1].";

/// System prompt that pins the model to the given sources.
pub fn build_grounded_system_prompt(sources: &[Source], instruction: Option<&str>) -> String {
    let mut prompt = String::from(GROUNDING_PREAMBLE);
    prompt.push_str("\n\n=== SOURCES ===\n");
    prompt.push_str(&build_source_context(sources, DEFAULT_MAX_CHARS_PER_SOURCE));
    prompt.push_str("=== END SOURCES ===");
    if let Some(instruction) = instruction {
        prompt.push_str("\n\n");
        prompt.push_str(instruction);
    }
    prompt
}

/// Instruction template for one studio artifact.
pub fn build_studio_prompt(kind: StudioContentKind, language: &str) -> String {
    match kind {
        StudioContentKind::Summary => format!(
            "Write a concise study summary of the sources in {language}. \
             Start with a one-paragraph overview, then list the key points as bullets."
        ),
        StudioContentKind::Flashcards => format!(
            "Create 10 flashcards in {language} covering the most important facts. \
             Respond with a JSON array only, each item {{\"front\": string, \"back\": string}}."
        ),
        StudioContentKind::Quiz => format!(
            "Create a 5-question multiple-choice quiz in {language}. \
             Respond with a JSON array only, each item \
             {{\"question\": string, \"options\": [string], \"answer_index\": number, \"explanation\": string}}."
        ),
        StudioContentKind::MindMap => format!(
            "Build a mind map of the sources in {language} as a nested Markdown bullet outline. \
             The first line is the central topic as a level-1 heading. Return only the outline."
        ),
        StudioContentKind::AudioScript => format!(
            "Write a lively podcast-style conversation in {language} between two hosts discussing the sources. \
             Every line must start with \"Host A:\" or \"Host B:\". \
             Keep it under 800 words. No stage directions, no headings."
        ),
    }
}

/// Generate one studio artifact grounded in `sources`.
pub async fn generate_studio_content<E: GenerationEngine>(
    engine: &E,
    sources: &[Source],
    kind: StudioContentKind,
    config: &GenerationConfig,
) -> Result<String, AppError> {
    require_sources(sources)?;
    let instruction = build_studio_prompt(kind, &config.language);
    let system_prompt = build_grounded_system_prompt(sources, Some(&instruction));
    let request = [ChatMessage::user(format!("Generate the {kind} now."))];

    crate::app_log!(
        "[studio] generate kind={} provider={} sources={}",
        kind,
        engine.provider_name(),
        sources.len()
    );
    let text = engine.generate(&system_prompt, &request, config).await?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Generation(format!("Model returned an empty {kind}")));
    }
    Ok(text)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

pub fn parse_flashcards(text: &str) -> Result<Vec<Flashcard>, AppError> {
    parse_json_array(text, "flashcards")
}

pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let questions: Vec<QuizQuestion> = parse_json_array(text, "quiz")?;
    if let Some(bad) = questions.iter().find(|q| q.answer_index >= q.options.len()) {
        return Err(AppError::Generation(format!(
            "Quiz answer index out of range for question: {}",
            bad.question
        )));
    }
    Ok(questions)
}

fn parse_json_array<T: DeserializeOwned>(text: &str, what: &str) -> Result<Vec<T>, AppError> {
    let body = strip_code_fence(text);
    serde_json::from_str(body)
        .map_err(|e| AppError::Generation(format!("Failed to parse {what} JSON: {e}")))
}

/// Models often wrap JSON in Markdown code fences; peel them off.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceKind;
    use crate::test_support::FakeEngine;

    fn config() -> GenerationConfig {
        GenerationConfig::from_app_config(&AppConfig::default())
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            StudioContentKind::Summary,
            StudioContentKind::Flashcards,
            StudioContentKind::Quiz,
            StudioContentKind::MindMap,
            StudioContentKind::AudioScript,
        ] {
            assert_eq!(kind.to_string().parse::<StudioContentKind>().unwrap(), kind);
        }
        assert!("podcast".parse::<StudioContentKind>().is_err());
    }

    #[test]
    fn test_studio_prompts_ask_for_expected_shape() {
        assert!(build_studio_prompt(StudioContentKind::Flashcards, "English").contains("JSON array"));
        assert!(build_studio_prompt(StudioContentKind::Quiz, "English").contains("answer_index"));
        assert!(build_studio_prompt(StudioContentKind::AudioScript, "German").contains("Host B:"));
        assert!(build_studio_prompt(StudioContentKind::MindMap, "English").contains("Markdown"));
    }

    #[test]
    fn test_grounded_prompt_contains_sources() {
        let sources = vec![Source::new("cells.txt", SourceKind::Text, "Mitochondria make ATP.")];
        let prompt = build_grounded_system_prompt(&sources, Some("Be brief."));
        assert!(prompt.starts_with(GROUNDING_PREAMBLE));
        assert!(prompt.contains("[Source 1: cells.txt (text)]\nMitochondria make ATP."));
        assert!(prompt.ends_with("Be brief."));
    }

    #[test]
    fn test_parse_fenced_flashcards() {
        let text = "```json\n[{\"front\": \"ATP\", \"back\": \"Energy currency\"}]\n```";
        let cards = parse_flashcards(text).unwrap();
        assert_eq!(
            cards,
            vec![Flashcard {
                front: "ATP".into(),
                back: "Energy currency".into()
            }]
        );
    }

    #[test]
    fn test_parse_quiz_rejects_bad_answer_index() {
        let text = r#"[{"question": "Q?", "options": ["a", "b"], "answer_index": 2}]"#;
        assert!(matches!(parse_quiz(text), Err(AppError::Generation(_))));

        let text = r#"[{"question": "Q?", "options": ["a", "b"], "answer_index": 1}]"#;
        let quiz = parse_quiz(text).unwrap();
        assert_eq!(quiz[0].explanation, None);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_flashcards("Here are your flashcards!"),
            Err(AppError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_studio_content_trims_reply() {
        let engine = FakeEngine::replying("  A short summary.\n");
        let sources = vec![Source::new("a.md", SourceKind::Markdown, "Alpha")];
        let text = generate_studio_content(&engine, &sources, StudioContentKind::Summary, &config())
            .await
            .unwrap();
        assert_eq!(text, "A short summary.");
        assert!(engine.seen_system.lock().unwrap()[0].contains("study summary"));
    }

    #[tokio::test]
    async fn test_generate_studio_content_requires_sources() {
        let engine = FakeEngine::replying("unused");
        let err = generate_studio_content(&engine, &[], StudioContentKind::Quiz, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(engine.seen_system.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let engine = FakeEngine::replying("   ");
        let sources = vec![Source::new("a.md", SourceKind::Markdown, "Alpha")];
        let err = generate_studio_content(&engine, &sources, StudioContentKind::MindMap, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }
}
