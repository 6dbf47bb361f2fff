use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::audio::wav::wav_header;
use crate::audio::{write_wav, PcmFormat};
use crate::chat::ChatSession;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::generation::openai_compat::OpenAiCompatEngine;
use crate::generation::{generate_studio_content, GenerationConfig, StudioContentKind};
use crate::sources::Source;
use crate::speech::gemini_tts::GeminiTtsEngine;
use crate::speech::SpeechConfig;
use crate::studio::{save_overview, AudioOverview, SavedOverview};

/// Wrap a raw PCM file in a WAV container. Works offline.
pub fn wrap_pcm_file(input: &Path, output: &Path, format: PcmFormat) -> Result<u64, AppError> {
    crate::app_log!(
        "[wrap] input={} rate={} channels={}",
        input.display(),
        format.sample_rate,
        format.channels
    );
    let pcm = fs::read(input)?;
    // Reject bad parameters before touching the output path.
    wav_header(pcm.len(), format.sample_rate, format.channels)?;

    let mut writer = BufWriter::new(fs::File::create(output)?);
    write_wav(&mut writer, &pcm, format.sample_rate, format.channels)?;
    writer.flush()?;

    let written = 44 + pcm.len() as u64;
    crate::app_log!("[wrap] Saved WAV: {} ({} bytes)", output.display(), written);
    Ok(written)
}

pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<Source>, AppError> {
    paths.iter().map(Source::from_path).collect()
}

pub async fn ask(config: &AppConfig, sources: &[Source], question: &str) -> Result<String, AppError> {
    let engine = OpenAiCompatEngine::from_config(config)?;
    let mut session = ChatSession::new(sources)?;
    session
        .ask(&engine, question, &GenerationConfig::from_app_config(config))
        .await
}

pub async fn studio(
    config: &AppConfig,
    sources: &[Source],
    kind: StudioContentKind,
) -> Result<String, AppError> {
    let engine = OpenAiCompatEngine::from_config(config)?;
    let gen_config = GenerationConfig::from_app_config(config);
    let text = generate_studio_content(&engine, sources, kind, &gen_config).await?;

    // Validate structured artifacts and re-emit them as pretty JSON.
    let rendered = match kind {
        StudioContentKind::Flashcards => {
            serde_json::to_string_pretty(&crate::generation::parse_flashcards(&text)?)?
        }
        StudioContentKind::Quiz => serde_json::to_string_pretty(&crate::generation::parse_quiz(&text)?)?,
        _ => text,
    };
    Ok(rendered)
}

pub async fn overview(
    config: &AppConfig,
    sources: &[Source],
    output_dir: Option<PathBuf>,
) -> Result<SavedOverview, AppError> {
    let generator = OpenAiCompatEngine::from_config(config)?;
    let speaker = GeminiTtsEngine::from_config(config)?;
    let overview = AudioOverview::generate(
        &generator,
        &speaker,
        sources,
        &GenerationConfig::from_app_config(config),
        &SpeechConfig::two_hosts(config),
    )
    .await?;

    let dir = match output_dir {
        Some(dir) => dir,
        None => config.resolve_output_dir()?,
    };
    save_overview(&overview, &dir)
}
