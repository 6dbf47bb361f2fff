use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::audio::{build_wav, WavFile};
use crate::error::AppError;
use crate::generation::{generate_studio_content, GenerationConfig, GenerationEngine, StudioContentKind};
use crate::sources::Source;
use crate::speech::{SpeechConfig, SpeechEngine};

/// A generated two-host audio overview, ready to play or save.
#[derive(Debug, Clone)]
pub struct AudioOverview {
    pub script: String,
    pub wav: WavFile,
    pub duration_secs: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedOverview {
    pub audio_path: String,
    pub script_path: String,
    pub duration_secs: f32,
}

impl AudioOverview {
    /// Script first, then speech. A failed script never reaches the TTS service.
    pub async fn generate<G, S>(
        generator: &G,
        speaker: &S,
        sources: &[Source],
        gen_config: &GenerationConfig,
        speech_config: &SpeechConfig,
    ) -> Result<Self, AppError>
    where
        G: GenerationEngine,
        S: SpeechEngine,
    {
        let script =
            generate_studio_content(generator, sources, StudioContentKind::AudioScript, gen_config)
                .await?;
        crate::app_log!("[overview] script ready chars={}", script.chars().count());

        let audio = speaker.synthesize(&script, speech_config).await?;
        let duration_secs = audio.format.duration_secs(audio.pcm.len());
        let wav = build_wav(&audio.pcm, audio.format.sample_rate, audio.format.channels)?;
        crate::app_log!(
            "[overview] synthesized provider={} rate={} channels={} duration_secs={:.1} wav_bytes={}",
            speaker.provider_name(),
            audio.format.sample_rate,
            audio.format.channels,
            duration_secs,
            wav.len()
        );

        Ok(Self {
            script,
            wav,
            duration_secs,
        })
    }
}

/// Write `audio_overview_<timestamp>.wav` and `.txt` into `dir`.
pub fn save_overview(overview: &AudioOverview, dir: &Path) -> Result<SavedOverview, AppError> {
    fs::create_dir_all(dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let base_name = format!("audio_overview_{timestamp}");

    let wav_path: PathBuf = dir.join(format!("{base_name}.wav"));
    fs::write(&wav_path, overview.wav.as_bytes())?;
    crate::app_log!(
        "[overview] Saved WAV: {} ({} bytes)",
        wav_path.display(),
        overview.wav.len()
    );

    let txt_path = dir.join(format!("{base_name}.txt"));
    fs::write(&txt_path, &overview.script)?;
    crate::app_log!("[overview] Saved TXT: {}", txt_path.display());

    Ok(SavedOverview {
        audio_path: wav_path.display().to_string(),
        script_path: txt_path.display().to_string(),
        duration_secs: overview.duration_secs,
    })
}
