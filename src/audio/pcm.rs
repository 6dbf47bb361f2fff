use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sample rate the speech service emits when the MIME type omits `rate=`.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Bytes per sample for signed 16-bit linear PCM.
pub const BYTES_PER_SAMPLE: u16 = 2;

/// Parameters describing a raw 16-bit PCM buffer. They travel next to the
/// bytes, never inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
        }
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Parse an inline-audio MIME type such as `audio/L16;codec=pcm;rate=24000`.
    pub fn from_mime(mime: &str) -> Result<Self, AppError> {
        let mut parts = mime.split(';').map(str::trim);
        let essence = parts.next().unwrap_or_default().to_ascii_lowercase();
        if !matches!(essence.as_str(), "audio/l16" | "audio/pcm" | "audio/raw") {
            return Err(AppError::InvalidArgument(format!(
                "Unsupported audio MIME type: {mime}"
            )));
        }

        let mut format = Self::default();
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "rate" => {
                    format.sample_rate = parse_positive(value, "rate", mime)?;
                }
                "channels" => {
                    format.channels = parse_positive(value, "channels", mime)?;
                }
                _ => {}
            }
        }
        Ok(format)
    }

    /// Playback length of `byte_len` bytes of PCM in this format.
    pub fn duration_secs(&self, byte_len: usize) -> f32 {
        let bytes_per_sec =
            self.sample_rate as f64 * self.channels as f64 * BYTES_PER_SAMPLE as f64;
        if bytes_per_sec == 0.0 {
            return 0.0;
        }
        (byte_len as f64 / bytes_per_sec) as f32
    }
}

fn parse_positive<T>(value: &str, name: &str, mime: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let parsed: T = value.trim().parse().map_err(|_| {
        AppError::InvalidArgument(format!("Malformed {name} parameter in MIME type: {mime}"))
    })?;
    if parsed == T::default() {
        return Err(AppError::InvalidArgument(format!(
            "{name} must be > 0 in MIME type: {mime}"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_gemini_tts_mime() {
        let format = PcmFormat::from_mime("audio/L16;codec=pcm;rate=24000").unwrap();
        assert_eq!(format, PcmFormat::new(24000, 1));
    }

    #[test]
    fn test_defaults_when_parameters_missing() {
        let format = PcmFormat::from_mime("audio/pcm").unwrap();
        assert_eq!(format, PcmFormat::default());
    }

    #[test]
    fn test_reads_channels_parameter() {
        let format = PcmFormat::from_mime("audio/L16; rate=16000; channels=2").unwrap();
        assert_eq!(format, PcmFormat::new(16000, 2));
    }

    #[test]
    fn test_rejects_zero_rate() {
        let err = PcmFormat::from_mime("audio/L16;rate=0").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_garbage_rate() {
        assert!(PcmFormat::from_mime("audio/L16;rate=fast").is_err());
    }

    #[test]
    fn test_rejects_compressed_audio() {
        let err = PcmFormat::from_mime("audio/mpeg").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_duration() {
        let format = PcmFormat::new(24000, 1);
        assert_eq!(format.duration_secs(48000), 1.0);
        assert_eq!(PcmFormat::new(0, 1).duration_secs(10), 0.0);
    }
}
