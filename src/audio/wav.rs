use std::io::Write;

use base64::Engine as _;

use super::pcm::{PcmFormat, BYTES_PER_SAMPLE};
use crate::error::AppError;

pub const HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// A complete RIFF/WAVE file: 44-byte header followed by the PCM payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavFile {
    bytes: Vec<u8>,
}

impl WavFile {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The PCM payload after the header.
    pub fn pcm_data(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// `data:` URL usable directly as the source of an audio element.
    pub fn to_data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:audio/wav;base64,{b64}")
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), AppError> {
        writer.write_all(&self.bytes)?;
        Ok(())
    }
}

impl AsRef<[u8]> for WavFile {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Build the canonical 44-byte header for `data_len` bytes of 16-bit PCM.
pub fn wav_header(
    data_len: usize,
    sample_rate: u32,
    num_channels: u16,
) -> Result<[u8; HEADER_LEN], AppError> {
    if sample_rate == 0 {
        return Err(AppError::InvalidArgument("sample_rate must be > 0".into()));
    }
    if num_channels == 0 {
        return Err(AppError::InvalidArgument("num_channels must be > 0".into()));
    }
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| {
            AppError::InvalidArgument(format!("PCM buffer too large for WAV: {data_len} bytes"))
        })?;
    let block_align = num_channels.checked_mul(BYTES_PER_SAMPLE).ok_or_else(|| {
        AppError::InvalidArgument(format!("Too many channels for WAV: {num_channels}"))
    })?;
    let byte_rate = sample_rate
        .checked_mul(u32::from(block_align))
        .ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "Byte rate overflows: {sample_rate} Hz x {num_channels} channels"
            ))
        })?;
    let file_size = 36 + data_size;

    let mut header = [0u8; HEADER_LEN];
    let mut cursor = &mut header[..];

    // RIFF header
    cursor.write_all(b"RIFF")?;
    cursor.write_all(&file_size.to_le_bytes())?;
    cursor.write_all(b"WAVE")?;

    // fmt sub-chunk
    cursor.write_all(b"fmt ")?;
    cursor.write_all(&FMT_CHUNK_SIZE.to_le_bytes())?;
    cursor.write_all(&FORMAT_PCM.to_le_bytes())?;
    cursor.write_all(&num_channels.to_le_bytes())?;
    cursor.write_all(&sample_rate.to_le_bytes())?;
    cursor.write_all(&byte_rate.to_le_bytes())?;
    cursor.write_all(&block_align.to_le_bytes())?;
    cursor.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    // data sub-chunk
    cursor.write_all(b"data")?;
    cursor.write_all(&data_size.to_le_bytes())?;

    Ok(header)
}

/// Wrap raw 16-bit little-endian PCM in a WAV container.
///
/// The samples are copied verbatim; their length is not checked against the
/// frame size. Fails only on a zero rate/channel count or sizes the header
/// fields cannot represent.
pub fn build_wav(samples: &[u8], sample_rate: u32, num_channels: u16) -> Result<WavFile, AppError> {
    let header = wav_header(samples.len(), sample_rate, num_channels)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + samples.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(samples);

    Ok(WavFile { bytes })
}

/// Stream the same bytes as [`build_wav`] without buffering the payload.
pub fn write_wav<W: Write>(
    writer: &mut W,
    samples: &[u8],
    sample_rate: u32,
    num_channels: u16,
) -> Result<(), AppError> {
    let header = wav_header(samples.len(), sample_rate, num_channels)?;
    writer.write_all(&header)?;
    writer.write_all(samples)?;
    Ok(())
}

/// Encode already-decoded i16 samples.
pub fn encode_wav(samples: &[i16], format: PcmFormat) -> Result<WavFile, AppError> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        pcm.extend_from_slice(&s.to_le_bytes());
    }
    build_wav(&pcm, format.sample_rate, format.channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_mono_24k_layout() {
        let samples: [u8; 4] = [0x01, 0x00, 0x02, 0x00];
        let wav = build_wav(&samples, 24000, 1).unwrap();
        let bytes = wav.as_bytes();

        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(bytes, 4), 40);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(bytes, 16), 16);
        assert_eq!(u16_at(bytes, 20), 1);
        assert_eq!(u16_at(bytes, 22), 1);
        assert_eq!(u32_at(bytes, 24), 24000);
        assert_eq!(u32_at(bytes, 28), 48000);
        assert_eq!(u16_at(bytes, 32), 2);
        assert_eq!(u16_at(bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(bytes, 40), 4);
        assert_eq!(&bytes[44..], &samples);
        assert_eq!(wav.pcm_data(), &samples);
    }

    #[test]
    fn test_empty_samples_header_only() {
        let wav = build_wav(&[], 16000, 2).unwrap();
        let bytes = wav.as_bytes();
        assert_eq!(bytes.len(), 44);
        assert_eq!(u32_at(bytes, 4), 36);
        assert_eq!(u32_at(bytes, 40), 0);
        assert_eq!(u16_at(bytes, 22), 2);
        assert_eq!(u32_at(bytes, 28), 64000);
        assert_eq!(u16_at(bytes, 32), 4);
    }

    #[test]
    fn test_stereo_odd_length_is_not_validated() {
        let samples = vec![0xABu8; 7];
        let wav = build_wav(&samples, 44100, 2).unwrap();
        assert_eq!(wav.len(), 51);
        assert_eq!(u32_at(wav.as_bytes(), 4), 43);
        assert_eq!(u32_at(wav.as_bytes(), 40), 7);
        assert_eq!(u32_at(wav.as_bytes(), 28), 44100 * 2 * 2);
        assert_eq!(wav.pcm_data(), samples.as_slice());
    }

    #[test]
    fn test_deterministic() {
        let a: Vec<u8> = (0..=255).collect();
        let b = a.clone();
        assert_eq!(build_wav(&a, 22050, 1).unwrap(), build_wav(&b, 22050, 1).unwrap());
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let err = build_wav(&[0, 0], 0, 1).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_zero_channels() {
        let err = build_wav(&[0, 0], 24000, 0).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_overflowing_rates() {
        assert!(wav_header(0, u32::MAX, 2).is_err());
        assert!(wav_header(0, 8000, u16::MAX).is_err());
        assert!(wav_header(u32::MAX as usize, 8000, 1).is_err());
    }

    #[test]
    fn test_write_wav_matches_build_wav() {
        let samples: [u8; 6] = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut out = Vec::new();
        write_wav(&mut out, &samples, 24000, 1).unwrap();
        assert_eq!(out, build_wav(&samples, 24000, 1).unwrap().into_bytes());
    }

    #[test]
    fn test_encode_wav_from_i16() {
        let wav = encode_wav(&[1, 2, -1], PcmFormat::new(16000, 1)).unwrap();
        assert_eq!(wav.pcm_data(), &[0x01u8, 0x00, 0x02, 0x00, 0xFF, 0xFF]);
        assert_eq!(u32_at(wav.as_bytes(), 40), 6);
    }

    #[test]
    fn test_data_url_prefix() {
        let wav = build_wav(&[0, 0], 24000, 1).unwrap();
        let url = wav.to_data_url();
        assert!(url.starts_with("data:audio/wav;base64,UklGR"));
    }
}
