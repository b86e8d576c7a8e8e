//! RIFF/WAVE encoding for synthesized PCM.
//!
//! Output is always 16-bit, mono, uncompressed PCM with the canonical
//! 44-byte header, which every browser audio element and desktop player
//! understands.

use crate::error::SheetError;

/// Size of the canonical RIFF/WAVE header
pub const HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
const PCM_FORMAT: u16 = 1;

/// Encode float samples as a 16-bit mono WAV file.
///
/// Samples are clamped to [-1, 1]. Negative values scale by 32768,
/// non-negative values by 32767.
///
/// # Errors
/// [`SheetError::Encode`] when the byte rate or the data length does not fit
/// the 32-bit header fields.
///
/// # Example
/// ```rust
/// use sheetscribe::encode_wav;
///
/// let bytes = encode_wav(&[0.0, 1.0, -1.0], 44100)?;
/// assert_eq!(bytes.len(), 44 + 3 * 2);
/// assert_eq!(&bytes[0..4], b"RIFF");
/// assert_eq!(&bytes[46..48], &32767i16.to_le_bytes());
/// # Ok::<(), sheetscribe::SheetError>(())
/// ```
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, SheetError> {
    let data_len = samples
        .len()
        .checked_mul(BLOCK_ALIGN as usize)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            SheetError::Encode(format!("{} samples do not fit in a WAV file", samples.len()))
        })?;
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or_else(|| SheetError::Encode(format!("sample rate {} is too high", sample_rate)))?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for &sample in samples {
        out.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    Ok(out)
}

/// Float sample to signed 16-bit, truncating toward zero. NaN becomes silence.
fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else if s >= 0.0 {
        (s * 32767.0) as i16
    } else {
        0
    }
}
