//! Duration reader for RIFF/WAVE files.

use crate::error::WavError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Compute the playback duration of a WAV file in milliseconds.
///
/// Only the `fmt ` byte rate and the `data` chunk size are needed; all other
/// chunks are skipped.
pub fn wav_duration_ms(bytes: &[u8]) -> Result<u64, WavError> {
    let mut cursor = Cursor::new(bytes);
    let mut tag = [0u8; 4];

    cursor.read_exact(&mut tag)?;
    if &tag != b"RIFF" {
        return Err(WavError::MissingSignature("RIFF"));
    }
    cursor.read_u32::<LittleEndian>()?;
    cursor.read_exact(&mut tag)?;
    if &tag != b"WAVE" {
        return Err(WavError::MissingSignature("WAVE"));
    }

    let mut byte_rate: Option<u32> = None;
    let mut data_size: Option<u32> = None;

    while byte_rate.is_none() || data_size.is_none() {
        if cursor.read_exact(&mut tag).is_err() {
            break;
        }
        let size = cursor.read_u32::<LittleEndian>()?;
        let chunk_start = cursor.position();

        match &tag {
            b"fmt " => {
                // audio format, channels, sample rate
                cursor.seek(SeekFrom::Current(8))?;
                byte_rate = Some(cursor.read_u32::<LittleEndian>()?);
            }
            b"data" => data_size = Some(size),
            _ => {}
        }

        // chunks are padded to an even size
        let next = chunk_start + u64::from(size) + u64::from(size & 1);
        cursor.seek(SeekFrom::Start(next))?;
    }

    match (byte_rate, data_size) {
        (Some(0), _) => Err(WavError::ZeroByteRate),
        (Some(rate), Some(size)) => Ok(u64::from(size) * 1000 / u64::from(rate)),
        (None, _) => Err(WavError::MissingChunk("fmt")),
        (_, None) => Err(WavError::MissingChunk("data")),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal PCM WAV with `data_len` bytes of silence.
    pub(crate) fn make_wav(sample_rate: u32, channels: u16, data_len: u32) -> Vec<u8> {
        let bits: u16 = 16;
        let block_align = channels * bits / 8;
        let byte_rate = sample_rate * u32::from(block_align);
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.resize(out.len() + data_len as usize, 0);
        out
    }

    #[test]
    fn test_one_second_mono() {
        let wav = make_wav(44100, 1, 88200);
        assert_eq!(wav_duration_ms(&wav).unwrap(), 1000);
    }

    #[test]
    fn test_half_second_stereo() {
        let wav = make_wav(22050, 2, 44100);
        assert_eq!(wav_duration_ms(&wav).unwrap(), 500);
    }

    #[test]
    fn test_not_a_wav() {
        assert!(matches!(
            wav_duration_ms(b"OggS...."),
            Err(WavError::MissingSignature("RIFF"))
        ));
        assert!(matches!(wav_duration_ms(b""), Err(WavError::Truncated(_))));
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut wav = make_wav(8000, 1, 0);
        wav.truncate(36);
        let err = wav_duration_ms(&wav).unwrap_err();
        assert!(matches!(err, WavError::MissingChunk("data")));
        assert_eq!(err.to_string(), "missing data chunk");
    }
}
