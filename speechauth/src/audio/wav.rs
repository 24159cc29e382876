//! WAV decoding with hound.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::format::Format;
use super::pcm::Pcm;
use crate::error::{Error, Result};

/// Decodes a WAV file into 16-bit PCM.
pub fn read_file(path: impl AsRef<Path>) -> Result<Pcm> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Decodes a WAV stream into 16-bit PCM.
///
/// Accepts mono or stereo integer PCM of 8 to 32 bits and 32-bit float.
pub fn decode<R: Read>(reader: R) -> Result<Pcm> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();

    let stereo = match spec.channels {
        1 => false,
        2 => true,
        n => {
            return Err(Error::UnsupportedAudio(format!("{} channels", n)));
        }
    };

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| (v as i16) << 8))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits @ (24 | 32)) => {
            let shift = bits - 16;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<std::result::Result<_, _>>()?
        }
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v * 32767.0).clamp(-32768.0, 32767.0) as i16))
            .collect::<std::result::Result<_, _>>()?,
        (format, bits) => {
            return Err(Error::UnsupportedAudio(format!(
                "{:?} samples of {} bits",
                format, bits
            )));
        }
    };

    let format = if stereo {
        Format::stereo(spec.sample_rate)
    } else {
        Format::mono(spec.sample_rate)
    };
    Ok(Pcm::new(format, samples))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use hound::{WavSpec, WavWriter};

    use super::*;

    /// Encodes 16-bit samples as an in-memory WAV file.
    pub(crate) fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_16() {
        let data = wav_bytes(16000, 1, &[1, -2, 3]);
        let pcm = decode(Cursor::new(data)).unwrap();
        assert_eq!(pcm.format(), Format::mono(16000));
        assert_eq!(pcm.samples(), &[1, -2, 3]);
    }

    #[test]
    fn test_decode_stereo_16() {
        let data = wav_bytes(8000, 2, &[1, 2, 3, 4]);
        let pcm = decode(Cursor::new(data)).unwrap();
        assert_eq!(pcm.format(), Format::STEREO_8K);
        assert_eq!(pcm.frames(), 2);
    }

    #[test]
    fn test_decode_float() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.5f32).unwrap();
            writer.write_sample(-1.0f32).unwrap();
            writer.finalize().unwrap();
        }
        let pcm = decode(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(pcm.samples(), &[16383, -32767]);
    }

    #[test]
    fn test_decode_rejects_multichannel() {
        let data = wav_bytes(8000, 4, &[0; 8]);
        let err = decode(Cursor::new(data)).unwrap_err();
        assert!(err.is_audio());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(Cursor::new(b"not a wav file".to_vec())).unwrap_err();
        assert!(matches!(err, Error::Wav(_)));
    }
}
