//! Decoded 16-bit PCM audio.

use super::format::Format;
use super::resample;
use crate::error::Result;

/// Interleaved 16-bit PCM samples with their format.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm {
    format: Format,
    samples: Vec<i16>,
}

impl Pcm {
    /// Creates audio from interleaved samples.
    ///
    /// A trailing half frame of a stereo buffer is dropped.
    pub fn new(format: Format, mut samples: Vec<i16>) -> Self {
        if format.stereo && samples.len() % 2 != 0 {
            samples.pop();
        }
        Self { format, samples }
    }

    /// Creates audio from little-endian 16-bit bytes.
    pub fn from_le_bytes(format: Format, data: &[u8]) -> Self {
        let samples = data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self::new(format, samples)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the number of sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.format.channels() as usize
    }

    /// Returns the byte length of the audio as 16-bit PCM.
    pub fn byte_len(&self) -> usize {
        self.samples.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.format.sample_rate as f64
    }

    /// Downmixes stereo to mono by averaging both channels.
    pub fn to_mono(&self) -> Pcm {
        if !self.format.stereo {
            return self.clone();
        }
        let samples = self
            .samples
            .chunks_exact(2)
            .map(|lr| ((lr[0] as i32 + lr[1] as i32) / 2) as i16)
            .collect();
        Pcm {
            format: Format::mono(self.format.sample_rate),
            samples,
        }
    }

    /// Upmixes mono to stereo by duplicating each sample.
    pub fn to_stereo(&self) -> Pcm {
        if self.format.stereo {
            return self.clone();
        }
        let samples = self.samples.iter().flat_map(|&s| [s, s]).collect();
        Pcm {
            format: Format::stereo(self.format.sample_rate),
            samples,
        }
    }

    /// Converts to the given sample rate, keeping the channel layout.
    pub fn resample(&self, sample_rate: u32) -> Result<Pcm> {
        if sample_rate == self.format.sample_rate {
            return Ok(self.clone());
        }
        let channels = self.format.channels() as usize;
        let samples = resample::resample(
            &self.samples,
            channels,
            self.format.sample_rate,
            sample_rate,
        )?;
        Ok(Pcm {
            format: Format {
                sample_rate,
                stereo: self.format.stereo,
            },
            samples,
        })
    }

    /// Returns the samples as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}
