//! Sample format of decoded audio.

/// Describes 16-bit signed integer audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// True for stereo (2 channels), false for mono (1 channel).
    pub stereo: bool,
}

impl Format {
    /// Creates a mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            stereo: false,
        }
    }

    /// Creates a stereo format with the given sample rate.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            stereo: true,
        }
    }

    /// Returns the number of channels (1 for mono, 2 for stereo).
    pub fn channels(&self) -> u32 {
        if self.stereo { 2 } else { 1 }
    }

    /// Returns the number of bytes per 16-bit sample frame.
    pub fn sample_bytes(&self) -> usize {
        if self.stereo { 4 } else { 2 }
    }
}

/// Rate every snippet is sent at.
pub const SESSION_SAMPLE_RATE: u32 = 8000;

impl Format {
    /// 8kHz mono, the session format for A-law and mono PCM.
    pub const MONO_8K: Format = Format::mono(SESSION_SAMPLE_RATE);
    /// 8kHz stereo, the session format for stereo PCM.
    pub const STEREO_8K: Format = Format::stereo(SESSION_SAMPLE_RATE);
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, 16 bit, {}",
            self.sample_rate,
            if self.stereo { "stereo" } else { "mono" }
        )
    }
}
