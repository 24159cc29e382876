//! Audio conversion into the session codec.
//!
//! Every snippet is sent as 8kHz audio: A-law mono, or 16-bit little-endian
//! PCM in mono or stereo. Input is decoded from WAV with hound, downmixed or
//! upmixed, resampled with rubato, then companded when the session negotiated
//! A-law.

pub mod alaw;
mod format;
mod pcm;
mod resample;
pub mod wav;

use serde::{Deserialize, Serialize};

pub use format::{Format, SESSION_SAMPLE_RATE};
pub use pcm::Pcm;

use crate::error::{Error, Result};

/// Audio codec negotiated through the session profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    #[default]
    Unknown,
    /// G.711 A-law, 8kHz mono.
    Alaw,
    /// 16-bit little-endian PCM, 8kHz.
    Pcm,
}

impl Codec {
    /// Parses the codec name used in profile payloads (case-insensitive).
    pub fn parse(name: &str) -> Codec {
        match name.to_ascii_lowercase().as_str() {
            "a" | "alaw" => Codec::Alaw,
            "p" | "pcm_little_endian" => Codec::Pcm,
            _ => Codec::Unknown,
        }
    }

    /// Returns the codec as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Unknown => "unknown",
            Codec::Alaw => "alaw",
            Codec::Pcm => "pcm",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel selector for stereo snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Mono,
    StereoLeft,
    StereoRight,
}

/// Audio converted into the session codec, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub codec: Codec,
    pub format: Format,
    pub data: Vec<u8>,
}

/// Converts audio into a mono 8kHz snippet in the given codec.
pub fn encode_mono(pcm: &Pcm, codec: Codec) -> Result<Encoded> {
    let converted = match codec {
        Codec::Alaw | Codec::Pcm => pcm.to_mono().resample(SESSION_SAMPLE_RATE)?,
        Codec::Unknown => {
            return Err(Error::UnsupportedAudio("session codec is unknown".to_string()));
        }
    };
    let data = match codec {
        Codec::Alaw => alaw::encode(converted.samples()),
        _ => converted.to_le_bytes(),
    };
    Ok(Encoded {
        codec,
        format: Format::MONO_8K,
        data,
    })
}

/// Converts audio into a stereo 8kHz PCM snippet.
///
/// Stereo snippets exist only for PCM sessions.
pub fn encode_stereo(pcm: &Pcm, codec: Codec) -> Result<Encoded> {
    if codec != Codec::Pcm {
        return Err(Error::UnsupportedAudio(format!(
            "stereo snippets require pcm, session codec is {}",
            codec
        )));
    }
    let converted = pcm.to_stereo().resample(SESSION_SAMPLE_RATE)?;
    Ok(Encoded {
        codec,
        format: Format::STEREO_8K,
        data: converted.to_le_bytes(),
    })
}
