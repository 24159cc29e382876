//! Parts pending upload on the next process exchange.

use bytes::Bytes;
use tracing::{debug, error};

use crate::audio::{self, Channel, Codec, Format, Pcm};
use crate::context::SpeechContext;
use crate::http::Part;
use crate::state::SessionState;

/// Form field names of uploaded parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartName {
    /// Mono audio.
    Data,
    /// Left channel of a stereo recording.
    Left,
    /// Right channel of a stereo recording.
    Right,
    /// Speech context JSON.
    Speech,
}

impl PartName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartName::Data => "data",
            PartName::Left => "left",
            PartName::Right => "right",
            PartName::Speech => "speech",
        }
    }

    /// Audio slot for a channel selector.
    pub fn for_channel(channel: Channel) -> PartName {
        match channel {
            Channel::Mono => PartName::Data,
            Channel::StereoLeft => PartName::Left,
            Channel::StereoRight => PartName::Right,
        }
    }
}

/// Audio converted into the session codec.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPart {
    pub filename: String,
    pub codec: Codec,
    pub format: Format,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
enum Element {
    Audio(AudioPart),
    Context(SpeechContext),
}

/// Ordered collection of named parts.
///
/// Parts are moved out by [`take_parts`](Self::take_parts) when the request
/// is built, so the accumulator is empty after every exchange.
#[derive(Debug, Clone, Default)]
pub struct ContentAccumulator {
    elements: Vec<(PartName, Element)>,
}

impl ContentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts mono-or-stereo audio into a mono snippet in the session codec.
    ///
    /// Fails when the session is not open or its codec is unknown. Counts
    /// the snippet and its encoded bytes on success.
    pub fn append(&mut self, pcm: &Pcm, filename: String, state: &mut SessionState) -> bool {
        if !state.is_open() {
            return false;
        }

        debug!("ContentAccumulator.append(): In-Length: {}", pcm.byte_len());
        debug!("ContentAccumulator.append(): In-Format: {}", pcm.format());

        let encoded = match audio::encode_mono(pcm, state.codec()) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("ContentAccumulator.append(): {}", e);
                return false;
            }
        };
        self.push_audio(PartName::Data, encoded, filename, state);
        true
    }

    /// Converts audio into a stereo PCM snippet placed in the slot chosen by
    /// the channel selector. Only PCM sessions accept stereo.
    pub fn append_stereo(
        &mut self,
        pcm: &Pcm,
        channel: Channel,
        filename: String,
        state: &mut SessionState,
    ) -> bool {
        if !state.is_open() {
            return false;
        }

        debug!("ContentAccumulator.append_stereo(): In-Channel: {:?}", channel);
        debug!("ContentAccumulator.append_stereo(): In-Length: {}", pcm.byte_len());
        debug!("ContentAccumulator.append_stereo(): In-Format: {}", pcm.format());

        let encoded = match audio::encode_stereo(pcm, state.codec()) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("ContentAccumulator.append_stereo(): {}", e);
                return false;
            }
        };
        self.push_audio(PartName::for_channel(channel), encoded, filename, state);
        true
    }

    fn push_audio(
        &mut self,
        name: PartName,
        encoded: audio::Encoded,
        filename: String,
        state: &mut SessionState,
    ) {
        debug!(
            "ContentAccumulator.append(): Append-Length: {}",
            encoded.data.len()
        );
        debug!("ContentAccumulator.append(): Append-Format: {}", encoded.format);

        state.record_snippet(encoded.data.len());
        self.elements.push((
            name,
            Element::Audio(AudioPart {
                filename,
                codec: encoded.codec,
                format: encoded.format,
                data: Bytes::from(encoded.data),
            }),
        ));
    }

    /// Queues a speech context as a `speech` part.
    pub fn push_context(&mut self, context: SpeechContext) {
        debug!("ContentAccumulator.push_context(): {}", context);
        self.elements.push((PartName::Speech, Element::Context(context)));
    }

    /// Number of queued parts.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Queued audio parts with their slot.
    pub fn audio_parts(&self) -> impl Iterator<Item = (PartName, &AudioPart)> {
        self.elements.iter().filter_map(|(name, e)| match e {
            Element::Audio(a) => Some((*name, a)),
            Element::Context(_) => None,
        })
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Drains the queue into multipart body parts.
    ///
    /// A context that fails to serialize is logged and skipped.
    pub fn take_parts(&mut self) -> Vec<Part> {
        self.elements
            .drain(..)
            .filter_map(|(name, element)| match element {
                Element::Audio(audio) => Some(Part::File {
                    name: name.as_str().to_string(),
                    filename: audio.filename,
                    data: audio.data,
                }),
                Element::Context(context) => match serde_json::to_string(&context) {
                    Ok(value) => Some(Part::Text {
                        name: name.as_str().to_string(),
                        value,
                    }),
                    Err(e) => {
                        error!("ContentAccumulator.take_parts(): {}", e);
                        None
                    }
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_state(codec: Codec) -> SessionState {
        let mut state = SessionState::new();
        state.open("s-1");
        state.set_codec(codec);
        state
    }

    #[test]
    fn test_append_requires_open_session() {
        let mut content = ContentAccumulator::new();
        let mut state = SessionState::new();
        state.set_codec(Codec::Pcm);
        let pcm = Pcm::new(Format::MONO_8K, vec![0; 80]);

        assert!(!content.append(&pcm, "a.raw".to_string(), &mut state));
        assert!(content.is_empty());
        assert_eq!(state.total_snippets_sent(), 0);
    }

    #[test]
    fn test_append_counts_encoded_bytes() {
        let mut content = ContentAccumulator::new();
        let mut state = open_state(Codec::Alaw);
        let pcm = Pcm::new(Format::mono(16000), vec![0; 1600]);

        assert!(content.append(&pcm, "a.raw".to_string(), &mut state));
        assert_eq!(state.total_snippets_sent(), 1);
        assert_eq!(state.total_audio_bytes_sent(), 800);

        let (name, part) = content.audio_parts().next().unwrap();
        assert_eq!(name, PartName::Data);
        assert_eq!(part.codec, Codec::Alaw);
        assert_eq!(part.format, Format::MONO_8K);
    }

    #[test]
    fn test_append_rejects_unknown_codec() {
        let mut content = ContentAccumulator::new();
        let mut state = open_state(Codec::Unknown);
        let pcm = Pcm::new(Format::MONO_8K, vec![0; 8]);
        assert!(!content.append(&pcm, "a.raw".to_string(), &mut state));
        assert_eq!(state.total_snippets_sent(), 0);
    }

    #[test]
    fn test_append_stereo_slots() {
        let mut content = ContentAccumulator::new();
        let mut state = open_state(Codec::Pcm);
        let pcm = Pcm::new(Format::STEREO_8K, vec![1, 2, 3, 4]);

        assert!(content.append_stereo(&pcm, Channel::StereoLeft, "l.raw".to_string(), &mut state));
        assert!(content.append_stereo(&pcm, Channel::StereoRight, "r.raw".to_string(), &mut state));
        assert!(content.append_stereo(&pcm, Channel::Mono, "m.raw".to_string(), &mut state));

        let names: Vec<_> = content.audio_parts().map(|(n, _)| n).collect();
        assert_eq!(names, vec![PartName::Left, PartName::Right, PartName::Data]);
        assert_eq!(state.total_audio_bytes_sent(), 24);
    }

    #[test]
    fn test_append_stereo_requires_pcm() {
        let mut content = ContentAccumulator::new();
        let mut state = open_state(Codec::Alaw);
        let pcm = Pcm::new(Format::STEREO_8K, vec![1, 2]);
        assert!(!content.append_stereo(&pcm, Channel::StereoLeft, "l.raw".to_string(), &mut state));
    }

    #[test]
    fn test_take_parts_drains() {
        let mut content = ContentAccumulator::new();
        let mut state = open_state(Codec::Pcm);
        let pcm = Pcm::new(Format::MONO_8K, vec![7; 4]);
        content.append(&pcm, "a-0-0.raw".to_string(), &mut state);
        content.push_context(SpeechContext::new("en-US", ["hello"]));

        let parts = content.take_parts();
        assert!(content.is_empty());
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name(), "data");
        match &parts[1] {
            Part::Text { name, value } => {
                assert_eq!(name, "speech");
                assert!(value.contains("\"languageCode\":\"en-US\""));
            }
            other => panic!("unexpected part {:?}", other),
        }
    }
}
