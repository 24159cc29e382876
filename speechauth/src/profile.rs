//! Session profiles negotiated with the server.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};

use crate::audio::Codec;
use crate::state::SessionState;

/// Kind of profile returned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Enrollment profile.
    Enroll,
    /// Single-utterance verification.
    Single,
    /// Single-utterance verification with a liveness challenge.
    SingleLiveness,
    /// Verification that tolerates one rejected utterance.
    DropOne,
    /// 1:N identification.
    Identify,
    /// Unrecognized type; a session cannot run under it.
    Unknown,
}

impl ProfileKind {
    /// Maps a verification profile type code.
    pub fn from_verify_code(code: u32) -> ProfileKind {
        match code {
            2 => ProfileKind::Single,
            3 => ProfileKind::SingleLiveness,
            10 | 11 => ProfileKind::DropOne,
            _ => ProfileKind::Unknown,
        }
    }

    /// Maps an identification profile type code.
    pub fn from_identify_code(code: u32) -> ProfileKind {
        match code {
            6 | 7 => ProfileKind::Identify,
            _ => ProfileKind::Unknown,
        }
    }
}

/// Parameters governing one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub index: u32,
    pub codec: Codec,
    pub kind: ProfileKind,
    pub required_speech_seconds: f64,
    /// Scores at or above this pass (verification/identification).
    pub pass_threshold: f64,
    /// Scores at or below this fail (verification/identification).
    pub fail_threshold: f64,
}

impl Profile {
    /// Returns false for profiles of unknown kind.
    pub fn is_usable(&self) -> bool {
        self.kind != ProfileKind::Unknown
    }
}

/// Profiles received during the current exchange sequence, keyed by index.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<u32, Profile>,
    last_index: Option<u32>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a profile and applies it to the session.
    ///
    /// The session adopts the profile's codec when it has none yet, and its
    /// speech requirement when this is the first profile stored. Profiles of
    /// unknown kind are rejected and `None` is returned.
    pub fn add(&mut self, profile: Profile, state: &mut SessionState) -> Option<u32> {
        if !profile.is_usable() {
            error!("ProfileStore.add(): Invalid ProfileType at index {}", profile.index);
            return None;
        }

        debug!("ProfileStore.add(): Codec: {}", profile.codec);
        debug!(
            "ProfileStore.add(): MinimumSecondsOfSpeech: {}",
            profile.required_speech_seconds
        );
        debug!("ProfileStore.add(): Index: {}", profile.index);

        if state.codec() == Codec::Unknown {
            state.set_codec(profile.codec);
        }
        if self.profiles.is_empty() {
            state.set_speech_required(profile.required_speech_seconds);
        }

        let index = profile.index;
        self.profiles.insert(index, profile);
        self.last_index = Some(index);
        Some(index)
    }

    pub fn get(&self, index: u32) -> Option<&Profile> {
        self.profiles.get(&index)
    }

    /// Returns the most recently stored profile.
    pub fn last(&self) -> Option<&Profile> {
        self.last_index.and_then(|i| self.profiles.get(&i))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
        self.last_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(index: u32, codec: Codec, kind: ProfileKind, required: f64) -> Profile {
        Profile {
            index,
            codec,
            kind,
            required_speech_seconds: required,
            pass_threshold: 0.8,
            fail_threshold: 0.3,
        }
    }

    #[test]
    fn test_add_adopts_codec_and_speech() {
        let mut store = ProfileStore::new();
        let mut state = SessionState::new();

        let index = store.add(profile(4, Codec::Alaw, ProfileKind::Single, 7.5), &mut state);
        assert_eq!(index, Some(4));
        assert_eq!(state.codec(), Codec::Alaw);
        assert_eq!(state.speech_required(), 7.5);
        assert_eq!(store.last().map(|p| p.index), Some(4));
    }

    #[test]
    fn test_first_profile_wins() {
        let mut store = ProfileStore::new();
        let mut state = SessionState::new();

        store.add(profile(1, Codec::Pcm, ProfileKind::Single, 5.0), &mut state);
        store.add(profile(2, Codec::Alaw, ProfileKind::DropOne, 9.0), &mut state);

        assert_eq!(store.len(), 2);
        assert_eq!(state.codec(), Codec::Pcm);
        assert_eq!(state.speech_required(), 5.0);
        assert_eq!(store.last().map(|p| p.index), Some(2));
        assert_eq!(store.get(1).map(|p| p.codec), Some(Codec::Pcm));
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let mut store = ProfileStore::new();
        let mut state = SessionState::new();

        let index = store.add(profile(1, Codec::Pcm, ProfileKind::Unknown, 5.0), &mut state);
        assert_eq!(index, None);
        assert!(store.is_empty());
        assert_eq!(state.codec(), Codec::Unknown);
        assert_eq!(state.speech_required(), 0.0);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ProfileKind::from_verify_code(2), ProfileKind::Single);
        assert_eq!(ProfileKind::from_verify_code(3), ProfileKind::SingleLiveness);
        assert_eq!(ProfileKind::from_verify_code(10), ProfileKind::DropOne);
        assert_eq!(ProfileKind::from_verify_code(11), ProfileKind::DropOne);
        assert_eq!(ProfileKind::from_verify_code(6), ProfileKind::Unknown);
        assert_eq!(ProfileKind::from_identify_code(6), ProfileKind::Identify);
        assert_eq!(ProfileKind::from_identify_code(7), ProfileKind::Identify);
        assert_eq!(ProfileKind::from_identify_code(2), ProfileKind::Unknown);
    }

    #[test]
    fn test_clear() {
        let mut store = ProfileStore::new();
        let mut state = SessionState::new();
        store.add(profile(1, Codec::Pcm, ProfileKind::Enroll, 5.0), &mut state);
        store.clear();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }
}
