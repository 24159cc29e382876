//! Session lifecycle state.

use serde::Serialize;

use crate::audio::Codec;
use crate::result::AliveResult;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Closed,
    Open,
    /// A terminal or cancel exchange has been issued; no more posts.
    Closing,
}

/// State of one session: phase, negotiated codec, speech totals, counters
/// and the sticky loudness flags.
///
/// Counters only grow while the session is open and are zeroed by
/// [`reset`](Self::reset). The too-soft and too-loud flags, once raised,
/// stay raised until the next reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    session_id: String,
    phase: Phase,
    codec: Codec,
    speech_required: f64,
    speech_extracted: f64,
    speech_trained: f64,
    score: f64,
    too_soft: bool,
    too_loud: bool,
    total_process_calls: u32,
    total_snippets_sent: u32,
    total_audio_bytes_sent: u64,
    liveness_required: bool,
    liveness: AliveResult,
    authorized: bool,
    overridable: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to `Closed` and zeroes every field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Opens the session under the server-issued id.
    ///
    /// An empty id is rejected and leaves the state untouched.
    pub fn open(&mut self, session_id: &str) -> bool {
        if session_id.is_empty() {
            return false;
        }
        self.session_id = session_id.to_string();
        self.phase = Phase::Open;
        true
    }

    /// Marks the session as closing ahead of a terminal or cancel exchange.
    pub fn begin_closing(&mut self) {
        if self.phase == Phase::Open {
            self.phase = Phase::Closing;
        }
    }

    /// Closes the session and forgets its id.
    pub fn close(&mut self) {
        self.session_id.clear();
        self.phase = Phase::Closed;
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns true when posts are accepted (open and not closing).
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    pub fn is_closing(&self) -> bool {
        self.phase == Phase::Closing
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub(crate) fn set_codec(&mut self, codec: Codec) {
        self.codec = codec;
    }

    pub fn speech_required(&self) -> f64 {
        self.speech_required
    }

    pub(crate) fn set_speech_required(&mut self, seconds: f64) {
        self.speech_required = seconds;
    }

    pub fn speech_extracted(&self) -> f64 {
        self.speech_extracted
    }

    pub(crate) fn set_speech_extracted(&mut self, seconds: f64) {
        self.speech_extracted = seconds;
    }

    pub fn speech_trained(&self) -> f64 {
        self.speech_trained
    }

    pub(crate) fn set_speech_trained(&mut self, seconds: f64) {
        self.speech_trained = seconds;
    }

    /// Score of the selected identity from the last exchange.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub(crate) fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    pub fn is_too_soft(&self) -> bool {
        self.too_soft
    }

    pub fn is_too_loud(&self) -> bool {
        self.too_loud
    }

    pub(crate) fn mark_too_soft(&mut self) {
        self.too_soft = true;
    }

    pub(crate) fn mark_too_loud(&mut self) {
        self.too_loud = true;
    }

    pub fn total_process_calls(&self) -> u32 {
        self.total_process_calls
    }

    pub fn total_snippets_sent(&self) -> u32 {
        self.total_snippets_sent
    }

    pub fn total_audio_bytes_sent(&self) -> u64 {
        self.total_audio_bytes_sent
    }

    pub(crate) fn record_process_call(&mut self) {
        self.total_process_calls += 1;
    }

    pub(crate) fn record_snippet(&mut self, bytes: usize) {
        self.total_snippets_sent += 1;
        self.total_audio_bytes_sent += bytes as u64;
    }

    pub fn is_liveness_required(&self) -> bool {
        self.liveness_required
    }

    pub(crate) fn require_liveness(&mut self) {
        self.liveness_required = true;
    }

    pub fn liveness(&self) -> AliveResult {
        self.liveness
    }

    pub(crate) fn set_liveness(&mut self, liveness: AliveResult) {
        self.liveness = liveness;
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub(crate) fn set_authorized(&mut self, authorized: bool) {
        self.authorized = authorized;
    }

    pub fn is_overridable(&self) -> bool {
        self.overridable
    }

    pub(crate) fn set_overridable(&mut self, overridable: bool) {
        self.overridable = overridable;
    }

    /// Percentage of required speech extracted so far.
    ///
    /// Never reports 100 before the requirement is actually met, and
    /// reports 0 when nothing is required.
    pub fn progress(&self) -> u32 {
        if self.speech_required <= 0.0 {
            return 0;
        }
        let percent = (self.speech_extracted / self.speech_required * 100.0).round();
        if percent < 0.0 {
            return 0;
        }
        if percent >= 100.0 {
            return if self.speech_extracted >= self.speech_required {
                100
            } else {
                99
            };
        }
        percent as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_speech(required: f64, extracted: f64) -> SessionState {
        let mut state = SessionState::new();
        state.set_speech_required(required);
        state.set_speech_extracted(extracted);
        state
    }

    #[test]
    fn test_progress() {
        assert_eq!(with_speech(10.0, 5.0).progress(), 50);
        assert_eq!(with_speech(10.0, 10.0).progress(), 100);
        assert_eq!(with_speech(10.0, 9.999).progress(), 99);
        assert_eq!(with_speech(0.0, 5.0).progress(), 0);
        assert_eq!(with_speech(10.0, 20.0).progress(), 100);
        assert_eq!(with_speech(10.0, -1.0).progress(), 0);
        assert_eq!(with_speech(3.0, 1.0).progress(), 33);
    }

    #[test]
    fn test_open_requires_session_id() {
        let mut state = SessionState::new();
        assert!(!state.open(""));
        assert_eq!(state.phase(), Phase::Closed);

        assert!(state.open("abc"));
        assert!(state.is_open());
        assert_eq!(state.session_id(), "abc");
    }

    #[test]
    fn test_closing_blocks_posts() {
        let mut state = SessionState::new();
        state.open("abc");
        state.begin_closing();
        assert!(state.is_closing());
        assert!(!state.is_open());

        state.close();
        assert_eq!(state.phase(), Phase::Closed);
        assert_eq!(state.session_id(), "");
    }

    #[test]
    fn test_begin_closing_needs_open_session() {
        let mut state = SessionState::new();
        state.begin_closing();
        assert_eq!(state.phase(), Phase::Closed);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = SessionState::new();
        state.open("abc");
        state.set_codec(Codec::Pcm);
        state.mark_too_soft();
        state.mark_too_loud();
        state.require_liveness();
        state.record_process_call();
        state.record_snippet(1600);

        state.reset();
        assert_eq!(state.phase(), Phase::Closed);
        assert_eq!(state.codec(), Codec::Unknown);
        assert!(!state.is_too_soft());
        assert!(!state.is_too_loud());
        assert!(!state.is_liveness_required());
        assert_eq!(state.total_process_calls(), 0);
        assert_eq!(state.total_snippets_sent(), 0);
        assert_eq!(state.total_audio_bytes_sent(), 0);
    }

    #[test]
    fn test_counters() {
        let mut state = SessionState::new();
        state.record_snippet(100);
        state.record_snippet(50);
        state.record_process_call();
        assert_eq!(state.total_snippets_sent(), 2);
        assert_eq!(state.total_audio_bytes_sent(), 150);
        assert_eq!(state.total_process_calls(), 1);
    }
}
