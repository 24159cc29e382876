//! Flow policies for enrollment, verification and identification.
//!
//! A [`FlowPolicy`] supplies everything that differs between the three
//! flows: URL paths, identity selector, error table, profile-type parsing,
//! per-identity result construction and selection, and result compounding.
//! [`SessionEngine`](crate::SessionEngine) runs the shared lifecycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::Codec;
use crate::classify::{self, ENROLL_ERRORS, ErrorTable, IDENTIFY_ERRORS, VERIFY_ERRORS};
use crate::http::encode_segment;
use crate::profile::{Profile, ProfileKind};
use crate::result::{InstanceResult, SpeechResult};
use crate::state::SessionState;
use crate::wire::{WireInstance, WireProfile, WireResponse};

/// Cancel reasons longer than this are truncated.
pub const MAX_CANCEL_REASON: usize = 64;

const CANCEL_PATH: &str = "/1/sve/Cancel";
const LIVENESS_PATH: &str = "/1/sve/Verification/Liveness";

/// Kind of network exchange within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Profile,
    Start,
    Process,
    /// Train (enrollment) or summarize (verification/identification).
    Terminal,
    Cancel,
}

/// Flow-specific behavior plugged into the session engine.
pub trait FlowPolicy: Send + Sync + 'static {
    /// Flow name used in log messages.
    const NAME: &'static str;
    const PROFILE_PATH: &'static str;
    /// Path of both process and terminal exchanges.
    const PROCESS_PATH: &'static str;
    /// Whether appended speech contexts make the session liveness-checked.
    const LIVENESS: bool = false;
    /// Exchange that carries the override token, if any.
    const OVERRIDE_TOKEN_ON: Option<Exchange> = None;

    /// Identity selector sent on start; empty when not configured.
    fn selector(&self) -> String;

    /// Identity label used in uploaded audio filenames.
    fn audio_label(&self) -> String {
        self.selector()
    }

    /// Path of the start exchange for a non-empty selector.
    fn start_path(&self, selector: &str) -> String;

    fn error_table(&self) -> ErrorTable;

    fn profile_kind(&self, profile_type: Option<u32>) -> ProfileKind;

    fn wire_profile<'a>(&self, response: &'a WireResponse) -> Option<&'a WireProfile>;

    fn wire_results<'a>(
        &self,
        response: &'a WireResponse,
    ) -> Option<&'a BTreeMap<String, WireInstance>>;

    /// Builds the per-identity result, classifying it against its profile.
    fn instance_result(&self, wire: &WireInstance, profile: Option<&Profile>) -> InstanceResult;

    /// Selects the result that drives the session outcome and records it in
    /// the state. Returns the new raw result, or `None` to keep the current.
    fn absorb(
        &mut self,
        results: &BTreeMap<String, InstanceResult>,
        exchange: Exchange,
        state: &mut SessionState,
    ) -> Option<SpeechResult>;

    /// Derives the exposed result from the raw one.
    fn compound(&self, raw: SpeechResult, _state: &SessionState) -> SpeechResult {
        raw
    }

    /// Clears per-session policy state.
    fn reset(&mut self) {}

    /// Builds a profile from its wire form.
    fn profile(&self, wire: &WireProfile) -> Profile {
        Profile {
            index: wire.index,
            codec: Codec::parse(&wire.codec),
            kind: self.profile_kind(wire.profile_type),
            required_speech_seconds: wire.min_seconds_of_speech.unwrap_or(0.0),
            pass_threshold: wire.pass.unwrap_or(0.0),
            fail_threshold: wire.fail.unwrap_or(0.0),
        }
    }
}

/// Cancel path for a free-form reason.
pub fn cancel_path(reason: &str) -> String {
    format!("{}/{}", CANCEL_PATH, encode_segment(&sanitize_cancel_reason(reason)))
}

/// Liveness post path for a language and challenge text.
pub fn liveness_path(language_code: &str, text: &str) -> String {
    format!(
        "{}/{}/{}",
        LIVENESS_PATH,
        encode_segment(language_code),
        encode_segment(text)
    )
}

/// Replaces spaces with dashes and truncates to [`MAX_CANCEL_REASON`]
/// characters. An empty reason becomes `"Unknown"`.
pub fn sanitize_cancel_reason(reason: &str) -> String {
    if reason.is_empty() {
        return "Unknown".to_string();
    }
    reason
        .replace(' ', "-")
        .chars()
        .take(MAX_CANCEL_REASON)
        .collect()
}

// ================== Enrollment ==================

/// Sub-population used to pick the enrollment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Parses `m`/`male` and `f`/`female` (case-insensitive).
    pub fn parse(s: &str) -> Gender {
        match s.to_ascii_lowercase().as_str() {
            "m" | "male" => Gender::Male,
            "f" | "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    /// Returns the single-letter token used in the start path.
    pub fn token(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
            Gender::Unknown => "u",
        }
    }
}

/// Enrollment flow: builds a voiceprint for one client id.
#[derive(Debug, Clone, Default)]
pub struct Enrollment {
    pub client_id: String,
    pub gender: Gender,
}

impl Enrollment {
    pub fn new(client_id: impl Into<String>, gender: Gender) -> Self {
        Self {
            client_id: client_id.into(),
            gender,
        }
    }
}

impl FlowPolicy for Enrollment {
    const NAME: &'static str = "Enrollment";
    const PROFILE_PATH: &'static str = "/1/sve/Enrollment/Profile";
    const PROCESS_PATH: &'static str = "/1/sve/Enrollment";
    const OVERRIDE_TOKEN_ON: Option<Exchange> = Some(Exchange::Start);

    fn selector(&self) -> String {
        self.client_id.clone()
    }

    fn start_path(&self, selector: &str) -> String {
        format!(
            "/1/sve/Enrollment/{}/{}",
            encode_segment(selector),
            self.gender.token()
        )
    }

    fn error_table(&self) -> ErrorTable {
        ENROLL_ERRORS
    }

    fn profile_kind(&self, _profile_type: Option<u32>) -> ProfileKind {
        ProfileKind::Enroll
    }

    fn wire_profile<'a>(&self, response: &'a WireResponse) -> Option<&'a WireProfile> {
        response.enroll_profile.as_ref()
    }

    fn wire_results<'a>(
        &self,
        response: &'a WireResponse,
    ) -> Option<&'a BTreeMap<String, WireInstance>> {
        response.enroll_results.as_ref()
    }

    fn instance_result(&self, wire: &WireInstance, profile: Option<&Profile>) -> InstanceResult {
        let minimum = profile.map(|p| p.required_speech_seconds).unwrap_or(0.0);
        let (result, extracted, trained) = match (wire.seconds_extracted, wire.seconds_trained) {
            (Some(extracted), _) if extracted >= minimum => (SpeechResult::Success, extracted, 0.0),
            (Some(extracted), _) => (SpeechResult::NeedMore, extracted, 0.0),
            (None, Some(trained)) => (SpeechResult::Success, 0.0, trained),
            (None, None) => (SpeechResult::Invalid, 0.0, 0.0),
        };
        InstanceResult {
            index: wire.index,
            error_code: wire.error.unwrap_or(0),
            speech_extracted: extracted,
            speech_trained: trained,
            result,
            extra: wire.extra.clone(),
            ..Default::default()
        }
    }

    fn absorb(
        &mut self,
        results: &BTreeMap<String, InstanceResult>,
        exchange: Exchange,
        state: &mut SessionState,
    ) -> Option<SpeechResult> {
        let selected = results
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(&self.client_id))
            .map(|(_, r)| r);
        let Some(result) = selected else {
            debug!("Enrollment.absorb(): no result for {}", self.client_id);
            state.set_speech_extracted(0.0);
            state.set_speech_trained(0.0);
            return Some(SpeechResult::Unknown);
        };
        match exchange {
            Exchange::Terminal => state.set_speech_trained(result.speech_trained),
            _ => state.set_speech_extracted(result.speech_extracted),
        }
        Some(result.result)
    }
}

// ================== Verification ==================

/// Verification flow: 1:1 match against a claimed client id.
#[derive(Debug, Clone, Default)]
pub struct Verification {
    pub client_id: String,
}

impl Verification {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl FlowPolicy for Verification {
    const NAME: &'static str = "Verification";
    const PROFILE_PATH: &'static str = "/1/sve/Verification/Profile";
    const PROCESS_PATH: &'static str = "/1/sve/Verification";
    const LIVENESS: bool = true;
    const OVERRIDE_TOKEN_ON: Option<Exchange> = Some(Exchange::Terminal);

    fn selector(&self) -> String {
        self.client_id.clone()
    }

    fn start_path(&self, selector: &str) -> String {
        format!("/1/sve/Verification/{}", encode_segment(selector))
    }

    fn error_table(&self) -> ErrorTable {
        VERIFY_ERRORS
    }

    fn profile_kind(&self, profile_type: Option<u32>) -> ProfileKind {
        ProfileKind::from_verify_code(profile_type.unwrap_or(0))
    }

    fn wire_profile<'a>(&self, response: &'a WireResponse) -> Option<&'a WireProfile> {
        response.verify_profile.as_ref()
    }

    fn wire_results<'a>(
        &self,
        response: &'a WireResponse,
    ) -> Option<&'a BTreeMap<String, WireInstance>> {
        response.verify_results.as_ref()
    }

    fn instance_result(&self, wire: &WireInstance, profile: Option<&Profile>) -> InstanceResult {
        scored_instance(wire, profile)
    }

    fn absorb(
        &mut self,
        results: &BTreeMap<String, InstanceResult>,
        _exchange: Exchange,
        state: &mut SessionState,
    ) -> Option<SpeechResult> {
        let result = results.get(&self.client_id).or_else(|| {
            results
                .iter()
                .find(|(id, _)| id.eq_ignore_ascii_case(&self.client_id))
                .map(|(_, r)| r)
        })?;
        state.set_score(result.score);
        state.set_speech_extracted(result.speech_extracted);
        Some(result.result)
    }

    fn compound(&self, raw: SpeechResult, state: &SessionState) -> SpeechResult {
        classify::compound_liveness(raw, state.is_liveness_required(), state.liveness())
    }
}

// ================== Identification ==================

/// Identification flow: 1:N match against a candidate set.
#[derive(Debug, Clone, Default)]
pub struct Identification {
    pub probable_id: String,
    pub possible_ids: Vec<String>,
    identified_id: String,
}

impl Identification {
    pub fn new<I, S>(probable_id: impl Into<String>, possible_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            probable_id: probable_id.into(),
            possible_ids: possible_ids
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
            identified_id: String::new(),
        }
    }

    /// Replaces the candidate set from a comma-separated list.
    pub fn set_possible_ids(&mut self, ids: &str) {
        self.possible_ids = ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Most likely client id, without any grouped candidates after `$`.
    pub fn probable_client_id(&self) -> &str {
        match self.probable_id.split_once('$') {
            Some((id, _)) => id,
            None => &self.probable_id,
        }
    }

    /// Id of the sole identity returned by the last exchange.
    pub fn identified_id(&self) -> &str {
        &self.identified_id
    }
}

impl FlowPolicy for Identification {
    const NAME: &'static str = "Identification";
    const PROFILE_PATH: &'static str = "/1/sve/Verification/Profile";
    const PROCESS_PATH: &'static str = "/1/sve/Verification";

    /// `probable$possible1,possible2`; a probable id already containing `$`
    /// is used verbatim.
    fn selector(&self) -> String {
        let mut selector = self.probable_id.clone();
        if selector.contains('$') {
            return selector;
        }
        if !self.possible_ids.is_empty() {
            if !selector.is_empty() {
                selector.push('$');
            }
            selector.push_str(&self.possible_ids.join(","));
        }
        selector
    }

    fn audio_label(&self) -> String {
        self.possible_ids.join(",")
    }

    fn start_path(&self, selector: &str) -> String {
        format!("/1/sve/Verification/{}", encode_segment(selector))
    }

    fn error_table(&self) -> ErrorTable {
        IDENTIFY_ERRORS
    }

    fn profile_kind(&self, profile_type: Option<u32>) -> ProfileKind {
        ProfileKind::from_identify_code(profile_type.unwrap_or(0))
    }

    fn wire_profile<'a>(&self, response: &'a WireResponse) -> Option<&'a WireProfile> {
        response.verify_profile.as_ref()
    }

    fn wire_results<'a>(
        &self,
        response: &'a WireResponse,
    ) -> Option<&'a BTreeMap<String, WireInstance>> {
        response.verify_results.as_ref()
    }

    fn instance_result(&self, wire: &WireInstance, profile: Option<&Profile>) -> InstanceResult {
        scored_instance(wire, profile)
    }

    fn absorb(
        &mut self,
        results: &BTreeMap<String, InstanceResult>,
        _exchange: Exchange,
        state: &mut SessionState,
    ) -> Option<SpeechResult> {
        if results.len() != 1 {
            return None;
        }
        let (id, result) = results.iter().next()?;
        self.identified_id = id.clone();
        state.set_score(result.score);
        state.set_speech_extracted(result.speech_extracted);
        Some(result.result)
    }

    fn reset(&mut self) {
        self.identified_id.clear();
    }
}

/// Builds a verification-style result: the server status when it sent a
/// recognized one, otherwise the score against the profile thresholds.
fn scored_instance(wire: &WireInstance, profile: Option<&Profile>) -> InstanceResult {
    let score = wire.score.unwrap_or(0.0);
    let status = wire
        .status
        .as_deref()
        .and_then(|s| s.chars().next())
        .map(SpeechResult::from_status);
    let result = match status {
        Some(status) if status != SpeechResult::Unknown => status,
        _ => profile
            .map(|p| classify::classify(score, p))
            .unwrap_or(SpeechResult::Unknown),
    };
    InstanceResult {
        index: wire.index,
        error_code: wire.error.unwrap_or(0),
        score,
        speech_extracted: wire.seconds_extracted.unwrap_or(0.0),
        speech_trained: 0.0,
        status,
        result,
        overridable: wire.overridable,
        authorized: wire.authorized,
        extra: wire.extra.clone(),
    }
}
