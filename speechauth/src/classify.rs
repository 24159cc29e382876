//! Score classification and server error mapping.

use crate::profile::Profile;
use crate::result::{AliveResult, SpeechResult};
use crate::state::SessionState;

/// Classifies a raw score against the profile thresholds.
///
/// Used only when the server supplied no pre-classified status. A score of
/// exactly zero means the snippet was not scored.
pub fn classify(score: f64, profile: &Profile) -> SpeechResult {
    if score == 0.0 {
        SpeechResult::NotScored
    } else if score >= profile.pass_threshold {
        SpeechResult::Pass
    } else if score <= profile.fail_threshold {
        SpeechResult::Fail
    } else {
        SpeechResult::Ambiguous
    }
}

/// Applies the sticky too-soft/too-loud flags to a mapped error result.
///
/// `TooSoft` and `TooLoud` raise their flag. `NeedMore` becomes whichever
/// flag is already raised, too-soft first.
pub fn apply_soft_loud_override(result: SpeechResult, state: &mut SessionState) -> SpeechResult {
    match result {
        SpeechResult::TooSoft => {
            state.mark_too_soft();
            result
        }
        SpeechResult::TooLoud => {
            state.mark_too_loud();
            result
        }
        SpeechResult::NeedMore if state.is_too_soft() => SpeechResult::TooSoft,
        SpeechResult::NeedMore if state.is_too_loud() => SpeechResult::TooLoud,
        _ => result,
    }
}

/// Compounds a verification result with the liveness outcome.
///
/// Without a liveness requirement the raw result is returned unchanged.
pub fn compound_liveness(raw: SpeechResult, required: bool, liveness: AliveResult) -> SpeechResult {
    if !required {
        return raw;
    }
    let alive = liveness == AliveResult::Alive;
    match raw {
        SpeechResult::Pass if alive => SpeechResult::PassIsAlive,
        SpeechResult::Pass => SpeechResult::PassNotAlive,
        SpeechResult::Ambiguous if alive => SpeechResult::AmbiguousIsAlive,
        SpeechResult::Ambiguous => SpeechResult::AmbiguousNotAlive,
        SpeechResult::Fail if alive => SpeechResult::FailIsAlive,
        SpeechResult::Fail => SpeechResult::FailNotAlive,
        SpeechResult::NeedMore => match liveness {
            AliveResult::Untested => SpeechResult::NeedMore,
            AliveResult::Alive => SpeechResult::NeedMoreIsAlive,
            AliveResult::NotAlive => SpeechResult::NeedMoreNotAlive,
        },
        other => other,
    }
}

/// Maps numeric server error codes to results for one flow.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTable(&'static [(u32, SpeechResult)]);

impl ErrorTable {
    /// Maps an error code by absolute value.
    ///
    /// Unmapped codes yield `Error`; a missing code yields `Unknown`.
    pub fn map(&self, code: Option<i32>) -> SpeechResult {
        let Some(code) = code else {
            return SpeechResult::Unknown;
        };
        let code = code.unsigned_abs();
        self.0
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, r)| *r)
            .unwrap_or(SpeechResult::Error)
    }
}

pub const ENROLL_ERRORS: ErrorTable = ErrorTable(&[
    (104, SpeechResult::LimitReached),
    (110, SpeechResult::Unauthorized),
    (303, SpeechResult::NeedMore),
    (311, SpeechResult::LimitReached),
    (318, SpeechResult::AlreadyEnrolled),
    (320, SpeechResult::TokenExists),
    (321, SpeechResult::TokenRequired),
    (325, SpeechResult::TooSoft),
    (326, SpeechResult::TooLoud),
]);

pub const VERIFY_ERRORS: ErrorTable = ErrorTable(&[
    (104, SpeechResult::LimitReached),
    (110, SpeechResult::Unauthorized),
    (403, SpeechResult::NeedMore),
    (410, SpeechResult::NotFound),
    (412, SpeechResult::LimitReached),
    (420, SpeechResult::BadEnrollment),
    (425, SpeechResult::TooSoft),
    (426, SpeechResult::TooLoud),
]);

pub const IDENTIFY_ERRORS: ErrorTable = VERIFY_ERRORS;
