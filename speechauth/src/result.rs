//! Result taxonomy shared by the enrollment, verification and
//! identification flows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ================== Speech Result ==================

/// Outcome of a session operation.
///
/// One enum covers all three flows; each flow produces only its own subset:
///
/// - Enrollment: `Success`, `NeedMore`, `AlreadyEnrolled`, `TokenExists`,
///   `TokenRequired`, `TooSoft`, `TooLoud`, `LimitReached`, `Unauthorized`.
/// - Verification: `Pass`, `Ambiguous`, `Fail`, `NeedMore`, their liveness
///   compounds, `NotScored`, `TooSoft`, `TooLoud`, `LimitReached`,
///   `Unauthorized`, `NotFound`, `BadEnrollment`.
/// - Identification: as verification, without liveness compounds.
///
/// `Timeout`, `Invalid`, `Error` and `Unknown` are common to all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeechResult {
    Success,
    Pass,
    PassIsAlive,
    PassNotAlive,
    Ambiguous,
    AmbiguousIsAlive,
    AmbiguousNotAlive,
    Fail,
    FailIsAlive,
    FailNotAlive,
    #[default]
    NeedMore,
    NeedMoreIsAlive,
    NeedMoreNotAlive,
    NotScored,
    TooSoft,
    TooLoud,
    LimitReached,
    Unauthorized,
    NotFound,
    BadEnrollment,
    AlreadyEnrolled,
    TokenExists,
    TokenRequired,
    /// No response reached the client.
    Timeout,
    /// A local precondition failed or the response was malformed.
    Invalid,
    /// The server returned an error code with no specific meaning.
    Error,
    /// The server returned an error without a code.
    Unknown,
}

impl SpeechResult {
    /// Returns the result as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechResult::Success => "success",
            SpeechResult::Pass => "pass",
            SpeechResult::PassIsAlive => "pass_is_alive",
            SpeechResult::PassNotAlive => "pass_not_alive",
            SpeechResult::Ambiguous => "ambiguous",
            SpeechResult::AmbiguousIsAlive => "ambiguous_is_alive",
            SpeechResult::AmbiguousNotAlive => "ambiguous_not_alive",
            SpeechResult::Fail => "fail",
            SpeechResult::FailIsAlive => "fail_is_alive",
            SpeechResult::FailNotAlive => "fail_not_alive",
            SpeechResult::NeedMore => "need_more",
            SpeechResult::NeedMoreIsAlive => "need_more_is_alive",
            SpeechResult::NeedMoreNotAlive => "need_more_not_alive",
            SpeechResult::NotScored => "not_scored",
            SpeechResult::TooSoft => "too_soft",
            SpeechResult::TooLoud => "too_loud",
            SpeechResult::LimitReached => "limit_reached",
            SpeechResult::Unauthorized => "unauthorized",
            SpeechResult::NotFound => "not_found",
            SpeechResult::BadEnrollment => "bad_enrollment",
            SpeechResult::AlreadyEnrolled => "already_enrolled",
            SpeechResult::TokenExists => "token_exists",
            SpeechResult::TokenRequired => "token_required",
            SpeechResult::Timeout => "timeout",
            SpeechResult::Invalid => "invalid",
            SpeechResult::Error => "error",
            SpeechResult::Unknown => "unknown",
        }
    }

    /// Parses the one-letter status some servers pre-classify results with.
    ///
    /// Unrecognized letters yield `Unknown`.
    pub fn from_status(status: char) -> SpeechResult {
        match status {
            'P' => SpeechResult::Pass,
            'A' => SpeechResult::Ambiguous,
            'F' => SpeechResult::Fail,
            'M' => SpeechResult::NeedMore,
            'N' => SpeechResult::NotScored,
            _ => SpeechResult::Unknown,
        }
    }

    /// Returns true for the failure results that did not come from the
    /// server's business logic.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SpeechResult::Timeout
                | SpeechResult::Invalid
                | SpeechResult::Error
                | SpeechResult::Unknown
        )
    }
}

impl std::fmt::Display for SpeechResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ================== Liveness ==================

/// Outcome of the liveness challenge of a verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AliveResult {
    #[default]
    Untested,
    NotAlive,
    Alive,
}

// ================== Instance Result ==================

/// Per-identity outcome of one process or terminal exchange.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InstanceResult {
    /// Index of the profile the result was scored against.
    pub index: u32,
    pub error_code: i32,
    pub score: f64,
    pub speech_extracted: f64,
    pub speech_trained: f64,
    /// Pre-classified status supplied by the server, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SpeechResult>,
    pub result: SpeechResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(SpeechResult::from_status('P'), SpeechResult::Pass);
        assert_eq!(SpeechResult::from_status('A'), SpeechResult::Ambiguous);
        assert_eq!(SpeechResult::from_status('F'), SpeechResult::Fail);
        assert_eq!(SpeechResult::from_status('M'), SpeechResult::NeedMore);
        assert_eq!(SpeechResult::from_status('N'), SpeechResult::NotScored);
        assert_eq!(SpeechResult::from_status('p'), SpeechResult::Unknown);
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for r in [
            SpeechResult::PassIsAlive,
            SpeechResult::NeedMoreNotAlive,
            SpeechResult::TokenRequired,
            SpeechResult::Timeout,
        ] {
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.as_str()));
        }
    }

    #[test]
    fn test_is_failure() {
        assert!(SpeechResult::Timeout.is_failure());
        assert!(SpeechResult::Invalid.is_failure());
        assert!(!SpeechResult::Fail.is_failure());
        assert!(!SpeechResult::NeedMore.is_failure());
    }
}
