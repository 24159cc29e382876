//! JSON payloads returned by the server.
//!
//! The server uses flat dotted keys (`"profile.verify"`, `"result.data"`).
//! Only the fields the session engine consumes are modeled; unknown
//! per-instance fields are kept in `extra`.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireResponse {
    #[serde(rename = "profile.enroll", default)]
    pub enroll_profile: Option<WireProfile>,
    #[serde(rename = "profile.verify", default)]
    pub verify_profile: Option<WireProfile>,
    #[serde(rename = "result.enroll", default)]
    pub enroll_results: Option<BTreeMap<String, WireInstance>>,
    #[serde(rename = "result.verify", default)]
    pub verify_results: Option<BTreeMap<String, WireInstance>>,
    #[serde(rename = "result.liveness", default)]
    pub liveness: Option<WireLiveness>,
    #[serde(rename = "result.data", default)]
    pub data: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub error: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One profile as sent by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireProfile {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub min_seconds_of_speech: Option<f64>,
    #[serde(rename = "type", default)]
    pub profile_type: Option<u32>,
    #[serde(default)]
    pub pass: Option<f64>,
    #[serde(default)]
    pub fail: Option<f64>,
}

/// Per-identity result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireInstance {
    #[serde(default)]
    pub error: Option<i32>,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub seconds_extracted: Option<f64>,
    #[serde(default)]
    pub seconds_trained: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub overridable: Option<bool>,
    #[serde(default)]
    pub authorized: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireLiveness {
    #[serde(default)]
    pub is_alive: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verify_response() {
        let body = r#"{
            "profile.verify": {"index": 3, "codec": "a", "min_seconds_of_speech": 4.5, "type": 2, "pass": 0.8, "fail": 0.3},
            "result.verify": {"bob": {"error": 0, "index": 3, "seconds_extracted": 2.0, "score": 0.91, "status": "P", "authorized": true, "gain": 1.5}},
            "result.liveness": {"is_alive": true},
            "result.data": {"session": "x"}
        }"#;
        let resp: WireResponse = serde_json::from_str(body).unwrap();

        let profile = resp.verify_profile.as_ref().unwrap();
        assert_eq!(profile.index, 3);
        assert_eq!(profile.codec, "a");
        assert_eq!(profile.profile_type, Some(2));
        assert_eq!(profile.pass, Some(0.8));

        let bob = &resp.verify_results.as_ref().unwrap()["bob"];
        assert_eq!(bob.score, Some(0.91));
        assert_eq!(bob.status.as_deref(), Some("P"));
        assert_eq!(bob.authorized, Some(true));
        assert_eq!(bob.overridable, None);
        assert_eq!(bob.extra["gain"], 1.5);

        assert_eq!(resp.liveness.as_ref().unwrap().is_alive, Some(true));
        assert_eq!(resp.data.as_ref().unwrap()["session"], "x");
        assert!(resp.enroll_results.is_none());
    }

    #[test]
    fn test_parse_enroll_response() {
        let body = r#"{
            "profile.enroll": {"index": 1, "codec": "pcm_little_endian", "min_seconds_of_speech": 20},
            "result.enroll": {"alice": {"error": 0, "index": 1, "seconds_extracted": 7.25}}
        }"#;
        let resp: WireResponse = serde_json::from_str(body).unwrap();
        let profile = resp.enroll_profile.as_ref().unwrap();
        assert_eq!(profile.min_seconds_of_speech, Some(20.0));
        assert_eq!(profile.profile_type, None);

        let alice = &resp.enroll_results.as_ref().unwrap()["alice"];
        assert_eq!(alice.seconds_extracted, Some(7.25));
        assert_eq!(alice.seconds_trained, None);
        assert!(alice.extra.is_empty());
    }

    #[test]
    fn test_parse_error_response() {
        let resp: WireResponse =
            serde_json::from_str(r#"{"error": -403, "description": "need more"}"#).unwrap();
        assert_eq!(resp.error, Some(-403));
        assert_eq!(resp.description.as_deref(), Some("need more"));
        assert!(resp.verify_profile.is_none());
    }
}
