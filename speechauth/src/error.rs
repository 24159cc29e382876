//! Error types for the speech authorization client.
//!
//! Engine operations never return these. A failed exchange is folded into a
//! [`SpeechResult`](crate::SpeechResult) on the engine; `Error` only crosses
//! the collaborator seams (transport, audio decoding, configuration).

use thiserror::Error;

/// Result type alias for speech authorization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for speech authorization operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decoding error.
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    /// Sample rate conversion error.
    #[error("resample error: {0}")]
    Resample(String),

    /// Audio that cannot be converted into the session codec.
    #[error("unsupported audio: {0}")]
    UnsupportedAudio(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport failure reported by a non-HTTP transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<rubato::ResamplerConstructionError> for Error {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        Error::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for Error {
    fn from(e: rubato::ResampleError) -> Self {
        Error::Resample(e.to_string())
    }
}

impl Error {
    /// Returns true if the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if the error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Transport(_))
    }

    /// Returns true if the error came from audio decoding or conversion.
    pub fn is_audio(&self) -> bool {
        matches!(
            self,
            Error::Wav(_) | Error::Resample(_) | Error::UnsupportedAudio(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        let err = Error::Transport("connection reset".to_string());
        assert!(err.is_transport());
        assert!(!err.is_timeout());
        assert!(!err.is_audio());

        let err = Error::UnsupportedAudio("3 channels".to_string());
        assert!(err.is_audio());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Config("developer key must be non-empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: developer key must be non-empty"
        );
    }
}
