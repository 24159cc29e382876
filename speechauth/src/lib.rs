//! Voice biometrics session client for Rust.
//!
//! This crate drives sessions against a remote voice-biometrics service.
//!
//! # Features
//!
//! - Enrollment: build a voiceprint for a client id
//! - Verification: 1:1 match against a claimed client id, with optional
//!   liveness challenges
//! - Identification: 1:N match against a candidate set
//! - Audio: WAV input resampled to 8kHz and encoded as A-law or PCM
//!
//! Every flow shares one lifecycle: negotiate a profile, start a session,
//! post one or more audio snippets, then close the session with a terminal
//! call (train or summarize) or cancel it. Operations never fail with an
//! error; each resolves to a [`SpeechResult`] kept on the engine.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use giztoy_speechauth::{Client, SpeechResult};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder("developer-key", "application-key").build()?;
//!
//!     let mut verifier = client.verifier("alice");
//!     if !verifier.start().await {
//!         println!("start failed: {}", verifier.result());
//!         return Ok(());
//!     }
//!
//!     verifier.append_wav("sample.wav")?;
//!     let result = verifier.post().await;
//!     if result == SpeechResult::NeedMore {
//!         println!("progress: {}%", verifier.progress());
//!     }
//!
//!     verifier.summarize().await;
//!     println!("verified: {}", verifier.is_verified());
//!     Ok(())
//! }
//! ```
//!
//! # Blocking use
//!
//! ```rust,no_run
//! use giztoy_speechauth::{BlockingSession, Client, Gender};
//!
//! let client = Client::builder("developer-key", "application-key").build()?;
//! let mut session = BlockingSession::new(client.enroller("alice", Gender::Female))?;
//! if session.start() {
//!     session.engine_mut().append_wav("sample.wav")?;
//!     session.post();
//!     session.terminal();
//! }
//! # Ok::<(), giztoy_speechauth::Error>(())
//! ```

mod adapters;
pub mod audio;
mod classify;
mod client;
mod content;
mod context;
mod cookie;
mod engine;
mod error;
mod flow;
pub mod http;
mod profile;
mod result;
mod state;
pub mod wire;

pub use adapters::{BlockingSession, SharedSession};
pub use audio::{Channel, Codec, Format, Pcm};
pub use classify::{
    ENROLL_ERRORS, ErrorTable, IDENTIFY_ERRORS, VERIFY_ERRORS, apply_soft_loud_override,
    classify, compound_liveness,
};
pub use client::{
    Client, ClientBuilder, Config, DEFAULT_APPLICATION_SOURCE, DEFAULT_SERVER, DEFAULT_TIMEOUT,
    Enroller, Identifier, Verifier, header,
};
pub use content::{AudioPart, ContentAccumulator, PartName};
pub use context::{SpeechContext, flags as context_flags};
pub use cookie::CookieJar;
pub use engine::{MetaValue, SessionEngine};
pub use error::{Error, Result};
pub use flow::{
    Enrollment, Exchange, FlowPolicy, Gender, Identification, MAX_CANCEL_REASON, Verification,
    sanitize_cancel_reason,
};
pub use profile::{Profile, ProfileKind, ProfileStore};
pub use result::{AliveResult, InstanceResult, SpeechResult};
pub use state::{Phase, SessionState};
