//! The session engine shared by all three flows.
//!
//! [`SessionEngine`] drives one session through Prefetch, Start, Post and a
//! terminal call (train or summarize), or aborts it with Cancel. Every
//! operation resolves to a value: transport failures become
//! [`SpeechResult::Timeout`], malformed responses become
//! [`SpeechResult::Invalid`], and server errors are mapped through the
//! flow's error table.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    audio::{Channel, Pcm, wav},
    classify,
    client::{Config, header},
    content::ContentAccumulator,
    context::SpeechContext,
    cookie::CookieJar,
    error::Result,
    flow::{self, Enrollment, Exchange, FlowPolicy, Identification, Verification},
    http::{Method, Request, Response, Transport},
    profile::{Profile, ProfileStore},
    result::{AliveResult, InstanceResult, SpeechResult},
    state::SessionState,
    wire::WireResponse,
};

const JSON_MEDIA_TYPE: &str = "application/json";
const MAX_FEEDBACK_COMMENTS: usize = 256;

/// Values accepted as session metadata.
pub trait MetaValue {
    fn to_meta(&self) -> String;
}

impl MetaValue for bool {
    fn to_meta(&self) -> String {
        let value = if *self { "1" } else { "0" };
        value.to_string()
    }
}

impl MetaValue for &str {
    fn to_meta(&self) -> String {
        (*self).to_string()
    }
}

impl MetaValue for String {
    fn to_meta(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_meta_value_display {
    ($($t:ty),*) => {
        $(impl MetaValue for $t {
            fn to_meta(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_meta_value_display!(i32, i64, u32, u64, f32, f64);

/// One voice-biometrics session for the flow `P`.
///
/// At most one operation runs at a time (`&mut self`); wrap the engine in
/// [`SharedSession`](crate::SharedSession) to share it across tasks.
pub struct SessionEngine<P: FlowPolicy> {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    policy: P,
    state: SessionState,
    profiles: ProfileStore,
    content: ContentAccumulator,
    results: BTreeMap<String, InstanceResult>,
    metadata: BTreeMap<String, String>,
    extra_data: BTreeMap<String, serde_json::Value>,
    cookies: CookieJar,
    raw_result: SpeechResult,
    interaction_id: String,
    interaction_tag: String,
    auth_token: String,
}

impl<P: FlowPolicy> SessionEngine<P> {
    /// Creates an engine over a shared configuration and transport.
    pub fn new(config: Arc<Config>, transport: Arc<dyn Transport>, policy: P) -> Self {
        Self {
            config,
            transport,
            policy,
            state: SessionState::new(),
            profiles: ProfileStore::new(),
            content: ContentAccumulator::new(),
            results: BTreeMap::new(),
            metadata: BTreeMap::new(),
            extra_data: BTreeMap::new(),
            cookies: CookieJar::new(),
            raw_result: SpeechResult::NeedMore,
            interaction_id: String::new(),
            interaction_tag: String::new(),
            auth_token: String::new(),
        }
    }

    // ---------- accessors ----------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the flow parameters (client id, candidates, gender).
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Per-identity results of the last process or terminal exchange.
    pub fn results(&self) -> &BTreeMap<String, InstanceResult> {
        &self.results
    }

    /// Free-form `result.data` returned by the last exchange.
    pub fn extra_data(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.extra_data
    }

    /// Result before liveness compounding.
    pub fn raw_result(&self) -> SpeechResult {
        self.raw_result
    }

    /// Result of the session so far.
    pub fn result(&self) -> SpeechResult {
        self.policy.compound(self.raw_result, &self.state)
    }

    pub fn progress(&self) -> u32 {
        self.state.progress()
    }

    pub fn session_id(&self) -> &str {
        self.state.session_id()
    }

    pub fn is_session_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_session_closing(&self) -> bool {
        self.state.is_closing()
    }

    /// Number of parts queued for the next post.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    pub fn set_interaction_id(&mut self, id: impl Into<String>) {
        self.interaction_id = id.into();
    }

    pub fn interaction_tag(&self) -> &str {
        &self.interaction_tag
    }

    pub fn set_interaction_tag(&mut self, tag: impl Into<String>) {
        self.interaction_tag = tag.into();
    }

    /// Sets the token sent as `Vv-Override-Token`.
    ///
    /// Enrollment sends it on start and verification on summarize;
    /// identification never sends it.
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = token.into();
    }

    /// Queues a `Meta-{name}` header for the next start, post or terminal
    /// call.
    pub fn set_meta_data(&mut self, name: &str, value: impl MetaValue) {
        self.metadata
            .insert(format!("{}{}", header::META_PREFIX, name), value.to_meta());
    }

    /// Queues operator feedback about the session.
    ///
    /// Comments default to `N/A` and are cut to 256 characters.
    pub fn set_feedback(
        &mut self,
        break_attempt: bool,
        recording: bool,
        background_noise: bool,
        comments: &str,
    ) {
        let comments = if comments.is_empty() {
            "N/A".to_string()
        } else {
            comments.chars().take(MAX_FEEDBACK_COMMENTS).collect()
        };

        for (name, value) in [
            (header::FEEDBACK_BREAK_ATTEMPT, break_attempt.to_meta()),
            (header::FEEDBACK_RECORDING, recording.to_meta()),
            (header::FEEDBACK_BACKGROUND_NOISE, background_noise.to_meta()),
            (header::FEEDBACK_COMMENTS, comments),
        ] {
            self.metadata.insert(name.to_string(), value.clone());
            self.set_meta_data(name, value);
        }
    }

    /// Pending metadata headers.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    // ---------- content ----------

    /// Queues audio as a mono snippet in the session codec.
    pub fn append(&mut self, pcm: &Pcm) -> bool {
        let filename = self.audio_name();
        self.content.append(pcm, filename, &mut self.state)
    }

    /// Queues audio as a stereo PCM snippet in the channel's slot.
    pub fn append_stereo(&mut self, pcm: &Pcm, channel: Channel) -> bool {
        let filename = self.audio_name();
        self.content
            .append_stereo(pcm, channel, filename, &mut self.state)
    }

    /// Decodes a WAV file and queues it as a mono snippet.
    pub fn append_wav(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        if !self.state.is_open() {
            return Ok(false);
        }
        debug!("{}.append_wav(): Filename: {}", P::NAME, path.as_ref().display());
        let pcm = wav::read_file(path)?;
        Ok(self.append(&pcm))
    }

    /// Queues speech contexts for the next post.
    ///
    /// On flows with liveness checking this marks liveness as required.
    pub fn append_contexts<I>(&mut self, contexts: I) -> bool
    where
        I: IntoIterator<Item = SpeechContext>,
    {
        if !self.state.is_open() {
            return false;
        }
        for context in contexts {
            self.content.push_context(context);
        }
        if P::LIVENESS {
            self.state.require_liveness();
        }
        true
    }

    fn audio_name(&self) -> String {
        let mut name = String::new();
        if !self.interaction_id.is_empty() {
            name.push_str(&self.interaction_id);
            name.push('-');
        }
        format!(
            "{}{}-{}-{}.raw",
            name,
            self.policy.audio_label(),
            self.state.total_process_calls(),
            self.content.len()
        )
    }

    // ---------- lifecycle ----------

    fn reset(&mut self) {
        self.state.reset();
        self.profiles.clear();
        self.content.clear();
        self.results.clear();
        self.extra_data.clear();
        self.metadata.clear();
        self.cookies = CookieJar::new();
        self.raw_result = SpeechResult::NeedMore;
        self.policy.reset();
    }

    /// Fetches the session profile without opening a session.
    pub async fn prefetch_profile(&mut self) -> Option<Profile> {
        self.reset();

        debug!("{}.prefetch_profile(): URI: {}", P::NAME, P::PROFILE_PATH);
        let request = self.build_request(Exchange::Profile, Method::Post, P::PROFILE_PATH.to_string());
        if self.exchange(Exchange::Profile, request).await {
            self.profiles.last().cloned()
        } else {
            None
        }
    }

    /// Opens a session for the configured identity.
    pub async fn start(&mut self) -> bool {
        self.reset();

        let selector = self.policy.selector();
        if selector.is_empty() {
            error!("{}.start(): Missing ClientId", P::NAME);
            self.raw_result = SpeechResult::Invalid;
            return false;
        }

        let path = self.policy.start_path(&selector);
        debug!("{}.start(): URI: {}", P::NAME, path);
        let request = self.build_request(Exchange::Start, Method::Post, path);
        self.exchange(Exchange::Start, request).await
    }

    /// Uploads the queued content and classifies the response.
    ///
    /// Posting with nothing queued is rejected without a network call.
    pub async fn post(&mut self) -> SpeechResult {
        if !self.state.is_open() {
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }
        if self.content.is_empty() {
            error!("{}.post(): No content to post", P::NAME);
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }

        debug!("{}.post(): URI: {}", P::NAME, P::PROCESS_PATH);
        self.process(P::PROCESS_PATH.to_string()).await
    }

    /// Decodes a WAV file, queues it and posts.
    pub async fn post_wav(&mut self, path: impl AsRef<Path>) -> Result<SpeechResult> {
        self.append_wav(path)?;
        Ok(self.post().await)
    }

    async fn process(&mut self, path: String) -> SpeechResult {
        self.results.clear();
        let mut request = self.build_request(Exchange::Process, Method::Post, path);
        request.body = Some(self.content.take_parts());
        self.state.record_process_call();
        self.exchange(Exchange::Process, request).await;
        self.result()
    }

    /// Closes the session with the flow's terminal call (train or
    /// summarize).
    pub async fn terminal(&mut self) -> SpeechResult {
        if !self.state.is_open() {
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }

        self.state.begin_closing();
        self.content.clear();
        self.results.clear();

        debug!("{}.terminal(): URI: {}", P::NAME, P::PROCESS_PATH);
        let request = self.build_request(Exchange::Terminal, Method::Delete, P::PROCESS_PATH.to_string());
        self.exchange(Exchange::Terminal, request).await;
        self.result()
    }

    /// Aborts the session.
    ///
    /// The reason is sanitized into the path. Any 2xx response closes the
    /// session regardless of its body.
    pub async fn cancel(&mut self, reason: &str) -> bool {
        if !self.state.is_open() {
            self.raw_result = SpeechResult::Invalid;
            return false;
        }

        self.state.begin_closing();
        self.content.clear();
        self.results.clear();

        let path = flow::cancel_path(reason);
        debug!("{}.cancel(): URI: {}", P::NAME, path);
        let request = self.build_request(Exchange::Cancel, Method::Delete, path);
        self.exchange(Exchange::Cancel, request).await
    }

    // ---------- exchange ----------

    fn build_request(&mut self, exchange: Exchange, method: Method, path: String) -> Request {
        let mut request = Request::new(method, path);

        match exchange {
            Exchange::Profile | Exchange::Start => {
                request.push_header(header::DEVELOPER_KEY, self.config.developer_key());
                request.push_header(header::APPLICATION_KEY, self.config.application_key());
                if !self.interaction_id.is_empty() {
                    request.push_header(header::INTERACTION_ID, self.interaction_id.as_str());
                }
                if !self.interaction_tag.is_empty() {
                    request.push_header(header::INTERACTION_TAG, self.interaction_tag.as_str());
                }
                let source = self.config.application_source();
                if !source.is_empty() {
                    request.push_header(header::INTERACTION_SOURCE, source);
                    request.push_header(header::APP_VERSION_ID, source);
                }
                let agent = self.config.user_agent();
                if !agent.is_empty() {
                    request.push_header(header::INTERACTION_AGENT, agent);
                }
                if exchange == Exchange::Start {
                    self.drain_metadata(&mut request);
                    self.push_override_token(exchange, &mut request);
                }
            }
            Exchange::Process | Exchange::Terminal => {
                request.push_header(header::SESSION_ID, self.state.session_id());
                self.drain_metadata(&mut request);
                self.push_override_token(exchange, &mut request);
            }
            Exchange::Cancel => {
                request.push_header(header::SESSION_ID, self.state.session_id());
            }
        }

        if let Some(cookie) = self.cookies.header() {
            request.push_header(header::COOKIE, cookie);
        }

        for (name, value) in &request.headers {
            debug!("{}: {}", name, value);
        }
        request
    }

    fn push_override_token(&self, exchange: Exchange, request: &mut Request) {
        if P::OVERRIDE_TOKEN_ON == Some(exchange) && !self.auth_token.is_empty() {
            request.push_header(header::OVERRIDE_TOKEN, self.auth_token.as_str());
        }
    }

    fn drain_metadata(&mut self, request: &mut Request) {
        for (name, value) in std::mem::take(&mut self.metadata) {
            request.push_header(name, value);
        }
    }

    async fn exchange(&mut self, exchange: Exchange, request: Request) -> bool {
        let path = request.path.clone();
        match self.transport.exchange(request).await {
            Ok(response) => self.handle_response(exchange, &path, response),
            Err(e) => {
                error!("{}.{:?}(): {}", P::NAME, exchange, e);
                self.raw_result = SpeechResult::Timeout;
                false
            }
        }
    }

    fn handle_response(&mut self, exchange: Exchange, path: &str, response: Response) -> bool {
        self.extra_data.clear();
        self.content.clear();

        for value in response.header_values(header::SET_COOKIE) {
            debug!("{}: {}", header::SET_COOKIE, value);
            self.cookies.merge(value);
        }

        debug!("{}.handle_response(): Http Status Code: {}", P::NAME, response.status);

        if !response.is_success() {
            return self.handle_error(path, &response);
        }

        if exchange == Exchange::Cancel {
            self.state.close();
            return true;
        }

        let session_id = if exchange == Exchange::Start {
            match response.header(header::SESSION_ID).filter(|id| !id.is_empty()) {
                Some(id) => Some(id.to_string()),
                None => {
                    error!(
                        "{}.handle_response(): Invalid start response, no {}",
                        P::NAME,
                        header::SESSION_ID
                    );
                    self.raw_result = SpeechResult::Invalid;
                    return false;
                }
            }
        } else {
            None
        };

        let Some(body) = Self::parse_body(&response) else {
            self.raw_result = SpeechResult::Invalid;
            return false;
        };

        match exchange {
            Exchange::Profile => self.absorb_profile(&body),
            Exchange::Start => {
                if !self.absorb_profile(&body) {
                    return false;
                }
                if let Some(id) = session_id {
                    self.state.open(&id);
                }
                self.absorb_data(&body);
                true
            }
            Exchange::Process | Exchange::Terminal => {
                self.absorb_results(&body, exchange);
                if exchange == Exchange::Terminal {
                    self.state.close();
                }
                true
            }
            Exchange::Cancel => true,
        }
    }

    fn handle_error(&mut self, path: &str, response: &Response) -> bool {
        let body: Option<WireResponse> = serde_json::from_slice(&response.body).ok();
        let code = body.as_ref().and_then(|b| b.error);
        let description = body.as_ref().and_then(|b| b.description.clone());

        let mapped = self.policy.error_table().map(code);
        self.raw_result = classify::apply_soft_loud_override(mapped, &mut self.state);

        error!(
            "{}.handle_response(): Error detected. Uri: {}, Result: {}, Code: {}, Description: {}",
            P::NAME,
            path,
            self.raw_result,
            code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
            description.unwrap_or_default()
        );
        false
    }

    fn parse_body(response: &Response) -> Option<WireResponse> {
        match response.media_type() {
            Some(JSON_MEDIA_TYPE) => {}
            other => {
                error!(
                    "handle_response(): Expected Content Type: '{}'. Actual Content Type: '{}'",
                    JSON_MEDIA_TYPE,
                    other.unwrap_or("Empty")
                );
                return None;
            }
        }
        if response.body.is_empty() {
            error!("handle_response(): Expected Content Data: Length 0");
            return None;
        }

        debug!(
            "handle_response(): Http Content: {}",
            String::from_utf8_lossy(&response.body)
        );
        match serde_json::from_slice(&response.body) {
            Ok(body) => Some(body),
            Err(e) => {
                error!("handle_response(): {}", e);
                None
            }
        }
    }

    fn absorb_profile(&mut self, body: &WireResponse) -> bool {
        let Some(wire) = self.policy.wire_profile(body) else {
            return true;
        };
        let profile = self.policy.profile(wire);
        if self.profiles.add(profile, &mut self.state).is_none() {
            self.raw_result = SpeechResult::Invalid;
            return false;
        }
        true
    }

    fn absorb_results(&mut self, body: &WireResponse, exchange: Exchange) {
        if let Some(wire_results) = self.policy.wire_results(body) {
            for (id, wire) in wire_results {
                let instance = self
                    .policy
                    .instance_result(wire, self.profiles.get(wire.index));

                debug!("{}: {} - Index: {}", P::NAME, id, instance.index);
                debug!("{}: {} - Error: {}", P::NAME, id, instance.error_code);
                debug!("{}: {} - Score: {}", P::NAME, id, instance.score);
                debug!("{}: {} - SpeechExtracted: {}", P::NAME, id, instance.speech_extracted);
                debug!("{}: {} - Result: {}", P::NAME, id, instance.result);

                if let Some(overridable) = instance.overridable {
                    self.state.set_overridable(overridable);
                }
                if let Some(authorized) = instance.authorized {
                    self.state.set_authorized(authorized);
                }
                self.results.insert(id.clone(), instance);
            }

            if let Some(result) = self.policy.absorb(&self.results, exchange, &mut self.state) {
                self.raw_result = result;
            }
        }

        if P::LIVENESS {
            if let Some(liveness) = &body.liveness {
                let alive = if liveness.is_alive == Some(true) {
                    AliveResult::Alive
                } else {
                    AliveResult::NotAlive
                };
                self.state.set_liveness(alive);
            }
        }

        self.absorb_data(body);
    }

    fn absorb_data(&mut self, body: &WireResponse) {
        if let Some(data) = &body.data {
            self.extra_data
                .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

// ================== Flow-specific operations ==================

impl SessionEngine<Enrollment> {
    /// Closes the enrollment session and trains the voiceprint.
    pub async fn train(&mut self) -> SpeechResult {
        self.terminal().await
    }

    /// Seconds of speech trained into the voiceprint.
    pub fn speech_trained(&self) -> f64 {
        self.state.speech_trained()
    }
}

impl SessionEngine<Verification> {
    /// Closes the verification session and summarizes its outcome.
    pub async fn summarize(&mut self) -> SpeechResult {
        self.terminal().await
    }

    /// Posts queued content against a liveness challenge.
    ///
    /// Both the language code and the challenge text are required.
    pub async fn post_liveness(&mut self, language_code: &str, text: &str) -> SpeechResult {
        if language_code.is_empty() {
            error!("Verification.post_liveness(): Missing Language Code");
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }
        if text.is_empty() {
            error!("Verification.post_liveness(): Missing Liveness Text");
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }
        if !self.state.is_open() {
            self.raw_result = SpeechResult::Invalid;
            return self.result();
        }

        self.state.require_liveness();
        let path = flow::liveness_path(language_code, text);
        debug!("Verification.post_liveness(): URI: {}", path);
        self.process(path).await
    }

    /// Score of the claimed identity.
    pub fn score(&self) -> f64 {
        self.state.score()
    }

    /// True when the claimed identity passed and, if liveness was required,
    /// the speaker was found alive.
    pub fn is_verified(&self) -> bool {
        self.raw_result == SpeechResult::Pass
            && (!self.state.is_liveness_required() || self.state.liveness() == AliveResult::Alive)
    }

    /// True once a scored outcome (pass, ambiguous or fail) is available.
    pub fn has_result(&self) -> bool {
        matches!(
            self.raw_result,
            SpeechResult::Pass | SpeechResult::Ambiguous | SpeechResult::Fail
        )
    }

    pub fn liveness_result(&self) -> AliveResult {
        self.state.liveness()
    }

    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }

    pub fn is_overridable(&self) -> bool {
        self.state.is_overridable()
    }
}

impl SessionEngine<Identification> {
    /// Closes the identification session and summarizes its outcome.
    pub async fn summarize(&mut self) -> SpeechResult {
        self.terminal().await
    }

    /// Id of the sole identity the server returned.
    pub fn identified_id(&self) -> &str {
        self.policy.identified_id()
    }

    pub fn identified_score(&self) -> f64 {
        self.state.score()
    }

    /// True when exactly one identity came back and it passed.
    pub fn is_identified(&self) -> bool {
        self.raw_result == SpeechResult::Pass && !self.policy.identified_id().is_empty()
    }

    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::audio::Format;
    use crate::error::Error;
    use crate::flow::Gender;

    #[derive(Default)]
    struct Scripted {
        responses: Mutex<Vec<Result<Response>>>,
        requests: Mutex<Vec<Request>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Response>>) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn exchange(&self, request: Request) -> Result<Response> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_string())))
        }
    }

    fn config() -> Arc<Config> {
        Arc::new(Config::builder("dk", "ak").build_config().unwrap())
    }

    fn start_response() -> Response {
        Response::json(
            200,
            r#"{"profile.enroll": {"index": 1, "codec": "p", "min_seconds_of_speech": 4}}"#,
        )
        .with_header("Vv-Session-Id", "s-1")
        .with_header("Set-Cookie", "route=a; Path=/")
    }

    fn audio() -> Pcm {
        Pcm::new(Format::MONO_8K, vec![100; 800])
    }

    #[tokio::test]
    async fn test_enroll_session() {
        let transport = Scripted::new(vec![
            Ok(start_response()),
            Ok(Response::json(
                200,
                r#"{"result.enroll": {"alice": {"error": 0, "index": 1, "seconds_extracted": 4.5}}}"#,
            )),
            Ok(Response::json(
                200,
                r#"{"result.enroll": {"alice": {"error": 0, "index": 1, "seconds_trained": 4.5}}}"#,
            )),
        ]);
        let mut engine = SessionEngine::new(
            config(),
            transport.clone(),
            Enrollment::new("Alice", Gender::Female),
        );

        assert!(engine.start().await);
        assert!(engine.is_session_open());
        assert!(engine.append(&audio()));
        assert_eq!(engine.post().await, SpeechResult::Success);
        assert_eq!(engine.progress(), 100);
        assert_eq!(engine.train().await, SpeechResult::Success);
        assert_eq!(engine.speech_trained(), 4.5);
        assert!(!engine.is_session_open());

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/1/sve/Enrollment/Alice/f");
        assert_eq!(requests[1].header("Vv-Session-Id"), Some("s-1"));
        assert_eq!(requests[1].header("Cookie"), Some("route=a"));
        assert_eq!(requests[2].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_not_open_is_invalid_without_network() {
        let transport = Scripted::new(vec![]);
        let mut engine = SessionEngine::new(config(), transport.clone(), Verification::new("bob"));

        assert_eq!(engine.post().await, SpeechResult::Invalid);
        assert_eq!(engine.terminal().await, SpeechResult::Invalid);
        assert!(!engine.cancel("stop").await);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_timeout() {
        let transport = Scripted::new(vec![Err(Error::Transport("down".to_string()))]);
        let mut engine = SessionEngine::new(config(), transport, Verification::new("bob"));
        assert!(!engine.start().await);
        assert_eq!(engine.result(), SpeechResult::Timeout);
        assert!(!engine.is_session_open());
    }

    #[test]
    fn test_feedback_metadata() {
        let mut engine = SessionEngine::new(config(), Scripted::new(vec![]), Verification::new("bob"));
        engine.set_feedback(false, false, true, "");
        engine.set_meta_data("Attempt", 3);

        let meta = engine.metadata();
        assert_eq!(meta["Feedback-BackgroundNoise"], "1");
        assert_eq!(meta["Feedback-Recording"], "0");
        assert_eq!(meta["Meta-Feedback-BackgroundNoise"], "1");
        assert_eq!(meta["Feedback-Comments"], "N/A");
        assert_eq!(meta["Meta-Attempt"], "3");
    }
}
