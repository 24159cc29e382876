//! Speech authorization API client.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    engine::SessionEngine,
    error::{Error, Result},
    flow::{Enrollment, Gender, Identification, Verification},
    http::{HttpTransport, Transport},
};

/// Default public server.
pub const DEFAULT_SERVER: &str = "https://public.v2ondemandapis.com";

/// Default application source, sent as `Interaction-Source` and
/// `App-Version-Id`.
pub const DEFAULT_APPLICATION_SOURCE: &str = "Dynamic.SpeechApi/2.0";

/// Default transport read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request and response header names.
pub mod header {
    pub const DEVELOPER_KEY: &str = "Developer-Key";
    pub const APPLICATION_KEY: &str = "Application-Key";
    pub const APP_VERSION_ID: &str = "App-Version-Id";
    pub const INTERACTION_ID: &str = "Interaction-Id";
    pub const INTERACTION_TAG: &str = "Interaction-Tag";
    pub const INTERACTION_SOURCE: &str = "Interaction-Source";
    pub const INTERACTION_AGENT: &str = "Interaction-Agent";
    pub const SESSION_ID: &str = "Vv-Session-Id";
    pub const OVERRIDE_TOKEN: &str = "Vv-Override-Token";
    pub const FEEDBACK_BREAK_ATTEMPT: &str = "Feedback-BreakAttempt";
    pub const FEEDBACK_RECORDING: &str = "Feedback-Recording";
    pub const FEEDBACK_BACKGROUND_NOISE: &str = "Feedback-BackgroundNoise";
    pub const FEEDBACK_COMMENTS: &str = "Feedback-Comments";
    pub const COOKIE: &str = "Cookie";
    pub const SET_COOKIE: &str = "Set-Cookie";
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// Prefix of metadata headers.
    pub const META_PREFIX: &str = "Meta-";
}

/// Enrollment session engine.
pub type Enroller = SessionEngine<Enrollment>;
/// Verification session engine.
pub type Verifier = SessionEngine<Verification>;
/// Identification session engine.
pub type Identifier = SessionEngine<Identification>;

/// Credentials and server settings shared by all sessions of a client.
#[derive(Debug, Clone)]
pub struct Config {
    developer_key: String,
    application_key: String,
    server: String,
    application_source: String,
    user_agent: String,
    timeout: Duration,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder(
        developer_key: impl Into<String>,
        application_key: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(developer_key, application_key)
    }

    pub fn developer_key(&self) -> &str {
        &self.developer_key
    }

    pub fn application_key(&self) -> &str {
        &self.application_key
    }

    /// Returns the server base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn application_source(&self) -> &str {
        &self.application_source
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Speech authorization API client.
///
/// The client hands out one engine per session; engines share the
/// configuration and transport but no mutable state.
///
/// # Example
///
/// ```rust,no_run
/// use giztoy_speechauth::{Client, Gender};
///
/// # async fn run() -> giztoy_speechauth::Result<()> {
/// let client = Client::builder("developer-key", "application-key").build()?;
/// let mut enroller = client.enroller("alice", Gender::Female);
/// if enroller.start().await {
///     enroller.append_wav("hello.wav")?;
///     enroller.post().await;
///     enroller.train().await;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a new client builder.
    pub fn builder(
        developer_key: impl Into<String>,
        application_key: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(developer_key, application_key)
    }

    /// Creates a client talking HTTP to the configured server.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.server.clone(), config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns an enrollment engine for the client id.
    pub fn enroller(&self, client_id: impl Into<String>, gender: Gender) -> Enroller {
        SessionEngine::new(
            self.config.clone(),
            self.transport.clone(),
            Enrollment::new(client_id, gender),
        )
    }

    /// Returns a verification engine for the claimed client id.
    pub fn verifier(&self, client_id: impl Into<String>) -> Verifier {
        SessionEngine::new(
            self.config.clone(),
            self.transport.clone(),
            Verification::new(client_id),
        )
    }

    /// Returns an identification engine over a candidate set.
    pub fn identifier<I, S>(&self, probable_id: impl Into<String>, possible_ids: I) -> Identifier
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SessionEngine::new(
            self.config.clone(),
            self.transport.clone(),
            Identification::new(probable_id, possible_ids),
        )
    }
}

/// Builder for [`Config`] and [`Client`].
pub struct ClientBuilder {
    developer_key: String,
    application_key: String,
    server: String,
    application_source: String,
    user_agent: String,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new builder with the default server and timeout.
    pub fn new(developer_key: impl Into<String>, application_key: impl Into<String>) -> Self {
        Self {
            developer_key: developer_key.into(),
            application_key: application_key.into(),
            server: DEFAULT_SERVER.to_string(),
            application_source: DEFAULT_APPLICATION_SOURCE.to_string(),
            user_agent: String::new(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    /// Sets a custom server base URL.
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.server = url.into();
        self
    }

    pub fn application_source(mut self, source: impl Into<String>) -> Self {
        self.application_source = source.into();
        self
    }

    /// Sets the agent string sent as `Interaction-Agent`.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Sets the transport read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a custom transport instead of HTTP.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configuration.
    pub fn build_config(self) -> Result<Config> {
        self.into_parts().map(|(config, _)| config)
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        let (config, transport) = self.into_parts()?;
        match transport {
            Some(transport) => Ok(Client::with_transport(config, transport)),
            None => Client::new(config),
        }
    }

    fn into_parts(self) -> Result<(Config, Option<Arc<dyn Transport>>)> {
        if self.developer_key.is_empty() {
            return Err(Error::Config("developer_key must be non-empty".to_string()));
        }
        if self.application_key.is_empty() {
            return Err(Error::Config("application_key must be non-empty".to_string()));
        }
        if self.server.is_empty() {
            return Err(Error::Config("server must be non-empty".to_string()));
        }

        let config = Config {
            developer_key: self.developer_key,
            application_key: self.application_key,
            server: self.server.trim_end_matches('/').to_string(),
            application_source: self.application_source,
            user_agent: self.user_agent,
            timeout: self.timeout,
        };
        Ok((config, self.transport))
    }
}
