//! HTTP transport for the speech authorization API.
//!
//! The engine talks to the server through the [`Transport`] trait: one
//! request in, one response out. [`HttpTransport`] is the reqwest-backed
//! implementation used by [`Client`](crate::Client); tests plug in their own.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client as ReqwestClient,
    header::{HeaderValue, USER_AGENT},
    multipart::{Form, Part as FormPart},
};

use crate::error::Result;

const USER_AGENT_VALUE: &str = "giztoy-speechauth-rust/1.0";

/// HTTP method of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

impl Method {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// One multipart body part.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Binary file part (audio snippet).
    File {
        name: String,
        filename: String,
        data: Bytes,
    },
    /// Text part (JSON-encoded speech context).
    Text { name: String, value: String },
}

impl Part {
    /// Returns the form field name of the part.
    pub fn name(&self) -> &str {
        match self {
            Part::File { name, .. } | Part::Text { name, .. } => name,
        }
    }
}

/// A single request issued by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the configured server, already percent-encoded.
    pub path: String,
    pub headers: Vec<(String, String)>,
    /// Multipart body; `None` for bodiless exchanges.
    pub body: Option<Vec<Part>>,
}

impl Request {
    /// Creates a request without headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Returns the first value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response received from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// Creates a response with the given status and no headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Creates a response carrying a JSON body.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Bytes::from(body.into()),
        }
    }

    /// Adds a header and returns the response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of the named header (case-insensitive).
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the media type of the body without parameters.
    pub fn media_type(&self) -> Option<&str> {
        self.header("Content-Type")
            .map(|v| v.split(';').next().unwrap_or("").trim())
    }
}

/// Network collaborator performing one exchange per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the server response.
    ///
    /// An `Err` means no response was received (timeout, connection
    /// failure); any status code the server sends is an `Ok`.
    async fn exchange(&self, request: Request) -> Result<Response>;
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the given server with a read timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_form(parts: Vec<Part>) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                Part::File {
                    name,
                    filename,
                    data,
                } => {
                    let file = FormPart::bytes(data.to_vec())
                        .file_name(filename)
                        .mime_str("application/octet-stream")?;
                    form.part(name, file)
                }
                Part::Text { name, value } => form.text(name, value),
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, request: Request) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        builder = builder.header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(parts) = request.body {
            builder = builder.multipart(Self::build_form(parts)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Percent-encodes one path segment.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("user-said-stop"), "user-said-stop");
        assert_eq!(encode_segment("my voice"), "my%20voice");
        assert_eq!(encode_segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(encode_segment("abc$abc,def"), "abc%24abc%2Cdef");
    }

    #[test]
    fn test_response_headers() {
        let resp = Response::json(200, "{}")
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2")
            .with_header("Vv-Session-Id", "s-1");

        assert!(resp.is_success());
        assert_eq!(resp.media_type(), Some("application/json"));
        assert_eq!(resp.header("vv-session-id"), Some("s-1"));
        assert_eq!(resp.header_values("Set-Cookie").count(), 2);

        let name = String::from("VV-SESSION-ID");
        let session = resp.header(&name);
        drop(name);
        assert_eq!(session, Some("s-1"));
    }

    #[test]
    fn test_media_type_strips_parameters() {
        let resp = Response::new(200).with_header("Content-Type", "application/json; charset=utf-8");
        assert_eq!(resp.media_type(), Some("application/json"));
        assert_eq!(Response::new(500).media_type(), None);
        assert!(!Response::new(500).is_success());
    }

    #[test]
    fn test_request_header_lookup() {
        let mut req = Request::new(Method::Delete, "/1/sve/Cancel/Unknown");
        req.push_header("Vv-Session-Id", "abc");
        assert_eq!(req.header("VV-SESSION-ID"), Some("abc"));
        assert_eq!(req.header("Cookie"), None);
        assert_eq!(req.method.as_str(), "DELETE");
    }

    #[test]
    fn test_build_form_accepts_parts() {
        let parts = vec![
            Part::File {
                name: "data".to_string(),
                filename: "c-0-0.raw".to_string(),
                data: Bytes::from_static(&[1, 2, 3]),
            },
            Part::Text {
                name: "speech".to_string(),
                value: "{}".to_string(),
            },
        ];
        assert!(HttpTransport::build_form(parts).is_ok());
    }
}
