//! Per-session cookie jar.

/// Cookies received from the server during one session.
///
/// Only name and value are kept; attributes such as `Path` or `Expires` are
/// ignored except `Max-Age=0`, which removes the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns the value of the named cookie.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Merges one `Set-Cookie` header value into the jar.
    ///
    /// Returns false when the value carries no usable name.
    pub fn merge(&mut self, set_cookie: &str) -> bool {
        let mut attrs = set_cookie.split(';');
        let Some((name, value)) = attrs.next().and_then(|pair| pair.split_once('=')) else {
            return false;
        };
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let value = value.trim().trim_matches('"');

        let expired = attrs.any(|attr| {
            attr.split_once('=').is_some_and(|(k, v)| {
                k.trim().eq_ignore_ascii_case("max-age") && v.trim() == "0"
            })
        });

        self.cookies.retain(|(k, _)| k != name);
        if !expired {
            self.cookies.push((name.to_string(), value.to_string()));
        }
        true
    }

    /// Builds the `Cookie` request header, or `None` when the jar is empty.
    pub fn header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
