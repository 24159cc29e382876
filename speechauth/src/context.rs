//! Speech contexts sent alongside audio snippets.

use serde::{Deserialize, Serialize};

/// Context flag values.
pub mod flags {
    pub const NONE: u32 = 0;
    pub const LIVENESS: u32 = 1;
    pub const IDENTITY: u32 = 2;
    pub const PIN: u32 = 3;
    pub const IDENTITY_PIN: u32 = 4;
}

/// Expected speech content of a snippet (phrases, grammar, language).
///
/// Uploaded as a JSON `speech` part; appending one to a verification
/// session makes the result liveness-compounded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeechContext {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "languageCode", default)]
    pub language_code: String,
    #[serde(default)]
    pub grammar: Option<String>,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default)]
    pub flags: u32,
}

impl SpeechContext {
    /// Creates a context for the given language and phrases.
    pub fn new<I, S>(language_code: impl Into<String>, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            language_code: language_code.into(),
            phrases: phrases.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.grammar = Some(grammar.into());
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

impl std::fmt::Display for SpeechContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            write!(f, "Name: {}, ", name)?;
        }
        if let Some(grammar) = self.grammar.as_deref().filter(|g| !g.is_empty()) {
            write!(f, "Grammar: {}, ", grammar)?;
        }
        write!(
            f,
            "LanguageCode: {}, Phrases: {}]",
            self.language_code,
            self.phrases.join(",")
        )
    }
}
