//! Session plumbing shared by the enroll, verify and identify commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use giztoy_speechauth::{FlowPolicy, SessionEngine, SessionState, SpeechResult};

use super::{print_error, print_info};
use crate::Cli;

/// Arguments common to every session command.
#[derive(Args)]
pub struct SessionArgs {
    /// Directory of WAV files to post, in name order
    #[arg(short, long)]
    pub path: PathBuf,

    /// Interaction id attached to the session
    #[arg(long)]
    pub interaction_id: Option<String>,

    /// Interaction tag attached to the session
    #[arg(long)]
    pub interaction_tag: Option<String>,

    /// Metadata sent with the first post (KEY=VALUE, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

/// Outcome of posting one file.
#[derive(Debug, Serialize)]
pub struct PostOutcome {
    pub file: String,
    pub result: SpeechResult,
    pub progress: u32,
}

/// Summary printed at the end of a session command.
#[derive(Serialize)]
pub struct Summary<'a> {
    pub flow: &'static str,
    pub result: SpeechResult,
    pub raw_result: SpeechResult,
    pub progress: u32,
    pub posts: Vec<PostOutcome>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<&'static str, serde_json::Value>,
    pub state: &'a SessionState,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub results: &'a BTreeMap<String, giztoy_speechauth::InstanceResult>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_data: &'a BTreeMap<String, serde_json::Value>,
}

impl<'a> Summary<'a> {
    pub fn new<P: FlowPolicy>(engine: &'a SessionEngine<P>, posts: Vec<PostOutcome>) -> Self {
        Self {
            flow: P::NAME,
            result: engine.result(),
            raw_result: engine.raw_result(),
            progress: engine.progress(),
            posts,
            details: BTreeMap::new(),
            state: engine.state(),
            results: engine.results(),
            extra_data: engine.extra_data(),
        }
    }

    pub fn detail(mut self, key: &'static str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key, value.into());
        self
    }
}

/// Lists the WAV files of a directory sorted by name.
pub fn wav_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if path.is_file() && is_wav {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("no .wav files found in {}", dir.display());
    }
    Ok(files)
}

/// Parses a KEY=VALUE metadata argument.
fn parse_meta(arg: &str) -> anyhow::Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => anyhow::bail!("invalid metadata '{}', expected KEY=VALUE", arg),
    }
}

/// Applies the interaction arguments to an engine before it starts.
///
/// Metadata is validated here and queued by [`start_and_post`] once the
/// session is open.
pub fn prepare<P: FlowPolicy>(engine: &mut SessionEngine<P>, args: &SessionArgs) -> anyhow::Result<()> {
    if let Some(id) = &args.interaction_id {
        engine.set_interaction_id(id.as_str());
    }
    if let Some(tag) = &args.interaction_tag {
        engine.set_interaction_tag(tag.as_str());
    }
    for arg in &args.meta {
        parse_meta(arg)?;
    }
    Ok(())
}

/// Starts the session and posts every file.
///
/// Fails only when the session cannot start or a file cannot be read.
/// Posting stops early once the session is no longer open.
pub async fn start_and_post<P: FlowPolicy>(
    cli: &Cli,
    engine: &mut SessionEngine<P>,
    args: &SessionArgs,
    files: &[PathBuf],
) -> anyhow::Result<Vec<PostOutcome>> {
    if !engine.start().await {
        anyhow::bail!("{} start failed: {}", P::NAME, engine.result());
    }
    for arg in &args.meta {
        let (key, value) = parse_meta(arg)?;
        engine.set_meta_data(key, value);
    }
    if cli.verbose {
        print_info(&format!("Session: {}", engine.session_id()));
    }

    let mut posts = Vec::with_capacity(files.len());
    for file in files {
        if !engine.is_session_open() {
            print_error("session closed, skipping remaining files");
            break;
        }

        let result = engine.post_wav(file).await?;
        let outcome = PostOutcome {
            file: file.display().to_string(),
            result,
            progress: engine.progress(),
        };
        if cli.verbose {
            print_info(&format!(
                "{}: {} ({}%)",
                outcome.file, outcome.result, outcome.progress
            ));
        }
        posts.push(outcome);
    }
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.wav", "a.WAV", "notes.txt", "c.wav"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.wav")).unwrap();

        let files = wav_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.WAV", "b.wav", "c.wav"]);
    }

    #[test]
    fn test_wav_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(wav_files(dir.path()).is_err());
    }

    #[test]
    fn test_parse_meta() {
        assert_eq!(parse_meta("Channel=mobile").unwrap(), ("Channel", "mobile"));
        assert_eq!(parse_meta("Empty=").unwrap(), ("Empty", ""));
        assert!(parse_meta("=x").is_err());
        assert!(parse_meta("novalue").is_err());
    }
}
