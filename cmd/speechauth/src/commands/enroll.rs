//! Enrollment command.

use clap::Args;
use giztoy_speechauth::Gender;

use super::session::{prepare, start_and_post, wav_files, SessionArgs, Summary};
use super::{create_client, get_context, output_result, print_success};
use crate::Cli;

/// Enroll a client id from a directory of speech samples.
///
/// Posts every WAV file, then trains the voiceprint.
#[derive(Args)]
pub struct EnrollCommand {
    /// Client id to enroll
    #[arg(long)]
    client_id: String,

    /// Speaker gender (m, f or u)
    #[arg(short, long, default_value = "u")]
    gender: String,

    /// Override token sent with the session start
    #[arg(long)]
    auth_token: Option<String>,

    #[command(flatten)]
    session: SessionArgs,
}

impl EnrollCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let files = wav_files(&self.session.path)?;

        let mut enroller = client.enroller(self.client_id.as_str(), Gender::parse(&self.gender));
        prepare(&mut enroller, &self.session)?;
        if let Some(token) = &self.auth_token {
            enroller.set_auth_token(token.as_str());
        }

        let posts = start_and_post(cli, &mut enroller, &self.session, &files).await?;
        let result = enroller.train().await;
        if cli.verbose {
            print_success(&format!("Train: {}", result));
        }

        let summary = Summary::new(&enroller, posts)
            .detail("client_id", self.client_id.as_str())
            .detail("speech_trained", enroller.speech_trained());
        output_result(&summary, cli.output.as_deref(), cli.json)
    }
}
