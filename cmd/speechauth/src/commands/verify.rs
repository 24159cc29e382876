//! Verification command.

use clap::Args;

use super::session::{prepare, start_and_post, wav_files, SessionArgs, Summary};
use super::{create_client, get_context, output_result, print_success};
use crate::Cli;

/// Verify a directory of speech samples against a client id.
///
/// Posts every WAV file, then summarizes the session.
#[derive(Args)]
pub struct VerifyCommand {
    /// Claimed client id
    #[arg(long)]
    client_id: String,

    /// Override token sent with the summary
    #[arg(long)]
    auth_token: Option<String>,

    #[command(flatten)]
    session: SessionArgs,
}

impl VerifyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let files = wav_files(&self.session.path)?;

        let mut verifier = client.verifier(self.client_id.as_str());
        prepare(&mut verifier, &self.session)?;

        let posts = start_and_post(cli, &mut verifier, &self.session, &files).await?;
        if let Some(token) = &self.auth_token {
            verifier.set_auth_token(token.as_str());
        }
        let result = verifier.summarize().await;
        if cli.verbose {
            print_success(&format!("Summarize: {}", result));
        }

        let summary = Summary::new(&verifier, posts)
            .detail("client_id", self.client_id.as_str())
            .detail("score", verifier.score())
            .detail("verified", verifier.is_verified())
            .detail("authorized", verifier.is_authorized())
            .detail("overridable", verifier.is_overridable());
        output_result(&summary, cli.output.as_deref(), cli.json)
    }
}
