//! Identification command.

use clap::Args;

use super::session::{prepare, start_and_post, wav_files, SessionArgs, Summary};
use super::{create_client, get_context, output_result, print_success};
use crate::Cli;

/// Identify the speaker of a directory of speech samples.
///
/// Posts every WAV file, then summarizes the session.
#[derive(Args)]
pub struct IdentifyCommand {
    /// Most likely client id
    #[arg(long, default_value = "")]
    probable_id: String,

    /// Candidate client ids, comma separated
    #[arg(long)]
    possible_ids: String,

    #[command(flatten)]
    session: SessionArgs,
}

impl IdentifyCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let files = wav_files(&self.session.path)?;

        let mut identifier = client.identifier(self.probable_id.as_str(), Vec::<String>::new());
        identifier.policy_mut().set_possible_ids(&self.possible_ids);
        prepare(&mut identifier, &self.session)?;

        let posts = start_and_post(cli, &mut identifier, &self.session, &files).await?;
        let result = identifier.summarize().await;
        if cli.verbose {
            print_success(&format!("Summarize: {}", result));
        }

        let summary = Summary::new(&identifier, posts)
            .detail("identified_id", identifier.identified_id())
            .detail("score", identifier.identified_score())
            .detail("identified", identifier.is_identified())
            .detail("authorized", identifier.is_authorized());
        output_result(&summary, cli.output.as_deref(), cli.json)
    }
}
