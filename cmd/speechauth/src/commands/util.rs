//! Utility functions for CLI commands.

use giztoy_speechauth::Client;

use super::cli_config::{load_config, Config, Context};
use crate::Cli;

const APP_NAME: &str = "speechauth";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context configuration to use.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;

    match cfg.resolve_context(cli.context.as_deref()) {
        Some(ctx) => Ok(ctx.clone()),
        None => match cli.context.as_deref() {
            None => anyhow::bail!(
                "no context specified. Use -c flag or set a default context with 'speechauth config use-context'"
            ),
            Some(name) => anyhow::bail!("context '{}' not found", name),
        },
    }
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(
    result: &T,
    output_path: Option<&str>,
    as_json: bool,
) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)?
    } else {
        serde_yaml::to_string(result)?
    };

    match output_path {
        Some(path) => std::fs::write(path, output)?,
        None => print!("{}", output),
    }

    Ok(())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Creates a speech authorization client from context configuration.
pub fn create_client(ctx: &Context) -> anyhow::Result<Client> {
    if ctx.developer_key.is_empty() {
        anyhow::bail!("developer_key not found in context '{}'", ctx.name);
    }
    if ctx.application_key.is_empty() {
        anyhow::bail!("application_key not found in context '{}'", ctx.name);
    }

    let agent = match ctx.get_extra("user_agent") {
        Some(agent) => agent.to_string(),
        None => format!("speechauth-cli/{}", env!("CARGO_PKG_VERSION")),
    };
    let mut builder = Client::builder(&ctx.developer_key, &ctx.application_key).user_agent(agent);

    if !ctx.server.is_empty() {
        builder = builder.server(&ctx.server);
    }
    if !ctx.application_source.is_empty() {
        builder = builder.application_source(&ctx.application_source);
    }
    if let Some(timeout) = ctx.timeout() {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}
