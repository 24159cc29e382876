//! Configuration management commands.

use clap::{Args, Subcommand};

use super::cli_config::{mask_key, Context as CliContext};
use super::{get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to manage multiple API configurations,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.giztoy/speechauth/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Developer key (required)
        #[arg(long)]
        developer_key: String,
        /// Application key (required)
        #[arg(long)]
        application_key: String,
        /// API server URL
        #[arg(long)]
        server: Option<String>,
        /// Application source sent with every session
        #[arg(long)]
        application_source: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<i32>,
        /// Agent string sent with every session
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                developer_key,
                application_key,
                server,
                application_source,
                timeout,
                user_agent,
            } => {
                let mut cfg = get_config(cli)?;

                if developer_key.is_empty() || application_key.is_empty() {
                    anyhow::bail!("--developer-key and --application-key must be non-empty");
                }

                let mut ctx = CliContext {
                    developer_key: developer_key.clone(),
                    application_key: application_key.clone(),
                    server: server.clone().unwrap_or_default(),
                    application_source: application_source.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or(0),
                    ..Default::default()
                };
                if let Some(agent) = user_agent {
                    ctx.set_extra("user_agent", agent);
                }

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<20} {:<40}", "CURRENT", "NAME", "SERVER");
                for (name, ctx) in cfg.sorted_contexts() {
                    let current = if name == &cfg.current_context { "*" } else { "" };
                    let server = if ctx.server.is_empty() { "-" } else { ctx.server.as_str() };
                    println!("{:<8} {:<20} {:<40}", current, name, server);
                }

                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                if !cfg.contexts.is_empty() {
                    println!("\nContext details:");

                    for (name, ctx) in cfg.sorted_contexts() {
                        println!("\n  {}:", name);
                        println!("    Developer Key: {}", mask_key(&ctx.developer_key));
                        println!("    Application Key: {}", mask_key(&ctx.application_key));
                        if !ctx.server.is_empty() {
                            println!("    Server: {}", ctx.server);
                        }
                        if !ctx.application_source.is_empty() {
                            println!("    Application Source: {}", ctx.application_source);
                        }
                        if ctx.timeout > 0 {
                            println!("    Timeout: {}s", ctx.timeout);
                        }
                        let mut extra: Vec<_> = ctx.extra.iter().collect();
                        extra.sort();
                        for (key, value) in extra {
                            println!("    {}: {}", key, value);
                        }
                    }
                }

                Ok(())
            }
        }
    }
}
