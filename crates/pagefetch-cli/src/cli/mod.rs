//! CLI for the pagefetch page fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config, run_get, GetArgs};

/// Top-level CLI for the pagefetch page fetcher.
#[derive(Debug, Parser)]
#[command(name = "pagefetch")]
#[command(about = "Fetch a web page and print its text with the resolved encoding", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config path.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a page and print its text (encoding goes to stderr).
    Get {
        /// Absolute HTTP/HTTPS URL to fetch.
        url: String,
        /// User-Agent header (overrides config).
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,
        /// Milliseconds to wait for response headers (overrides config).
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
        /// Proxy as host:port or URL (overrides config).
        #[arg(long, value_name = "PROXY")]
        proxy: Option<String>,
        /// Charset used when the response declares none (overrides config).
        #[arg(long, value_name = "LABEL")]
        default_encoding: Option<String>,
        /// Print only the resolved encoding.
        #[arg(long)]
        encoding_only: bool,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                url,
                user_agent,
                timeout_ms,
                proxy,
                default_encoding,
                encoding_only,
            } => {
                let args = GetArgs {
                    url,
                    user_agent,
                    timeout_ms,
                    proxy,
                    default_encoding,
                    encoding_only,
                };
                run_get(cli.config.as_deref(), args).await?
            }
            CliCommand::Config => run_config(cli.config.as_deref())?,
        }

        Ok(())
    }
}
