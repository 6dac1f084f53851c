//! `pagefetch get <url>` – fetch one page.

use anyhow::{Context, Result};
use pagefetch_core::config::FetcherConfig;
use pagefetch_core::Fetcher;
use std::io::Write;
use std::path::Path;

use super::load_config;

#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub url: String,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
    pub proxy: Option<String>,
    pub default_encoding: Option<String>,
    pub encoding_only: bool,
}

/// Command-line values win over the config file.
fn apply_overrides(mut cfg: FetcherConfig, args: &GetArgs) -> FetcherConfig {
    if let Some(ua) = &args.user_agent {
        cfg.user_agent = ua.clone();
    }
    if let Some(ms) = args.timeout_ms {
        cfg.timeout_ms = ms;
    }
    if let Some(proxy) = &args.proxy {
        cfg.proxy = Some(proxy.clone());
    }
    if let Some(label) = &args.default_encoding {
        cfg.default_encoding = label.clone();
    }
    cfg
}

pub async fn run_get(config_path: Option<&Path>, args: GetArgs) -> Result<()> {
    let cfg = apply_overrides(load_config(config_path)?, &args);
    let fetcher = Fetcher::from_config(&cfg)?;

    let result = tokio::task::spawn_blocking({
        let url = args.url.clone();
        move || fetcher.get(&url)
    })
    .await
    .context("fetch task join")?
    .with_context(|| format!("fetching {}", args.url))?;

    if args.encoding_only {
        println!("{}", result.encoding());
        return Ok(());
    }
    eprintln!("encoding: {}", result.encoding());
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(result.text().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
