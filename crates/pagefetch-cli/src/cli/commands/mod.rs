//! CLI command handlers.

mod config;
mod get;

pub use config::run_config;
pub use get::{run_get, GetArgs};

use anyhow::Result;
use pagefetch_core::config::{self as core_config, FetcherConfig};
use std::path::Path;

/// Explicit config file if given, otherwise the XDG one (created on first use).
fn load_config(path: Option<&Path>) -> Result<FetcherConfig> {
    let cfg = match path {
        Some(p) => core_config::load_from(p)?,
        None => core_config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}
