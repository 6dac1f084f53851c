//! `pagefetch config` – show where settings come from and what they are.

use anyhow::Result;
use pagefetch_core::{config, logging};
use std::path::Path;

use super::load_config;

pub fn run_config(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    let cfg = load_config(config_path)?;
    println!("config file:       {}", path.display());
    println!("user_agent:        {}", cfg.user_agent);
    println!("timeout_ms:        {}", cfg.timeout_ms);
    println!("proxy:             {}", cfg.proxy.as_deref().unwrap_or("(direct)"));
    println!("default_encoding:  {}", cfg.default_encoding);
    println!("sniff_limit_bytes: {}", cfg.sniff_limit_bytes);
    if let Ok(log) = logging::log_file_path() {
        println!("log file:          {}", log.display());
    }
    Ok(())
}
