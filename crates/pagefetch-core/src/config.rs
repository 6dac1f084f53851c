use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::DEFAULT_SNIFF_LIMIT;

/// Fetcher configuration loaded from `~/.config/pagefetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How long to wait for response headers, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional proxy, `host:port` or a proxy URL (None = direct connection).
    #[serde(default)]
    pub proxy: Option<String>,
    /// Charset label used when a response declares no charset, or an unknown one.
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
    /// How many bytes of decoded text are searched for an in-document charset.
    #[serde(default = "default_sniff_limit")]
    pub sniff_limit_bytes: usize,
}

fn default_user_agent() -> String {
    concat!("pagefetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_encoding() -> String {
    "iso-8859-1".to_string()
}

fn default_sniff_limit() -> usize {
    DEFAULT_SNIFF_LIMIT
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            proxy: None,
            default_encoding: default_encoding(),
            sniff_limit_bytes: default_sniff_limit(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetcherConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetcherConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<FetcherConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: FetcherConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
