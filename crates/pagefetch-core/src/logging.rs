//! Log setup for pagefetch hosts.
//!
//! Events go to `pagefetch.log` under the XDG state dir when it is writable,
//! otherwise to stderr. `PAGEFETCH_LOG` (then `RUST_LOG`) overrides the filter.

use anyhow::Result;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,pagefetch=debug,pagefetch_core=debug";
const FILTER_ENV: &str = "PAGEFETCH_LOG";

/// Where log events end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDestination::File(path) => write!(f, "{}", path.display()),
            LogDestination::Stderr => f.write_str("stderr"),
        }
    }
}

/// `~/.local/state/pagefetch/pagefetch.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagefetch")?;
    Ok(xdg_dirs.get_state_home().join("pagefetch.log"))
}

/// Install the global subscriber, preferring the log file. Never fails; a
/// second call leaves the first subscriber in place.
pub fn init() -> LogDestination {
    match init_file() {
        Ok(path) => LogDestination::File(path),
        Err(e) => {
            init_stderr();
            tracing::debug!("log file unavailable ({:#}), logging to stderr", e);
            LogDestination::Stderr
        }
    }
}

fn init_file() -> Result<PathBuf> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {}", e))?;
    tracing::info!("pagefetch {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(path)
}

fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn env_filter() -> EnvFilter {
    let spec = std::env::var(FILTER_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok();
    filter_from(spec.as_deref())
}

/// Filter from a directive string; missing or unparsable falls back to the default.
fn filter_from(spec: Option<&str>) -> EnvFilter {
    spec.and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_enables_debug_for_pagefetch() {
        let filter = filter_from(None).to_string();
        assert!(filter.contains("pagefetch_core=debug"), "{filter}");
    }

    #[test]
    fn explicit_filter_is_used() {
        let filter = filter_from(Some("pagefetch_core=trace")).to_string();
        assert!(filter.contains("pagefetch_core=trace"), "{filter}");
        assert!(!filter.contains("pagefetch_core=debug"), "{filter}");
    }

    #[test]
    fn log_file_lives_under_pagefetch_state_dir() {
        let path = log_file_path().unwrap();
        assert!(path.ends_with("pagefetch/pagefetch.log"), "{}", path.display());
    }

    #[test]
    fn destination_display() {
        assert_eq!(LogDestination::Stderr.to_string(), "stderr");
        let file = LogDestination::File(PathBuf::from("/tmp/pagefetch.log"));
        assert_eq!(file.to_string(), "/tmp/pagefetch.log");
    }
}
