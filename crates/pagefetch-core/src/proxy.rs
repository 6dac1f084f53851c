//! Proxy descriptor.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::FetchError;

const PROXY_SCHEMES: &[&str] = &["http", "https", "socks4", "socks4a", "socks5", "socks5h"];

/// A proxy every request of a fetch is routed through.
///
/// Accepts `host:port` (plain HTTP proxy) or a proxy URL such as
/// `http://host:port` or `socks5://host:port`, optionally with credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    url: Url,
}

impl Proxy {
    pub fn parse(descriptor: &str) -> Result<Proxy, FetchError> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(FetchError::InvalidRequest("empty proxy descriptor".into()));
        }
        let with_scheme = if descriptor.contains("://") {
            descriptor.to_string()
        } else {
            format!("http://{}", descriptor)
        };
        let url = Url::parse(&with_scheme)
            .map_err(|e| FetchError::InvalidRequest(format!("proxy {:?}: {}", descriptor, e)))?;
        if !PROXY_SCHEMES.contains(&url.scheme()) {
            return Err(FetchError::InvalidRequest(format!(
                "proxy {:?}: unsupported scheme {}",
                descriptor,
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(FetchError::InvalidRequest(format!("proxy {:?}: missing host", descriptor)));
        }
        if url.port_or_known_default().is_none() {
            return Err(FetchError::InvalidRequest(format!("proxy {:?}: missing port", descriptor)));
        }
        Ok(Proxy { url })
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    /// Proxy string in the form libcurl's `CURLOPT_PROXY` expects.
    pub fn as_curl_str(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }
}

impl FromStr for Proxy {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Proxy::parse(s)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.url.scheme(), self.host())?;
        if let Some(port) = self.port() {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}
