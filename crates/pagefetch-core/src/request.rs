//! Validated, immutable fetch request.

use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::proxy::Proxy;

/// One page fetch: what to get, who is asking, and how long to wait for headers.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: Url,
    user_agent: String,
    proxy: Option<Proxy>,
    timeout: Duration,
}

impl FetchRequest {
    /// Build a request. The URL must be absolute `http` or `https` with a host,
    /// and the timeout must be non-zero.
    pub fn new(url: &str, user_agent: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| FetchError::InvalidRequest(format!("URL {:?}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidRequest(format!(
                "URL {:?}: scheme must be http or https",
                url
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(FetchError::InvalidRequest(format!("URL {:?}: missing host", url)));
        }
        if timeout.is_zero() {
            return Err(FetchError::InvalidRequest("timeout must be positive".into()));
        }
        Ok(Self {
            url: parsed,
            user_agent: user_agent.into(),
            proxy: None,
            timeout,
        })
    }

    /// Route this request through `proxy`, overriding the fetcher's proxy.
    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        let r = FetchRequest::new("https://lyrics.example.com/song?id=1", "ua/1.0", Duration::from_secs(3)).unwrap();
        assert_eq!(r.url().host_str(), Some("lyrics.example.com"));
        assert_eq!(r.user_agent(), "ua/1.0");
        assert_eq!(r.timeout(), Duration::from_secs(3));
        assert!(r.proxy().is_none());
        assert!(FetchRequest::new("http://127.0.0.1:8080/", "ua", Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        let t = Duration::from_secs(1);
        for bad in ["/relative/path", "ftp://example.com/file", "file:///etc/passwd", "not a url", ""] {
            let err = FetchRequest::new(bad, "ua", t).unwrap_err();
            assert!(matches!(err, FetchError::InvalidRequest(_)), "{bad}");
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = FetchRequest::new("http://example.com/", "ua", Duration::ZERO).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn proxy_override() {
        let r = FetchRequest::new("http://example.com/", "ua", Duration::from_secs(1))
            .unwrap()
            .with_proxy(Proxy::parse("proxy.local:3128").unwrap());
        assert_eq!(r.proxy().map(Proxy::host), Some("proxy.local"));
    }
}
