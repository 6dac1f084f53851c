//! Page fetcher: request lifecycle, body decoding and encoding resolution.

use std::time::Duration;

use crate::charset::{self, Charset};
use crate::config::FetcherConfig;
use crate::decompress;
use crate::error::FetchError;
use crate::phase::{FetchPhase, PhaseTracker};
use crate::proxy::Proxy;
use crate::request::FetchRequest;
use crate::resolver::{EncodingResolver, DEFAULT_SNIFF_LIMIT};
use crate::response::FetchResult;
use crate::transfer::{RawResponse, Transfer, TransferSpec};

/// Fetches pages and returns their text with a resolved encoding.
///
/// Immutable once built; share it freely between threads. Each call to
/// [`Fetcher::fetch`] runs its own transfer and blocks until the result is in.
#[derive(Debug, Clone)]
pub struct Fetcher {
    user_agent: String,
    timeout: Duration,
    proxy: Option<Proxy>,
    default_charset: Charset,
    resolver: EncodingResolver,
}

#[derive(Debug, Clone)]
pub struct FetcherBuilder {
    user_agent: String,
    timeout: Duration,
    proxy: Option<Proxy>,
    default_charset: Charset,
    sniff_limit: usize,
}

impl Default for FetcherBuilder {
    fn default() -> Self {
        let cfg = FetcherConfig::default();
        Self {
            user_agent: cfg.user_agent,
            timeout: Duration::from_millis(cfg.timeout_ms),
            proxy: None,
            default_charset: Charset::Latin1,
            sniff_limit: DEFAULT_SNIFF_LIMIT,
        }
    }
}

impl FetcherBuilder {
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route every fetch through `proxy` unless the request names its own.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Charset used when the response declares none, or an unknown one.
    pub fn default_charset(mut self, charset: Charset) -> Self {
        self.default_charset = charset;
        self
    }

    pub fn sniff_limit(mut self, bytes: usize) -> Self {
        self.sniff_limit = bytes;
        self
    }

    pub fn build(self) -> Result<Fetcher, FetchError> {
        if self.timeout.is_zero() {
            return Err(FetchError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(Fetcher {
            user_agent: self.user_agent,
            timeout: self.timeout,
            proxy: self.proxy,
            default_charset: self.default_charset,
            resolver: EncodingResolver::new(self.sniff_limit),
        })
    }
}

impl Fetcher {
    pub fn builder() -> FetcherBuilder {
        FetcherBuilder::default()
    }

    /// Build a fetcher from loaded configuration.
    pub fn from_config(cfg: &FetcherConfig) -> Result<Fetcher, FetchError> {
        let default_charset = Charset::from_label(&cfg.default_encoding).ok_or_else(|| {
            FetchError::InvalidConfig(format!("unknown default_encoding {:?}", cfg.default_encoding))
        })?;
        let mut builder = Fetcher::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .default_charset(default_charset)
            .sniff_limit(cfg.sniff_limit_bytes);
        if let Some(proxy) = cfg.proxy.as_deref() {
            let proxy = Proxy::parse(proxy)
                .map_err(|e| FetchError::InvalidConfig(format!("proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        builder.build()
    }

    /// A request for `url` using this fetcher's user agent and timeout.
    pub fn request(&self, url: &str) -> Result<FetchRequest, FetchError> {
        FetchRequest::new(url, self.user_agent.clone(), self.timeout)
    }

    /// Shorthand for `fetch(&self.request(url)?)`.
    pub fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.fetch(&self.request(url)?)
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn default_charset(&self) -> Charset {
        self.default_charset
    }

    /// GET the page, wait up to the request timeout for response headers,
    /// then read, decompress and decode the body.
    pub fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        let url = request.url().as_str();
        let mut phase = PhaseTracker::new(url);
        let proxy = request.proxy().or(self.proxy.as_ref());

        phase.advance(FetchPhase::Requesting);
        let mut transfer = Transfer::start(TransferSpec {
            url: url.to_string(),
            user_agent: request.user_agent().to_string(),
            proxy: proxy.map(|p| p.as_curl_str().to_string()),
        });

        phase.advance(FetchPhase::AwaitingResponse);
        if let Err(e) = transfer.wait_for_headers(request.timeout()) {
            tracing::warn!(url, phase = %phase.current(), "fetch failed: {}", e);
            phase.fail();
            return Err(e);
        }

        phase.advance(FetchPhase::Reading);
        let raw = match transfer.finish().and_then(|r| read_body(url, r)) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(url, phase = %phase.current(), "fetch failed: {}", e);
                phase.fail();
                return Err(e);
            }
        };

        phase.advance(FetchPhase::Decoding);
        let initial = self.initial_charset(url, raw.content_type.as_deref());
        let decoded = initial.decode(&raw.body);

        phase.advance(FetchPhase::ResolvingEncoding);
        let resolved = self.resolver.resolve(decoded, &raw.body, initial);

        phase.advance(FetchPhase::Done);
        tracing::debug!(url, bytes = raw.body.len(), encoding = %resolved.1, "fetched page");
        Ok(FetchResult::from_resolved(resolved))
    }

    /// Transport charset if declared and known, otherwise the default.
    fn initial_charset(&self, url: &str, content_type: Option<&str>) -> Charset {
        let Some(label) = content_type.and_then(charset::charset_param) else {
            return self.default_charset;
        };
        match Charset::from_label(label) {
            Some(cs) => cs,
            None => {
                tracing::warn!(url, label, "unknown transport charset, using {}", self.default_charset);
                self.default_charset
            }
        }
    }
}

/// Body bytes ready for decoding.
#[derive(Debug)]
struct Body {
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Check the status and undo `Content-Encoding: gzip`.
fn read_body(url: &str, response: RawResponse) -> Result<Body, FetchError> {
    if !(200..300).contains(&response.status) {
        return Err(FetchError::Http {
            status: response.status,
            url: url.to_string(),
        });
    }
    let body = if decompress::is_gzip(response.head.content_encoding.as_deref()) {
        tracing::debug!(url, "gzip compression detected");
        decompress::gunzip(&response.body)?
    } else {
        response.body
    };
    Ok(Body {
        content_type: response.head.content_type,
        body,
    })
}
