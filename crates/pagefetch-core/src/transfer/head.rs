//! Parse HTTP response header blocks as libcurl hands them over.

use url::Url;

/// Fields of a response header block the fetcher cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    /// Status code from the status line, if it parsed.
    pub status: Option<u32>,
    /// `Content-Type` value (carries the transport charset).
    pub content_type: Option<String>,
    /// `Content-Encoding` value (`gzip` triggers decompression).
    pub content_encoding: Option<String>,
    /// `Location` value; with a 3xx status the block is a redirect hop.
    pub location: Option<String>,
}

impl ResponseHead {
    /// 1xx responses and redirect hops are followed by another header block.
    pub(crate) fn is_interim(&self) -> bool {
        match self.status {
            Some(100..=199) => true,
            Some(300..=399) => self.location.is_some(),
            _ => false,
        }
    }
}

/// Parse one block of header lines (status line first) into a ResponseHead.
pub(crate) fn parse_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("http/")) {
            head.status = parse_status_line(line);
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                head.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-encoding") {
                head.content_encoding = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("location") {
                head.location = Some(value.to_string());
            }
        }
    }

    head
}

/// `HTTP/1.1 200 OK` -> 200.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Accumulates raw header lines from libcurl's header callback. libcurl emits
/// one block per response, so redirects and `100 Continue` produce several.
///
/// Through an HTTP proxy, an `https` hop is tunnelled and libcurl also hands
/// over the proxy's reply to `CONNECT`. That block is skipped: the origin has
/// not answered yet.
#[derive(Debug, Default)]
pub(crate) struct HeadCollector {
    block: Vec<String>,
    last: Option<ResponseHead>,
    signalled: bool,
    /// URL of the current hop; redirects are resolved against it.
    current: Option<Url>,
    /// Requests go through an HTTP(S) proxy that tunnels `https` hops.
    http_proxy: bool,
    /// The next 2xx block is a `CONNECT` reply.
    expect_connect: bool,
}

impl HeadCollector {
    /// Collector for a request to `url`, optionally through the libcurl
    /// proxy string `proxy`.
    pub(crate) fn new(url: &str, proxy: Option<&str>) -> HeadCollector {
        let http_proxy = proxy.is_some_and(tunnels_https);
        let current = Url::parse(url).ok();
        let expect_connect = http_proxy && current.as_ref().is_some_and(|u| u.scheme() == "https");
        HeadCollector {
            current,
            http_proxy,
            expect_connect,
            ..HeadCollector::default()
        }
    }

    /// Feed one header line. Returns true exactly once: when the first
    /// non-interim block is complete.
    pub(crate) fn push(&mut self, data: &[u8]) -> bool {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end();
        if !line.is_empty() {
            self.block.push(line.to_string());
            return false;
        }
        if self.block.is_empty() {
            return false;
        }
        let head = parse_head(&self.block);
        self.block.clear();
        if self.expect_connect && matches!(head.status, Some(200..=299)) {
            self.expect_connect = false;
            tracing::trace!("proxy tunnel established");
            return false;
        }
        let interim = head.is_interim();
        if interim {
            self.follow(head.location.as_deref());
        }
        self.last = Some(head);
        if interim || self.signalled {
            return false;
        }
        self.signalled = true;
        true
    }

    /// Track a redirect hop. A new `https` origin means a new tunnel.
    fn follow(&mut self, location: Option<&str>) {
        let (Some(current), Some(location)) = (self.current.as_ref(), location) else {
            return;
        };
        let Ok(next) = current.join(location) else {
            return;
        };
        if self.http_proxy && next.scheme() == "https" && next.origin() != current.origin() {
            self.expect_connect = true;
        }
        self.current = Some(next);
    }

    /// The last complete header block.
    pub(crate) fn into_head(self) -> ResponseHead {
        self.last.unwrap_or_default()
    }
}

/// libcurl tunnels `https` through `http://` and `https://` proxies. A proxy
/// string without a scheme is HTTP.
fn tunnels_https(proxy: &str) -> bool {
    match proxy.split_once("://") {
        Some((scheme, _)) => scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"),
        None => !proxy.is_empty(),
    }
}
