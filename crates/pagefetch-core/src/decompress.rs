//! Content-Encoding handling for buffered response bodies.

use flate2::read::GzDecoder;
use std::io::Read;

use crate::error::FetchError;

/// True if the `Content-Encoding` value is `gzip` (case-insensitive).
pub(crate) fn is_gzip(content_encoding: Option<&str>) -> bool {
    content_encoding.is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"))
}

/// Decompress a whole gzip body. Any failure is fatal for the fetch.
pub(crate) fn gunzip(body: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut out = Vec::with_capacity(body.len().saturating_mul(4));
    GzDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(FetchError::Decode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn gzip_detection_is_case_insensitive() {
        assert!(is_gzip(Some("gzip")));
        assert!(is_gzip(Some("GZip ")));
        assert!(!is_gzip(Some("deflate")));
        assert!(!is_gzip(Some("br")));
        assert!(!is_gzip(None));
    }

    #[test]
    fn gunzip_restores_body() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"<p>hello</p>").unwrap();
        let compressed = enc.finish().unwrap();
        assert_eq!(gunzip(&compressed).unwrap(), b"<p>hello</p>");
    }

    #[test]
    fn gunzip_rejects_garbage() {
        let err = gunzip(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
