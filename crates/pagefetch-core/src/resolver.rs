//! Encoding resolution: reconcile the transport charset with a charset
//! declared inside the document, re-decoding the raw body when they differ.
//!
//! The scan is a narrow pattern match over a bounded prefix of the decoded
//! text, not an HTML or XML parser. Three declaration forms are accepted:
//!
//! - `<meta http-equiv="Content-Type" content="text/html; charset=X">`
//! - `<?xml version="1.0" encoding="X"?>`
//! - `<meta charset="X">`
//!
//! Only the first declaration in document order is considered.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::charset::Charset;

/// Default number of bytes of decoded text searched for a declaration.
pub const DEFAULT_SNIFF_LIMIT: usize = 16 * 1024;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?i)<meta\s+http-equiv\s*=\s*["']?content-type["']?\s+content\s*=\s*[^>]*?;\s*charset\s*=\s*([a-z0-9_-]+)[^>]*>"#,
        r#"|<\?xml\s[^>]*?encoding\s*=\s*["']([a-z0-9._:-]+)["'][^>]*\?>"#,
        r#"|<meta\s+charset\s*=\s*["']?([a-z0-9_-]+)"#,
    ))
    .expect("charset declaration pattern is valid")
});

/// What the resolver decided for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No declaration in the scanned prefix.
    NoDeclaration,
    /// A declaration was found but its label is unknown.
    Unrecognized,
    /// The declaration names the charset already in use.
    AlreadyCurrent,
    /// The declaration names a different charset; decode again with it.
    Redecode(Charset),
}

#[derive(Debug, Clone, Copy)]
pub struct EncodingResolver {
    sniff_limit: usize,
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self {
            sniff_limit: DEFAULT_SNIFF_LIMIT,
        }
    }
}

impl EncodingResolver {
    pub fn new(sniff_limit: usize) -> Self {
        Self { sniff_limit }
    }

    pub fn sniff_limit(&self) -> usize {
        self.sniff_limit
    }

    /// The first charset label declared in the scanned prefix of `text`.
    pub fn declared_label<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = DECLARATION.captures(sniff_window(text, self.sniff_limit))?;
        (1..=3).find_map(|i| caps.get(i)).map(|m| m.as_str())
    }

    /// Decide whether `decoded` (currently decoded as `current`) needs another pass.
    pub fn decide(&self, decoded: &str, current: Charset) -> Decision {
        let Some(label) = self.declared_label(decoded) else {
            return Decision::NoDeclaration;
        };
        match Charset::from_label(label) {
            None => {
                tracing::debug!(label, "ignoring unrecognized in-document charset");
                Decision::Unrecognized
            }
            Some(declared) if declared == current => Decision::AlreadyCurrent,
            Some(declared) => Decision::Redecode(declared),
        }
    }

    /// Returns the final text and the charset it was decoded with. `decoded`
    /// must be `raw` decoded with `current`; it is handed back untouched
    /// unless a different, recognized charset is declared in it.
    pub fn resolve(&self, decoded: String, raw: &[u8], current: Charset) -> (String, Charset) {
        match self.decide(&decoded, current) {
            Decision::Redecode(declared) => {
                tracing::debug!(from = %current, to = %declared, "re-decoding with in-document charset");
                (declared.decode(raw), declared)
            }
            _ => (decoded, current),
        }
    }
}

/// Longest prefix of `text` no larger than `limit` bytes that ends on a char boundary.
fn sniff_window(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTTP_EQUIV_LATIN1: &str = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1"></head><body>x</body></html>"#;

    #[test]
    fn finds_http_equiv_declaration() {
        let r = EncodingResolver::default();
        assert_eq!(r.declared_label(HTTP_EQUIV_LATIN1), Some("ISO-8859-1"));
        let unquoted = "<META HTTP-EQUIV=content-type CONTENT=\"text/html;charset=utf-8\">";
        assert_eq!(r.declared_label(unquoted), Some("utf-8"));
        let single = "<meta http-equiv='Content-Type' content='text/html; charset=windows-1251'>";
        assert_eq!(r.declared_label(single), Some("windows-1251"));
    }

    #[test]
    fn finds_xml_and_html5_declarations() {
        let r = EncodingResolver::default();
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?><rss></rss>"#;
        assert_eq!(r.declared_label(xml), Some("UTF-8"));
        let xml_single = "<?xml version='1.0' encoding='Shift_JIS' standalone='yes'?>";
        assert_eq!(r.declared_label(xml_single), Some("Shift_JIS"));
        assert_eq!(r.declared_label(r#"<head><meta charset="koi8-r"></head>"#), Some("koi8-r"));
    }

    #[test]
    fn first_declaration_wins() {
        let r = EncodingResolver::default();
        let doc = r#"<meta charset="utf-8"><meta http-equiv="content-type" content="text/html; charset=iso-8859-1">"#;
        assert_eq!(r.declared_label(doc), Some("utf-8"));
    }

    #[test]
    fn http_equiv_other_than_content_type_is_ignored() {
        let r = EncodingResolver::default();
        let doc = r#"<meta http-equiv="refresh" content="5; charset=utf-8">"#;
        assert_eq!(r.declared_label(doc), None);
    }

    #[test]
    fn declaration_past_the_sniff_window_is_ignored() {
        let r = EncodingResolver::new(64);
        let doc = format!("{}<meta charset=\"utf-8\">", " ".repeat(100));
        assert_eq!(r.declared_label(&doc), None);
        assert_eq!(EncodingResolver::default().declared_label(&doc), Some("utf-8"));
    }

    #[test]
    fn sniff_window_respects_char_boundaries() {
        assert_eq!(sniff_window("aé", 2), "a");
        assert_eq!(sniff_window("aé", 3), "aé");
        assert_eq!(sniff_window("abc", 10), "abc");
    }

    #[test]
    fn same_charset_is_not_redecoded() {
        let r = EncodingResolver::default();
        let decoded = r#"<meta charset="UTF-8"><p>Grüße</p>"#.to_string();
        assert_eq!(r.decide(&decoded, Charset::utf8()), Decision::AlreadyCurrent);
        let (text, cs) = r.resolve(decoded.clone(), decoded.as_bytes(), Charset::utf8());
        assert_eq!(text, decoded);
        assert_eq!(cs, Charset::utf8());
    }

    #[test]
    fn latin1_guess_is_corrected_to_utf8() {
        let r = EncodingResolver::default();
        let raw = "<meta charset=\"utf-8\"><p>Grüße</p>".as_bytes();
        let guess = Charset::Latin1.decode(raw);
        assert!(guess.contains("GrÃ¼"));
        let (text, cs) = r.resolve(guess, raw, Charset::Latin1);
        assert_eq!(cs, Charset::utf8());
        assert_eq!(text, Charset::utf8().decode(raw));
        assert!(text.contains("Grüße"));
    }

    #[test]
    fn http_equiv_latin1_scenario() {
        let r = EncodingResolver::default();
        let mut raw = HTTP_EQUIV_LATIN1.as_bytes().to_vec();
        raw.extend_from_slice(b"caf\xe9");
        let guess = Charset::utf8().decode(&raw);
        let (text, cs) = r.resolve(guess, &raw, Charset::utf8());
        assert_eq!(cs.name(), "iso-8859-1");
        assert!(text.ends_with("café"));
    }

    #[test]
    fn unrecognized_declaration_keeps_current() {
        let r = EncodingResolver::default();
        let decoded = r#"<meta charset="x-klingon-8">hello"#.to_string();
        assert_eq!(r.decide(&decoded, Charset::Latin1), Decision::Unrecognized);
        let (text, cs) = r.resolve(decoded.clone(), decoded.as_bytes(), Charset::Latin1);
        assert_eq!(cs, Charset::Latin1);
        assert_eq!(text, decoded);
    }

    #[test]
    fn no_declaration_keeps_current() {
        let r = EncodingResolver::default();
        assert_eq!(r.decide("<p>plain</p>", Charset::utf8()), Decision::NoDeclaration);
    }
}
