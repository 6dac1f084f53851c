//! Charset labels and decoding.
//!
//! Labels resolve through `encoding_rs` (WHATWG label table), except the
//! Latin-1 and ASCII families: WHATWG folds those into windows-1252, which
//! turns bytes 0x80..=0x9F into punctuation. Here they decode as true
//! ISO-8859-1, where every byte maps to the code point of the same value, so
//! decoding can never fail and the reported name stays `iso-8859-1`.

use encoding_rs::Encoding;
use std::fmt;

/// WHATWG labels that really mean windows-1252; every other label WHATWG
/// maps to windows-1252 belongs to the Latin-1/ASCII family.
const WINDOWS_1252_LABELS: &[&str] = &["windows-1252", "cp1252", "x-cp1252"];

/// A resolved character encoding.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// ISO-8859-1, byte value == code point.
    #[default]
    Latin1,
    /// Any other encoding known to `encoding_rs`.
    Whatwg(&'static Encoding),
}

impl Charset {
    pub fn utf8() -> Charset {
        Charset::Whatwg(encoding_rs::UTF_8)
    }

    /// Resolve a charset label (case-insensitive, surrounding whitespace and
    /// quotes ignored). Returns `None` for unknown labels and for labels that
    /// map to the WHATWG "replacement" encoding, which cannot decode content.
    pub fn from_label(label: &str) -> Option<Charset> {
        let label = label.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
        if label.is_empty() {
            return None;
        }
        let lower = label.to_ascii_lowercase();
        let enc = Encoding::for_label_no_replacement(lower.as_bytes())?;
        if enc == encoding_rs::WINDOWS_1252 && !WINDOWS_1252_LABELS.contains(&lower.as_str()) {
            return Some(Charset::Latin1);
        }
        Some(Charset::Whatwg(enc))
    }

    /// Lowercase canonical name, e.g. `utf-8`, `iso-8859-1`, `shift_jis`.
    pub fn name(&self) -> String {
        match self {
            Charset::Latin1 => "iso-8859-1".to_string(),
            Charset::Whatwg(enc) => enc.name().to_ascii_lowercase(),
        }
    }

    /// Decode `bytes` in full. Malformed sequences become U+FFFD; a BOM is
    /// kept as part of the text rather than switching encodings.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Latin1 => encoding_rs::mem::decode_latin1(bytes).into_owned(),
            Charset::Whatwg(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Extract the `charset` parameter from a `Content-Type` header value.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then_some(value)
    })
}
