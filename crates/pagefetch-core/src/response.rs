//! Result of a successful fetch.

use crate::charset::Charset;

/// Page text and the charset it was decoded with.
///
/// Only built from the resolver's output, so `text` is always the body
/// decoded with `charset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    text: String,
    charset: Charset,
}

impl FetchResult {
    pub(crate) fn from_resolved((text, charset): (String, Charset)) -> Self {
        Self { text, charset }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercase encoding name, e.g. `utf-8` or `iso-8859-1`.
    pub fn encoding(&self) -> String {
        self.charset.name()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn into_parts(self) -> (String, Charset) {
        (self.text, self.charset)
    }
}
