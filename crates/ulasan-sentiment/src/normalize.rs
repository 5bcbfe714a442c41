//! Review text normalization.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid mention regex"));
static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("valid non-letter regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalize raw review text into lowercase ASCII words separated by single
/// spaces.
///
/// URLs and `@mentions` are removed outright. For hashtags only the `#` goes;
/// the tag text is kept. Digits, punctuation and non-ASCII letters become
/// word breaks. Empty or whitespace-only input yields `""`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let lower = raw.to_lowercase();
    let t = URL_RE.replace_all(&lower, " ");
    let t = MENTION_RE.replace_all(&t, " ");
    let t = t.replace('#', " ");
    let t = NON_LETTER_RE.replace_all(&t, " ");
    let t = WHITESPACE_RE.replace_all(&t, " ");
    t.trim().to_string()
}
