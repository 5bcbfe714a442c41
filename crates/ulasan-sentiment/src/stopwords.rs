use std::collections::HashSet;

/// Drop every stopword token from normalized text.
///
/// Tokens are split on single spaces; empty tokens produced by stray
/// whitespace are discarded rather than rejoined.
#[must_use]
pub fn remove_stopwords(normalized: &str, stopwords: &HashSet<String>) -> String {
    normalized
        .split(' ')
        .filter(|token| !token.is_empty() && !stopwords.contains(*token))
        .collect::<Vec<_>>()
        .join(" ")
}
