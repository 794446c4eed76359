//! Bare URL detection in extracted text.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?|ftp)://[^\s<>"'`{}|\\^\[\]]+"#).unwrap()
});

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '*'];

/// Find absolute URLs in free text, in order of appearance.
///
/// Trailing sentence punctuation is dropped; an unbalanced closing
/// parenthesis is treated as punctuation.
pub fn find_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let url = trim_trailing(m.as_str());
            // Scheme alone, e.g. "http://" followed by punctuation.
            if url.ends_with("://") {
                None
            } else {
                Some(url.to_string())
            }
        })
        .collect()
}

fn trim_trailing(url: &str) -> &str {
    let mut end = url.len();
    while let Some(c) = url[..end].chars().next_back() {
        if !TRAILING_PUNCTUATION.contains(&c) {
            break;
        }
        if c == ')' && url[..end].matches('(').count() >= url[..end].matches(')').count() {
            break;
        }
        end -= c.len_utf8();
    }
    &url[..end]
}

/// Whether a link target is an absolute URL worth reporting (internal
/// anchors and relative targets are skipped).
pub fn is_absolute_url(target: &str) -> bool {
    match target.split_once(':') {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}
