//! Escaping helpers for HTML text, attribute values, and URLs.
//!
//! Every externally-derived string placed into an `href` or attribute goes
//! through one of these before it reaches the output buffer.

/// Escape HTML special characters in text content.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for embedding in a double-quoted HTML attribute.
#[must_use]
pub fn escape_attribute(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a URL for embedding in an `href` attribute.
///
/// Percent-encodes characters that would terminate or break out of the
/// attribute; the URL structure (`:`, `/`, `?`, `&`, `#`) is left intact.
#[must_use]
pub fn escape_url(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("%22"),
            '\'' => result.push_str("%27"),
            '<' => result.push_str("%3C"),
            '>' => result.push_str("%3E"),
            '`' => result.push_str("%60"),
            ' ' => result.push_str("%20"),
            _ => result.push(c),
        }
    }
    result
}
