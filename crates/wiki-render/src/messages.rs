//! Locale-aware output templates for filters.
//!
//! Filters resolve their output templates once, at pipeline-construction
//! time, and reuse the resolved string across all render calls. A host can
//! override any template (for localization or skinning) before building the
//! engine.

use std::collections::HashMap;

/// Message store resolving template keys to output format strings.
///
/// Templates use `{name}` placeholders filled by [`fill`]. Unknown keys fall
/// back to the built-in English defaults.
#[derive(Clone, Debug, Default)]
pub struct Messages {
    overrides: HashMap<String, String>,
}

impl Messages {
    /// Create a message store with the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a template key.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), template.into());
        self
    }

    /// Resolve a template key to its format string.
    ///
    /// Returns the override if one was installed, the built-in default
    /// otherwise. An unknown key resolves to the empty string and is logged.
    #[must_use]
    pub fn template(&self, key: &str) -> String {
        if let Some(template) = self.overrides.get(key) {
            return template.clone();
        }
        match default_template(key) {
            Some(template) => template.to_owned(),
            None => {
                tracing::warn!(key, "unknown message key; resolving to empty template");
                String::new()
            }
        }
    }
}

fn default_template(key: &str) -> Option<&'static str> {
    Some(match key {
        "filter.bold" => "<strong>{text}</strong>",
        "filter.italic" => "<em>{text}</em>",
        "filter.heading" => "<h3 class=\"heading-{outline}\" id=\"{id}\">{text}</h3>",
        "filter.code.block" => "<div class=\"code\"><pre>{body}</pre></div>",
        "filter.link.external" => "<a href=\"{href}\"{rel}>{text}</a>",
        "filter.link.anchor" => "<a href=\"#{anchor}\">{text}</a>",
        "filter.link.unknown" => "[<span class=\"error\">{text}?</span>]",
        _ => return None,
    })
}

/// Fill `{name}` placeholders in a resolved template.
///
/// The template is scanned once, left to right; substituted values are
/// emitted verbatim and never re-scanned for placeholders. Placeholders
/// with no matching argument stay literal.
#[must_use]
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(start) = rest.find('{') else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let Some(end) = rest.find('}') else {
            out.push_str(rest);
            return out;
        };
        let name = &rest[1..end];
        match args.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[..=end]),
        }
        rest = &rest[end + 1..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_template() {
        assert_eq!(Messages::new().template("filter.bold"), "<strong>{text}</strong>");
    }

    #[test]
    fn test_override_wins() {
        let messages = Messages::new().with_message("filter.bold", "<b>{text}</b>");
        assert_eq!(messages.template("filter.bold"), "<b>{text}</b>");
    }

    #[test]
    fn test_unknown_key_resolves_empty() {
        assert_eq!(Messages::new().template("filter.nope"), "");
    }

    #[test]
    fn test_fill() {
        assert_eq!(fill("<a href=\"{href}\">{text}</a>", &[("href", "/x"), ("text", "X")]), "<a href=\"/x\">X</a>");
    }

    #[test]
    fn test_fill_values_are_not_rescanned() {
        // A substituted value containing placeholder syntax stays literal.
        assert_eq!(fill("{a}{b}", &[("a", "{b}"), ("b", "2")]), "{b}2");
        assert_eq!(
            fill(
                "<a href=\"{href}\">{text}</a>",
                &[("href", "/x?q={text}"), ("text", "X")]
            ),
            "<a href=\"/x?q={text}\">X</a>"
        );
    }

    #[test]
    fn test_fill_unknown_placeholder_stays_literal() {
        assert_eq!(fill("{a} {nope}", &[("a", "1")]), "1 {nope}");
    }

    #[test]
    fn test_fill_unterminated_brace_is_copied() {
        assert_eq!(fill("x{a", &[("a", "1")]), "x{a");
    }
}
