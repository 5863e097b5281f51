//! Bracketed link resolution.
//!
//! One `[...]` token is parsed left to right: display alias, then an
//! optional window/rel target, then the link itself, which is classified as
//! external, same-page anchor, interwiki, or internal. Internal links are
//! emitted by the host capability so the core stays independent of URL
//! schemes and storage.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::escape::{escape_attribute, escape_html, escape_url};
use crate::host::convert_wiki_words;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::messages::{Messages, fill};
use crate::pipeline::{FilterError, FilterId};

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("invalid link regex"));

/// Split at the first link delimiter.
///
/// `|` wins if present anywhere, else the first `>`, else the first
/// `&gt;`. This priority is load-bearing for compatibility and must not be
/// changed to plain leftmost-first.
fn split_delimiter(s: &str) -> Option<(&str, &str)> {
    if let Some(i) = s.find('|') {
        return Some((&s[..i], &s[i + 1..]));
    }
    if let Some(i) = s.find('>') {
        return Some((&s[..i], &s[i + 1..]));
    }
    s.find("&gt;").map(|i| (&s[..i], &s[i + 4..]))
}

/// Whether the link target points outside the wiki.
fn is_external(link: &str) -> bool {
    link.starts_with("mailto:") || link.find("://").is_some_and(|i| i < 10)
}

/// One parsed `[...]` token.
#[derive(Debug, Default, PartialEq, Eq)]
struct LinkToken<'a> {
    alias: Option<&'a str>,
    link: &'a str,
    window: Option<&'a str>,
}

impl<'a> LinkToken<'a> {
    fn parse(content: &'a str) -> Self {
        let (alias, rest) = match split_delimiter(content) {
            Some((alias, rest)) => (Some(alias.trim()), rest.trim()),
            None => (None, content),
        };
        let (link, window) = match split_delimiter(rest) {
            Some((link, window)) => (link.trim(), Some(window.trim())),
            None => (rest, None),
        };
        Self { alias, link, window }
    }
}

/// Resolves `[...]` tokens into anchors, create links, or error markers.
pub struct LinkFilter {
    matcher: TokenMatcher,
    external_template: String,
    anchor_template: String,
    unknown_template: String,
    default_rel: Option<String>,
}

impl LinkFilter {
    /// Create the link filter.
    ///
    /// `default_rel` is emitted on external links that carry no explicit
    /// target (e.g. `Some("nofollow")`).
    #[must_use]
    pub fn new(messages: &Messages, default_rel: Option<String>) -> Self {
        Self {
            matcher: TokenMatcher::new(LINK_PATTERN.clone()),
            external_template: messages.template("filter.link.external"),
            anchor_template: messages.template("filter.link.anchor"),
            unknown_template: messages.template("filter.link.unknown"),
            default_rel,
        }
    }

    fn emit_external(&self, output: &mut String, token: &LinkToken<'_>) {
        let rel = token
            .window
            .map(str::to_owned)
            .or_else(|| self.default_rel.clone());
        let rel_attr = rel.map_or_else(String::new, |value| {
            format!(" rel=\"{}\"", escape_attribute(&value))
        });
        let text = token.alias.unwrap_or(token.link);
        output.push_str(&fill(
            &self.external_template,
            &[
                ("rel", &rel_attr),
                ("href", &escape_url(token.link)),
                ("text", &escape_html(text)),
            ],
        ));
    }

    fn emit_anchor(&self, output: &mut String, anchor: &str, alias: Option<&str>) {
        let text = alias.unwrap_or(anchor);
        output.push_str(&fill(
            &self.anchor_template,
            &[
                ("anchor", &escape_attribute(anchor)),
                ("text", &escape_html(text)),
            ],
        ));
    }

    fn emit_unknown(&self, output: &mut String, content: &str) {
        output.push_str(&fill(
            &self.unknown_template,
            &[("text", &escape_html(content))],
        ));
    }
}

/// Insert `rel="_<target>"` into the first anchor tag emitted after `from`.
fn splice_rel(output: &mut String, from: usize, target: &str) {
    if let Some(pos) = output[from..].find("<a ") {
        let insert_at = from + pos + 3;
        output.insert_str(insert_at, &format!("rel=\"_{}\" ", escape_attribute(target)));
    }
}

impl TokenFilter for LinkFilter {
    fn id(&self) -> FilterId {
        FilterId::Link
    }

    fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    fn handle(
        &self,
        output: &mut String,
        token: &Captures<'_>,
        context: &mut RenderContext,
    ) -> Result<(), FilterError> {
        let content = token[1].trim();
        if content.is_empty() {
            output.push_str(&escape_html(&token[0]));
            return Ok(());
        }
        let parsed = LinkToken::parse(content);

        if is_external(parsed.link) {
            self.emit_external(output, &parsed);
            return Ok(());
        }

        // Anchor fragment: the last '#', unless it is the final character.
        let (base, anchor) = match parsed.link.rfind('#') {
            Some(i) if i + 1 < parsed.link.len() => {
                (&parsed.link[..i], Some(&parsed.link[i + 1..]))
            }
            _ => (parsed.link, None),
        };

        let base = base.trim();
        if base.chars().all(|c| c == '#') {
            // No resolvable page name. With an anchor this is a same-page
            // link; otherwise the token is malformed and passes through.
            match anchor {
                Some(anchor) => self.emit_anchor(output, anchor, parsed.alias),
                None => output.push_str(&escape_html(&token[0])),
            }
            return Ok(());
        }

        if let Some(at) = base.rfind('@') {
            let (target, space) = (&base[..at], &base[at + 1..]);
            let registry = context.interwiki();
            if registry.contains(space) {
                let text = parsed.alias.unwrap_or(target);
                if let Err(error) = registry.expand(output, space, target, text, anchor) {
                    tracing::warn!(space, error = %error, "interwiki expansion failed");
                    self.emit_unknown(output, content);
                }
            } else {
                self.emit_unknown(output, content);
            }
            return Ok(());
        }

        // Internal link: the host decides existence and markup.
        let display = match parsed.alias {
            Some(alias) => alias.to_owned(),
            None => {
                let short = base.split_once('.').map_or(base, |(_, page)| page);
                convert_wiki_words(short)
            }
        };
        let host = context.host();
        let mark = output.len();
        if host.exists(base) {
            host.append_link(output, base, &display, anchor);
        } else if host.show_create() {
            host.append_create_link(output, base, &display);
            // Page existence may change, so this render must not be cached.
            context.set_cacheable(false);
        } else {
            output.push_str(&escape_html(&display));
        }
        if let Some(window) = parsed.window {
            splice_rel(output, mark, window);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadingIdGenerator, MemoryInterwiki, MemoryWiki};
    use crate::pipeline::Filter;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn context_with(wiki: MemoryWiki, interwiki: MemoryInterwiki) -> RenderContext {
        RenderContext::new(
            Arc::new(wiki),
            Arc::new(interwiki),
            Arc::new(HeadingIdGenerator),
        )
    }

    fn filter() -> LinkFilter {
        LinkFilter::new(&Messages::new(), None)
    }

    fn apply(input: &str, ctx: &mut RenderContext) -> String {
        Filter::apply(&filter(), input, ctx).unwrap().unwrap()
    }

    #[test]
    fn test_parse_alias_link_window() {
        assert_eq!(
            LinkToken::parse("Alias>Main.Page>_blank"),
            LinkToken {
                alias: Some("Alias"),
                link: "Main.Page",
                window: Some("_blank"),
            }
        );
    }

    #[test]
    fn test_parse_pipe_beats_earlier_angle() {
        // '|' wins even when '>' occurs first in the text.
        assert_eq!(
            LinkToken::parse("a > b|Target"),
            LinkToken {
                alias: Some("a > b"),
                link: "Target",
                window: None,
            }
        );
    }

    #[test]
    fn test_parse_entity_delimiter() {
        assert_eq!(
            LinkToken::parse("Alias&gt;Page"),
            LinkToken {
                alias: Some("Alias"),
                link: "Page",
                window: None,
            }
        );
    }

    #[test]
    fn test_external_link() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(
            apply("[http://example.com]", &mut ctx),
            "<a href=\"http://example.com\">http://example.com</a>"
        );
    }

    #[test]
    fn test_external_link_with_alias_and_default_rel() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        let filter = LinkFilter::new(&Messages::new(), Some("nofollow".to_owned()));
        let output = Filter::apply(&filter, "[Example>http://example.com]", &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(
            output,
            "<a href=\"http://example.com\" rel=\"nofollow\">Example</a>"
        );
    }

    #[test]
    fn test_mailto_link() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(
            apply("[mailto:joe@example.com]", &mut ctx),
            "<a href=\"mailto:joe@example.com\">mailto:joe@example.com</a>"
        );
    }

    #[test]
    fn test_scheme_deep_in_text_is_not_external() {
        let wiki = MemoryWiki::new().with_create_links(false);
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        // "://" beyond the first ten characters does not classify as external.
        let output = apply("[SomeLongPageName://x]", &mut ctx);
        assert!(!output.contains("<a href"));
    }

    #[test]
    fn test_bare_anchor_link() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(
            apply("[#section]", &mut ctx),
            "<a href=\"#section\">section</a>"
        );
    }

    #[test]
    fn test_bare_anchor_with_alias() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(
            apply("[See below|#details]", &mut ctx),
            "<a href=\"#details\">See below</a>"
        );
    }

    #[test]
    fn test_internal_existing_page_with_alias() {
        let wiki = MemoryWiki::new().with_page("PageA");
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        assert_eq!(
            apply("[Alias>PageA]", &mut ctx),
            "<span class=\"wikilink\"><a href=\"/wiki/PageA\">Alias</a></span>"
        );
        assert!(ctx.is_cacheable());
    }

    #[test]
    fn test_internal_existing_page_display_transform() {
        let wiki = MemoryWiki::new().with_page("Main.FrontPage");
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        // Space qualifier dropped, camel case split into words.
        assert_eq!(
            apply("[Main.FrontPage]", &mut ctx),
            "<span class=\"wikilink\"><a href=\"/wiki/Main/FrontPage\">Front Page</a></span>"
        );
    }

    #[test]
    fn test_internal_link_with_anchor() {
        let wiki = MemoryWiki::new().with_page("PageA");
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        let output = apply("[PageA#part2]", &mut ctx);
        assert!(output.contains("href=\"/wiki/PageA#part2\""));
    }

    #[test]
    fn test_missing_page_creates_link_and_marks_non_cacheable() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        let output = apply("[PageB]", &mut ctx);
        assert!(output.contains("wikicreatelink"));
        assert!(output.contains("Page B"));
        assert!(!ctx.is_cacheable());
    }

    #[test]
    fn test_missing_page_without_create_shows_plain_text() {
        let wiki = MemoryWiki::new().with_create_links(false);
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        assert_eq!(apply("[PageB]", &mut ctx), "Page B");
        assert!(ctx.is_cacheable());
    }

    #[test]
    fn test_window_target_spliced_as_rel() {
        let wiki = MemoryWiki::new().with_page("PageA");
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        let output = apply("[Alias>PageA>blank]", &mut ctx);
        assert_eq!(
            output,
            "<span class=\"wikilink\"><a rel=\"_blank\" href=\"/wiki/PageA\">Alias</a></span>"
        );
    }

    #[test]
    fn test_registered_interwiki_expands() {
        let interwiki = MemoryInterwiki::new().with_space("c2", "http://c2.com/cgi/wiki?");
        let mut ctx = context_with(MemoryWiki::new(), interwiki);
        assert_eq!(
            apply("[WikiWiki@c2]", &mut ctx),
            "<a href=\"http://c2.com/cgi/wiki?WikiWiki\">WikiWiki</a>"
        );
    }

    #[test]
    fn test_unknown_interwiki_emits_error_marker() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(
            apply("[PageC@unknownspace]", &mut ctx),
            "[<span class=\"error\">PageC@unknownspace?</span>]"
        );
    }

    #[test]
    fn test_empty_brackets_pass_through_escaped() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(apply("a [] b [ ] c", &mut ctx), "a [] b [ ] c");
    }

    #[test]
    fn test_bare_hash_passes_through() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        assert_eq!(apply("[#]", &mut ctx), "[#]");
        assert!(ctx.is_cacheable());
    }

    #[test]
    fn test_trailing_hash_stays_in_page_name() {
        let wiki = MemoryWiki::new().with_create_links(false);
        let mut ctx = context_with(wiki, MemoryInterwiki::new());
        // A final '#' is not an anchor separator.
        let output = apply("[PageA#]", &mut ctx);
        assert!(!output.contains("href"));
    }

    #[test]
    fn test_surrounding_text_is_preserved() {
        let mut ctx = context_with(MemoryWiki::new(), MemoryInterwiki::new());
        let output = apply("see [#here] now", &mut ctx);
        assert_eq!(output, "see <a href=\"#here\">here</a> now");
    }
}
