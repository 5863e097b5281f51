//! Inline text styles: `*bold*` and `~~italic~~`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::messages::{Messages, fill};
use crate::pipeline::{FilterError, FilterId};

// The opening and closing stars must hug non-space text, so a list bullet
// ("* item") never reads as an opening star.
static BOLD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(\S(?:[^\n*]*\S)?)\*").expect("invalid bold regex"));

static ITALIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^\n~]+)~~").expect("invalid italic regex"));

/// `*text*` inline style.
pub struct BoldFilter {
    matcher: TokenMatcher,
    template: String,
}

impl BoldFilter {
    /// Create the bold filter, resolving its template once.
    #[must_use]
    pub fn new(messages: &Messages) -> Self {
        Self {
            matcher: TokenMatcher::new(BOLD_PATTERN.clone()),
            template: messages.template("filter.bold"),
        }
    }
}

impl TokenFilter for BoldFilter {
    fn id(&self) -> FilterId {
        FilterId::Bold
    }

    fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    fn handle(
        &self,
        output: &mut String,
        token: &Captures<'_>,
        _context: &mut RenderContext,
    ) -> Result<(), FilterError> {
        output.push_str(&fill(&self.template, &[("text", &token[1])]));
        Ok(())
    }
}

/// `~~text~~` inline style.
pub struct ItalicFilter {
    matcher: TokenMatcher,
    template: String,
}

impl ItalicFilter {
    /// Create the italic filter, resolving its template once.
    #[must_use]
    pub fn new(messages: &Messages) -> Self {
        Self {
            matcher: TokenMatcher::new(ITALIC_PATTERN.clone()),
            template: messages.template("filter.italic"),
        }
    }
}

impl TokenFilter for ItalicFilter {
    fn id(&self) -> FilterId {
        FilterId::Italic
    }

    fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    fn handle(
        &self,
        output: &mut String,
        token: &Captures<'_>,
        _context: &mut RenderContext,
    ) -> Result<(), FilterError> {
        output.push_str(&fill(&self.template, &[("text", &token[1])]));
        Ok(())
    }
}
