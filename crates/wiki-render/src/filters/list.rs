//! Nested list reconstruction from flat bullet lines.
//!
//! A contiguous block of bulleted lines carries its nesting in the bullet
//! prefix of each line (`*`, `**`, `*#`, ...). The reconstructor diffs
//! successive prefixes and interpolates the open/close tags the HTML
//! structure needs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::pipeline::{FilterError, FilterId};

// The bullet run must be separated from the item text by a space; a tab
// would survive into the prefix the reconstructor diffs on.
static LIST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*[-*#1iIaAghHkKj]+\.? +[^\n]+\n?)+")
        .expect("invalid list block regex")
});

/// Open tag for one bullet character.
fn open_tag(bullet: char) -> &'static str {
    match bullet {
        '*' => "<ul class=\"star\">",
        '#' | '1' => "<ol>",
        'i' => "<ol class=\"roman\">",
        'I' => "<ol class=\"ROMAN\">",
        'a' => "<ol class=\"alpha\">",
        'A' => "<ol class=\"ALPHA\">",
        'g' => "<ol class=\"greek\">",
        'h' => "<ol class=\"hiragana\">",
        'H' => "<ol class=\"HIRAGANA\">",
        'k' => "<ol class=\"katakana\">",
        'K' => "<ol class=\"KATAKANA\">",
        'j' => "<ol class=\"hebrew\">",
        _ => "<ul class=\"minus\">",
    }
}

/// Close tag for one bullet character. All ordered variants share `</ol>`.
fn close_tag(bullet: char) -> &'static str {
    match bullet {
        '-' | '*' => "</ul>",
        _ => "</ol>",
    }
}

/// Rebuild one contiguous block of bullet lines as nested list markup.
///
/// `last` holds the previous line's bullet run; each new line closes the
/// levels it no longer shares with `last` and opens the levels it adds.
/// Items stay open until the next transition (or the end of the block)
/// closes them.
pub(crate) fn reconstruct_list(block: &str) -> String {
    let mut out = String::with_capacity(block.len() * 2);
    let mut last: Vec<char> = Vec::new();

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((prefix, text)) = line.split_once(' ') else {
            continue;
        };
        // An ordered marker may carry a trailing dot ("1. item").
        let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
        if prefix.is_empty() {
            continue;
        }
        let curr: Vec<char> = prefix.chars().collect();

        let shared = last
            .iter()
            .zip(&curr)
            .take_while(|(a, b)| a == b)
            .count();

        for &bullet in last[shared..].iter().rev() {
            out.push_str("</li>");
            out.push_str(close_tag(bullet));
            out.push('\n');
        }
        if curr.len() == shared && !last.is_empty() {
            // Sibling item at the same depth: close the dangling one.
            out.push_str("</li>\n");
        }
        for (depth, &bullet) in curr.iter().enumerate().skip(shared) {
            if depth > shared {
                // The parent list was opened this run and has no item yet.
                out.push_str("<li class=\"innerlist\">");
            }
            out.push_str(open_tag(bullet));
            out.push('\n');
        }
        out.push_str("<li>");
        out.push_str(text.trim_start());
        out.push('\n');

        last = curr;
    }

    for &bullet in last.iter().rev() {
        out.push_str("</li>");
        out.push_str(close_tag(bullet));
        out.push('\n');
    }
    out
}

/// Turns flat bullet blocks into nested `<ul>`/`<ol>` structures.
pub struct ListFilter {
    matcher: TokenMatcher,
}

impl ListFilter {
    /// Create the list filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: TokenMatcher::new(LIST_BLOCK.clone()),
        }
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for ListFilter {
    fn id(&self) -> FilterId {
        FilterId::List
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
        output.push_str(&reconstruct_list(&token[0]));
        Ok(())
    }
}
