//! Backslash escaping of markup characters.
//!
//! `\c` renders `c` as a character entity, hiding it from every later
//! filter in the chain. Alphanumerics need no protection and pass through
//! unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::pipeline::{FilterError, FilterId};

static ESCAPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(.)").expect("invalid escape regex"));

/// `\c` character escaping.
pub struct EscapeFilter {
    matcher: TokenMatcher,
}

impl EscapeFilter {
    /// Create the escape filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: TokenMatcher::new(ESCAPE_PATTERN.clone()),
        }
    }
}

impl Default for EscapeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for EscapeFilter {
    fn id(&self) -> FilterId {
        FilterId::Escape
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
        let escaped = token[1]
            .chars()
            .next()
            .filter(|c| !c.is_alphanumeric());
        match escaped {
            Some(c) => {
                output.push_str("&#");
                output.push_str(&(c as u32).to_string());
                output.push(';');
            }
            None => output.push_str(&token[1]),
        }
        Ok(())
    }
}
