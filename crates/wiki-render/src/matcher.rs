//! Regex token scanning shared by all built-in filters.

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::pipeline::{Before, Filter, FilterError, FilterId};

/// Wraps a compiled pattern and drives scan-and-replace over an input.
///
/// Text between matches is copied verbatim; for each match the handler is
/// responsible for appending the replacement to the output buffer.
#[derive(Clone, Debug)]
pub struct TokenMatcher {
    pattern: Regex,
}

impl TokenMatcher {
    /// Wrap a compiled pattern.
    #[must_use]
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Find all non-overlapping matches and rebuild the input around them.
    ///
    /// # Errors
    ///
    /// Propagates the first handler error; the scheduler treats it as a
    /// no-op for the whole step.
    pub fn scan<H>(
        &self,
        input: &str,
        context: &mut RenderContext,
        mut handler: H,
    ) -> Result<String, FilterError>
    where
        H: FnMut(&mut String, &Captures<'_>, &mut RenderContext) -> Result<(), FilterError>,
    {
        let mut output = String::with_capacity(input.len());
        let mut last = 0;
        for token in self.pattern.captures_iter(input) {
            let Some(matched) = token.get(0) else { continue };
            output.push_str(&input[last..matched.start()]);
            handler(&mut output, &token, context)?;
            last = matched.end();
        }
        output.push_str(&input[last..]);
        Ok(output)
    }
}

/// Base behavior for pattern-driven filters.
///
/// Implementors supply a matcher and a per-match handler; the blanket
/// [`Filter`] impl runs the [`set_up`](TokenFilter::set_up) hook once per
/// render, scans the input, and returns the rebuilt output.
pub trait TokenFilter: Send + Sync {
    /// Stable identity used by ordering constraints.
    fn id(&self) -> FilterId;

    /// The token matcher for this filter.
    fn matcher(&self) -> &TokenMatcher;

    /// Filters that must follow this one.
    fn before(&self) -> Before {
        Before::Unconstrained
    }

    /// Filters this one supersedes.
    fn replaces(&self) -> Vec<FilterId> {
        Vec::new()
    }

    /// Whether this filter's output depends only on its input.
    fn cacheable(&self) -> bool {
        true
    }

    /// Hook run once before scanning.
    fn set_up(&self, _context: &mut RenderContext) {}

    /// Append the transformation of one match to the output buffer.
    ///
    /// # Errors
    ///
    /// An error aborts the scan; the scheduler skips the whole step.
    fn handle(
        &self,
        output: &mut String,
        token: &Captures<'_>,
        context: &mut RenderContext,
    ) -> Result<(), FilterError>;
}

impl<T: TokenFilter> Filter for T {
    fn id(&self) -> FilterId {
        TokenFilter::id(self)
    }

    fn before(&self) -> Before {
        TokenFilter::before(self)
    }

    fn replaces(&self) -> Vec<FilterId> {
        TokenFilter::replaces(self)
    }

    fn cacheable(&self) -> bool {
        TokenFilter::cacheable(self)
    }

    fn apply(
        &self,
        input: &str,
        context: &mut RenderContext,
    ) -> Result<Option<String>, FilterError> {
        self.set_up(context);
        let output = self
            .matcher()
            .scan(input, context, |output, token, context| {
                self.handle(output, token, context)
            })?;
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadingIdGenerator, MemoryInterwiki, MemoryWiki};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn context() -> RenderContext {
        RenderContext::new(
            Arc::new(MemoryWiki::new()),
            Arc::new(MemoryInterwiki::new()),
            Arc::new(HeadingIdGenerator),
        )
    }

    fn matcher(pattern: &str) -> TokenMatcher {
        TokenMatcher::new(Regex::new(pattern).unwrap())
    }

    #[test]
    fn test_scan_copies_gaps_verbatim() {
        let matcher = matcher(r"\d+");
        let mut ctx = context();
        let output = matcher
            .scan("a 1 b 22 c", &mut ctx, |out, token, _| {
                out.push_str(&format!("<{}>", &token[0]));
                Ok(())
            })
            .unwrap();
        assert_eq!(output, "a <1> b <22> c");
    }

    #[test]
    fn test_scan_without_matches_returns_input() {
        let matcher = matcher(r"\d+");
        let mut ctx = context();
        let output = matcher
            .scan("no digits", &mut ctx, |_, _, _| Ok(()))
            .unwrap();
        assert_eq!(output, "no digits");
    }

    #[test]
    fn test_scan_handler_error_propagates() {
        let matcher = matcher(r"\d+");
        let mut ctx = context();
        let result = matcher.scan("1", &mut ctx, |_, _, _| {
            Err(FilterError::Host("nope".to_owned()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_token_filter_blanket_impl() {
        struct Shout {
            matcher: TokenMatcher,
        }

        impl TokenFilter for Shout {
            fn id(&self) -> FilterId {
                FilterId::Custom("shout")
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
                output.push_str(&token[1].to_uppercase());
                Ok(())
            }
        }

        let filter = Shout {
            matcher: matcher(r"!(\w+)!"),
        };
        let mut ctx = context();
        let output = Filter::apply(&filter, "say !hello! now", &mut ctx).unwrap();
        assert_eq!(output, Some("say HELLO now".to_owned()));
    }
}
