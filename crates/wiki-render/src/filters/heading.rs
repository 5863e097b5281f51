//! Outline heading markup (`1 Title`, `1.1 Subtitle`, ...).
//!
//! Every heading gets a render-unique id derived from its text and the
//! number of identical heading texts seen earlier, so two `1.1 Overview`
//! headings in one document link to distinct anchors.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::escape::escape_attribute;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::messages::{Messages, fill};
use crate::pipeline::{FilterError, FilterId};

static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(1(?:\.1)*)[ \t]+(\S[^\n]*?)[ \t]*$").expect("invalid heading regex")
});

/// Turns outline markup into anchored headings.
pub struct HeadingFilter {
    matcher: TokenMatcher,
    template: String,
}

impl HeadingFilter {
    /// Create the heading filter, resolving its template once.
    #[must_use]
    pub fn new(messages: &Messages) -> Self {
        Self {
            matcher: TokenMatcher::new(HEADING_PATTERN.clone()),
            template: messages.template("filter.heading"),
        }
    }
}

impl TokenFilter for HeadingFilter {
    fn id(&self) -> FilterId {
        FilterId::Heading
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
        let outline = token[1].replace('.', "-");
        let text = &token[2];

        let occurrence = context.record_heading(text);
        let id = context.ids().make_id(text, occurrence);

        let display = if context.outline_numbering() {
            context
                .numbering(&id)
                .map_or_else(|| text.to_owned(), |label| format!("{label} {text}"))
        } else {
            text.to_owned()
        };

        output.push_str(&fill(
            &self.template,
            &[
                ("outline", &outline),
                ("id", &escape_attribute(&id)),
                ("text", &display),
            ],
        ));
        Ok(())
    }
}
