//! Protect-then-restore handling of `{code}` regions.
//!
//! [`CodeProtectFilter`] runs before everything else: it strips the body of
//! each `{code}`...`{code}` region out of the visible stream into the
//! content vault, leaving only the delimiters. [`CodeRestoreFilter`] runs
//! after every content-mutating filter and re-emits the saved bodies in
//! strict FIFO order, so no intermediate filter ever sees protected text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::matcher::{TokenFilter, TokenMatcher};
use crate::messages::{Messages, fill};
use crate::pipeline::{Before, FilterError, FilterId};

/// Vault key shared by the protect/restore pair.
const VAULT_KEY: &str = "code";

static PROTECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{code(?::([^}]*))?\}(.*?)\{code\}").expect("invalid code protect regex")
});

static RESTORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{code(?::([^}]*))?\}\{code\}").expect("invalid code restore regex")
});

/// Removes `{code}` bodies from the stream into the vault.
pub struct CodeProtectFilter {
    matcher: TokenMatcher,
}

impl CodeProtectFilter {
    /// Create the protect half of the pair.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: TokenMatcher::new(PROTECT_PATTERN.clone()),
        }
    }
}

impl Default for CodeProtectFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenFilter for CodeProtectFilter {
    fn id(&self) -> FilterId {
        FilterId::CodeProtect
    }

    fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    fn before(&self) -> Before {
        Before::All
    }

    fn handle(
        &self,
        output: &mut String,
        token: &Captures<'_>,
        context: &mut RenderContext,
    ) -> Result<(), FilterError> {
        let body = &token[2];
        context.vault_mut().protect(VAULT_KEY, body);
        output.push_str("{code");
        if let Some(params) = token.get(1) {
            output.push(':');
            output.push_str(params.as_str());
        }
        output.push_str("}{code}");
        Ok(())
    }
}

/// Re-injects vault bodies at the emptied `{code}` delimiters.
pub struct CodeRestoreFilter {
    matcher: TokenMatcher,
    template: String,
}

impl CodeRestoreFilter {
    /// Create the restore half of the pair.
    #[must_use]
    pub fn new(messages: &Messages) -> Self {
        Self {
            matcher: TokenMatcher::new(RESTORE_PATTERN.clone()),
            template: messages.template("filter.code.block"),
        }
    }
}

impl TokenFilter for CodeRestoreFilter {
    fn id(&self) -> FilterId {
        FilterId::CodeRestore
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
        match context.vault_mut().restore(VAULT_KEY) {
            Some(body) => output.push_str(&fill(&self.template, &[("body", &body)])),
            None => {
                // More delimiter pairs than saved bodies: leave them as-is.
                tracing::warn!("code vault exhausted; leaving delimiters untouched");
                output.push_str(&token[0]);
            }
        }
        Ok(())
    }
}
