//! Filter chain scheduling.
//!
//! A [`Pipeline`] holds the ordered filter list, resolves "runs-before"
//! constraints at registration time, and executes the chain over the input.
//! It is built once, finalized, and then read-only, so it can be shared
//! across concurrent render calls as long as each call brings its own
//! [`RenderContext`].

use std::collections::HashSet;
use std::fmt;

use crate::context::RenderContext;

/// Stable identity of a filter type.
///
/// Ordering constraints (`before`, `replaces`) compare these identifiers,
/// keeping scheduling independent of any type-name reflection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterId {
    /// Removes `{code}` bodies into the vault.
    CodeProtect,
    /// Backslash character escaping.
    Escape,
    /// `*bold*` inline style.
    Bold,
    /// `~~italic~~` inline style.
    Italic,
    /// Outline headings (`1`, `1.1`, ...).
    Heading,
    /// Nested list reconstruction.
    List,
    /// Bracketed link resolution.
    Link,
    /// Re-injects `{code}` bodies from the vault.
    CodeRestore,
    /// Host-contributed filter, identified by a static name.
    Custom(&'static str),
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeProtect => write!(f, "code-protect"),
            Self::Escape => write!(f, "escape"),
            Self::Bold => write!(f, "bold"),
            Self::Italic => write!(f, "italic"),
            Self::Heading => write!(f, "heading"),
            Self::List => write!(f, "list"),
            Self::Link => write!(f, "link"),
            Self::CodeRestore => write!(f, "code-restore"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Placement constraint: which filters must follow this one in the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Before {
    /// No constraint; the filter is appended.
    #[default]
    Unconstrained,
    /// The filter precedes every other filter.
    All,
    /// The filter precedes the named filters.
    Filters(Vec<FilterId>),
}

/// Error raised by a filter's apply step.
///
/// Filter failures are non-fatal to the pipeline: the scheduler logs them
/// and treats the step as a no-op.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A filter pattern failed to compile.
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// An interwiki space tag is not registered.
    #[error("unknown interwiki space: {0}")]
    UnknownInterwiki(String),
    /// A host capability failed.
    #[error("host capability failed: {0}")]
    Host(String),
}

/// A single ordered transformation step.
///
/// Filters are stateless and reused across render calls; all per-render
/// state lives in the [`RenderContext`].
pub trait Filter: Send + Sync {
    /// Stable identity used by ordering constraints.
    fn id(&self) -> FilterId;

    /// Filters that must follow this one.
    fn before(&self) -> Before {
        Before::Unconstrained
    }

    /// Filters this one supersedes; they are removed at finalize time.
    fn replaces(&self) -> Vec<FilterId> {
        Vec::new()
    }

    /// Whether this filter's output depends only on its input.
    fn cacheable(&self) -> bool {
        true
    }

    /// Transform `input` into the next stage of the chain.
    ///
    /// `Ok(None)` means the filter produced no output; the scheduler logs a
    /// warning and keeps the input unchanged.
    ///
    /// # Errors
    ///
    /// An error is logged by the scheduler and the step is skipped.
    fn apply(&self, input: &str, context: &mut RenderContext)
        -> Result<Option<String>, FilterError>;
}

/// Ordered, finalized sequence of filters executed per render call.
#[derive(Default)]
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a filter at the position its `before` constraint demands.
    ///
    /// The filter lands at the minimum index among the filters it must
    /// precede, at position 0 if it precedes everything, or at the end if
    /// unconstrained. Ties keep registration order (stable insert).
    pub fn register<F: Filter + 'static>(&mut self, filter: F) {
        let index = match filter.before() {
            Before::All => 0,
            Before::Filters(ids) => self
                .filters
                .iter()
                .position(|existing| ids.contains(&existing.id()))
                .unwrap_or(self.filters.len()),
            Before::Unconstrained => self.filters.len(),
        };
        self.filters.insert(index, Box::new(filter));
    }

    /// Remove every filter named in another filter's `replaces` set.
    ///
    /// Idempotent; call once after all registrations.
    pub fn finalize(&mut self) {
        let replaced: HashSet<FilterId> = self
            .filters
            .iter()
            .flat_map(|filter| filter.replaces())
            .collect();
        self.filters.retain(|filter| !replaced.contains(&filter.id()));
    }

    /// Resolved filter order.
    #[must_use]
    pub fn order(&self) -> Vec<FilterId> {
        self.filters.iter().map(|filter| filter.id()).collect()
    }

    /// Number of registered filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the pipeline has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain over `input`.
    ///
    /// The stop flag is checked before each filter; once set, the
    /// accumulated output is returned as-is. A filter that fails or returns
    /// no output is logged and treated as a no-op for that step, and a step
    /// whose output equals its input never disqualifies caching.
    #[must_use]
    pub fn run(&self, input: &str, context: &mut RenderContext) -> String {
        let mut text = input.to_owned();
        for filter in &self.filters {
            if context.stop_requested() {
                tracing::debug!(filter = %filter.id(), "stop requested; ending filter chain");
                break;
            }
            let was_cacheable = context.is_cacheable();
            if !filter.cacheable() {
                context.set_cacheable(false);
            }
            match filter.apply(&text, context) {
                Ok(Some(output)) => {
                    if output == text {
                        context.set_cacheable(was_cacheable);
                    } else {
                        text = output;
                    }
                }
                Ok(None) => {
                    tracing::warn!(filter = %filter.id(), "filter produced no output; treating as no-op");
                    context.set_cacheable(was_cacheable);
                }
                Err(error) => {
                    tracing::warn!(filter = %filter.id(), error = %error, "filter failed; skipping");
                    context.set_cacheable(was_cacheable);
                }
            }
        }
        text
    }
}
