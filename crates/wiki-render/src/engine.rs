//! Render engine: the standard filter chain plus host capabilities.

use std::sync::Arc;

use crate::context::RenderContext;
use crate::filters::{
    BoldFilter, CodeProtectFilter, CodeRestoreFilter, EscapeFilter, HeadingFilter, ItalicFilter,
    LinkFilter, ListFilter,
};
use crate::host::{HeadingIdGenerator, IdGenerator, InterwikiRegistry, WikiHost};
use crate::messages::Messages;
use crate::pipeline::Pipeline;

/// Configuration for [`RenderEngine`].
pub struct EngineConfig {
    /// `rel` attribute emitted on external links without an explicit target.
    pub external_rel: Option<String>,
    /// Prefix headings with outline-numbering labels from the context.
    pub outline_numbering: bool,
    /// Message store filters resolve their templates from.
    pub messages: Messages,
    /// Heading-id generator; defaults to [`HeadingIdGenerator`].
    pub ids: Option<Arc<dyn IdGenerator>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            external_rel: None,
            outline_numbering: false,
            messages: Messages::new(),
            ids: None,
        }
    }

    /// Set the default `rel` attribute for external links.
    #[must_use]
    pub fn with_external_rel(mut self, rel: impl Into<String>) -> Self {
        self.external_rel = Some(rel.into());
        self
    }

    /// Enable outline-numbering prefixes on headings.
    #[must_use]
    pub fn with_outline_numbering(mut self) -> Self {
        self.outline_numbering = true;
        self
    }

    /// Replace the message store.
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Replace the heading-id generator.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }
}

/// Wiki markup renderer.
///
/// Owns the finalized filter [`Pipeline`] and the host capability handles.
/// The engine is built once and is read-only afterwards, so it can be
/// shared across threads; every render call gets its own fresh
/// [`RenderContext`] from [`new_context`](Self::new_context).
pub struct RenderEngine {
    pipeline: Pipeline,
    host: Arc<dyn WikiHost>,
    interwiki: Arc<dyn InterwikiRegistry>,
    ids: Arc<dyn IdGenerator>,
    outline_numbering: bool,
}

impl RenderEngine {
    /// Build an engine with the standard filter chain.
    ///
    /// Chain order: code-protect first, then escape, bold, italic, heading,
    /// list, link, and code-restore last, so restore runs after every
    /// content-mutating filter.
    #[must_use]
    pub fn new(
        host: Arc<dyn WikiHost>,
        interwiki: Arc<dyn InterwikiRegistry>,
        config: EngineConfig,
    ) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.register(CodeProtectFilter::new());
        pipeline.register(EscapeFilter::new());
        pipeline.register(BoldFilter::new(&config.messages));
        pipeline.register(ItalicFilter::new(&config.messages));
        pipeline.register(HeadingFilter::new(&config.messages));
        pipeline.register(ListFilter::new());
        pipeline.register(LinkFilter::new(&config.messages, config.external_rel.clone()));
        pipeline.register(CodeRestoreFilter::new(&config.messages));
        pipeline.finalize();
        Self::with_pipeline(pipeline, host, interwiki, config)
    }

    /// Build an engine around a custom, already-registered pipeline.
    ///
    /// Finalizes the pipeline; use this when the host contributes its own
    /// filters.
    #[must_use]
    pub fn with_pipeline(
        mut pipeline: Pipeline,
        host: Arc<dyn WikiHost>,
        interwiki: Arc<dyn InterwikiRegistry>,
        config: EngineConfig,
    ) -> Self {
        pipeline.finalize();
        let ids = config
            .ids
            .unwrap_or_else(|| Arc::new(HeadingIdGenerator));
        Self {
            pipeline,
            host,
            interwiki,
            ids,
            outline_numbering: config.outline_numbering,
        }
    }

    /// Create a fresh per-render context bound to this engine's host.
    #[must_use]
    pub fn new_context(&self) -> RenderContext {
        let mut context = RenderContext::new(
            Arc::clone(&self.host),
            Arc::clone(&self.interwiki),
            Arc::clone(&self.ids),
        );
        context.set_outline_numbering(self.outline_numbering);
        context
    }

    /// Render raw markup through the filter chain.
    ///
    /// Never fails: individual filter errors are logged and skipped, so the
    /// caller always gets a (possibly partially transformed) string back.
    /// Query `context.is_cacheable()` afterwards to decide about memoizing
    /// the result.
    #[must_use]
    pub fn render(&self, markup: &str, context: &mut RenderContext) -> String {
        self.pipeline.run(markup, context)
    }

    /// The resolved filter chain.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
