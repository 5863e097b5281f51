//! Wiki markup rendering as a pipeline of regex-driven filters.
//!
//! A [`RenderEngine`] pushes raw markup through an ordered chain of
//! [`Filter`]s. Each filter scans for its own token syntax, replaces the
//! tokens with HTML, and copies everything else through untouched. The
//! shared [`RenderContext`] carries per-render state: the content vault
//! that shields `{code}` regions from the rest of the chain, heading
//! occurrence counts, the cacheability flag, and an early-stop switch.
//!
//! The engine talks to the embedding wiki only through the [`WikiHost`],
//! [`InterwikiRegistry`], and [`IdGenerator`] traits, so link existence
//! checks and URL construction stay the host's business. In-memory
//! implementations ship for embedding and tests.
//!
//! ```
//! use std::sync::Arc;
//! use wiki_render::{EngineConfig, MemoryInterwiki, MemoryWiki, RenderEngine};
//!
//! let engine = RenderEngine::new(
//!     Arc::new(MemoryWiki::new()),
//!     Arc::new(MemoryInterwiki::new()),
//!     EngineConfig::default(),
//! );
//! let mut context = engine.new_context();
//! let html = engine.render("1 Welcome\n\n* first\n* second\n", &mut context);
//! assert!(html.contains("<h3 class=\"heading-1\" id=\"HWelcome\">Welcome</h3>"));
//! assert!(html.contains("<ul class=\"star\">"));
//! assert!(context.is_cacheable());
//! ```

pub mod context;
pub mod engine;
pub mod escape;
pub mod filters;
pub mod host;
pub mod matcher;
pub mod messages;
pub mod pipeline;

pub use context::{ContentVault, RenderContext};
pub use engine::{EngineConfig, RenderEngine};
pub use escape::{escape_attribute, escape_html, escape_url};
pub use filters::{
    BoldFilter, CodeProtectFilter, CodeRestoreFilter, EscapeFilter, HeadingFilter, ItalicFilter,
    LinkFilter, ListFilter,
};
pub use host::{
    HeadingIdGenerator, IdGenerator, InterwikiRegistry, MemoryInterwiki, MemoryWiki, WikiHost,
    convert_wiki_words,
};
pub use matcher::{TokenFilter, TokenMatcher};
pub use messages::{Messages, fill};
pub use pipeline::{Before, Filter, FilterError, FilterId, Pipeline};
