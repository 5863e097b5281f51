//! Host capability interfaces consumed by the rendering core.
//!
//! The core never talks to storage, permissions, or URL schemes directly:
//! link existence, link emission, interwiki expansion, and heading-id
//! generation are all delegated through these traits. In-memory
//! implementations are provided for tests and simple embedders.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::escape::{escape_attribute, escape_html};
use crate::pipeline::FilterError;

/// Capability for resolving and emitting links to wiki pages.
///
/// `append_link` and `append_create_link` write directly into the output
/// buffer so the host fully controls the link markup.
pub trait WikiHost: Send + Sync {
    /// Whether a page with this name exists.
    fn exists(&self, page: &str) -> bool;

    /// Append a link to an existing page.
    fn append_link(&self, buffer: &mut String, page: &str, text: &str, anchor: Option<&str>);

    /// Append a "create this page" link for a missing page.
    fn append_create_link(&self, buffer: &mut String, page: &str, text: &str);

    /// Whether missing pages get a create link.
    fn show_create(&self) -> bool {
        true
    }
}

/// Registry of interwiki spaces reachable through `target@space` links.
pub trait InterwikiRegistry: Send + Sync {
    /// Whether this space tag is registered.
    fn contains(&self, space: &str) -> bool;

    /// Expand an interwiki link into the output buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownInterwiki`] if the space is not
    /// registered. The caller treats this as non-fatal.
    fn expand(
        &self,
        buffer: &mut String,
        space: &str,
        target: &str,
        text: &str,
        anchor: Option<&str>,
    ) -> Result<(), FilterError>;
}

/// Generator of collision-free heading anchors.
pub trait IdGenerator: Send + Sync {
    /// Derive an id for heading `text`, unique per `occurrence` index.
    fn make_id(&self, text: &str, occurrence: usize) -> String;
}

/// In-memory wiki with a fixed page set.
#[derive(Debug, Default)]
pub struct MemoryWiki {
    pages: HashSet<String>,
    base_url: String,
    show_create: bool,
}

impl MemoryWiki {
    /// Create an empty wiki with create links enabled and base URL `/wiki/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: HashSet::new(),
            base_url: "/wiki/".to_owned(),
            show_create: true,
        }
    }

    /// Add an existing page.
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.pages.insert(page.into());
        self
    }

    /// Set the URL prefix for page links.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enable or disable create links for missing pages.
    #[must_use]
    pub fn with_create_links(mut self, show_create: bool) -> Self {
        self.show_create = show_create;
        self
    }

    /// URL path for a page name: the `Space.Page` qualifier dot becomes `/`.
    fn page_url(&self, page: &str) -> String {
        format!("{}{}", self.base_url, page.replacen('.', "/", 1))
    }
}

impl WikiHost for MemoryWiki {
    fn exists(&self, page: &str) -> bool {
        self.pages.contains(page)
    }

    fn append_link(&self, buffer: &mut String, page: &str, text: &str, anchor: Option<&str>) {
        buffer.push_str("<span class=\"wikilink\"><a href=\"");
        buffer.push_str(&escape_attribute(&self.page_url(page)));
        if let Some(anchor) = anchor {
            buffer.push('#');
            buffer.push_str(&escape_attribute(anchor));
        }
        buffer.push_str("\">");
        buffer.push_str(&escape_html(text));
        buffer.push_str("</a></span>");
    }

    fn append_create_link(&self, buffer: &mut String, page: &str, text: &str) {
        buffer.push_str("<span class=\"wikicreatelink\">");
        buffer.push_str(&escape_html(text));
        buffer.push_str("<a href=\"");
        buffer.push_str(&escape_attribute(&self.page_url(page)));
        buffer.push_str("?create=1\">?</a></span>");
    }

    fn show_create(&self) -> bool {
        self.show_create
    }
}

/// In-memory interwiki registry mapping space tags to URL prefixes.
#[derive(Debug, Default)]
pub struct MemoryInterwiki {
    spaces: HashMap<String, String>,
}

impl MemoryInterwiki {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a space tag with its URL prefix.
    #[must_use]
    pub fn with_space(mut self, space: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        self.spaces.insert(space.into(), url_prefix.into());
        self
    }
}

impl InterwikiRegistry for MemoryInterwiki {
    fn contains(&self, space: &str) -> bool {
        self.spaces.contains_key(space)
    }

    fn expand(
        &self,
        buffer: &mut String,
        space: &str,
        target: &str,
        text: &str,
        anchor: Option<&str>,
    ) -> Result<(), FilterError> {
        let Some(prefix) = self.spaces.get(space) else {
            return Err(FilterError::UnknownInterwiki(space.to_owned()));
        };
        buffer.push_str("<a href=\"");
        buffer.push_str(&escape_attribute(&format!("{prefix}{target}")));
        if let Some(anchor) = anchor {
            buffer.push('#');
            buffer.push_str(&escape_attribute(anchor));
        }
        buffer.push_str("\">");
        buffer.push_str(&escape_html(text));
        buffer.push_str("</a>");
        Ok(())
    }
}

/// Default heading-id generator: `H` plus the alphanumeric characters of the
/// text, suffixed with the occurrence index for repeats.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingIdGenerator;

impl IdGenerator for HeadingIdGenerator {
    fn make_id(&self, text: &str, occurrence: usize) -> String {
        let mut id = String::with_capacity(text.len() + 1);
        id.push('H');
        id.extend(text.chars().filter(|c| c.is_alphanumeric()));
        if occurrence > 0 {
            id.push('-');
            id.push_str(&occurrence.to_string());
        }
        id
    }
}

static WIKI_WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z])([A-Z])").expect("invalid wiki word regex"));

/// Split a CamelCase page name into words.
///
/// A space is inserted at every lowercase-to-uppercase boundary; text
/// without such a boundary is returned unchanged.
#[must_use]
pub fn convert_wiki_words(name: &str) -> String {
    WIKI_WORD_BOUNDARY.replace_all(name, "$1 $2").into_owned()
}
