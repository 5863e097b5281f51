//! Per-render mutable state shared across the filter chain.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::host::{IdGenerator, InterwikiRegistry, WikiHost};

/// Key-addressed store of protected text fragments.
///
/// A protect filter pushes fragments during its scan; the paired restore
/// filter pops them back in strict FIFO order later in the same render call.
/// The vault lives and dies with one [`RenderContext`].
#[derive(Debug, Default)]
pub struct ContentVault {
    stores: HashMap<String, VecDeque<String>>,
}

impl ContentVault {
    /// Save a fragment under `key`, after all previously saved ones.
    pub fn protect(&mut self, key: &str, body: impl Into<String>) {
        self.stores.entry(key.to_owned()).or_default().push_back(body.into());
    }

    /// Take the oldest unrestored fragment under `key`.
    ///
    /// Returns `None` when the vault is exhausted; the caller leaves the
    /// delimiter text untouched in that case.
    pub fn restore(&mut self, key: &str) -> Option<String> {
        self.stores.get_mut(key)?.pop_front()
    }

    /// Number of fragments still waiting to be restored under `key`.
    #[must_use]
    pub fn pending(&self, key: &str) -> usize {
        self.stores.get(key).map_or(0, VecDeque::len)
    }
}

/// Mutable state for one render call.
///
/// One instance is constructed per call (via
/// [`RenderEngine::new_context`](crate::RenderEngine::new_context)) and
/// passed by reference through the whole filter chain. The known state is
/// carried in typed fields; host-contributed filters can stash dynamic
/// values in the string extension map.
pub struct RenderContext {
    vault: ContentVault,
    stop_filtering: bool,
    cacheable: bool,
    headings: Vec<String>,
    numbering: HashMap<String, String>,
    outline_numbering: bool,
    extensions: HashMap<String, String>,
    host: Arc<dyn WikiHost>,
    interwiki: Arc<dyn InterwikiRegistry>,
    ids: Arc<dyn IdGenerator>,
}

impl RenderContext {
    /// Create a fresh context bound to the given host capabilities.
    #[must_use]
    pub fn new(
        host: Arc<dyn WikiHost>,
        interwiki: Arc<dyn InterwikiRegistry>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            vault: ContentVault::default(),
            stop_filtering: false,
            cacheable: true,
            headings: Vec::new(),
            numbering: HashMap::new(),
            outline_numbering: false,
            extensions: HashMap::new(),
            host,
            interwiki,
            ids,
        }
    }

    /// Whether the render result so far depends only on its input.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Mark the render result cacheable or not.
    pub fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
    }

    /// Ask the scheduler to stop after the current filter.
    pub fn stop_filtering(&mut self) {
        self.stop_filtering = true;
    }

    /// Whether a filter has requested an early stop.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_filtering
    }

    /// The protected-fragment vault.
    #[must_use]
    pub fn vault(&self) -> &ContentVault {
        &self.vault
    }

    /// Mutable access to the protected-fragment vault.
    pub fn vault_mut(&mut self) -> &mut ContentVault {
        &mut self.vault
    }

    /// Record a heading text and return its occurrence index.
    ///
    /// The index counts identical heading texts seen earlier in this render,
    /// so the first `"Overview"` is occurrence 0 and the second is 1.
    pub fn record_heading(&mut self, text: &str) -> usize {
        let occurrence = self.headings.iter().filter(|seen| *seen == text).count();
        self.headings.push(text.to_owned());
        occurrence
    }

    /// Heading texts recorded so far, in document order.
    #[must_use]
    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    /// Install an outline-numbering label for a heading id.
    pub fn set_numbering(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.numbering.insert(id.into(), label.into());
    }

    /// Outline-numbering label for a heading id, if one was installed.
    #[must_use]
    pub fn numbering(&self, id: &str) -> Option<&str> {
        self.numbering.get(id).map(String::as_str)
    }

    /// Enable or disable outline-numbering prefixes on headings.
    pub fn set_outline_numbering(&mut self, enabled: bool) {
        self.outline_numbering = enabled;
    }

    /// Whether outline numbering is enabled for this render.
    #[must_use]
    pub fn outline_numbering(&self) -> bool {
        self.outline_numbering
    }

    /// Read a host-contributed extension value.
    #[must_use]
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).map(String::as_str)
    }

    /// Write a host-contributed extension value.
    pub fn set_extension(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extensions.insert(key.into(), value.into());
    }

    /// The existence/link host capability.
    #[must_use]
    pub fn host(&self) -> Arc<dyn WikiHost> {
        Arc::clone(&self.host)
    }

    /// The interwiki registry capability.
    #[must_use]
    pub fn interwiki(&self) -> Arc<dyn InterwikiRegistry> {
        Arc::clone(&self.interwiki)
    }

    /// The heading-id generator capability.
    #[must_use]
    pub fn ids(&self) -> Arc<dyn IdGenerator> {
        Arc::clone(&self.ids)
    }
}
