//! Named, pre-configured transport instances.

use std::collections::HashMap;

/// A default transport plus any number of named alternatives.
///
/// Lets one client route requests through differently configured
/// transports (proxies, TLS settings, connection pools) selected by name.
///
/// # Example
///
/// ```
/// use resilient_http::transport::{ClientRegistry, ReqwestClient};
///
/// let registry = ClientRegistry::new(ReqwestClient::new())
///     .with_named("internal", ReqwestClient::new());
///
/// assert!(registry.get(None).is_some());
/// assert!(registry.get(Some("internal")).is_some());
/// assert!(registry.get(Some("missing")).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ClientRegistry<H> {
    default: H,
    named: HashMap<String, H>,
}

impl<H> ClientRegistry<H> {
    /// Creates a registry holding only the default transport.
    #[must_use]
    pub fn new(default: H) -> Self {
        Self {
            default,
            named: HashMap::new(),
        }
    }

    /// Adds a named transport.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, client: H) -> Self {
        self.insert(name, client);
        self
    }

    /// Adds or replaces a named transport, returning the replaced one.
    pub fn insert(&mut self, name: impl Into<String>, client: H) -> Option<H> {
        self.named.insert(name.into(), client)
    }

    /// Returns the default transport.
    #[must_use]
    pub const fn default_client(&self) -> &H {
        &self.default
    }

    /// Selects a transport by name; `None` selects the default.
    #[must_use]
    pub fn get(&self, name: Option<&str>) -> Option<&H> {
        match name {
            None => Some(&self.default),
            Some(name) => self.named.get(name),
        }
    }

    /// Returns the names of the registered named transports, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
