//! Content-type to decoding strategy mapping.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::outcome::BoxError;

/// Converts a response body into an intermediate JSON value.
pub type CustomDecoder = Arc<dyn Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync>;

/// How a response body is turned into the target type.
#[derive(Clone)]
pub enum DecodeStrategy {
    /// JSON with case-insensitive field names.
    Json,
    /// XML.
    Xml,
    /// The body bytes are handed to the target as-is.
    Raw,
    /// A caller-supplied conversion to a JSON value, then case-insensitive
    /// deserialization of that value.
    Custom(CustomDecoder),
}

impl DecodeStrategy {
    /// Wraps a conversion function as a custom strategy.
    pub fn custom<F>(decoder: F) -> Self
    where
        F: Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(decoder))
    }

    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Raw => "raw",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for DecodeStrategy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (Self::Json, Self::Json) | (Self::Xml, Self::Xml) | (Self::Raw, Self::Raw) => true,
            _ => false,
        }
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decoder '{0}', expected one of: json, xml, raw")]
pub struct UnknownStrategy(pub String);

impl FromStr for DecodeStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "raw" => Ok(Self::Raw),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Ordered list of content-type keys and their strategies.
///
/// A response content type matches a key when it contains the key,
/// ignoring ASCII case, so `application/json; charset=utf-8` matches
/// `application/json`. Keys are checked in registration order and the
/// first match wins.
///
/// # Example
///
/// ```
/// use resilient_http::decode::{DecodeStrategy, Decoders};
///
/// let decoders = Decoders::default().with("application/vnd.api+json", DecodeStrategy::Json);
///
/// let (key, strategy) = decoders.find("Application/JSON; charset=utf-8").unwrap();
/// assert_eq!(key, "application/json");
/// assert_eq!(strategy.name(), "json");
/// assert!(decoders.find("image/png").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Decoders {
    entries: Vec<(String, DecodeStrategy)>,
}

impl Decoders {
    /// Content types decoded as JSON by default.
    pub const JSON_TYPES: [&'static str; 3] = ["application/json", "text/json", "text/x-json"];

    /// Content types decoded as XML by default.
    pub const XML_TYPES: [&'static str; 4] = [
        "application/xml",
        "text/xml",
        "text/x-xml",
        "application/x-www-form-urlencoded",
    ];

    /// Content types passed through as raw bytes by default.
    pub const RAW_TYPES: [&'static str; 1] = ["application/octet-stream"];

    /// Creates an empty mapping.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a strategy for a content-type key.
    ///
    /// An existing entry with the same key (ignoring case) is replaced in
    /// place; otherwise the entry is appended and checked after all
    /// earlier ones.
    pub fn register(&mut self, content_type: impl Into<String>, strategy: DecodeStrategy) {
        let key = content_type.into().trim().to_ascii_lowercase();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = strategy,
            None => self.entries.push((key, strategy)),
        }
    }

    /// Builder form of [`Decoders::register`].
    #[must_use]
    pub fn with(mut self, content_type: impl Into<String>, strategy: DecodeStrategy) -> Self {
        self.register(content_type, strategy);
        self
    }

    /// Removes the entry for a key, returning its strategy.
    pub fn remove(&mut self, content_type: &str) -> Option<DecodeStrategy> {
        let key = content_type.trim().to_ascii_lowercase();
        let index = self.entries.iter().position(|(existing, _)| *existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Finds the first entry whose key the content type contains.
    #[must_use]
    pub fn find(&self, content_type: &str) -> Option<(&str, &DecodeStrategy)> {
        let content_type = content_type.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| !key.is_empty() && content_type.contains(key.as_str()))
            .map(|(key, strategy)| (key.as_str(), strategy))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodeStrategy)> {
        self.entries
            .iter()
            .map(|(key, strategy)| (key.as_str(), strategy))
    }
}

impl Default for Decoders {
    fn default() -> Self {
        let mut decoders = Self::empty();
        for key in Self::JSON_TYPES {
            decoders.register(key, DecodeStrategy::Json);
        }
        for key in Self::XML_TYPES {
            decoders.register(key, DecodeStrategy::Xml);
        }
        for key in Self::RAW_TYPES {
            decoders.register(key, DecodeStrategy::Raw);
        }
        decoders
    }
}
