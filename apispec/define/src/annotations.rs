//! Side-channel generation hints.
//!
//! Doc ids, server defaults, codegen names and similar tags are metadata, not
//! structure. They ride along on operations, fields, types and enum variants
//! as a plain key/value map so that structural checks never depend on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known annotation keys.
pub mod keys {
    pub const DOC_ID: &str = "doc_id";
    pub const EXT_DOC_ID: &str = "ext_doc_id";
    pub const SERVER_DEFAULT: &str = "server_default";
    pub const CODEGEN_NAME: &str = "codegen_name";
    pub const NAMESPACE: &str = "namespace";
    pub const REST_SPEC_NAME: &str = "rest_spec_name";
}

/// Key/value annotations attached to a schema element.
///
/// Keys are stored without the leading `@`. Flags without a value (for
/// example the legacy `ambiguous_origin` marker) are stored with an empty
/// value.
///
/// ## Examples
///
/// ```
/// use apispec_define::Annotations;
///
/// let mut ann = Annotations::default();
/// ann.insert("server_default", "true");
/// ann.insert("ext_doc_id", "inference-chunking");
///
/// assert_eq!(ann.server_default(), Some("true"));
/// assert_eq!(ann.ext_doc_id(), Some("inference-chunking"));
/// assert!(ann.doc_id().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, String>);

impl Annotations {
    /// Inserts or replaces an annotation, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates annotations in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.get(keys::DOC_ID)
    }

    pub fn ext_doc_id(&self) -> Option<&str> {
        self.get(keys::EXT_DOC_ID)
    }

    /// The value the server applies when the field is omitted.
    pub fn server_default(&self) -> Option<&str> {
        self.get(keys::SERVER_DEFAULT)
    }

    pub fn codegen_name(&self) -> Option<&str> {
        self.get(keys::CODEGEN_NAME)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.get(keys::NAMESPACE)
    }
}

impl FromIterator<(String, String)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
