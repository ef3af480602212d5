//! Core types for operation definitions.
//!
//! This module provides the fundamental types describing one REST endpoint:
//!
//! - [`Operation`] - The full request contract of one endpoint
//! - [`UrlTemplate`] - A path template with its allowed methods
//! - [`HttpMethod`] - HTTP method enumeration
//! - [`Body`] - The request body shape

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::annotations::Annotations;
use crate::availability::{Availability, Privileges};
use crate::name::QualifiedName;
use crate::schema::{FieldSpec, FieldType};

/// HTTP methods an operation may be invoked with.
///
/// ## Examples
///
/// Parse from string:
///
/// ```
/// use std::str::FromStr;
/// use apispec_define::HttpMethod;
///
/// let method = HttpMethod::from_str("PUT").unwrap();
/// assert_eq!(method, HttpMethod::Put);
/// ```
///
/// Display as uppercase:
///
/// ```
/// use apispec_define::HttpMethod;
///
/// assert_eq!(HttpMethod::Post.to_string(), "POST");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET - Retrieve a resource
    Get,
    /// HTTP POST - Create a new resource
    Post,
    /// HTTP PUT - Replace a resource entirely
    Put,
    /// HTTP PATCH - Partially update a resource
    Patch,
    /// HTTP DELETE - Remove a resource
    Delete,
    /// HTTP HEAD - Get headers only (no body)
    Head,
    /// HTTP OPTIONS - Get allowed methods for a resource
    Options,
}

/// A URL path template and the methods it accepts.
///
/// Placeholders use curly braces: `/_connector/{connector_id}/_pipeline`.
///
/// ## Examples
///
/// ```
/// use apispec_define::{HttpMethod, UrlTemplate};
///
/// let url = UrlTemplate::new("/_inference/{task_type}/{inference_id}", vec![HttpMethod::Put]);
/// assert_eq!(url.placeholders(), vec!["task_type", "inference_id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTemplate {
    pub path: String,
    pub methods: Vec<HttpMethod>,
}

impl UrlTemplate {
    pub fn new(path: impl Into<String>, methods: Vec<HttpMethod>) -> Self {
        Self {
            path: path.into(),
            methods,
        }
    }

    /// Extracts placeholder names in the order they appear.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut params = Vec::new();
        let mut start = None;

        for (idx, c) in self.path.char_indices() {
            match c {
                '{' => start = Some(idx + 1),
                '}' => {
                    if let Some(begin) = start.take() {
                        let param = &self.path[begin..idx];
                        if !param.is_empty() {
                            params.push(param);
                        }
                    }
                }
                _ => {}
            }
        }

        params
    }
}

/// Where a request field is carried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldLocation {
    #[strum(serialize = "path_parts")]
    Path,
    #[strum(serialize = "query_parameters")]
    Query,
    #[strum(serialize = "body")]
    Body,
}

/// The request body shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "shape", rename_all = "snake_case")]
pub enum Body {
    /// The operation takes no body.
    #[default]
    None,
    /// `body: { ... }` - an object whose members are declared inline.
    Properties(Vec<FieldSpec>),
    /// `body: SomeType` - the whole body is one value, named by `@codegen_name`.
    Value {
        codegen_name: String,
        value_type: FieldType,
        description: Option<String>,
    },
}

impl Body {
    /// Member fields of a property body; empty for other shapes.
    pub fn fields(&self) -> &[FieldSpec] {
        match self {
            Self::Properties(fields) => fields,
            _ => &[],
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// One API endpoint definition.
///
/// An operation is created by parsing one schema unit and is never mutated
/// after validation. Types it mentions are referenced by name; the registry
/// owns their definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Rest name, e.g. `connector.update_pipeline`. Unique across the corpus.
    pub name: String,
    pub description: Option<String>,
    pub urls: Vec<UrlTemplate>,
    pub path_parts: Vec<FieldSpec>,
    pub query_parameters: Vec<FieldSpec>,
    pub body: Body,
    pub availability: Vec<Availability>,
    pub privileges: Privileges,
    pub annotations: Annotations,
    /// Names of the types this operation's unit declared inline.
    pub inline_types: Vec<QualifiedName>,
}

impl Operation {
    /// Namespace under which inline types of this operation are registered.
    pub fn namespace(&self) -> &str {
        &self.name
    }

    /// Union of placeholders across every URL template.
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.urls.iter().flat_map(UrlTemplate::placeholders).collect()
    }

    pub fn path_part(&self, name: &str) -> Option<&FieldSpec> {
        self.path_parts.iter().find(|f| f.name == name)
    }

    /// Every declared field tagged with its location, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldLocation, &FieldSpec)> {
        self.path_parts
            .iter()
            .map(|f| (FieldLocation::Path, f))
            .chain(self.query_parameters.iter().map(|f| (FieldLocation::Query, f)))
            .chain(self.body.fields().iter().map(|f| (FieldLocation::Body, f)))
    }

    /// Fields a caller must supply, including a value body's codegen name.
    pub fn required_fields(&self) -> Vec<(FieldLocation, &str)> {
        let mut out: Vec<_> = self
            .fields()
            .filter(|(_, f)| f.required)
            .map(|(loc, f)| (loc, f.name.as_str()))
            .collect();
        if let Body::Value { codegen_name, .. } = &self.body {
            out.push((FieldLocation::Body, codegen_name.as_str()));
        }
        out
    }

    /// All type names referenced directly by the operation's own fields.
    pub fn references(&self) -> Vec<&QualifiedName> {
        let mut out: Vec<&QualifiedName> = self
            .fields()
            .flat_map(|(_, f)| f.field_type.references())
            .collect();
        if let Body::Value { value_type, .. } = &self.body {
            out.extend(value_type.references());
        }
        out
    }
}
