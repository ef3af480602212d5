//! Runtime request construction against a parsed [`Operation`].
//!
//! [`RequestBuilder`] follows the same contract as the emitted
//! `{Op}RequestBuilder` types, evaluated dynamically: values are collected per
//! location, required fields are checked at [`RequestBuilder::build`], and the
//! most specific URL template whose placeholders are all supplied is used.
//!
//! ## Examples
//!
//! ```
//! use apispec_define::{Body, FieldSpec, FieldType, HttpMethod, Operation, UrlTemplate};
//! use apispec_gen::request::{RequestBuilder, RequestError};
//!
//! let op = Operation {
//!     name: "connector.update_pipeline".to_string(),
//!     urls: vec![UrlTemplate::new("/_connector/{connector_id}/_pipeline", vec![HttpMethod::Put])],
//!     path_parts: vec![FieldSpec::required("connector_id", FieldType::named("Id"))],
//!     body: Body::Properties(vec![FieldSpec::required(
//!         "pipeline",
//!         FieldType::named("IngestPipelineParams"),
//!     )]),
//!     ..Operation::default()
//! };
//!
//! let err = RequestBuilder::new(&op)
//!     .body_field("pipeline", serde_json::json!({"name": "p"}))
//!     .build()
//!     .unwrap_err();
//! assert!(matches!(err, RequestError::MissingRequiredField { ref field, .. } if field == "connector_id"));
//!
//! let request = RequestBuilder::new(&op)
//!     .path_param("connector_id", "my-connector")
//!     .body_field("pipeline", serde_json::json!({"name": "p"}))
//!     .build()
//!     .unwrap();
//! assert_eq!(request.method, HttpMethod::Put);
//! assert_eq!(request.path, "/_connector/my-connector/_pipeline");
//! ```

use std::collections::BTreeMap;

use apispec_define::{Body, FieldLocation, HttpMethod, Operation};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::template::{by_specificity, substitute_path_params};

/// Errors raised while constructing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// A required path, query or body field was not supplied.
    #[error("Operation '{operation}' is missing required field '{field}'")]
    MissingRequiredField { operation: String, field: String },

    /// A value was supplied for a field the operation does not declare.
    #[error("Operation '{operation}' declares no {location} field '{field}'")]
    UnknownField {
        operation: String,
        location: FieldLocation,
        field: String,
    },

    /// No URL template can be filled from the supplied path parameters.
    #[error("Operation '{operation}' has no URL template for the supplied path parameters")]
    NoMatchingTemplate { operation: String },
}

/// A fully substituted request, ready for a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Query pairs in declaration order.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Collects field values for one operation and checks them at build time.
#[derive(Debug, Clone)]
pub struct RequestBuilder<'op> {
    op: &'op Operation,
    path: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: Map<String, Value>,
    value_body: Option<Value>,
    rejected: Option<RequestError>,
}

impl<'op> RequestBuilder<'op> {
    pub fn new(op: &'op Operation) -> Self {
        Self {
            op,
            path: BTreeMap::new(),
            query: BTreeMap::new(),
            body: Map::new(),
            value_body: None,
            rejected: None,
        }
    }

    /// Sets a path parameter.
    pub fn path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        if self.op.path_part(name).is_some() {
            self.path.insert(name.to_string(), value.into());
        } else {
            self.reject(FieldLocation::Path, name);
        }
        self
    }

    /// Sets a query parameter.
    pub fn query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        if self.op.query_parameters.iter().any(|f| f.name == name) {
            self.query.insert(name.to_string(), value.into());
        } else {
            self.reject(FieldLocation::Query, name);
        }
        self
    }

    /// Sets one property of a `body: { ... }` body.
    pub fn body_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        if self.op.body.fields().iter().any(|f| f.name == name) {
            self.body.insert(name.to_string(), value.into());
        } else {
            self.reject(FieldLocation::Body, name);
        }
        self
    }

    /// Sets the whole body of a `body: SomeType` operation.
    pub fn body(mut self, value: impl Into<Value>) -> Self {
        if let Body::Value { .. } = self.op.body {
            self.value_body = Some(value.into());
        } else {
            self.reject(FieldLocation::Body, "body");
        }
        self
    }

    /// Checks the collected values and substitutes the URL template.
    ///
    /// ## Errors
    ///
    /// - `UnknownField` for the first value supplied under an undeclared name
    /// - `MissingRequiredField` for the first required field, in declaration
    ///   order, that was not supplied
    /// - `NoMatchingTemplate` when no template's placeholders are all supplied
    pub fn build(self) -> Result<PreparedRequest, RequestError> {
        if let Some(err) = self.rejected {
            return Err(err);
        }

        let operation = self.op.name.clone();
        for (location, field) in self.op.required_fields() {
            let supplied = match location {
                FieldLocation::Path => self.path.contains_key(field),
                FieldLocation::Query => self.query.contains_key(field),
                FieldLocation::Body => match self.op.body {
                    Body::Value { .. } => self.value_body.is_some(),
                    _ => self.body.contains_key(field),
                },
            };
            if !supplied {
                debug!(operation = %operation, field, "missing required field");
                return Err(RequestError::MissingRequiredField {
                    operation,
                    field: field.to_string(),
                });
            }
        }

        let (template, method) = by_specificity(&self.op.urls)
            .into_iter()
            .filter(|url| url.placeholders().iter().all(|p| self.path.contains_key(*p)))
            .find_map(|url| url.methods.first().map(|m| (url, *m)))
            .ok_or_else(|| RequestError::NoMatchingTemplate {
                operation: operation.clone(),
            })?;

        let params: Vec<(&str, &str)> = self
            .path
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let path = substitute_path_params(&template.path, &params);

        let query = self
            .op
            .query_parameters
            .iter()
            .filter_map(|f| {
                self.query
                    .get(&f.name)
                    .map(|v| (f.name.clone(), v.clone()))
            })
            .collect();

        let body = match &self.op.body {
            Body::None => None,
            Body::Properties(_) if self.body.is_empty() => None,
            Body::Properties(_) => Some(Value::Object(self.body)),
            Body::Value { .. } => self.value_body,
        };

        debug!(operation = %operation, %method, path = %path, "prepared request");
        Ok(PreparedRequest {
            method,
            path,
            query,
            body,
        })
    }

    fn reject(&mut self, location: FieldLocation, field: &str) {
        if self.rejected.is_none() {
            self.rejected = Some(RequestError::UnknownField {
                operation: self.op.name.clone(),
                location,
                field: field.to_string(),
            });
        }
    }
}
