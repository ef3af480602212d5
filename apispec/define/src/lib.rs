//! Apispec Definition Library
//!
//! This crate provides the in-memory schema model for a REST API
//! interface-definition corpus. Schema units are parsed into these types by
//! `apispec-gen`, resolved against a type registry, validated, and finally
//! rendered into typed client bindings.
//!
//! ## Core Types
//!
//! ### Operations
//!
//! - [`Operation`] - One REST endpoint's full request contract
//! - [`UrlTemplate`] - A URL path template with its allowed HTTP methods
//! - [`HttpMethod`] - HTTP methods (GET, POST, PUT, etc.)
//! - [`Body`] - The request body shape (properties, a single value, or none)
//! - [`FieldLocation`] - Where a field lives in the request (path, query, body)
//!
//! ### Types
//!
//! - [`FieldSpec`] - One member of a body, parameter list or settings object
//! - [`FieldType`] - Declared type of a field (primitive, reference, array, map, union)
//! - [`TypeRef`] - A named, lazily resolved pointer to a type definition
//! - [`QualifiedName`] - A type name, optionally scoped to an owning namespace
//! - [`TypeDef`] - A named definition: [`EnumSpec`], [`ClassSpec`] or [`AliasSpec`]
//!
//! ### Metadata
//!
//! - [`Annotations`] - Side-channel key/value generation hints
//! - [`Availability`] - Per-deployment stability, visibility and version data
//! - [`Privileges`] - Cluster and index privileges required by an operation
//! - [`Version`] - A `major.minor.patch` version
//!
//! ## Examples
//!
//! ```
//! use apispec_define::{Body, FieldSpec, FieldType, HttpMethod, Operation, UrlTemplate};
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
//! assert_eq!(op.placeholders().into_iter().collect::<Vec<_>>(), vec!["connector_id"]);
//! assert_eq!(op.required_fields().len(), 2);
//! ```

pub mod annotations;
pub mod availability;
pub mod error;
pub mod name;
pub mod prelude;
pub mod schema;
pub mod typedef;
pub mod types;

// Re-export main types at crate root
pub use annotations::Annotations;
pub use availability::{Availability, DeploymentTarget, Privileges, Stability, Version, Visibility};
pub use error::DefineError;
pub use name::QualifiedName;
pub use schema::{FieldSpec, FieldType, Primitive, TypeRef};
pub use typedef::{AliasSpec, ClassSpec, EnumSpec, EnumVariant, TypeDef};
pub use types::{Body, FieldLocation, HttpMethod, Operation, UrlTemplate};
