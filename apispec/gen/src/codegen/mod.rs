//! Rust binding generation.
//!
//! Generators here return `proc_macro2::TokenStream`s that
//! [`crate::output`] assembles into modules, validates with `syn` and
//! formats with `prettyplease`.
//!
//! ## Submodules
//!
//! - [`naming`] - Schema name to Rust identifier mapping
//! - [`types`] - Enums, classes and aliases from the registry
//! - [`request_structs`] - `{Op}Request`, `{Op}Body` and `into_parts()`
//! - [`builder`] - `{Op}RequestBuilder` with required-field checks
//! - [`response`] - `{Op}Response` placeholders
//! - [`error`] - `BindingError`, `RequestParts` and `param_string` for the
//!   shared module
//!
//! ## Per-operation output
//!
//! 1. Inline types of the operation via [`TypeContext::generate_type`]
//! 2. The request struct via [`generate_request_struct`]
//! 3. The builder via [`generate_request_builder`]
//! 4. The response placeholder via [`generate_response_type`]

pub mod builder;
pub mod error;
pub mod naming;
pub mod request_structs;
pub mod response;
pub mod types;

pub use builder::generate_request_builder;
pub use error::{generate_error_type, generate_param_helper, generate_request_parts_type};
pub use request_structs::generate_request_struct;
pub use response::generate_response_type;
pub use types::TypeContext;
