//! Runtime support emitted into the generated `shared` module.
//!
//! Every generated request type converts into [`RequestParts`] through
//! `into_parts()` and reports construction failures as `BindingError`.
//! Both live in `shared.rs` so operation modules import them instead of
//! redefining them.

use proc_macro2::TokenStream;
use quote::quote;

/// Generates the `RequestParts` alias returned by `into_parts()`.
pub fn generate_request_parts_type() -> TokenStream {
    quote! {
        /// The components of a prepared HTTP request.
        ///
        /// - `0`: HTTP method (e.g. "GET", "PUT")
        /// - `1`: URL path with path parameters substituted
        /// - `2`: Query parameters as (name, value) pairs, in declaration order
        /// - `3`: Optional JSON request body
        pub type RequestParts = (
            &'static str,
            String,
            Vec<(String, String)>,
            Option<serde_json::Value>,
        );
    }
}

/// Generates the `BindingError` enum.
///
/// `MissingRequiredField` carries the wire name of the first absent field
/// in declaration order, which is what builders check in.
pub fn generate_error_type() -> TokenStream {
    quote! {
        /// Errors raised while constructing or converting a request.
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum BindingError {
            /// A required path, query or body field was not supplied.
            #[error("missing required field `{field}`")]
            MissingRequiredField {
                /// Wire name of the field.
                field: &'static str,
            },

            /// No URL template can be filled from the supplied path parameters.
            #[error("no URL template matches the supplied path parameters")]
            NoMatchingTemplate,

            /// A value could not be serialized to JSON.
            #[error("failed to serialize request value: {0}")]
            Serialization(String),
        }
    }
}

/// Generates `param_string`, which renders a path or query value.
///
/// Strings and enums render as their wire value, arrays as comma-separated
/// items, and any other JSON as its compact text.
pub fn generate_param_helper() -> TokenStream {
    quote! {
        /// Renders a value for use in a URL path or query string.
        ///
        /// ## Errors
        ///
        /// Returns `BindingError::Serialization` if the value cannot be
        /// represented as JSON.
        pub fn param_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BindingError> {
            fn render(value: &serde_json::Value) -> String {
                match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) => {
                        items.iter().map(render).collect::<Vec<_>>().join(",")
                    }
                    other => other.to_string(),
                }
            }

            let value = serde_json::to_value(value)
                .map_err(|e| BindingError::Serialization(e.to_string()))?;
            Ok(render(&value))
        }
    }
}
