//! Response placeholder generation.

use apispec_define::Operation;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::naming::operation_type_name;

/// Generates `{Op}Response`, a transparent wrapper around the raw JSON body.
///
/// Response shapes are not part of the corpus, so every operation gets the
/// same placeholder.
pub fn generate_response_type(op: &Operation) -> TokenStream {
    let name = format_ident!("{}Response", operation_type_name(&op.name));
    let doc = format!(" Response of `{}`.", op.name);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct #name(pub serde_json::Value);
    }
}
