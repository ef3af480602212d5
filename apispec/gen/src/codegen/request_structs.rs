//! Request struct generation for operations.
//!
//! Each certified operation gets a `{Op}Request` struct holding its path and
//! query parameters at top level plus its body, and a `{Op}Body` struct when
//! the body is declared as an inline object. `into_parts()` turns a request
//! into [`RequestParts`](super::error::generate_request_parts_type) by
//! choosing the most specific URL template whose placeholders are all set.

use apispec_define::{Body, FieldSpec, Operation};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::codegen::naming::{field_ident, operation_type_name, to_snake_case};
use crate::codegen::types::{TypeContext, doc_attrs};
use crate::errors::GeneratorError;
use crate::template::{build_format_string, by_specificity};

/// Generates `{Op}{suffix}`, `{Op}Body` and the `into_parts()` impl.
///
/// For `connector.update_pipeline` this yields:
///
/// ```ignore
/// pub struct ConnectorUpdatePipelineRequest {
///     pub connector_id: crate::shared::Id,
///     pub body: ConnectorUpdatePipelineBody,
/// }
///
/// impl ConnectorUpdatePipelineRequest {
///     pub fn into_parts(self) -> Result<RequestParts, BindingError> {
///         let connector_id_param = crate::shared::param_string(&self.connector_id)?;
///         let (method, path) = ("PUT", format!("/_connector/{}/_pipeline", connector_id_param));
///         // ...
///     }
/// }
/// ```
///
/// ## Errors
///
/// Returns `GeneratorError::UnresolvedType` if a field type does not resolve.
pub fn generate_request_struct(
    op: &Operation,
    ctx: &TypeContext<'_>,
    suffix: &str,
) -> Result<TokenStream, GeneratorError> {
    let base = operation_type_name(&op.name);
    let struct_name = format_ident!("{}{}", base, suffix);
    let body_name = format_ident!("{}Body", base);

    let mut fields = Vec::new();
    for field in op.path_parts.iter().chain(&op.query_parameters) {
        fields.push(ctx.field(None, field)?);
    }

    let body_struct = match &op.body {
        Body::Properties(props) if !props.is_empty() => {
            fields.push(quote! {
                /// Request body.
                pub body: #body_name,
            });
            let members = props
                .iter()
                .map(|f| ctx.field(None, f))
                .collect::<Result<Vec<_>, _>>()?;
            let doc = format!(" Body of `{}`.", op.name);
            quote! {
                #[doc = #doc]
                #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
                pub struct #body_name {
                    #(#members)*
                }
            }
        }
        Body::Value {
            codegen_name,
            value_type,
            description,
        } => {
            let mut field = FieldSpec::required(codegen_name.clone(), value_type.clone());
            field.description = description.clone();
            fields.push(ctx.field(None, &field)?);
            quote! {}
        }
        _ => quote! {},
    };

    let docs = request_docs(op);
    let into_parts = generate_into_parts(op);

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct #struct_name {
            #(#fields)*
        }

        #body_struct

        impl #struct_name {
            #into_parts
        }
    })
}

fn request_docs(op: &Operation) -> TokenStream {
    let mut text = format!("Request for `{}`.", op.name);
    if let Some(description) = &op.description {
        text.push_str("\n\n");
        text.push_str(description);
    }
    text.push_str("\n\n## Endpoints\n");
    for url in &op.urls {
        let methods: Vec<String> = url.methods.iter().map(ToString::to_string).collect();
        text.push_str(&format!("\n- `{} {}`", methods.join("|"), url.path));
    }
    doc_attrs(Some(&text))
}

/// Local variable holding the rendered value of a path parameter.
fn param_local(name: &str) -> Ident {
    format_ident!("{}_param", to_snake_case(name))
}

fn generate_into_parts(op: &Operation) -> TokenStream {
    let path_locals = op.path_parts.iter().map(|part| {
        let field = field_ident(&part.name);
        let local = param_local(&part.name);
        if part.required {
            quote! { let #local = crate::shared::param_string(&self.#field)?; }
        } else {
            quote! {
                let #local = self
                    .#field
                    .as_ref()
                    .map(|value| crate::shared::param_string(value))
                    .transpose()?;
            }
        }
    });

    let select = generate_template_selection(op);
    let query = generate_query(op);

    let body_expr = match &op.body {
        Body::Properties(props) if !props.is_empty() => Some(quote! { &self.body }),
        Body::Value { codegen_name, .. } => {
            let field = field_ident(codegen_name);
            Some(quote! { &self.#field })
        }
        _ => None,
    };
    let body = match body_expr {
        Some(expr) => quote! {
            let body = Some(
                serde_json::to_value(#expr)
                    .map_err(|e| BindingError::Serialization(e.to_string()))?,
            );
        },
        None => quote! { let body = None; },
    };

    quote! {
        /// Converts the request into (method, path, query, body) parts.
        ///
        /// ## Errors
        ///
        /// Returns `BindingError::Serialization` if a value fails to serialize,
        /// or `BindingError::NoMatchingTemplate` if the optional path
        /// parameters set fit no URL template.
        pub fn into_parts(self) -> Result<RequestParts, BindingError> {
            #(#path_locals)*
            #select
            #query
            #body
            Ok((method, path, query, body))
        }
    }
}

/// `let (method, path) = ...;` over the templates, most specific first.
fn generate_template_selection(op: &Operation) -> TokenStream {
    let mut branches: Vec<(Vec<Ident>, TokenStream)> = Vec::new();
    let mut fallback = None;

    for url in by_specificity(&op.urls) {
        let Some(method) = url.methods.first() else {
            continue;
        };
        let method = method.to_string();
        let placeholders = url.placeholders();
        let path_expr = if placeholders.is_empty() {
            let path = url.path.as_str();
            quote! { #path.to_string() }
        } else {
            let format_str = build_format_string(&url.path);
            let args = placeholders.iter().map(|p| param_local(p));
            quote! { format!(#format_str, #(#args),*) }
        };
        let value = quote! { (#method, #path_expr) };

        let conditions: Vec<Ident> = placeholders
            .iter()
            .filter(|p| op.path_part(p).is_some_and(|f| !f.required))
            .map(|p| param_local(p))
            .collect();

        if conditions.is_empty() {
            fallback = Some(value);
            break;
        }
        branches.push((conditions, value));
    }

    if branches.is_empty() {
        return match fallback {
            Some(value) => quote! { let (method, path) = #value; },
            None => quote! { let (method, path): (&'static str, String) = return Err(BindingError::NoMatchingTemplate); },
        };
    }

    let mut rest = match fallback {
        Some(value) => quote! { { #value } },
        None => quote! { { return Err(BindingError::NoMatchingTemplate); } },
    };
    for (conditions, value) in branches.into_iter().rev() {
        let pattern = if let [single] = conditions.as_slice() {
            quote! { let Some(#single) = &#single }
        } else {
            quote! { let (#(Some(#conditions)),*) = (#(&#conditions),*) }
        };
        rest = quote! { if #pattern { #value } else #rest };
    }

    quote! { let (method, path) = #rest; }
}

fn generate_query(op: &Operation) -> TokenStream {
    if op.query_parameters.is_empty() {
        return quote! { let query = Vec::new(); };
    }

    let pushes = op.query_parameters.iter().map(|param| {
        let field = field_ident(&param.name);
        let wire = param.name.as_str();
        if param.required {
            quote! {
                query.push((#wire.to_string(), crate::shared::param_string(&self.#field)?));
            }
        } else {
            quote! {
                if let Some(value) = &self.#field {
                    query.push((#wire.to_string(), crate::shared::param_string(value)?));
                }
            }
        }
    });

    quote! {
        let mut query = Vec::new();
        #(#pushes)*
    }
}
