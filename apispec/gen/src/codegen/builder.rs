//! Request builder generation.
//!
//! `{Op}RequestBuilder` holds every path, query and body field as an
//! `Option`. `build()` checks the required ones in declaration order and
//! reports the first absent field by its wire name.

use apispec_define::{Body, FieldSpec, Operation};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::naming::{field_ident, operation_type_name};
use crate::codegen::types::TypeContext;
use crate::errors::GeneratorError;

/// Generates `{Op}{suffix}Builder` and `{Op}{suffix}::builder()`.
///
/// ## Errors
///
/// Returns `GeneratorError::UnresolvedType` if a field type does not resolve.
pub fn generate_request_builder(
    op: &Operation,
    ctx: &TypeContext<'_>,
    suffix: &str,
) -> Result<TokenStream, GeneratorError> {
    let base = operation_type_name(&op.name);
    let request_name = format_ident!("{}{}", base, suffix);
    let builder_name = format_ident!("{}{}Builder", base, suffix);
    let body_name = format_ident!("{}Body", base);

    let value_body = match &op.body {
        Body::Value {
            codegen_name,
            value_type,
            ..
        } => Some(FieldSpec::required(codegen_name.clone(), value_type.clone())),
        _ => None,
    };
    let top_level: Vec<&FieldSpec> = op
        .path_parts
        .iter()
        .chain(&op.query_parameters)
        .chain(value_body.as_ref())
        .collect();
    let body_fields: &[FieldSpec] = op.body.fields();

    let mut slots = Vec::new();
    let mut setters = Vec::new();
    for field in top_level.iter().copied().chain(body_fields) {
        let ident = field_ident(&field.name);
        let ty = ctx.rust_type(&field.field_type)?;
        slots.push(quote! { #ident: Option<#ty>, });

        let doc = if field.required {
            format!(" Sets `{}` (required).", field.name)
        } else {
            format!(" Sets `{}`.", field.name)
        };
        setters.push(quote! {
            #[doc = #doc]
            pub fn #ident(mut self, value: impl Into<#ty>) -> Self {
                self.#ident = Some(value.into());
                self
            }
        });
    }

    let top_inits = top_level.iter().map(|f| field_init(f));
    let body_init = if body_fields.is_empty() {
        quote! {}
    } else {
        let inits = body_fields.iter().map(field_init);
        quote! {
            body: #body_name {
                #(#inits)*
            },
        }
    };

    let builder_doc = format!(" Builder for [`{request_name}`].");
    let builder_fn_doc = format!(" Starts a [`{builder_name}`] with no fields set.");

    Ok(quote! {
        #[doc = #builder_doc]
        #[derive(Debug, Clone, Default)]
        pub struct #builder_name {
            #(#slots)*
        }

        impl #builder_name {
            #(#setters)*

            /// Builds the request.
            ///
            /// ## Errors
            ///
            /// Returns `BindingError::MissingRequiredField` naming the first
            /// required field that was not set.
            pub fn build(self) -> Result<#request_name, BindingError> {
                Ok(#request_name {
                    #(#top_inits)*
                    #body_init
                })
            }
        }

        impl #request_name {
            #[doc = #builder_fn_doc]
            pub fn builder() -> #builder_name {
                #builder_name::default()
            }
        }
    })
}

fn field_init(field: &FieldSpec) -> TokenStream {
    let ident = field_ident(&field.name);
    if field.required {
        let wire = field.name.as_str();
        quote! {
            #ident: self
                .#ident
                .ok_or(BindingError::MissingRequiredField { field: #wire })?,
        }
    } else {
        quote! { #ident: self.#ident, }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{format_code, validate_code};
    use crate::registry::TypeRegistry;
    use apispec_define::{FieldType, HttpMethod, Primitive, UrlTemplate};

    fn update_pipeline() -> Operation {
        Operation {
            name: "connector.update_pipeline".to_string(),
            urls: vec![UrlTemplate::new(
                "/_connector/{connector_id}/_pipeline",
                vec![HttpMethod::Put],
            )],
            path_parts: vec![FieldSpec::required("connector_id", FieldType::named("Id"))],
            query_parameters: vec![FieldSpec::optional(
                "pretty",
                FieldType::Primitive(Primitive::Boolean),
            )],
            body: Body::Properties(vec![FieldSpec::required(
                "pipeline",
                FieldType::named("IngestPipelineParams"),
            )]),
            ..Operation::default()
        }
    }

    fn render(op: &Operation) -> String {
        let registry = TypeRegistry::with_shared_library();
        let ctx = TypeContext::new(&registry, Some(&op.name));
        let tokens = generate_request_builder(op, &ctx, "Request").unwrap();
        format_code(&validate_code(&tokens).unwrap())
    }

    #[test]
    fn builder_checks_required_fields_by_wire_name() {
        let code = render(&update_pipeline());
        assert!(code.contains("pub struct ConnectorUpdatePipelineRequestBuilder"));
        assert!(code.contains("connector_id: Option<crate::shared::Id>,"));
        assert!(code.contains(
            "pub fn connector_id(mut self, value: impl Into<crate::shared::Id>) -> Self"
        ));
        assert!(code.contains(r#"BindingError::MissingRequiredField {"#));
        assert!(code.contains(r#"field: "connector_id""#));
        assert!(code.contains("pretty: self.pretty,"));
        assert!(code.contains("body: ConnectorUpdatePipelineBody {"));
        assert!(code.contains("pub fn builder() -> ConnectorUpdatePipelineRequestBuilder"));
    }

    #[test]
    fn required_checks_follow_declaration_order() {
        let code = render(&update_pipeline());
        let connector = code.find(r#"field: "connector_id""#).unwrap();
        let pipeline = code.find(r#"field: "pipeline""#).unwrap();
        assert!(connector < pipeline);
    }

    #[test]
    fn value_body_is_a_top_level_slot() {
        let op = Operation {
            name: "ingest.simulate".to_string(),
            urls: vec![UrlTemplate::new("/_ingest/_simulate", vec![HttpMethod::Post])],
            body: Body::Value {
                codegen_name: "docs".to_string(),
                value_type: FieldType::array_of(FieldType::Primitive(Primitive::String)),
                description: None,
            },
            ..Operation::default()
        };
        let code = render(&op);
        assert!(code.contains("docs: Option<Vec<String>>,"));
        assert!(code.contains(r#"field: "docs""#));
        assert!(!code.contains("IngestSimulateBody"));
    }
}
