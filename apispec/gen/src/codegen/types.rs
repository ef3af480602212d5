//! Rust rendering of registry type definitions.
//!
//! Enums become `Copy` enums with serde-renamed variants and a `Display`
//! impl that writes the wire value. Classes become structs, with base types
//! flattened in. Aliases become `pub type` items.

use std::collections::BTreeSet;

use apispec_define::{EnumSpec, FieldSpec, FieldType, Primitive, QualifiedName, TypeDef};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::naming::{field_ident, module_name, type_ident};
use crate::errors::GeneratorError;
use crate::registry::TypeRegistry;

/// Where generated code is being placed, for rendering type paths.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub registry: &'a TypeRegistry,
    /// Namespace of the module being generated; `None` for the shared module.
    pub namespace: Option<&'a str>,
}

impl<'a> TypeContext<'a> {
    pub fn new(registry: &'a TypeRegistry, namespace: Option<&'a str>) -> Self {
        Self {
            registry,
            namespace,
        }
    }

    /// Renders a field type as a Rust type.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::UnresolvedType` for a reference the registry
    /// cannot resolve.
    pub fn rust_type(&self, ty: &FieldType) -> Result<TokenStream, GeneratorError> {
        Ok(match ty {
            FieldType::Primitive(p) => primitive_type(*p),
            FieldType::Named(r) => self.type_path(&r.name)?,
            FieldType::Array(inner) => {
                let inner = self.rust_type(inner)?;
                quote! { Vec<#inner> }
            }
            FieldType::Map { key, value } => {
                let key = self.rust_type(key)?;
                let value = self.rust_type(value)?;
                quote! { std::collections::BTreeMap<#key, #value> }
            }
            FieldType::Union(_) => quote! { serde_json::Value },
        })
    }

    /// Path to a named type as seen from the current module.
    pub fn type_path(&self, name: &QualifiedName) -> Result<TokenStream, GeneratorError> {
        let def = self.registry.resolve(name)?;
        let canonical = def.name();
        let ident = type_ident(&canonical.name);

        Ok(match canonical.namespace.as_deref() {
            ns if ns == self.namespace => quote! { #ident },
            None => quote! { crate::shared::#ident },
            Some(ns) => {
                let module = format_ident!("{}", module_name(ns));
                quote! { crate::#module::#ident }
            }
        })
    }

    /// Renders one definition.
    pub fn generate_type(&self, def: &TypeDef) -> Result<TokenStream, GeneratorError> {
        match def {
            TypeDef::Enum(spec) => Ok(generate_enum(spec)),
            TypeDef::Class(class) => {
                let ident = type_ident(&class.name.name);
                let docs = doc_attrs(class.description.as_deref());

                let mut members = Vec::new();
                for base in &class.extends {
                    let ty = self.type_path(&base.name)?;
                    let member = field_ident(&base.name.name);
                    let doc = format!(" Members inherited from `{}`.", base.name.name);
                    members.push(quote! {
                        #[doc = #doc]
                        #[serde(flatten)]
                        pub #member: #ty,
                    });
                }
                for field in &class.fields {
                    members.push(self.field(Some(&class.name), field)?);
                }

                Ok(quote! {
                    #docs
                    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
                    pub struct #ident {
                        #(#members)*
                    }
                })
            }
            TypeDef::Alias(alias) => {
                let ident = type_ident(&alias.name.name);
                let docs = doc_attrs(alias.description.as_deref());
                let target = self.rust_type(&alias.target)?;
                Ok(quote! {
                    #docs
                    pub type #ident = #target;
                })
            }
        }
    }

    /// Renders one struct field with its serde attributes.
    ///
    /// `owner` is the class being generated, if any; an optional field that
    /// leads back to it is boxed.
    pub fn field(
        &self,
        owner: Option<&QualifiedName>,
        field: &FieldSpec,
    ) -> Result<TokenStream, GeneratorError> {
        let ident = field_ident(&field.name);
        let docs = field_docs(field);
        let rename = rename_attr(&ident, &field.name);
        let mut ty = self.rust_type(&field.field_type)?;

        if field.required {
            return Ok(quote! {
                #docs
                #rename
                pub #ident: #ty,
            });
        }

        if let (Some(owner), FieldType::Named(target)) = (owner, &field.field_type)
            && self.reaches(&target.name, owner)
        {
            ty = quote! { Box<#ty> };
        }
        Ok(quote! {
            #docs
            #rename
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub #ident: Option<#ty>,
        })
    }

    /// Whether `from` contains `to` without passing through a collection.
    fn reaches(&self, from: &QualifiedName, to: &QualifiedName) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from.clone()];
        while let Some(name) = stack.pop() {
            let Ok(def) = self.registry.resolve(&name) else {
                continue;
            };
            if def.name() == to {
                return true;
            }
            if !seen.insert(def.name().clone()) {
                continue;
            }
            match def {
                TypeDef::Enum(_) => {}
                TypeDef::Class(class) => {
                    stack.extend(class.extends.iter().map(|b| b.name.clone()));
                    stack.extend(class.fields.iter().filter_map(|f| match &f.field_type {
                        FieldType::Named(r) => Some(r.name.clone()),
                        _ => None,
                    }));
                }
                TypeDef::Alias(alias) => {
                    if let FieldType::Named(r) = &alias.target {
                        stack.push(r.name.clone());
                    }
                }
            }
        }
        false
    }
}

fn primitive_type(p: Primitive) -> TokenStream {
    match p {
        Primitive::String => quote! { String },
        Primitive::Boolean => quote! { bool },
        Primitive::Byte => quote! { i8 },
        Primitive::Short => quote! { i16 },
        Primitive::Integer => quote! { i32 },
        Primitive::Long => quote! { i64 },
        Primitive::Float => quote! { f32 },
        Primitive::Double | Primitive::Number => quote! { f64 },
        Primitive::Null => quote! { () },
    }
}

fn generate_enum(spec: &EnumSpec) -> TokenStream {
    let ident = type_ident(&spec.name.name);
    let docs = doc_attrs(spec.description.as_deref());

    let variants = spec.variants.iter().map(|v| {
        let variant = type_ident(&v.name);
        let wire = v.wire_name();
        let docs = doc_attrs(v.description.as_deref());
        quote! {
            #docs
            #[serde(rename = #wire)]
            #variant,
        }
    });
    let arms = spec.variants.iter().map(|v| {
        let variant = type_ident(&v.name);
        let wire = v.wire_name();
        quote! { Self::#variant => #wire, }
    });

    quote! {
        #docs
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum #ident {
            #(#variants)*
        }

        impl std::fmt::Display for #ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match *self {
                    #(#arms)*
                })
            }
        }
    }
}

/// `#[doc]` attributes for an optional description, one per line.
pub fn doc_attrs(description: Option<&str>) -> TokenStream {
    let lines = description
        .into_iter()
        .flat_map(str::lines)
        .map(|line| if line.is_empty() { String::new() } else { format!(" {line}") });
    quote! { #(#[doc = #lines])* }
}

fn field_docs(field: &FieldSpec) -> TokenStream {
    let mut text = field.description.clone().unwrap_or_default();
    if let Some(default) = field.annotations.server_default() {
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&format!("Server default: `{default}`."));
    }
    doc_attrs(Some(text.as_str()).filter(|t| !t.is_empty()))
}

/// `#[serde(rename)]` when the identifier differs from the wire name.
pub fn rename_attr(ident: &proc_macro2::Ident, wire: &str) -> TokenStream {
    if *ident == wire {
        quote! {}
    } else {
        quote! { #[serde(rename = #wire)] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{format_code, validate_code};
    use apispec_define::{Annotations, ClassSpec, EnumVariant, TypeRef};

    fn render(registry: &TypeRegistry, namespace: Option<&str>, def: &TypeDef) -> String {
        let tokens = TypeContext::new(registry, namespace)
            .generate_type(def)
            .unwrap();
        let tokens = quote! {
            use serde::{Deserialize, Serialize};
            #tokens
        };
        format_code(&validate_code(&tokens).unwrap())
    }

    fn make_class(ns: &str, name: &str, extends: &[&str], fields: Vec<FieldSpec>) -> TypeDef {
        TypeDef::Class(ClassSpec {
            name: QualifiedName::scoped(ns, name),
            extends: extends
                .iter()
                .map(|b| TypeRef::new(QualifiedName::shared(*b)))
                .collect(),
            fields,
            description: None,
            annotations: Annotations::default(),
        })
    }

    #[test]
    fn enum_renames_variants_and_displays_wire_value() {
        let registry = TypeRegistry::with_shared_library();
        let mut completion = EnumVariant::new("completion");
        completion.description = Some("Chat completion.".to_string());
        let mut custom = EnumVariant::new("custom");
        custom.wire_value = Some("x-custom".to_string());
        let def = TypeDef::Enum(EnumSpec {
            name: QualifiedName::scoped("inference.put_anthropic", "AnthropicTaskType"),
            variants: vec![completion, custom],
            description: Some("Task types".to_string()),
            annotations: Annotations::default(),
        });

        let code = render(&registry, Some("inference.put_anthropic"), &def);
        assert!(code.contains("pub enum AnthropicTaskType"));
        assert!(code.contains(r#"#[serde(rename = "completion")]"#));
        assert!(code.contains("Completion,"));
        assert!(code.contains(r#"Self::Custom => "x-custom""#));
        assert!(code.contains("impl std::fmt::Display for AnthropicTaskType"));
        assert!(code.contains("/// Chat completion."));
    }

    #[test]
    fn class_fields_keep_optionality() {
        let registry = TypeRegistry::with_shared_library();
        let def = make_class(
            "inference.put_anthropic",
            "AnthropicTaskSettings",
            &[],
            vec![
                FieldSpec::required("max_tokens", FieldType::Primitive(Primitive::Integer)),
                FieldSpec::optional("temperature", FieldType::Primitive(Primitive::Float)),
                FieldSpec::optional("top_k", FieldType::Primitive(Primitive::Integer))
                    .with_annotation("server_default", "5"),
            ],
        );

        let code = render(&registry, Some("inference.put_anthropic"), &def);
        assert!(code.contains("pub max_tokens: i32,"));
        assert!(code.contains("pub temperature: Option<f32>,"));
        assert!(code.contains(r#"#[serde(default, skip_serializing_if = "Option::is_none")]"#));
        assert!(code.contains("/// Server default: `5`."));
    }

    #[test]
    fn shared_references_use_shared_module_path() {
        let registry = TypeRegistry::with_shared_library();
        let def = make_class(
            "analysis.tokenizers",
            "NGramTokenizer",
            &["tokenizer_base"],
            vec![FieldSpec::required(
                "token_chars",
                FieldType::array_of(FieldType::named("TokenChar")),
            )],
        );

        let code = render(&registry, Some("analysis.tokenizers"), &def);
        assert!(code.contains("#[serde(flatten)]"));
        assert!(code.contains("pub tokenizer_base: crate::shared::TokenizerBase,"));
        assert!(code.contains("pub token_chars: Vec<crate::shared::TokenChar>,"));
    }

    #[test]
    fn shared_module_uses_bare_names() {
        let registry = TypeRegistry::with_shared_library();
        let ctx = TypeContext::new(&registry, None);
        let ty = ctx.rust_type(&FieldType::named("Id")).unwrap();
        assert_eq!(ty.to_string(), "Id");
    }

    #[test]
    fn wire_names_are_renamed() {
        let registry = TypeRegistry::with_shared_library();
        let def = make_class(
            "cluster.nodes_stats",
            "Stats",
            &[],
            vec![
                FieldSpec::optional("FilterPath", FieldType::Primitive(Primitive::String)),
                FieldSpec::required("type", FieldType::Primitive(Primitive::String)),
            ],
        );

        let code = render(&registry, Some("cluster.nodes_stats"), &def);
        assert!(code.contains(r#"#[serde(rename = "FilterPath")]"#));
        assert!(code.contains("pub filter_path: Option<String>,"));
        assert!(code.contains("pub r#type: String,"));
    }

    #[test]
    fn optional_self_reference_is_boxed() {
        let mut registry = TypeRegistry::with_shared_library();
        let def = make_class(
            "test.tree",
            "Node",
            &[],
            vec![
                FieldSpec::optional("child", FieldType::scoped("test.tree", "Node")),
                FieldSpec::optional(
                    "children",
                    FieldType::array_of(FieldType::scoped("test.tree", "Node")),
                ),
            ],
        );
        registry.register(def.clone()).unwrap();
        registry.resolve_all().unwrap();

        let code = render(&registry, Some("test.tree"), &def);
        assert!(code.contains("pub child: Option<Box<Node>>,"));
        assert!(code.contains("pub children: Option<Vec<Node>>,"));
    }

    #[test]
    fn unresolved_reference_fails() {
        let registry = TypeRegistry::with_shared_library();
        let ctx = TypeContext::new(&registry, Some("x"));
        match ctx.rust_type(&FieldType::named("Missing")) {
            Err(GeneratorError::UnresolvedType { name }) => assert_eq!(name, "Missing"),
            other => panic!("Expected UnresolvedType, got: {:?}", other),
        }
    }

    #[test]
    fn containers_and_unions() {
        let registry = TypeRegistry::with_shared_library();
        let ctx = TypeContext::new(&registry, Some("x"));
        let map = FieldType::map_of(
            FieldType::Primitive(Primitive::String),
            FieldType::named("j_v_m_pool"),
        );
        assert_eq!(
            ctx.rust_type(&map).unwrap().to_string(),
            quote! { std::collections::BTreeMap<String, crate::shared::JVMPool> }.to_string()
        );
        let union = FieldType::Union(vec![
            FieldType::Primitive(Primitive::String),
            FieldType::Primitive(Primitive::Long),
        ]);
        assert_eq!(ctx.rust_type(&union).unwrap().to_string(), "serde_json :: Value");
    }
}
