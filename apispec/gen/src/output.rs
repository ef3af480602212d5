//! Output assembly and file writing for generated bindings.
//!
//! This module handles the final phase of generation: assembling each
//! module from the codegen pieces, validating it with `syn`, formatting it
//! with `prettyplease`, and writing it to disk atomically.
//!
//! ## Output Structure
//!
//! ```text
//! generated/src/
//! ├── lib.rs                        # Module declarations
//! ├── shared.rs                     # Shared library types, BindingError, RequestParts
//! ├── prelude.rs                    # Re-exports of every request, builder and response
//! ├── connector_update_pipeline.rs  # One module per certified operation
//! └── cluster_nodes_stats.rs        # One module per clean type-only unit
//! ```
//!
//! Every file is generated and validated before the first one is written, so
//! an emission failure leaves the output directory untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use apispec_define::{Operation, QualifiedName};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::codegen::naming::{module_name, operation_type_name};
use crate::codegen::{
    TypeContext, generate_error_type, generate_param_helper, generate_request_builder,
    generate_request_parts_type, generate_request_struct, generate_response_type,
};
use crate::errors::GeneratorError;
use crate::pipeline::CheckedCorpus;
use crate::registry::TypeRegistry;
use crate::validation::{check_generated_names, validate_request_suffix};

const RESERVED_MODULES: [&str; 3] = ["lib", "shared", "prelude"];

/// One emitted module and what it was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePlan {
    /// File stem, e.g. `connector_update_pipeline`.
    pub module: String,
    /// Rest name or namespace.
    pub owner: String,
    /// Whether `owner` is an operation.
    pub is_operation: bool,
}

/// Every file of a generation run, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    /// `(file name, formatted content)` pairs.
    pub files: Vec<(String, String)>,
    /// Rest names of the operations that were emitted.
    pub operations: Vec<String>,
    /// Namespaces of the type-only units that were emitted.
    pub type_units: Vec<String>,
}

impl GeneratedFiles {
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, content)| content.as_str())
    }
}

/// Assembles `shared.rs`: every shared-library type plus the runtime
/// support types the operation modules import.
pub fn assemble_shared_module(registry: &TypeRegistry) -> Result<TokenStream, GeneratorError> {
    let ctx = TypeContext::new(registry, None);
    let types = registry
        .shared_types()
        .map(|def| ctx.generate_type(def))
        .collect::<Result<Vec<_>, _>>()?;

    let error_type = generate_error_type();
    let request_parts_type = generate_request_parts_type();
    let param_helper = generate_param_helper();

    Ok(quote! {
        //! Shared types and runtime support for the generated bindings.

        use serde::{Deserialize, Serialize};

        #error_type

        #request_parts_type

        #param_helper

        #(#types)*
    })
}

/// Assembles the module for one certified operation.
///
/// ## Errors
///
/// Returns `GeneratorError::UnresolvedType` if an inline type is missing
/// from the registry.
pub fn assemble_operation_module(
    op: &Operation,
    registry: &TypeRegistry,
    suffix: &str,
) -> Result<TokenStream, GeneratorError> {
    let ctx = TypeContext::new(registry, Some(&op.name));
    let inline_types = op
        .inline_types
        .iter()
        .map(|name| ctx.generate_type(registry.resolve(name)?))
        .collect::<Result<Vec<_>, _>>()?;
    let request = generate_request_struct(op, &ctx, suffix)?;
    let builder = generate_request_builder(op, &ctx, suffix)?;
    let response = generate_response_type(op);

    let module_doc = format!(" Bindings for `{}`.", op.name);
    let description = op
        .description
        .as_deref()
        .map(|d| {
            let lines = d.lines().map(|l| format!(" {l}"));
            quote! {
                #![doc = ""]
                #(#![doc = #lines])*
            }
        })
        .unwrap_or_default();

    Ok(quote! {
        #![doc = #module_doc]
        #description

        use serde::{Deserialize, Serialize};

        use crate::shared::{BindingError, RequestParts};

        #(#inline_types)*

        #request

        #builder

        #response
    })
}

/// Assembles the module for one type-only unit.
pub fn assemble_type_module(
    namespace: &str,
    names: &[QualifiedName],
    registry: &TypeRegistry,
) -> Result<TokenStream, GeneratorError> {
    let ctx = TypeContext::new(registry, Some(namespace));
    let types = names
        .iter()
        .map(|name| ctx.generate_type(registry.resolve(name)?))
        .collect::<Result<Vec<_>, _>>()?;
    let module_doc = format!(" Types of `{namespace}`.");

    Ok(quote! {
        #![doc = #module_doc]

        use serde::{Deserialize, Serialize};

        #(#types)*
    })
}

/// Assembles `lib.rs`.
pub fn assemble_lib_rs(modules: &[ModulePlan]) -> TokenStream {
    let module_decls = modules.iter().map(|plan| {
        let ident = format_ident!("{}", plan.module);
        let doc = if plan.is_operation {
            format!(" `{}`", plan.owner)
        } else {
            format!(" Types of `{}`.", plan.owner)
        };
        quote! {
            #[doc = #doc]
            pub mod #ident;
        }
    });

    quote! {
        //! Generated bindings for the certified operations of an API corpus.
        //!
        //! ## Quick Start
        //!
        //! ```ignore
        //! use apispec_bindings::prelude::*;
        //! ```

        pub mod shared;

        pub mod prelude;

        #(#module_decls)*
    }
}

/// Assembles `prelude.rs`, re-exporting each operation's request, builder
/// and response.
pub fn assemble_prelude(modules: &[ModulePlan], suffix: &str) -> TokenStream {
    let reexports = modules.iter().filter(|p| p.is_operation).map(|plan| {
        let module = format_ident!("{}", plan.module);
        let base = operation_type_name(&plan.owner);
        let request = format_ident!("{}{}", base, suffix);
        let builder = format_ident!("{}{}Builder", base, suffix);
        let response = format_ident!("{}Response", base);
        quote! {
            pub use crate::#module::{#request, #builder, #response};
        }
    });

    quote! {
        //! Convenient re-exports for working with the generated bindings.

        pub use crate::shared::{BindingError, RequestParts};

        #(#reexports)*
    }
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code using prettyplease, prepending a generated-file
/// notice.
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!(
        "// This code was automatically generated by apispec-gen. Do not edit manually.\n\n{}",
        formatted
    )
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if the parent directory cannot be
/// created, or the temp file cannot be written or renamed.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Plans one module per certified operation and clean type-only unit.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if two owners map to the same
/// module name or an owner maps to a reserved one.
pub fn plan_modules(checked: &CheckedCorpus) -> Result<Vec<ModulePlan>, GeneratorError> {
    let operations = checked.certified_operations().map(|op| (op.name.as_str(), true));
    let type_units = checked.clean_type_units().map(|(ns, _)| (ns, false));

    let mut plans: BTreeMap<String, ModulePlan> = BTreeMap::new();
    for (owner, is_operation) in operations.chain(type_units) {
        let module = module_name(owner);
        if RESERVED_MODULES.contains(&module.as_str()) {
            return Err(GeneratorError::CodeGenError(format!(
                "'{owner}' maps to the reserved module name '{module}'"
            )));
        }
        if let Some(existing) = plans.get(&module) {
            return Err(GeneratorError::CodeGenError(format!(
                "'{}' and '{owner}' both map to module '{module}'",
                existing.owner
            )));
        }
        plans.insert(
            module.clone(),
            ModulePlan {
                module,
                owner: owner.to_string(),
                is_operation,
            },
        );
    }
    Ok(plans.into_values().collect())
}

/// Generates every file for the certified subset of `checked`.
///
/// Uncertified operations and type-only units with violations are skipped.
///
/// ## Errors
///
/// Returns an error if the suffix is invalid, an inline type collides with a
/// generated name, module names clash, or generated code fails to parse.
pub fn generate_all(
    checked: &CheckedCorpus,
    suffix: &str,
    parallel: bool,
) -> Result<GeneratedFiles, GeneratorError> {
    validate_request_suffix(suffix)?;
    for op in checked.certified_operations() {
        check_generated_names(op, suffix)?;
    }

    let skipped = checked.registry.operations().count() - checked.certified.len();
    if skipped > 0 {
        warn!(skipped, "skipping operations with violations");
    }

    let plans = plan_modules(checked)?;
    let registry = &checked.registry;

    let render = |plan: &ModulePlan| -> Result<(String, String), GeneratorError> {
        let tokens = if plan.is_operation {
            let op = registry.operation(&plan.owner).ok_or_else(|| {
                GeneratorError::CodeGenError(format!("operation '{}' is not registered", plan.owner))
            })?;
            assemble_operation_module(op, registry, suffix)?
        } else {
            let names = checked.type_units.get(&plan.owner).map(Vec::as_slice).unwrap_or_default();
            assemble_type_module(&plan.owner, names, registry)?
        };
        let formatted = format_code(&validate_code(&tokens)?);
        debug!(module = %plan.module, owner = %plan.owner, "emitted module");
        Ok((format!("{}.rs", plan.module), formatted))
    };

    let modules: Vec<(String, String)> = if parallel {
        plans.par_iter().map(render).collect::<Result<_, _>>()?
    } else {
        plans.iter().map(render).collect::<Result<_, _>>()?
    };

    let lib = format_code(&validate_code(&assemble_lib_rs(&plans))?);
    let shared = format_code(&validate_code(&assemble_shared_module(registry)?)?);
    let prelude = format_code(&validate_code(&assemble_prelude(&plans, suffix))?);

    let mut files = vec![
        ("lib.rs".to_string(), lib),
        ("shared.rs".to_string(), shared),
        ("prelude.rs".to_string(), prelude),
    ];
    files.extend(modules);

    let (operations, type_units): (Vec<&ModulePlan>, Vec<&ModulePlan>) =
        plans.iter().partition(|p| p.is_operation);

    info!(
        operations = operations.len(),
        type_units = type_units.len(),
        files = files.len(),
        "emitted bindings"
    );

    Ok(GeneratedFiles {
        files,
        operations: operations.iter().map(|p| p.owner.clone()).collect(),
        type_units: type_units.iter().map(|p| p.owner.clone()).collect(),
    })
}

/// Generates every file and writes it under `output_dir`.
///
/// With `dry_run`, files are printed to stdout instead of written.
///
/// ## Errors
///
/// Returns any error from [`generate_all`], or `GeneratorError::WriteError`
/// if a file cannot be written.
pub fn generate_and_write_all(
    checked: &CheckedCorpus,
    output_dir: &Path,
    dry_run: bool,
    suffix: &str,
    parallel: bool,
) -> Result<GeneratedFiles, GeneratorError> {
    let generated = generate_all(checked, suffix, parallel)?;

    if dry_run {
        for (filename, content) in &generated.files {
            println!("=== {} ===\n{}\n", filename, content);
        }
    } else {
        for (filename, content) in &generated.files {
            write_atomic(&output_dir.join(filename), content)?;
        }
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{SchemaUnit, bundled_units, check_corpus};
    use tempfile::TempDir;

    fn bundled() -> CheckedCorpus {
        check_corpus(&bundled_units(), false)
    }

    #[test]
    fn validate_code_rejects_invalid_code() {
        match validate_code(&quote! { pub struct }) {
            Err(GeneratorError::CodeGenError(msg)) => {
                assert!(msg.starts_with("Generated code is invalid"))
            }
            Err(other) => panic!("Expected CodeGenError, got: {:?}", other),
            Ok(_) => panic!("Expected CodeGenError, got valid code"),
        }
    }

    #[test]
    fn format_code_prepends_notice() {
        let file = validate_code(&quote! { pub struct A; }).unwrap();
        let code = format_code(&file);
        assert!(code.starts_with("// This code was automatically generated by apispec-gen."));
        assert!(code.contains("pub struct A;"));
    }

    #[test]
    fn write_atomic_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/lib.rs");
        write_atomic(&path, "// hi").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "// hi");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lib.rs");
        write_atomic(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn plans_operations_and_type_units() {
        let plans = plan_modules(&bundled()).unwrap();
        let modules: Vec<_> = plans.iter().map(|p| p.module.as_str()).collect();
        assert_eq!(
            modules,
            vec![
                "analysis_tokenizers_n_gram",
                "cluster_nodes_stats",
                "connector_update_pipeline",
                "document_single_exists",
                "inference_put_anthropic",
                "inference_put_elasticsearch",
            ]
        );
        assert_eq!(plans.iter().filter(|p| p.is_operation).count(), 3);
    }

    #[test]
    fn bundled_corpus_generates_every_file() {
        let generated = generate_all(&bundled(), "Request", true).unwrap();
        assert_eq!(generated.files.len(), 9);
        assert_eq!(generated.files[0].0, "lib.rs");

        let lib = generated.file("lib.rs").unwrap();
        assert!(lib.contains("pub mod shared;"));
        assert!(lib.contains("pub mod connector_update_pipeline;"));

        let shared = generated.file("shared.rs").unwrap();
        assert!(shared.contains("pub enum BindingError"));
        assert!(shared.contains("pub type RequestParts"));
        assert!(shared.contains("pub struct IngestPipelineParams"));
        assert!(shared.contains("pub struct JVMPool"));

        let prelude = generated.file("prelude.rs").unwrap();
        assert!(prelude.contains("ConnectorUpdatePipelineRequestBuilder"));
        assert!(!prelude.contains("cluster_nodes_stats"));

        let anthropic = generated.file("inference_put_anthropic.rs").unwrap();
        assert!(anthropic.contains("pub enum AnthropicTaskType"));
        assert!(anthropic.contains("pub struct InferencePutAnthropicRequest"));
        assert!(anthropic.contains("pub struct InferencePutAnthropicBody"));
        assert!(anthropic.contains("pub struct InferencePutAnthropicResponse"));
    }

    #[test]
    fn parallel_emission_matches_sequential() {
        let checked = bundled();
        let parallel = generate_all(&checked, "Request", true).unwrap();
        let sequential = generate_all(&checked, "Request", false).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn custom_suffix_flows_through() {
        let generated = generate_all(&bundled(), "Req", false).unwrap();
        let module = generated.file("connector_update_pipeline.rs").unwrap();
        assert!(module.contains("pub struct ConnectorUpdatePipelineReq "));
        assert!(module.contains("pub struct ConnectorUpdatePipelineReqBuilder"));
    }

    #[test]
    fn invalid_suffix_is_rejected() {
        match generate_all(&bundled(), "Req-uest", false) {
            Err(GeneratorError::InvalidRequestSuffix { suffix, .. }) => {
                assert_eq!(suffix, "Req-uest")
            }
            other => panic!("Expected InvalidRequestSuffix, got: {:?}", other),
        }
    }

    #[test]
    fn inline_type_colliding_with_generated_name() {
        let unit = r#"
            /** @rest_spec_name demo.ping */
            export interface Request extends RequestBase {
              urls: [{ path: '/_ping' methods: ['GET'] }]
              body: { kind: DemoPingBody }
            }
            export enum DemoPingBody { a }
        "#;
        let checked = check_corpus(&[SchemaUnit::new("ping.ts", unit)], false);
        match generate_all(&checked, "Request", false) {
            Err(GeneratorError::NamingCollision {
                type_name,
                suggestion,
                ..
            }) => {
                assert_eq!(type_name, "DemoPingBody");
                assert_eq!(suggestion, "DemoPingBodyType");
            }
            other => panic!("Expected NamingCollision, got: {:?}", other),
        }
    }

    #[test]
    fn uncertified_operations_are_skipped() {
        let mut units = bundled_units();
        units.push(SchemaUnit::new(
            "bad.ts",
            r#"
            /** @rest_spec_name demo.bad */
            export interface Request extends RequestBase {
              urls: [{ path: '/_bad/{id}' methods: ['GET'] }]
            }
            "#,
        ));
        let checked = check_corpus(&units, false);
        let generated = generate_all(&checked, "Request", false).unwrap();
        assert!(!generated.operations.contains(&"demo.bad".to_string()));
        assert!(generated.file("demo_bad.rs").is_none());
        assert_eq!(generated.operations.len(), 3);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("src");
        generate_and_write_all(&bundled(), &out, true, "Request", false).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn writes_every_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("src");
        let generated = generate_and_write_all(&bundled(), &out, false, "Request", true).unwrap();
        for (name, content) in &generated.files {
            assert_eq!(&fs::read_to_string(out.join(name)).unwrap(), content);
        }
    }
}
