//! The shared-type library.
//!
//! These are the common primitives and reusable settings objects that schema
//! units import from `@_types/*` and `@inference/_types/*`. They are registered
//! under bare names into the read-only partition of the registry; corpus units
//! reference them without qualification.
//!
//! ## Contents
//!
//! | Name | Kind | Used by |
//! |------|------|---------|
//! | `Id`, `Name`, `VersionString` | alias of `string` | path parts, tokenizers |
//! | `RequestBase`, `request` | empty class | every request interface |
//! | `IngestPipelineParams` | class | `connector.update_pipeline` |
//! | `InferenceChunkingSettings` | class | inference `put_*` bodies |
//! | `RateLimitSetting` | class | inference service settings |
//! | `AdaptiveAllocations` | class | `inference.put_elasticsearch` |
//! | `TokenChar` | enum | `edge_n_gram_tokenizer` |
//! | `tokenizer_base` | class | tokenizer definitions |
//! | `j_v_m_pool` | class | `memory_stats` |

use apispec_define::{
    AliasSpec, Annotations, ClassSpec, EnumSpec, EnumVariant, FieldSpec, FieldType, Primitive,
    QualifiedName, TypeDef,
};

fn string() -> FieldType {
    FieldType::Primitive(Primitive::String)
}

fn boolean() -> FieldType {
    FieldType::Primitive(Primitive::Boolean)
}

fn integer() -> FieldType {
    FieldType::Primitive(Primitive::Integer)
}

fn long() -> FieldType {
    FieldType::Primitive(Primitive::Long)
}

fn alias(name: &str, target: FieldType, description: &str) -> TypeDef {
    TypeDef::Alias(AliasSpec {
        name: QualifiedName::shared(name),
        target,
        description: Some(description.to_string()),
        annotations: Annotations::default(),
    })
}

fn class(name: &str, description: &str, fields: Vec<FieldSpec>) -> TypeDef {
    TypeDef::Class(ClassSpec {
        name: QualifiedName::shared(name),
        extends: vec![],
        fields,
        description: Some(description.to_string()),
        annotations: Annotations::default(),
    })
}

fn enumeration(name: &str, description: &str, variants: &[&str]) -> TypeDef {
    TypeDef::Enum(EnumSpec {
        name: QualifiedName::shared(name),
        variants: variants.iter().map(|v| EnumVariant::new(*v)).collect(),
        description: Some(description.to_string()),
        annotations: Annotations::default(),
    })
}

/// Returns the shared-type library, sorted by name.
pub fn shared_types() -> Vec<TypeDef> {
    let mut types = vec![
        alias("Id", string(), "A unique identifier."),
        alias("Name", string(), "A human-readable name."),
        alias("VersionString", string(), "A version string."),
        class("RequestBase", "Common base of every request definition.", vec![]),
        class("request", "Legacy base of request definitions.", vec![]),
        class(
            "IngestPipelineParams",
            "Ingest pipeline configuration of a connector.",
            vec![
                FieldSpec::required("name", string()),
                FieldSpec::required("extract_binary_content", boolean()),
                FieldSpec::required("reduce_whitespace", boolean()),
                FieldSpec::required("run_ml_inference", boolean()),
            ],
        ),
        class(
            "InferenceChunkingSettings",
            "Chunking configuration for inference endpoints.",
            vec![
                FieldSpec::optional("max_chunk_size", integer())
                    .with_annotation("server_default", "250"),
                FieldSpec::optional("overlap", integer()).with_annotation("server_default", "100"),
                FieldSpec::optional("sentence_overlap", integer())
                    .with_annotation("server_default", "1"),
                FieldSpec::optional("separator_group", string()),
                FieldSpec::optional("separators", FieldType::array_of(string())),
                FieldSpec::optional("strategy", string())
                    .with_annotation("server_default", "sentence"),
            ],
        ),
        class(
            "RateLimitSetting",
            "Limits the number of requests per minute sent to a service.",
            vec![FieldSpec::optional("requests_per_minute", integer())],
        ),
        class(
            "AdaptiveAllocations",
            "Adaptive allocation settings of a trained model deployment.",
            vec![
                FieldSpec::optional("enabled", boolean()).with_annotation("server_default", "false"),
                FieldSpec::optional("max_number_of_allocations", integer()),
                FieldSpec::optional("min_number_of_allocations", integer()),
            ],
        ),
        enumeration(
            "TokenChar",
            "Character classes kept in tokens.",
            &["letter", "digit", "whitespace", "punctuation", "symbol", "custom"],
        ),
        class(
            "tokenizer_base",
            "Common base of tokenizer definitions.",
            vec![FieldSpec::optional("version", FieldType::named("VersionString"))],
        ),
        class(
            "j_v_m_pool",
            "One JVM memory pool.",
            vec![
                FieldSpec::required("used", string()),
                FieldSpec::required("used_in_bytes", long()),
                FieldSpec::required("peak_used", string()),
                FieldSpec::required("peak_used_in_bytes", long()),
                FieldSpec::required("max", string()),
                FieldSpec::required("max_in_bytes", long()),
                FieldSpec::required("peak_max", string()),
                FieldSpec::required("peak_max_in_bytes", long()),
            ],
        ),
    ];
    types.sort_by(|a, b| a.name().cmp(b.name()));
    types
}
