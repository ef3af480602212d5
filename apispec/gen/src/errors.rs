//! Error types for the apispec generator.

use thiserror::Error;

/// Errors that can occur while loading, resolving or generating a corpus.
///
/// Per-operation schema problems are not errors; they are accumulated as
/// [`Violation`](crate::validation::Violation)s. This enum covers the
/// failures that stop a phase outright.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to read a schema unit or corpus directory
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Corpus directory does not exist
    #[error("Corpus directory does not exist: {0}")]
    CorpusNotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A type name is already registered with a structurally different definition.
    #[error("Type '{name}' is already registered with a different definition")]
    DuplicateType { name: String },

    /// An operation rest name is registered twice.
    #[error("Operation '{name}' is already registered")]
    DuplicateOperation { name: String },

    /// A type reference does not resolve through the registry.
    #[error("Type '{name}' is not defined")]
    UnresolvedType { name: String },

    /// A composite type contains itself by value.
    #[error("Type '{name}' contains itself by value through {}", cycle.join(" -> "))]
    CyclicType {
        /// The offending type.
        name: String,
        /// Every member of the cycle, sorted.
        cycle: Vec<String>,
    },

    /// The registry was sealed by `resolve_all` and no longer accepts definitions.
    #[error("Registry is sealed; cannot register '{0}'")]
    RegistrySealed(String),

    /// Naming collision between an inline type and a generated wrapper type.
    ///
    /// This occurs when an operation declares a type whose Rust name matches
    /// one of the names the emitter derives from the rest name (e.g. an inline
    /// `PutAnthropicRequest` inside `inference.put_anthropic`).
    #[error(
        "Naming collision for operation '{operation}': type '{type_name}' conflicts with a generated type. Suggestion: rename it to '{suggestion}'"
    )]
    NamingCollision {
        /// The operation rest name.
        operation: String,
        /// The Rust name that collides.
        type_name: String,
        /// Suggested alternative name.
        suggestion: String,
    },

    /// A field's generated identifier clashes with a member the emitter adds.
    ///
    /// Builder setters share a namespace with `build()`, and path or query
    /// parameters share the request struct with its `body` field.
    #[error(
        "Naming collision for operation '{operation}': field '{field}' conflicts with the generated `{member}`"
    )]
    FieldNameCollision {
        /// The operation rest name.
        operation: String,
        /// Wire name of the field.
        field: String,
        /// The generated member it clashes with.
        member: String,
    },

    /// Invalid request suffix configuration.
    ///
    /// The request suffix must be alphanumeric (letters and numbers only)
    /// to ensure valid Rust identifier generation.
    #[error("Invalid request suffix '{suffix}': {reason}")]
    InvalidRequestSuffix {
        /// The invalid suffix value.
        suffix: String,
        /// Explanation of why the suffix is invalid.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_type_message_lists_chain() {
        let err = GeneratorError::CyclicType {
            name: "a::A".to_string(),
            cycle: vec!["a::A".to_string(), "a::B".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Type 'a::A' contains itself by value through a::A -> a::B"
        );
    }

    #[test]
    fn read_error_keeps_source() {
        let err = GeneratorError::ReadError {
            path: "corpus/x.ts".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("corpus/x.ts"));
    }
}
