//! Generator configuration loaded from `apispec.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! corpus_dir = "specification"
//! output_dir = "generated/src"
//! parallel = true
//! request_suffix = "Request"
//! extensions = ["ts"]
//! ```
//!
//! Without `corpus_dir` the corpus bundled in `apispec-definitions` is used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::GeneratorError;
use crate::pipeline::{SchemaUnit, bundled_units, load_corpus};
use crate::validation::validate_request_suffix;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "apispec.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory of schema units; `None` selects the bundled corpus.
    pub corpus_dir: Option<PathBuf>,
    /// Directory the generated `src/` files are written to.
    pub output_dir: PathBuf,
    /// Run parsing, validation and emission on the rayon pool.
    pub parallel: bool,
    /// Suffix of generated request types.
    pub request_suffix: String,
    /// File extensions treated as schema units.
    pub extensions: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            corpus_dir: None,
            output_dir: PathBuf::from("generated/src"),
            parallel: true,
            request_suffix: "Request".to_string(),
            extensions: vec!["ts".to_string()],
        }
    }
}

impl GeneratorConfig {
    /// Parses and validates a configuration document.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` for malformed TOML or unknown
    /// keys, and `GeneratorError::InvalidRequestSuffix` for a bad suffix.
    pub fn from_toml_str(text: &str) -> Result<Self, GeneratorError> {
        let config: Self =
            toml::from_str(text).map_err(|e| GeneratorError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit configuration file.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if the file is missing or
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path).map_err(|e| {
            GeneratorError::ConfigError(format!("cannot read '{}': {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `path` when given, else `apispec.toml` in `dir` when present,
    /// else the defaults.
    pub fn load_or_default(path: Option<&Path>, dir: &Path) -> Result<Self, GeneratorError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Checks values that deserialize but cannot be used.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::InvalidRequestSuffix` or
    /// `GeneratorError::ConfigError` for an empty extension list.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        validate_request_suffix(&self.request_suffix)?;
        if self.extensions.is_empty() {
            return Err(GeneratorError::ConfigError(
                "extensions must name at least one file extension".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads the configured corpus.
    pub fn load_units(&self) -> Result<Vec<SchemaUnit>, GeneratorError> {
        match &self.corpus_dir {
            Some(dir) => load_corpus(dir, &self.extensions),
            None => Ok(bundled_units()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(
            GeneratorConfig::from_toml_str("").unwrap(),
            GeneratorConfig::default()
        );
    }

    #[test]
    fn every_key_is_read() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            corpus_dir = "specification"
            output_dir = "out/src"
            parallel = false
            request_suffix = "Req"
            extensions = ["ts", "tsx"]
            "#,
        )
        .unwrap();
        assert_eq!(config.corpus_dir, Some(PathBuf::from("specification")));
        assert_eq!(config.output_dir, PathBuf::from("out/src"));
        assert!(!config.parallel);
        assert_eq!(config.request_suffix, "Req");
        assert_eq!(config.extensions, vec!["ts", "tsx"]);
    }

    #[test]
    fn unknown_key_is_rejected() {
        match GeneratorConfig::from_toml_str("corpus = 'x'") {
            Err(GeneratorError::ConfigError(msg)) => assert!(msg.contains("corpus")),
            other => panic!("Expected ConfigError, got: {:?}", other),
        }
    }

    #[test]
    fn bad_suffix_is_rejected() {
        match GeneratorConfig::from_toml_str("request_suffix = 'Re quest'") {
            Err(GeneratorError::InvalidRequestSuffix { suffix, .. }) => {
                assert_eq!(suffix, "Re quest")
            }
            other => panic!("Expected InvalidRequestSuffix, got: {:?}", other),
        }
    }

    #[test]
    fn empty_extensions_are_rejected() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("extensions = []"),
            Err(GeneratorError::ConfigError(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        match GeneratorConfig::load_or_default(Some(&missing), dir.path()) {
            Err(GeneratorError::ConfigError(msg)) => assert!(msg.contains("nope.toml")),
            other => panic!("Expected ConfigError, got: {:?}", other),
        }
    }

    #[test]
    fn discovers_config_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "parallel = false").unwrap();
        let config = GeneratorConfig::load_or_default(None, dir.path()).unwrap();
        assert!(!config.parallel);

        let empty = TempDir::new().unwrap();
        let config = GeneratorConfig::load_or_default(None, empty.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn default_corpus_is_bundled() {
        let units = GeneratorConfig::default().load_units().unwrap();
        assert_eq!(units.len(), 6);
    }
}
