//! Cargo.toml generation for the emitted bindings package.
//!
//! The generated modules need `serde`, `serde_json` and `thiserror`, and
//! nothing else, so the manifest is a fixed template.

use std::path::Path;

use tracing::info;

use crate::errors::GeneratorError;
use crate::output::write_atomic;

/// Package name of the emitted bindings crate.
pub const BINDINGS_PACKAGE: &str = "apispec-bindings";

/// Returns the manifest for the bindings package.
pub fn generate_cargo_toml() -> String {
    format!(
        r#"# This file was automatically generated by apispec-gen. Do not edit manually.

[package]
name = "{BINDINGS_PACKAGE}"
version = "0.1.0"
edition = "2024"
publish = false

[lib]
path = "src/lib.rs"

[dependencies]
serde = {{ version = "1.0", features = ["derive"] }}
serde_json = "1.0"
thiserror = "2.0"
"#
    )
}

/// Writes `Cargo.toml` into `dir`, or prints it when `dry_run` is set.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if the file cannot be written.
pub fn write_cargo_toml(dir: &Path, dry_run: bool) -> Result<(), GeneratorError> {
    let content = generate_cargo_toml();
    if dry_run {
        println!("=== Cargo.toml ===\n{}\n", content);
        return Ok(());
    }

    let path = dir.join("Cargo.toml");
    write_atomic(&path, &content)?;
    info!(path = %path.display(), "wrote bindings manifest");
    Ok(())
}
