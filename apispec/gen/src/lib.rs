//! apispec corpus validator and binding generator.
//!
//! This crate reads a corpus of TypeScript-flavoured schema units, each
//! describing one REST operation or a set of types, and:
//!
//! - parses every unit into the `apispec-define` model
//! - registers types in a [`registry::TypeRegistry`], scoping per-operation
//!   types to their operation
//! - validates every operation and reports [`validation::Violation`]s grouped
//!   by operation
//! - emits typed Rust bindings for the certified operations
//!
//! ## Modules
//!
//! - [`parser`] - Schema unit lexer and parser
//! - [`registry`] - Type registry with shared and corpus partitions
//! - [`validation`] - Operation and type-unit validation
//! - [`pipeline`] - Corpus loading and the parallel check phases
//! - [`codegen`] - Code generation for types, requests and builders
//! - [`output`] - Final assembly, validation, and file writing
//! - [`cargo_gen`] - Cargo.toml generation for the bindings package
//! - [`request`] - Runtime request construction against an operation
//! - [`template`] - URL template utilities
//! - [`report`] - Terminal and JSON reports
//! - [`config`] - `apispec.toml` configuration
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use apispec_gen::output::generate_and_write_all;
//! use apispec_gen::pipeline::{bundled_units, check_corpus};
//!
//! let checked = check_corpus(&bundled_units(), true);
//! for violation in &checked.violations {
//!     eprintln!("{violation}");
//! }
//!
//! let generated =
//!     generate_and_write_all(&checked, Path::new("generated/src"), false, "Request", true)
//!         .unwrap();
//! println!("emitted {} operations", generated.operations.len());
//! ```

pub mod cargo_gen;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod request;
pub mod template;
pub mod validation;
