//! Apispec Definitions
//!
//! This crate holds the data the generator runs against:
//!
//! - [`shared`] - The shared-type library (identifier aliases, numeric
//!   settings objects, common enums) that is pre-seeded into the read-only
//!   partition of the type registry before any corpus unit is processed.
//! - [`corpus`] - The bundled schema corpus, embedded at compile time, used
//!   when no corpus directory is given on the command line.
//!
//! ## Examples
//!
//! ```
//! use apispec_definitions::corpus::bundled_corpus;
//! use apispec_definitions::shared::shared_types;
//!
//! let shared = shared_types();
//! assert!(shared.iter().any(|t| t.name().name == "Id"));
//!
//! let corpus = bundled_corpus();
//! assert!(corpus.iter().any(|u| u.path.ends_with("PutAnthropicRequest.ts")));
//! ```

pub mod corpus;
pub mod prelude;
pub mod shared;

pub use corpus::{BundledUnit, bundled_corpus};
pub use shared::shared_types;
