//! Convenient re-exports for working with the bundled definitions.
//!
//! ```
//! use apispec_definitions::prelude::*;
//!
//! assert_eq!(bundled_corpus().len(), 6);
//! ```

pub use crate::corpus::{BundledUnit, bundled_corpus};
pub use crate::shared::shared_types;
