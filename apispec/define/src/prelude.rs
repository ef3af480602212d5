//! Convenient re-exports of the schema model.
//!
//! ```
//! use apispec_define::prelude::*;
//!
//! let field = FieldSpec::optional("top_p", FieldType::Primitive(Primitive::Float));
//! assert!(!field.required);
//! ```

pub use crate::annotations::Annotations;
pub use crate::availability::{
    Availability, DeploymentTarget, Privileges, Stability, Version, Visibility,
};
pub use crate::name::QualifiedName;
pub use crate::schema::{FieldSpec, FieldType, Primitive, TypeRef};
pub use crate::typedef::{AliasSpec, ClassSpec, EnumSpec, EnumVariant, TypeDef};
pub use crate::types::{Body, FieldLocation, HttpMethod, Operation, UrlTemplate};
