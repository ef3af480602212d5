//! Field and type-expression definitions.
//!
//! A [`FieldSpec`] is one member of a body, a parameter list, or a settings
//! object. Its [`FieldType`] is a small expression tree over primitives and
//! named references into the type registry.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::annotations::Annotations;
use crate::name::QualifiedName;

/// Built-in scalar types of the schema language.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use apispec_define::Primitive;
///
/// assert_eq!(Primitive::from_str("integer").unwrap(), Primitive::Integer);
/// assert_eq!(Primitive::Float.to_string(), "float");
/// assert!(Primitive::from_str("Id").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Primitive {
    String,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Number,
    Null,
}

/// A named pointer to a type definition held by the registry.
///
/// The reference never owns the definition; it is resolved by name at
/// validation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: QualifiedName,
}

impl TypeRef {
    pub fn new(name: QualifiedName) -> Self {
        Self { name }
    }
}

/// The declared type of a field.
///
/// ## Examples
///
/// ```
/// use apispec_define::{FieldType, Primitive};
///
/// let ty = FieldType::array_of(FieldType::named("TokenChar"));
/// assert_eq!(ty.to_string(), "TokenChar[]");
///
/// let map = FieldType::map_of(FieldType::Primitive(Primitive::String), FieldType::named("Pool"));
/// assert_eq!(map.to_string(), "Dictionary<string, Pool>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum FieldType {
    Primitive(Primitive),
    Named(TypeRef),
    Array(Box<FieldType>),
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
    Union(Vec<FieldType>),
}

impl FieldType {
    /// A reference to a shared (bare) type name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(TypeRef::new(QualifiedName::shared(name)))
    }

    /// A reference to a type scoped to `namespace`.
    pub fn scoped(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(TypeRef::new(QualifiedName::scoped(namespace, name)))
    }

    pub fn array_of(inner: FieldType) -> Self {
        Self::Array(Box::new(inner))
    }

    pub fn map_of(key: FieldType, value: FieldType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// All type names referenced anywhere in this expression.
    pub fn references(&self) -> Vec<&QualifiedName> {
        let mut out = Vec::new();
        self.collect_references(&mut out, true);
        out
    }

    /// Names this expression contains by value.
    ///
    /// Arrays and maps introduce indirection, so nothing below them is
    /// returned. Union members are held by value.
    pub fn by_value_references(&self) -> Vec<&QualifiedName> {
        let mut out = Vec::new();
        self.collect_references(&mut out, false);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a QualifiedName>, through_containers: bool) {
        match self {
            Self::Primitive(_) => {}
            Self::Named(r) => out.push(&r.name),
            Self::Array(inner) => {
                if through_containers {
                    inner.collect_references(out, through_containers);
                }
            }
            Self::Map { key, value } => {
                if through_containers {
                    key.collect_references(out, through_containers);
                    value.collect_references(out, through_containers);
                }
            }
            Self::Union(members) => {
                for m in members {
                    m.collect_references(out, through_containers);
                }
            }
        }
    }

    /// Scopes every bare reference whose name is in `local` to `namespace`.
    pub fn qualify(&mut self, namespace: &str, local: &BTreeSet<String>) {
        match self {
            Self::Primitive(_) => {}
            Self::Named(r) => {
                if r.name.is_shared() && local.contains(&r.name.name) {
                    r.name = QualifiedName::scoped(namespace, r.name.name.clone());
                }
            }
            Self::Array(inner) => inner.qualify(namespace, local),
            Self::Map { key, value } => {
                key.qualify(namespace, local);
                value.qualify(namespace, local);
            }
            Self::Union(members) => {
                for m in members {
                    m.qualify(namespace, local);
                }
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Named(r) => write!(f, "{}", r.name.name),
            Self::Array(inner) => match inner.as_ref() {
                Self::Union(_) => write!(f, "({inner})[]"),
                _ => write!(f, "{inner}[]"),
            },
            Self::Map { key, value } => write!(f, "Dictionary<{key}, {value}>"),
            Self::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
        }
    }
}

/// One member of a body, parameter list or settings object.
///
/// ## Examples
///
/// ```
/// use apispec_define::{FieldSpec, FieldType, Primitive};
///
/// let field = FieldSpec::optional("return_documents", FieldType::Primitive(Primitive::Boolean))
///     .with_annotation("server_default", "true");
///
/// assert!(!field.required);
/// assert!(field.has_server_default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub name: String,
    pub field_type: FieldType,
    /// `false` when the schema marks the field with `?`.
    pub required: bool,
    pub description: Option<String>,
    pub annotations: Annotations,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            description: None,
            annotations: Annotations::default(),
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key, value);
        self
    }

    /// Whether the server applies a default when the field is omitted.
    pub fn has_server_default(&self) -> bool {
        self.annotations.server_default().is_some()
    }

    /// Names this field holds by value. Optional fields hold nothing by value.
    pub fn by_value_references(&self) -> Vec<&QualifiedName> {
        if self.required {
            self.field_type.by_value_references()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arrays_and_maps_break_by_value_chains() {
        let ty = FieldType::Union(vec![
            FieldType::named("A"),
            FieldType::array_of(FieldType::named("B")),
            FieldType::map_of(FieldType::Primitive(Primitive::String), FieldType::named("C")),
        ]);

        let all: Vec<_> = ty.references().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(all, vec!["A", "B", "C"]);

        let by_value: Vec<_> = ty
            .by_value_references()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(by_value, vec!["A"]);
    }

    #[test]
    fn optional_fields_hold_nothing_by_value() {
        let field = FieldSpec::optional("rate_limit", FieldType::named("RateLimitSetting"));
        assert!(field.by_value_references().is_empty());

        let field = FieldSpec::required("rate_limit", FieldType::named("RateLimitSetting"));
        assert_eq!(field.by_value_references().len(), 1);
    }

    #[test]
    fn qualify_only_touches_local_names() {
        let mut ty = FieldType::Union(vec![
            FieldType::named("ServiceType"),
            FieldType::named("Id"),
            FieldType::array_of(FieldType::named("ServiceType")),
        ]);
        ty.qualify("inference.put_anthropic", &local(&["ServiceType"]));

        let names: Vec<_> = ty.references().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "inference.put_anthropic::ServiceType",
                "Id",
                "inference.put_anthropic::ServiceType"
            ]
        );
    }

    #[test]
    fn display_parenthesises_union_arrays() {
        let ty = FieldType::array_of(FieldType::Union(vec![
            FieldType::Primitive(Primitive::String),
            FieldType::Primitive(Primitive::Long),
        ]));
        assert_eq!(ty.to_string(), "(string | long)[]");
    }
}
