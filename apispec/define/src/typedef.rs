//! Named type definitions owned by the type registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;
use crate::name::QualifiedName;
use crate::schema::{FieldSpec, FieldType, TypeRef};

/// One variant of an [`EnumSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    /// Variant name as declared.
    pub name: String,
    /// Explicit wire value (`name = 'value'`), if any.
    pub wire_value: Option<String>,
    pub description: Option<String>,
    pub annotations: Annotations,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wire_value: None,
            description: None,
            annotations: Annotations::default(),
        }
    }

    /// The string sent on the wire for this variant.
    pub fn wire_name(&self) -> &str {
        self.wire_value.as_deref().unwrap_or(&self.name)
    }
}

/// A closed set of string-like variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub name: QualifiedName,
    pub variants: Vec<EnumVariant>,
    pub description: Option<String>,
    pub annotations: Annotations,
}

/// A composite object type (`class` or non-request `interface`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: QualifiedName,
    /// Base types whose members are inherited by value.
    pub extends: Vec<TypeRef>,
    pub fields: Vec<FieldSpec>,
    pub description: Option<String>,
    pub annotations: Annotations,
}

/// A named alias for another type expression (`type Id = string`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSpec {
    pub name: QualifiedName,
    pub target: FieldType,
    pub description: Option<String>,
    pub annotations: Annotations,
}

/// A named type definition.
///
/// ## Examples
///
/// ```
/// use apispec_define::{EnumSpec, EnumVariant, QualifiedName, TypeDef};
///
/// let def = TypeDef::Enum(EnumSpec {
///     name: QualifiedName::scoped("inference.put_anthropic", "ServiceType"),
///     variants: vec![EnumVariant::new("anthropic")],
///     description: None,
///     annotations: Default::default(),
/// });
///
/// assert_eq!(def.kind(), "enum");
/// assert!(!def.is_composite());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    Enum(EnumSpec),
    Class(ClassSpec),
    Alias(AliasSpec),
}

impl TypeDef {
    pub fn name(&self) -> &QualifiedName {
        match self {
            Self::Enum(e) => &e.name,
            Self::Class(c) => &c.name,
            Self::Alias(a) => &a.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Enum(_) => "enum",
            Self::Class(_) => "class",
            Self::Alias(_) => "alias",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => e.description.as_deref(),
            Self::Class(c) => c.description.as_deref(),
            Self::Alias(a) => a.description.as_deref(),
        }
    }

    /// Classes and aliases can contain other types; enums cannot.
    pub fn is_composite(&self) -> bool {
        !matches!(self, Self::Enum(_))
    }

    /// Every type name this definition mentions.
    pub fn references(&self) -> Vec<&QualifiedName> {
        match self {
            Self::Enum(_) => Vec::new(),
            Self::Class(c) => c
                .extends
                .iter()
                .map(|r| &r.name)
                .chain(c.fields.iter().flat_map(|f| f.field_type.references()))
                .collect(),
            Self::Alias(a) => a.target.references(),
        }
    }

    /// Type names this definition contains by value.
    ///
    /// Base types and required, non-container fields count. Optional fields,
    /// arrays and maps break containment.
    pub fn by_value_references(&self) -> Vec<&QualifiedName> {
        match self {
            Self::Enum(_) => Vec::new(),
            Self::Class(c) => c
                .extends
                .iter()
                .map(|r| &r.name)
                .chain(c.fields.iter().flat_map(FieldSpec::by_value_references))
                .collect(),
            Self::Alias(a) => a.target.by_value_references(),
        }
    }

    /// Structural equality: same name, same shape. Descriptions and
    /// annotations are ignored, and enum variant order does not matter.
    pub fn same_shape(&self, other: &TypeDef) -> bool {
        if self.name() != other.name() {
            return false;
        }
        match (self, other) {
            (Self::Enum(a), Self::Enum(b)) => {
                let mut left: Vec<_> = a.variants.iter().map(EnumVariant::wire_name).collect();
                let mut right: Vec<_> = b.variants.iter().map(EnumVariant::wire_name).collect();
                left.sort_unstable();
                right.sort_unstable();
                left == right
            }
            (Self::Class(a), Self::Class(b)) => {
                a.extends == b.extends && field_shapes(&a.fields) == field_shapes(&b.fields)
            }
            (Self::Alias(a), Self::Alias(b)) => a.target == b.target,
            _ => false,
        }
    }
}

fn field_shapes(fields: &[FieldSpec]) -> BTreeMap<&str, (&FieldType, bool)> {
    fields
        .iter()
        .map(|f| (f.name.as_str(), (&f.field_type, f.required)))
        .collect()
}
