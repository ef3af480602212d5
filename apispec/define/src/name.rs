//! Qualified type names.
//!
//! Shared library types live under a bare name (`Id`). Types declared inline
//! by a schema unit are scoped to the unit's namespace, which for operations
//! is the rest name (`inference.put_anthropic::ServiceType`). Scoping keeps two
//! units that both declare `ServiceType` from colliding in the registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DefineError;

/// Separator between namespace and type name in the rendered form.
const SEPARATOR: &str = "::";

/// A type name, optionally scoped to an owning namespace.
///
/// ## Examples
///
/// ```
/// use apispec_define::QualifiedName;
///
/// let shared = QualifiedName::shared("Id");
/// assert!(shared.is_shared());
/// assert_eq!(shared.to_string(), "Id");
///
/// let scoped = QualifiedName::scoped("inference.put_anthropic", "ServiceType");
/// assert_eq!(scoped.to_string(), "inference.put_anthropic::ServiceType");
/// assert_eq!("inference.put_anthropic::ServiceType".parse::<QualifiedName>().unwrap(), scoped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Owning namespace, `None` for the shared partition.
    pub namespace: Option<String>,
    /// The bare type name as written in the schema.
    pub name: String,
}

impl QualifiedName {
    /// Creates a bare (shared partition) name.
    pub fn shared(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Creates a name scoped to `namespace`.
    pub fn scoped(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Returns `true` when the name belongs to the shared partition.
    pub fn is_shared(&self) -> bool {
        self.namespace.is_none()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}{SEPARATOR}{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for QualifiedName {
    type Err = DefineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DefineError::InvalidQualifiedName(s.to_string());
        match s.rsplit_once(SEPARATOR) {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Ok(Self::scoped(ns, name)),
            Some(_) => Err(invalid()),
            None if s.is_empty() => Err(invalid()),
            None => Ok(Self::shared(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_names_sort_before_scoped() {
        let mut names = vec![
            QualifiedName::scoped("a.b", "Z"),
            QualifiedName::shared("Id"),
        ];
        names.sort();
        assert!(names[0].is_shared());
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!("".parse::<QualifiedName>().is_err());
        assert!("::Name".parse::<QualifiedName>().is_err());
        assert!("ns::".parse::<QualifiedName>().is_err());
    }

    #[test]
    fn parse_bare_name() {
        assert_eq!(
            "RateLimitSetting".parse::<QualifiedName>().unwrap(),
            QualifiedName::shared("RateLimitSetting")
        );
    }

    #[test]
    fn serde_roundtrip_keeps_namespace() {
        let name = QualifiedName::scoped("connector.update_pipeline", "Body");
        let json = serde_json::to_string(&name).unwrap();
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
