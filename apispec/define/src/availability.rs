//! Availability, privilege and version metadata.
//!
//! Availability is kept as raw strings on the model so that a malformed
//! `@availability` line survives parsing and can be reported by the validator
//! alongside every other problem in the operation. The typed accessors here
//! are what the validator uses to decide well-formedness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::DefineError;

/// Stability level of an operation on one deployment target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stability {
    Experimental,
    Beta,
    Stable,
}

/// Visibility of an operation on one deployment target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    Public,
    FeatureFlag,
    Private,
}

/// Deployment flavour an availability line applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeploymentTarget {
    Stack,
    Serverless,
}

/// A `major.minor.patch` version.
///
/// Versions order numerically, so `8.9.0 < 8.12.0`.
///
/// ## Examples
///
/// ```
/// use apispec_define::Version;
///
/// let v: Version = "8.12.0".parse().unwrap();
/// assert_eq!((v.major, v.minor, v.patch), (8, 12, 0));
/// assert!("8.9.0".parse::<Version>().unwrap() < v);
/// assert!("8.12".parse::<Version>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for Version {
    type Err = DefineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DefineError::InvalidVersion {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected major.minor.patch"));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("components must be unsigned integers"));
            }
            *slot = part
                .parse()
                .map_err(|_| invalid("component out of range"))?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One `@availability` line, e.g. `stack since=8.12.0 stability=beta`.
///
/// ## Examples
///
/// ```
/// use apispec_define::{Availability, DeploymentTarget, Stability};
///
/// let a = Availability::parse_annotation("stack since=8.12.0 stability=beta").unwrap();
/// assert_eq!(a.deployment_target().unwrap(), DeploymentTarget::Stack);
/// assert_eq!(a.stability_level().unwrap(), Some(Stability::Beta));
/// assert_eq!(a.since_version().unwrap().unwrap().to_string(), "8.12.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Deployment target as written (`stack`, `serverless`).
    pub target: String,
    pub stability: Option<String>,
    pub visibility: Option<String>,
    /// Introduction version as written.
    pub since: Option<String>,
}

impl Availability {
    /// Splits an annotation value into target and `key=value` settings.
    ///
    /// Only the shape is checked here: a target followed by known keys. The
    /// values themselves are left for [`Availability::stability_level`] and
    /// friends.
    ///
    /// ## Errors
    ///
    /// Returns `DefineError::InvalidAvailability` when the target is missing,
    /// a setting is not `key=value`, or a key is unknown.
    pub fn parse_annotation(value: &str) -> Result<Self, DefineError> {
        let invalid = |reason: String| DefineError::InvalidAvailability {
            value: value.to_string(),
            reason,
        };

        let mut tokens = value.split_whitespace();
        let target = tokens
            .next()
            .ok_or_else(|| invalid("missing deployment target".to_string()))?;

        let mut availability = Self {
            target: target.to_string(),
            ..Self::default()
        };

        for token in tokens {
            let (key, val) = token
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected key=value, found '{token}'")))?;
            let slot = match key {
                "stability" => &mut availability.stability,
                "visibility" => &mut availability.visibility,
                "since" => &mut availability.since,
                other => return Err(invalid(format!("unknown setting '{other}'"))),
            };
            *slot = Some(val.to_string());
        }

        Ok(availability)
    }

    pub fn deployment_target(&self) -> Result<DeploymentTarget, DefineError> {
        DeploymentTarget::from_str(&self.target)
            .map_err(|_| DefineError::UnknownTarget(self.target.clone()))
    }

    pub fn stability_level(&self) -> Result<Option<Stability>, DefineError> {
        self.stability
            .as_deref()
            .map(|s| Stability::from_str(s).map_err(|_| DefineError::UnknownStability(s.to_string())))
            .transpose()
    }

    pub fn visibility_level(&self) -> Result<Option<Visibility>, DefineError> {
        self.visibility
            .as_deref()
            .map(|s| {
                Visibility::from_str(s).map_err(|_| DefineError::UnknownVisibility(s.to_string()))
            })
            .transpose()
    }

    pub fn since_version(&self) -> Result<Option<Version>, DefineError> {
        self.since.as_deref().map(Version::from_str).transpose()
    }
}

/// Privileges a caller needs to invoke an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privileges {
    pub cluster: Vec<String>,
    pub index: Vec<String>,
}

impl Privileges {
    pub fn is_empty(&self) -> bool {
        self.cluster.is_empty() && self.index.is_empty()
    }
}
