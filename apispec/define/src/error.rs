//! Error types for schema model parsing helpers.

use thiserror::Error;

/// Errors raised while interpreting raw model values (versions, names,
/// availability annotations).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineError {
    /// A version string is not in `major.minor.patch` form.
    #[error("invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    /// A qualified type name is empty or has an empty segment.
    #[error("invalid qualified name '{0}'")]
    InvalidQualifiedName(String),

    /// An `@availability` annotation could not be interpreted.
    #[error("invalid availability '{value}': {reason}")]
    InvalidAvailability { value: String, reason: String },

    /// Stability level outside the closed set.
    #[error("unknown stability '{0}' (expected experimental, beta or stable)")]
    UnknownStability(String),

    /// Visibility outside the closed set.
    #[error("unknown visibility '{0}' (expected public, feature_flag or private)")]
    UnknownVisibility(String),

    /// Deployment target outside the closed set.
    #[error("unknown deployment target '{0}' (expected stack or serverless)")]
    UnknownTarget(String),
}
