//! Error types for the analysis engines.
//!
//! Every failure carries the name of the offending field, group or
//! category so the caller can report it without re-deriving context.
//! Errors are returned before any computation starts; no engine produces
//! a partial result.

use thiserror::Error;

/// Machine-readable error codes.
pub mod codes {
    pub const SCHEMA: &str = "SCHEMA_ERROR";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const INSUFFICIENT_GROUPS: &str = "INSUFFICIENT_GROUPS";
    pub const INSUFFICIENT_CATEGORIES: &str = "INSUFFICIENT_CATEGORIES";
    pub const INVALID_SPECIFICATION: &str = "INVALID_SPECIFICATION";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const DOMAIN: &str = "DOMAIN_ERROR";
    pub const DEGENERATE: &str = "DEGENERATE_INPUT";
}

/// Failure of validation or of an analysis engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The raw input shape cannot be resolved to the entity an analysis needs.
    #[error("schema error in '{field}': {reason}")]
    Schema { field: String, reason: String },

    /// Too few valid observations in a series or group.
    #[error("'{field}' needs at least {required} valid data points, got {actual}")]
    InsufficientData {
        field: String,
        required: usize,
        actual: usize,
    },

    /// Too few groups for a between-group comparison.
    #[error("at least {required} groups are required, got {actual}")]
    InsufficientGroups { required: usize, actual: usize },

    /// Too few categories for a ranking.
    #[error("at least {required} categories are required, got {actual}")]
    InsufficientCategories { required: usize, actual: usize },

    /// Specification limits or target are inconsistent.
    #[error("invalid specification: {reason}")]
    InvalidSpecification { reason: String },

    /// A parameter or entry lies outside its admissible range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// Data lies outside the support of the requested distribution.
    #[error("domain error in '{field}': {reason}")]
    Domain { field: String, reason: String },

    /// The result is mathematically undefined for this input.
    #[error("degenerate input in '{field}': {reason}")]
    Degenerate { field: String, reason: String },
}

impl AnalysisError {
    /// Stable code for the external dispatch layer.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Schema { .. } => codes::SCHEMA,
            AnalysisError::InsufficientData { .. } => codes::INSUFFICIENT_DATA,
            AnalysisError::InsufficientGroups { .. } => codes::INSUFFICIENT_GROUPS,
            AnalysisError::InsufficientCategories { .. } => codes::INSUFFICIENT_CATEGORIES,
            AnalysisError::InvalidSpecification { .. } => codes::INVALID_SPECIFICATION,
            AnalysisError::InvalidValue { .. } => codes::INVALID_VALUE,
            AnalysisError::Domain { .. } => codes::DOMAIN,
            AnalysisError::Degenerate { .. } => codes::DEGENERATE,
        }
    }

    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient_data(field: impl Into<String>, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData {
            field: field.into(),
            required,
            actual,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_specification(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidSpecification {
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::Domain {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalysisError::Degenerate {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_field_and_minimum() {
        let err = AnalysisError::insufficient_data("group 'B'", 2, 1);
        let msg = err.to_string();
        assert!(msg.contains("group 'B'"), "{msg}");
        assert!(msg.contains("at least 2"), "{msg}");
        assert!(msg.contains("got 1"), "{msg}");
    }

    #[test]
    fn codes_are_distinct_per_kind() {
        let errors = [
            AnalysisError::schema("data", "x"),
            AnalysisError::insufficient_data("data", 3, 1),
            AnalysisError::InsufficientGroups {
                required: 2,
                actual: 1,
            },
            AnalysisError::InsufficientCategories {
                required: 2,
                actual: 1,
            },
            AnalysisError::invalid_specification("x"),
            AnalysisError::invalid_value("alpha", "x"),
            AnalysisError::domain("data", "x"),
            AnalysisError::degenerate("data", "x"),
        ];
        let mut seen: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), errors.len());
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(
            AnalysisError::invalid_value("alpha", "must be in (0, 1)"),
            AnalysisError::invalid_value("alpha", "must be in (0, 1)")
        );
    }
}
