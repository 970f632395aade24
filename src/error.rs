//! Error handling for the gbsip codec
//!
//! Every parse, validate and serialize operation returns a [`CodecResult`].
//! Errors name the field and the sub-rule that failed so the transport layer
//! can render a diagnostic or map the failure to a rejection response.

use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Failure category, independent of which field produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    EmptyInput,
    UnrecognizedField,
    MissingRequiredSubfield,
    PatternMismatch,
    EnumMismatch,
    CrossFieldInconsistency,
    NumericOverflow,
    LookupMiss,
    LimitExceeded,
}

/// Unified error type for all codec operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Nothing left to parse after trimming
    #[error("{field}: input is empty")]
    EmptyInput { field: &'static str },

    /// The line does not start with the expected field name
    #[error("{field}: unrecognized field line {line:?}")]
    UnrecognizedField { field: &'static str, line: String },

    #[error("{field}: missing required {subfield}")]
    MissingRequiredSubfield {
        field: &'static str,
        subfield: &'static str,
    },

    #[error("{field}: {subfield} {value:?} does not match {expected}")]
    PatternMismatch {
        field: &'static str,
        subfield: &'static str,
        value: String,
        expected: String,
    },

    #[error("{field}: {subfield} {value:?} is not one of {allowed}")]
    EnumMismatch {
        field: &'static str,
        subfield: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field}: {rule}")]
    CrossFieldInconsistency { field: &'static str, rule: String },

    #[error("{field}: {subfield} {value:?} does not fit in {width}")]
    NumericOverflow {
        field: &'static str,
        subfield: &'static str,
        value: String,
        width: &'static str,
    },

    /// Status code absent from every category table
    #[error("{field}: status code {code} not found in any category table")]
    LookupMiss { field: &'static str, code: u16 },

    #[error("{field}: {what} {actual} exceeds limit {limit}")]
    LimitExceeded {
        field: &'static str,
        what: &'static str,
        actual: usize,
        limit: usize,
    },

    /// Failure inside a component owned by `field`
    #[error("{field}: {source}")]
    Nested {
        field: &'static str,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub fn empty(field: &'static str) -> Self {
        CodecError::EmptyInput { field }
    }

    pub fn unrecognized(field: &'static str, line: impl Into<String>) -> Self {
        CodecError::UnrecognizedField {
            field,
            line: line.into(),
        }
    }

    pub fn missing(field: &'static str, subfield: &'static str) -> Self {
        CodecError::MissingRequiredSubfield { field, subfield }
    }

    pub fn pattern(
        field: &'static str,
        subfield: &'static str,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        CodecError::PatternMismatch {
            field,
            subfield,
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn not_allowed(
        field: &'static str,
        subfield: &'static str,
        value: impl Into<String>,
        allowed: impl Into<String>,
    ) -> Self {
        CodecError::EnumMismatch {
            field,
            subfield,
            value: value.into(),
            allowed: allowed.into(),
        }
    }

    pub fn inconsistent(field: &'static str, rule: impl Into<String>) -> Self {
        CodecError::CrossFieldInconsistency {
            field,
            rule: rule.into(),
        }
    }

    pub fn overflow(
        field: &'static str,
        subfield: &'static str,
        value: impl Into<String>,
        width: &'static str,
    ) -> Self {
        CodecError::NumericOverflow {
            field,
            subfield,
            value: value.into(),
            width,
        }
    }

    pub fn lookup_miss(field: &'static str, code: u16) -> Self {
        CodecError::LookupMiss { field, code }
    }

    pub fn limit(field: &'static str, what: &'static str, actual: usize, limit: usize) -> Self {
        CodecError::LimitExceeded {
            field,
            what,
            actual,
            limit,
        }
    }

    /// Wrap this error as having happened inside `field`.
    pub fn within(self, field: &'static str) -> Self {
        CodecError::Nested {
            field,
            source: Box::new(self),
        }
    }

    /// Kind of the innermost failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::EmptyInput { .. } => ErrorKind::EmptyInput,
            CodecError::UnrecognizedField { .. } => ErrorKind::UnrecognizedField,
            CodecError::MissingRequiredSubfield { .. } => ErrorKind::MissingRequiredSubfield,
            CodecError::PatternMismatch { .. } => ErrorKind::PatternMismatch,
            CodecError::EnumMismatch { .. } => ErrorKind::EnumMismatch,
            CodecError::CrossFieldInconsistency { .. } => ErrorKind::CrossFieldInconsistency,
            CodecError::NumericOverflow { .. } => ErrorKind::NumericOverflow,
            CodecError::LookupMiss { .. } => ErrorKind::LookupMiss,
            CodecError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            CodecError::Nested { source, .. } => source.kind(),
        }
    }

    /// Outermost field name the error is attributed to
    pub fn field(&self) -> &'static str {
        match self {
            CodecError::EmptyInput { field }
            | CodecError::UnrecognizedField { field, .. }
            | CodecError::MissingRequiredSubfield { field, .. }
            | CodecError::PatternMismatch { field, .. }
            | CodecError::EnumMismatch { field, .. }
            | CodecError::CrossFieldInconsistency { field, .. }
            | CodecError::NumericOverflow { field, .. }
            | CodecError::LookupMiss { field, .. }
            | CodecError::LimitExceeded { field, .. }
            | CodecError::Nested { field, .. } => field,
        }
    }

    /// Field names from the outermost wrapper down to the failing component.
    pub fn path(&self) -> Vec<&'static str> {
        let mut path = vec![self.field()];
        let mut current = self;
        while let CodecError::Nested { source, .. } = current {
            path.push(source.field());
            current = source;
        }
        path
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
