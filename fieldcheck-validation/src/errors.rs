// Validation failures and engine errors

use crate::Value;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// A single violated constraint on a single field.
///
/// Serializes with the field names API clients already expect:
/// `{"FailedField": "email", "Tag": "email", "Value": "nope", "Error": true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "FailedField")]
    field: String,

    #[serde(rename = "Tag")]
    tag: String,

    #[serde(rename = "Value")]
    value: Value,

    #[serde(rename = "Error")]
    error: bool,
}

impl FieldError {
    /// Build a field error. The field name is lowercased.
    pub(crate) fn new(field: &str, tag: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.to_lowercase(),
            tag: tag.into(),
            value,
            error: true,
        }
    }

    /// Lowercased name of the failed field
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Constraint tag that was violated
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Field value at validation time
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Always `true`; kept for payload compatibility.
    pub fn is_error(&self) -> bool {
        self.error
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: failed on the '{}' constraint", self.field, self.tag)
    }
}

/// Ordered collection of field errors produced by one validation call.
///
/// Empty means every declared constraint was satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get errors for a specific (lowercased) field
    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        let field = field.to_lowercase();
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Whether a given field failed on a given tag
    pub fn contains(&self, field: &str, tag: &str) -> bool {
        self.for_field(field).iter().any(|e| e.tag == tag)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.errors).unwrap_or(serde_json::Value::Null)
    }
}

impl Deref for FieldErrors {
    type Target = [FieldError];

    fn deref(&self) -> &Self::Target {
        &self.errors
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// The engine could not run the declared constraints at all.
///
/// Distinct from a failed validation: these point at a broken record
/// declaration, a bad registration or bad configuration.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A rule names a constraint that is not registered.
    #[error("{record}.{field}: unknown constraint '{tag}'")]
    UnknownConstraint {
        record: &'static str,
        field: &'static str,
        tag: String,
    },

    /// A constraint that needs a parameter was declared without one.
    #[error("{record}.{field}: constraint '{tag}' requires a parameter")]
    MissingParameter {
        record: &'static str,
        field: &'static str,
        tag: String,
    },

    /// A constraint that takes no parameter was given one.
    #[error("{record}.{field}: constraint '{tag}' does not take a parameter")]
    UnexpectedParameter {
        record: &'static str,
        field: &'static str,
        tag: String,
    },

    /// A constraint parameter could not be parsed.
    #[error("{record}.{field}: invalid parameter '{param}' for '{tag}': {reason}")]
    InvalidParameter {
        record: &'static str,
        field: &'static str,
        tag: String,
        param: String,
        reason: String,
    },

    /// The rule string itself is malformed.
    #[error("{record}.{field}: invalid rule '{rule}': {reason}")]
    InvalidRule {
        record: &'static str,
        field: &'static str,
        rule: String,
        reason: String,
    },

    /// A constraint was applied to a value kind it cannot check.
    #[error("{record}.{field}: constraint '{tag}' cannot be applied to a {kind} value")]
    UnsupportedKind {
        record: &'static str,
        field: &'static str,
        tag: String,
        kind: &'static str,
    },

    /// The record produced a different number of values than it declares.
    #[error("{record}: declares {declared} fields but produced {produced} values")]
    FieldCountMismatch {
        record: &'static str,
        declared: usize,
        produced: usize,
    },

    /// A custom constraint could not be registered.
    #[error("Registration error: {0}")]
    Registration(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ValidatorError {
    /// Check if this error comes from a record's declared rules.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Self::UnknownConstraint { .. }
                | Self::MissingParameter { .. }
                | Self::UnexpectedParameter { .. }
                | Self::InvalidParameter { .. }
                | Self::InvalidRule { .. }
        )
    }
}
