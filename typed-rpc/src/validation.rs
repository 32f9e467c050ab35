//! Input/Output Validation Framework
//!
//! Procedures declare their contracts as Rust types. Deserialization checks
//! the structure; the [`Validate`] trait checks everything serde cannot
//! express (non-empty strings, email format, ranges).
//!
//! # Example
//!
//! ```rust,ignore
//! use typed_rpc::validation::{Validate, ValidationResult, ValidationRules};
//!
//! #[derive(Debug, serde::Deserialize)]
//! struct CreateUserInput {
//!     name: String,
//!     email: String,
//! }
//!
//! impl Validate for CreateUserInput {
//!     fn validate(&self) -> ValidationResult {
//!         ValidationRules::new()
//!             .required("name", &self.name)
//!             .max_length("name", &self.name, 100)
//!             .email("email", &self.email)
//!             .build()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::{RouterOutput, RpcConfig, RpcError, types::NoInput};

/// Validation error for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Error code identifying the type of validation failure
    pub code: String,
}

impl FieldError {
    /// Create a new field error
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// Create a "required" field error
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(&field, format!("{} can not be empty.", field), "required")
    }

    /// Create a "max_length" field error
    pub fn max_length(field: impl Into<String>, max: usize) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be at most {} characters.", field, max),
            "max_length",
        )
    }

    /// Create a "range" field error
    pub fn range(field: impl Into<String>, min: i64, max: i64) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be between {} and {}.", field, min, max),
            "range",
        )
    }

    /// Create a "pattern" field error
    pub fn pattern(field: impl Into<String>, pattern: &str) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must match pattern: {}", field, pattern),
            "pattern",
        )
    }

    /// Create an "email" field error
    pub fn email(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            &field,
            format!("{} must be of a valid email format.", field),
            "email",
        )
    }

    /// Create a custom field error
    pub fn custom(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, "custom")
    }

    /// Prefix the field name, e.g. `id` -> `data.id`.
    pub fn nested(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

/// Result of validating a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the value is valid
    pub valid: bool,
    /// List of field-level errors (empty if valid)
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Create a validation result from a list of errors.
    /// If the list is empty, the result is valid.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            trace!("Validation passed (no errors)");
        } else {
            let field_names: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            debug!(
                error_count = errors.len(),
                fields = ?field_names,
                "Validation failed"
            );
        }
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Get the errors
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Convert to a map of field -> errors for easier lookup
    pub fn errors_by_field(&self) -> HashMap<String, Vec<&FieldError>> {
        let mut map: HashMap<String, Vec<&FieldError>> = HashMap::new();
        for error in &self.errors {
            map.entry(error.field.clone()).or_default().push(error);
        }
        map
    }

    /// Merge another validation result into this one
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
        self
    }

    /// Prefix every field name with `parent`.
    pub fn nested(self, parent: &str) -> Self {
        Self {
            valid: self.valid,
            errors: self.errors.into_iter().map(|e| e.nested(parent)).collect(),
        }
    }

    /// Turn a failed result into `err`, attaching the field errors as details.
    pub fn into_result(self, err: RpcError) -> Result<(), RpcError> {
        if self.valid {
            Ok(())
        } else {
            Err(err.with_details(self.errors))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Trait for validatable contract types.
///
/// Implement this on input and output structs; procedures run it after
/// deserialization and before the value reaches the handler or the caller.
pub trait Validate {
    /// Validate the value and return a result with any errors
    fn validate(&self) -> ValidationResult;
}

impl Validate for () {
    fn validate(&self) -> ValidationResult {
        ValidationResult::ok()
    }
}

impl Validate for String {
    fn validate(&self) -> ValidationResult {
        ValidationResult::ok()
    }
}

impl Validate for NoInput {
    fn validate(&self) -> ValidationResult {
        ValidationResult::ok()
    }
}

impl Validate for serde_json::Value {
    fn validate(&self) -> ValidationResult {
        ValidationResult::ok()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> ValidationResult {
        match self {
            Some(value) => value.validate(),
            None => ValidationResult::ok(),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> ValidationResult {
        self.iter()
            .enumerate()
            .fold(ValidationResult::ok(), |acc, (i, item)| {
                acc.merge(item.validate().nested(&i.to_string()))
            })
    }
}

/// Validates the base output shape, then the payload under `data`.
impl<T: Validate> Validate for RouterOutput<T> {
    fn validate(&self) -> ValidationResult {
        let mut rules = ValidationRules::new().range("status", self.status as i64, 100, 599);
        if let Some(message) = &self.message {
            rules = rules.required("message", message);
        }
        let base = rules.build();
        match &self.data {
            Some(data) => base.merge(data.validate().nested("data")),
            None => base,
        }
    }
}

/// Builder for validation rules.
///
/// # Example
///
/// ```rust,ignore
/// let result = ValidationRules::new()
///     .required("id", &input.id)
///     .email("email", &input.email)
///     .pattern("phone", &input.phone, r"^\+?[0-9]{10,15}$")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ValidationRules {
    errors: Vec<FieldError>,
}

impl ValidationRules {
    /// Create a new validation rules builder
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a custom error
    pub fn add_error(mut self, error: FieldError) -> Self {
        trace!(field = %error.field, code = %error.code, "Adding custom validation error");
        self.errors.push(error);
        self
    }

    /// Validate that a string field is not empty (required)
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.is_empty() {
            trace!(field = %field, "Required field is empty");
            self.errors.push(FieldError::required(field));
        }
        self
    }

    /// Validate maximum string length
    pub fn max_length(mut self, field: &str, value: &str, max: usize) -> Self {
        if value.chars().count() > max {
            trace!(field = %field, length = value.len(), max = max, "Field exceeds maximum length");
            self.errors.push(FieldError::max_length(field, max));
        }
        self
    }

    /// Validate that a number is within a range (inclusive)
    pub fn range(mut self, field: &str, value: i64, min: i64, max: i64) -> Self {
        if value < min || value > max {
            trace!(field = %field, value = value, min = min, max = max, "Field outside valid range");
            self.errors.push(FieldError::range(field, min, max));
        }
        self
    }

    /// Validate that a string matches a regex pattern
    pub fn pattern(mut self, field: &str, value: &str, pattern: &str) -> Self {
        match regex::Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    trace!(field = %field, pattern = %pattern, "Field does not match pattern");
                    self.errors.push(FieldError::pattern(field, pattern));
                }
            }
            Err(e) => {
                warn!(field = %field, pattern = %pattern, error = %e, "Invalid validation regex pattern");
                self.errors.push(FieldError::new(
                    field,
                    format!("Invalid validation pattern: {}", pattern),
                    "invalid_pattern",
                ));
            }
        }
        self
    }

    /// Validate that a string is a valid email address
    pub fn email(mut self, field: &str, value: &str) -> Self {
        let is_valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if !is_valid {
            trace!(field = %field, "Invalid email format");
            self.errors.push(FieldError::email(field));
        }
        self
    }

    /// Add a custom validation with a predicate
    pub fn custom<F>(mut self, field: &str, predicate: F, message: &str) -> Self
    where
        F: FnOnce() -> bool,
    {
        if !predicate() {
            trace!(field = %field, message = %message, "Custom validation failed");
            self.errors.push(FieldError::custom(field, message));
        }
        self
    }

    /// Build the validation result
    pub fn build(self) -> ValidationResult {
        ValidationResult::from_errors(self.errors)
    }
}

// =============================================================================
// Transport-level validation
// =============================================================================

/// Validate the characters of an endpoint path.
///
/// Segments are separated by `.` or `/` and may contain ASCII alphanumerics,
/// `_` and `-`. Empty segments and single-segment paths are rejected; the
/// registry walk decides whether the segments actually exist.
///
/// # Errors
///
/// Returns `RpcError::bad_endpoint` if the path is malformed.
pub fn validate_path(path: &str) -> Result<(), RpcError> {
    let segments: Vec<&str> = path.split(['.', '/']).collect();

    if segments.len() < 2 {
        return Err(RpcError::bad_endpoint()
            .with_cause(format!("path '{}' needs a router and a procedure", path)));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(
            RpcError::bad_endpoint().with_cause(format!("path '{}' has an empty segment", path))
        );
    }
    if let Some(invalid_char) = path
        .chars()
        .find(|&ch| !is_segment_char(ch) && !matches!(ch, '.' | '/'))
    {
        return Err(RpcError::bad_endpoint().with_cause(format!(
            "path '{}' contains invalid character '{}'",
            path, invalid_char
        )));
    }

    Ok(())
}

/// Validate a single registry name (one path segment).
///
/// Names may not be empty and may only contain ASCII alphanumerics, `_`
/// and `-`; separators would make the entry unreachable by path.
///
/// # Errors
///
/// Returns `RpcError::bad_endpoint` if the name is not a valid segment.
pub fn validate_segment(name: &str) -> Result<(), RpcError> {
    if name.is_empty() {
        return Err(RpcError::bad_endpoint().with_cause("name is empty"));
    }
    if let Some(invalid_char) = name.chars().find(|&ch| !is_segment_char(ch)) {
        return Err(RpcError::bad_endpoint().with_cause(format!(
            "name '{}' contains invalid character '{}'",
            name, invalid_char
        )));
    }
    Ok(())
}

fn is_segment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-')
}

/// Validate a request body size against configuration limit.
///
/// # Errors
///
/// Returns `RpcError::payload_too_large` if the body exceeds the configured maximum size.
pub fn validate_input_size(size: usize, config: &RpcConfig) -> Result<(), RpcError> {
    if size > config.max_input_size {
        return Err(RpcError::payload_too_large(format!(
            "Input size {} bytes exceeds maximum {} bytes",
            size, config.max_input_size
        )));
    }
    Ok(())
}
