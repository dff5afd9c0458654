//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain constructors validate names and passwords; these helpers cover the
//! transport-level checks (absent body fields, blank query parameters,
//! non-positive ids) and attach `{field, code}` details for clients.

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: i64) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

/// `missing_field` error carrying a caller-facing message.
pub(crate) fn missing_field_error(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::MissingField)
}

/// Unwrap a required value or report it as missing.
pub(crate) fn required<T>(
    value: Option<T>,
    field: FieldName,
    message: &str,
) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field, message))
}

/// Require a non-blank text value, returning it trimmed.
pub(crate) fn required_text(
    value: Option<&str>,
    field: FieldName,
    message: &str,
) -> Result<String, Error> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| missing_field_error(field, message))
}

/// Reject ids that cannot name a row.
pub(crate) fn positive_id<Id: From<i32>>(value: i32, field: FieldName) -> Result<Id, Error> {
    if value > 0 {
        Ok(Id::from(value))
    } else {
        let name = field.as_str();
        Err(
            ValidationError::new(name, format!("{name} must be a positive integer"))
                .with_value(ErrorCode::InvalidId, i64::from(value)),
        )
    }
}

/// Validate an optional list of ids.
pub(crate) fn id_list<Id: From<i32>>(
    values: Option<Vec<i32>>,
    field: FieldName,
) -> Result<Option<Vec<Id>>, Error> {
    values
        .map(|ids| ids.into_iter().map(|id| positive_id(id, field)).collect())
        .transpose()
}
