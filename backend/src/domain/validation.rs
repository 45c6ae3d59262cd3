//! Collected field violations for up-front payload validation.
//!
//! Validators push every problem they find instead of stopping at the first
//! one, then convert the collection into a single [`Error`] whose details
//! list each violation.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// Whether a violation is a plain validation failure or a forbidden
/// operation such as repeating an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The value is malformed or out of range.
    Invalid,
    /// The value is well formed but the combination is not allowed.
    Operation,
}

/// One problem with one field of a submitted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Stable machine-readable violation code.
    pub code: &'static str,
    /// Human-readable explanation.
    pub message: String,
    /// Position within a list field, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip)]
    pub kind: ViolationKind,
}

impl FieldViolation {
    /// Build a validation failure for `field`.
    pub fn invalid(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
            index: None,
            kind: ViolationKind::Invalid,
        }
    }

    /// Build a forbidden-operation failure for `field`.
    pub fn operation(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Operation,
            ..Self::invalid(field, code, message)
        }
    }

    /// Attach the list position of the offending entry.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Ordered collection of violations found in one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// Start an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Record the error of a fallible check, returning its success value.
    pub fn check<T>(&mut self, result: Result<T, FieldViolation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.push(violation);
                None
            }
        }
    }

    /// Whether no violation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded violations in discovery order.
    pub fn as_slice(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Convert the violations into a domain error.
    ///
    /// The error code is [`ErrorCode::InvalidOperation`](super::ErrorCode)
    /// when any violation is a forbidden operation, otherwise
    /// [`ErrorCode::InvalidRequest`](super::ErrorCode).
    pub fn into_error(self) -> Error {
        let message = match self.0.as_slice() {
            [single] => single.message.clone(),
            many => format!("{} validation errors", many.len()),
        };
        let message = if message.trim().is_empty() {
            "validation failed".to_owned()
        } else {
            message
        };
        let is_operation = self
            .0
            .iter()
            .any(|violation| violation.kind == ViolationKind::Operation);
        let error = if is_operation {
            Error::invalid_operation(message)
        } else {
            Error::invalid_request(message)
        };
        error.with_details(json!({ "violations": self.0 }))
    }

    /// Return `value` when nothing was recorded, otherwise the combined error.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Error> {
        if !self.is_empty() {
            return Err(self.into_error());
        }
        value().ok_or_else(|| Error::internal("validated payload is incomplete"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn single_violation_uses_its_message() {
        let mut violations = Violations::new();
        violations.push(FieldViolation::invalid("name", "too_long", "name is too long"));

        let error = violations.into_error();
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "name is too long");
        assert_eq!(
            error.details(),
            Some(&json!({"violations": [
                {"field": "name", "code": "too_long", "message": "name is too long"}
            ]}))
        );
    }

    #[rstest]
    fn any_operation_violation_upgrades_the_code() {
        let mut violations = Violations::new();
        violations.push(FieldViolation::invalid("cookingTime", "out_of_range", "bad time"));
        violations.push(
            FieldViolation::operation("ingredients", "duplicate_id", "repeated ingredient").at(2),
        );

        let error = violations.into_error();
        assert_eq!(error.code(), ErrorCode::InvalidOperation);
        assert_eq!(error.message(), "2 validation errors");
        let listed = error
            .details()
            .and_then(|details| details.get("violations"))
            .and_then(serde_json::Value::as_array)
            .expect("violations listed");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].get("index"), Some(&json!(2)));
    }

    #[rstest]
    fn finish_returns_value_when_clean() {
        let violations = Violations::new();
        assert_eq!(violations.finish(|| Some(7)).expect("clean payload"), 7);
    }
}
