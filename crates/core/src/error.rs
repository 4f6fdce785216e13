use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::types::DbId;

/// One entry of a field-level validation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// camelCase path of the offending field (`generationSettings.creativityLevel`).
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Schema violations with a per-field breakdown.
    #[error("Validation failed on {} field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The generation capability is unconfigured or unreachable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build an [`CoreError::InvalidFields`] from a single field failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidFields(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::InvalidFields(flatten_validation_errors(&errors))
    }
}

/// Flatten nested `validator` errors into a sorted, camelCase field list.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &camel_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{path} is invalid ({})", err.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// `pain_points` -> `painPoints`.
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "age is required"))]
        age: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(max = 3, message = "too long"))]
        short_name: String,
        #[validate(nested)]
        demographics: Inner,
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("pain_points"), "painPoints");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("generation_settings"), "generationSettings");
    }

    #[test]
    fn nested_errors_are_flattened_with_paths() {
        let outer = Outer {
            short_name: "toolong".into(),
            demographics: Inner { age: String::new() },
        };
        let err: CoreError = outer.validate().unwrap_err().into();
        match err {
            CoreError::InvalidFields(fields) => {
                assert_eq!(
                    fields,
                    vec![
                        FieldError::new("demographics.age", "age is required"),
                        FieldError::new("shortName", "too long"),
                    ]
                );
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[test]
    fn invalid_fields_display_counts_entries() {
        let err = CoreError::InvalidFields(vec![
            FieldError::new("a", "x"),
            FieldError::new("b", "y"),
        ]);
        assert_eq!(err.to_string(), "Validation failed on 2 field(s)");
    }
}
