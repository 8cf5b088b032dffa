//! HTTP error mapping.
//!
//! Every failure surfaces as `{success: false, message, errors?}`. Internal
//! errors are logged with their cause but reported with a generic message
//! unless `EXPOSE_ERROR_DETAIL=true` (development only).

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

use dossier_core::ValidationErrors;

/// Whether internal error text is included in responses.
///
/// Read once from `EXPOSE_ERROR_DETAIL`; defaults to off.
fn expose_error_detail() -> bool {
    static EXPOSE: OnceLock<bool> = OnceLock::new();
    *EXPOSE.get_or_init(|| {
        std::env::var("EXPOSE_ERROR_DETAIL")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    })
}

#[derive(Debug)]
pub enum ApiError {
    Internal(dossier_core::Error),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<dossier_core::Error> for ApiError {
    fn from(err: dossier_core::Error) -> Self {
        use dossier_core::Error;
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::DocumentNotFound(id) => ApiError::NotFound(format!("document {id}")),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, errors) = match self {
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    error = %err,
                    "Request failed with internal error"
                );
                let message = if expose_error_detail() {
                    err.to_string()
                } else {
                    "Internal server error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors.0),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {msg}"), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
        };

        let mut body = serde_json::json!({
            "success": false,
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = serde_json::json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = dossier_core::Error::DocumentNotFound("doc-1".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = dossier_core::Error::Conflict("busy".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = dossier_core::Error::Search("boom".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_validation_mapping_carries_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("limit", "must be between 1 and 100");
        let err: ApiError = dossier_core::Error::Validation(errors).into();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.0[0].field, "limit"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
