/// HTTP error mapping
///
/// Handlers return [`ApiResult`]; `?` on a storage, webhook or validation
/// error lands here and is rendered as a JSON `ErrorResponse`.
///
/// | Source                                  | Status |
/// |-----------------------------------------|--------|
/// | `DbError::UniqueConstraintViolation`    | 409    |
/// | `DbError::ForeignKeyViolation`          | 422    |
/// | `DbError::NotFound`                     | 404    |
/// | request validation                      | 422    |
/// | `WebhookError::Transport`               | 502    |
/// | `WebhookError::NotConfigured`           | 503    |
/// | any other storage failure               | 500    |
///
/// # Example
///
/// ```
/// use daybook_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("no such playlist".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use daybook_shared::error::DbError;
use daybook_shared::webhook::WebhookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationErrors};

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), a unique column already holds the value
    Conflict(String),

    /// Unprocessable entity (422), a referenced parent row does not exist
    InvalidReference(String),

    /// Unprocessable entity (422), one entry per failed field
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Bad gateway (502), an upstream call failed
    BadGateway(String),

    /// Service unavailable (503), a collaborator is not configured
    ServiceUnavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// JSON body of every error answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code such as `not_found` or `invalid_reference`
    pub error: String,

    pub message: String,

    /// Present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::InvalidReference(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_reference",
                msg,
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Storage details stay in the log
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Something went wrong on our side".to_string(),
                    None,
                )
            }
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg, None),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueConstraintViolation { column } => {
                ApiError::Conflict(format!("{} already exists", column))
            }
            DbError::ForeignKeyViolation(_) => {
                ApiError::InvalidReference("Referenced record does not exist".to_string())
            }
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {} not found", entity, id))
            }
            DbError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            WebhookError::Transport(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(details)
    }
}

/// Runs the derived validation rules of a request body
pub fn validate<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(ApiError::from)
}
