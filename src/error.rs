// Business error surface for the tenancy core
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::database::DelegateError;

/// Closed set of business codes raised by the tenancy core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessCode {
    // 401: tenant context was never initialized for this request
    Unauthorized,

    // 403: repository-embedded ownership check
    Forbidden,

    // 403: explicit TenantContext::verify_resource_ownership
    InsufficientPermissions,

    // 404: missing, or owned by another tenant (deliberately indistinguishable)
    ResourceNotFound,

    // 500: the persistence delegate failed
    InternalError,
}

impl BusinessCode {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            BusinessCode::Unauthorized => 401,
            BusinessCode::Forbidden => 403,
            BusinessCode::InsufficientPermissions => 403,
            BusinessCode::ResourceNotFound => 404,
            BusinessCode::InternalError => 500,
        }
    }

    /// Get error code for client handling
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCode::Unauthorized => "UNAUTHORIZED",
            BusinessCode::Forbidden => "FORBIDDEN",
            BusinessCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            BusinessCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            BusinessCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for BusinessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single exception type exposed by the core: a business code plus a
/// client-safe message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BusinessError {
    pub code: BusinessCode,
    pub message: String,
}

impl BusinessError {
    pub fn new(code: BusinessCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(BusinessCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(BusinessCode::Forbidden, message)
    }

    pub fn insufficient_permissions(message: impl Into<String>) -> Self {
        Self::new(BusinessCode::InsufficientPermissions, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BusinessCode::ResourceNotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BusinessCode::InternalError, message)
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        self.code.as_str()
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.message,
            }
        })
    }
}

// Storage failures never leak their details to clients
impl From<DelegateError> for BusinessError {
    fn from(err: DelegateError) -> Self {
        match err {
            DelegateError::RecordNotFound { model, id } => {
                tracing::warn!("Delegate reported missing {} record {}", model, id);
                BusinessError::not_found(format!("{} does not exist or is not accessible", model))
            }
            other => {
                tracing::error!("Persistence delegate error: {}", other);
                BusinessError::internal("An error occurred while processing your request")
            }
        }
    }
}

/// Marker placed in response extensions so the tenant boundary can observe
/// that a handler failed without re-parsing the body.
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub code: BusinessCode,
    pub message: String,
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for BusinessError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_json())).into_response();
        response.extensions_mut().insert(FailureReport {
            code: self.code,
            message: self.message,
        });
        response
    }
}
