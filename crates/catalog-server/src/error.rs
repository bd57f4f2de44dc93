//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`catalog_core::Error`] so that route
//! handlers can return `Result<T, AppError>`. Handlers wrap errors with
//! [`AppError::for_request`] so the body names the failed request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::service::RequestContext;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: catalog_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: catalog_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Wrap `inner` and tag it with the id of the request that failed.
    pub fn for_request(inner: catalog_core::Error, rc: &RequestContext) -> Self {
        Self::new(inner).with_request_id(rc.request_id.clone())
    }
}

/// Machine-readable code for each error variant.
fn error_code(err: &catalog_core::Error) -> &'static str {
    use catalog_core::Error;
    match err {
        Error::NotFound { .. } => "not_found",
        Error::Validation(_) | Error::InvalidFields(_) => "validation_error",
        Error::TooLarge(_) => "payload_too_large",
        Error::Image(_) => "image_error",
        Error::Database { .. } => "database_error",
        Error::Io { .. } => "io_error",
        Error::Internal(_) => "internal_error",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                "Server error in API handler"
            );
        }

        let mut body = json!({
            "error": self.inner.to_string(),
            "code": error_code(&self.inner),
            "request_id": self.request_id,
        });

        if let catalog_core::Error::InvalidFields(fields) = &self.inner {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}
