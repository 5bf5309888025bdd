use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use listwise_core::errors::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::warn;

pub fn correlation_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4())
}

/// Interface error rendered as a JSON body with the matching status code.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: &'static str,
    pub correlation_id: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self(InterfaceError::bad_request(message, correlation_id))
    }

    pub fn from_application(error: ApplicationError, correlation_id: impl Into<String>) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> ErrorBody {
        // Only client errors echo their detail back.
        let error = match &self.0 {
            InterfaceError::BadRequest { message, .. } => message.clone(),
            other => other.user_message().to_string(),
        };
        ErrorBody {
            error,
            message: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_string(),
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(
                event_name = "api.request_failed",
                correlation_id = %self.0.correlation_id(),
                error = %self.0,
                "request failed"
            );
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use listwise_core::errors::{ApplicationError, DomainError};

    use super::ApiError;

    #[test]
    fn domain_errors_map_to_bad_request_with_detail() {
        let error = ApiError::from_application(
            ApplicationError::Domain(DomainError::EmptyListCommand {
                action: "add_item".to_string(),
            }),
            "req-1",
        );

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        let body = error.body();
        assert!(body.error.contains("add_item"));
        assert_eq!(body.correlation_id, "req-1");
    }

    #[test]
    fn persistence_errors_hide_internal_detail() {
        let error = ApiError::from_application(
            ApplicationError::Persistence("disk full at /var/data".to_string()),
            "req-2",
        );

        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!error.body().error.contains("/var/data"));
    }

    #[test]
    fn every_application_error_has_a_request_status() {
        let errors = [
            ApplicationError::Domain(DomainError::EmptyListCommand {
                action: "new_list".to_string(),
            }),
            ApplicationError::Persistence("rename failed".to_string()),
        ];

        for error in errors {
            let expected = match &error {
                ApplicationError::Domain(_) => StatusCode::BAD_REQUEST,
                ApplicationError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            assert_eq!(ApiError::from_application(error, "req-3").status(), expected);
        }
    }
}
