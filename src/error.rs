//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::FieldIssue;
use crate::store::StoreError;
use crate::wizard::{Step, WizardError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, step, issues) = match self {
            ApiError::Wizard(WizardError::StepInvalid { step, issues }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "STEP_INCOMPLETE",
                Some(step),
                issues,
            ),
            ApiError::Wizard(WizardError::AtFirstStep)
            | ApiError::Wizard(WizardError::AtLastStep)
            | ApiError::Wizard(WizardError::NotAtFinalStep(_)) => {
                (StatusCode::CONFLICT, "STEP_OUT_OF_RANGE", None, Vec::new())
            }
            ApiError::Wizard(WizardError::Submitting) => {
                (StatusCode::CONFLICT, "SUBMITTING", None, Vec::new())
            }
            ApiError::Wizard(WizardError::Completed) => {
                (StatusCode::CONFLICT, "COMPLETED", None, Vec::new())
            }
            ApiError::Wizard(WizardError::Interrupted) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SUBMIT_INTERRUPTED",
                None,
                Vec::new(),
            ),
            ApiError::Store(StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", None, Vec::new())
            }
            // Reserved: store mutations downgrade write failures to warnings,
            // so no current route returns this variant.
            ApiError::Store(StoreError::PersistenceUnavailable(ref detail)) => {
                tracing::error!(detail = %detail, "Appointment storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    None,
                    Vec::new(),
                )
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", None, Vec::new()),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                step,
                issues,
            },
        };
        (status, Json(body)).into_response()
    }
}
