//! Booking wizard routes.
//!
//! GET   /wizard          - Current step, draft, per-step validity and guidance
//! PATCH /wizard/draft    - Edit draft fields
//! POST  /wizard/advance  - Move to the next step (current step must validate)
//! POST  /wizard/retreat  - Move to the previous step
//! POST  /wizard/jump     - Jump to a step (every earlier step must validate)
//! POST  /wizard/submit   - Store the booking as a new appointment
//! POST  /wizard/reset    - Discard the draft and start over

use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use tracing::info;

use crate::booking::SharedBooking;
use crate::error::ApiError;
use crate::models::{ApiResponse, AppointmentRecord, DraftPatch, JumpRequest};
use crate::routes::message;
use crate::wizard::{Step, WizardView};

type ViewResult = Result<Json<ApiResponse<WizardView>>, ApiError>;

/// Build the wizard router.
pub fn router() -> Router {
    Router::new()
        .route("/wizard", get(show))
        .route("/wizard/draft", patch(edit_draft))
        .route("/wizard/advance", post(advance))
        .route("/wizard/retreat", post(retreat))
        .route("/wizard/jump", post(jump))
        .route("/wizard/submit", post(submit))
        .route("/wizard/reset", post(reset))
}

fn view(data: WizardView, message: &str) -> ViewResult {
    Ok(Json(ApiResponse {
        data,
        message: message.to_string(),
    }))
}

async fn show(Extension(booking): Extension<SharedBooking>) -> ViewResult {
    view(booking.view().await, "Wizard state")
}

async fn edit_draft(
    Extension(booking): Extension<SharedBooking>,
    Json(patch): Json<DraftPatch>,
) -> ViewResult {
    view(booking.edit(patch).await?, "Draft updated")
}

async fn advance(Extension(booking): Extension<SharedBooking>) -> ViewResult {
    view(booking.advance().await?, "Moved to next step")
}

async fn retreat(Extension(booking): Extension<SharedBooking>) -> ViewResult {
    view(booking.retreat().await?, "Moved to previous step")
}

async fn jump(
    Extension(booking): Extension<SharedBooking>,
    Json(req): Json<JumpRequest>,
) -> ViewResult {
    let step = Step::from_number(req.step)
        .ok_or_else(|| ApiError::BadRequest(format!("step must be between 1 and 5, got {}", req.step)))?;
    view(booking.jump_to(step).await?, "Moved to requested step")
}

/// Finalize the draft. Responds once the record is stored.
async fn submit(
    Extension(booking): Extension<SharedBooking>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentRecord>>), ApiError> {
    let record = booking.submit().await?;
    info!("Booking {} submitted for {}", record.id, record.details.pet_name);

    let message = message(&booking, "Appointment booked").await;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: record,
            message,
        }),
    ))
}

async fn reset(Extension(booking): Extension<SharedBooking>) -> ViewResult {
    view(booking.reset().await?, "Wizard reset")
}
