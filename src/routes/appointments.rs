//! Stored appointment routes (the "consult appointments" view).
//!
//! GET    /appointments             - List appointments, newest first by default
//! GET    /appointments/{id}         - Retrieve one appointment
//! GET    /appointments/{id}/summary - Plain-data summary for document generation
//! PATCH  /appointments/{id}/status  - Change an appointment's status
//! DELETE /appointments/{id}         - Permanently remove an appointment

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use uuid::Uuid;

use crate::booking::SharedBooking;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, AppointmentRecord, AppointmentSummary, ListOrder, ListQuery, UpdateStatusRequest,
};
use crate::routes::message;
use crate::store::StoreError;

/// Build the appointments router.
pub fn router() -> Router {
    Router::new()
        .route("/appointments", get(list_appointments))
        .route(
            "/appointments/{id}",
            get(get_appointment).delete(delete_appointment),
        )
        .route("/appointments/{id}/summary", get(appointment_summary))
        .route("/appointments/{id}/status", patch(update_status))
}

async fn list_appointments(
    Extension(booking): Extension<SharedBooking>,
    Query(query): Query<ListQuery>,
) -> Json<ApiResponse<Vec<AppointmentRecord>>> {
    let data = match query.order {
        ListOrder::Newest => booking.list_newest_first().await,
        ListOrder::Inserted => booking.list().await,
    };
    let message = message(&booking, &format!("{} appointments", data.len())).await;
    Json(ApiResponse { data, message })
}

async fn get_appointment(
    Extension(booking): Extension<SharedBooking>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentRecord>>, ApiError> {
    let record = booking.get(id).await?;
    Ok(Json(ApiResponse {
        data: record,
        message: "Appointment retrieved".to_string(),
    }))
}

async fn appointment_summary(
    Extension(booking): Extension<SharedBooking>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentSummary>>, ApiError> {
    let summary = booking.summary(id).await?;
    Ok(Json(ApiResponse {
        data: summary,
        message: "Appointment summary".to_string(),
    }))
}

async fn update_status(
    Extension(booking): Extension<SharedBooking>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<AppointmentRecord>>, ApiError> {
    let record = booking.update_status(id, req.status).await?;
    let message = message(&booking, &format!("Status set to {}", record.status.as_str())).await;
    Ok(Json(ApiResponse {
        data: record,
        message,
    }))
}

async fn delete_appointment(
    Extension(booking): Extension<SharedBooking>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if booking.delete(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::NotFound(id).into())
    }
}
