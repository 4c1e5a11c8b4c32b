//! HTTP route modules for the booking service.
//!
//! - `wizard`: the step-gated booking form
//! - `appointments`: listing, detail, status changes and deletion of stored bookings
//! - `health`: liveness probe

pub mod appointments;
pub mod health;
pub mod wizard;

use crate::booking::BookingService;

/// Response message, extended with any pending storage warning.
pub(crate) async fn message(booking: &BookingService, text: &str) -> String {
    match booking.persistence_warning().await {
        Some(warning) => format!("{text} (warning: {warning})"),
        None => text.to_string(),
    }
}
