//! # Veterinary Booking Service Library
//!
//! Exposes the Axum router and modules so integration tests can create
//! an in-process server without requiring `cargo run` in another terminal.

pub mod booking;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod wizard;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::booking::SharedBooking;

/// Build the Axum router with all route modules and middleware.
///
/// The caller is responsible for opening the appointment store and wiring it
/// into the booking service. This function does NOT start a server.
pub fn create_app(booking: SharedBooking) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::wizard::router())
        .merge(routes::appointments::router())
        .layer(Extension(booking))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
