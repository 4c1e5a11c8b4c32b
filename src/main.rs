//! # Veterinary Booking Service
//!
//! Local HTTP backend for the clinic's appointment form: a five-step booking
//! wizard and the "consult appointments" listing built on the same store.
//!
//! ## Architecture
//!
//! - Axum handles HTTP routing and request/response lifecycle
//! - The booking wizard gates each step on the fields it needs
//! - Submitted bookings are kept as a JSON collection in a single storage
//!   slot, backed by SQLite through SQLx (or process memory)

use std::sync::Arc;

use tracing::info;

use vet_booking::booking::BookingService;
use vet_booking::clock::SystemClock;
use vet_booking::config::{AppConfig, StorageBackend};
use vet_booking::db::{self, MemorySlotStore, SlotStore, SqliteSlotStore};
use vet_booking::store::AppointmentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vet_booking=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting veterinary booking service");

    let slots: Arc<dyn SlotStore> = match &config.storage {
        StorageBackend::Sqlite(url) => {
            let pool = db::connect(url).await?;
            info!("Connected to appointment database, migrations complete");
            Arc::new(SqliteSlotStore::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory appointment storage");
            Arc::new(MemorySlotStore::new())
        }
    };

    let store = AppointmentStore::open(slots, config.appointments_slot.clone()).await;
    let booking = Arc::new(BookingService::new(
        store,
        Arc::new(SystemClock),
        config.submit_delay,
    ));

    let app = vet_booking::create_app(booking);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
