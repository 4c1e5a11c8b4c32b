//! Booking service.
//!
//! Ties the wizard, the appointment store and the clock together behind one
//! shared handle. The HTTP routes only ever talk to this type.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::{AppointmentRecord, AppointmentStatus, AppointmentSummary, DraftPatch};
use crate::store::{AppointmentStore, StoreError};
use crate::wizard::{Step, WizardController, WizardError, WizardView};

/// Shared handle injected into the router.
pub type SharedBooking = Arc<BookingService>;

pub struct BookingService {
    wizard: Mutex<WizardController>,
    store: Mutex<AppointmentStore>,
    clock: Arc<dyn Clock>,
    submit_delay: Duration,
}

impl BookingService {
    pub fn new(store: AppointmentStore, clock: Arc<dyn Clock>, submit_delay: Duration) -> Self {
        Self {
            wizard: Mutex::new(WizardController::new()),
            store: Mutex::new(store),
            clock,
            submit_delay,
        }
    }

    // ------------------------------------------------------------------------
    // Wizard
    // ------------------------------------------------------------------------

    pub async fn view(&self) -> WizardView {
        self.wizard.lock().await.view(self.clock.local_now())
    }

    pub async fn edit(&self, patch: DraftPatch) -> Result<WizardView, WizardError> {
        let mut wizard = self.wizard.lock().await;
        wizard.edit(patch)?;
        Ok(wizard.view(self.clock.local_now()))
    }

    pub async fn advance(&self) -> Result<WizardView, WizardError> {
        let now = self.clock.local_now();
        let mut wizard = self.wizard.lock().await;
        let step = wizard.advance(now)?;
        debug!("Wizard advanced to {}", step);
        Ok(wizard.view(now))
    }

    pub async fn retreat(&self) -> Result<WizardView, WizardError> {
        let mut wizard = self.wizard.lock().await;
        let step = wizard.retreat()?;
        debug!("Wizard moved back to {}", step);
        Ok(wizard.view(self.clock.local_now()))
    }

    pub async fn jump_to(&self, step: Step) -> Result<WizardView, WizardError> {
        let now = self.clock.local_now();
        let mut wizard = self.wizard.lock().await;
        wizard.jump_to(step, now)?;
        debug!("Wizard jumped to {}", step);
        Ok(wizard.view(now))
    }

    pub async fn reset(&self) -> Result<WizardView, WizardError> {
        let mut wizard = self.wizard.lock().await;
        wizard.reset()?;
        Ok(wizard.view(self.clock.local_now()))
    }

    /// Finalize the draft and store it as a new appointment.
    ///
    /// The wizard lock is released during the artificial delay so that other
    /// calls see the `Submitting` phase and get refused instead of queueing.
    /// The delay and the store write run on their own task, so a caller that
    /// goes away mid-submission still leaves the wizard `Completed`.
    pub async fn submit(self: &Arc<Self>) -> Result<AppointmentRecord, WizardError> {
        let details = self
            .wizard
            .lock()
            .await
            .begin_submit(self.clock.local_now())?;

        info!("Submitting booking for {}", details.pet_name);
        let service = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(service.submit_delay).await;

            let record = service
                .store
                .lock()
                .await
                .create(details, service.clock.now_utc())
                .await;
            service.wizard.lock().await.complete(record.id);
            record
        });

        match task.await {
            Ok(record) => Ok(record),
            Err(e) => {
                error!("Booking submission task failed: {}", e);
                self.wizard.lock().await.abort_submit();
                Err(WizardError::Interrupted)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------------

    pub async fn list(&self) -> Vec<AppointmentRecord> {
        self.store.lock().await.list().to_vec()
    }

    pub async fn list_newest_first(&self) -> Vec<AppointmentRecord> {
        self.store.lock().await.list_newest_first()
    }

    pub async fn get(&self, id: Uuid) -> Result<AppointmentRecord, StoreError> {
        self.store
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn summary(&self, id: Uuid) -> Result<AppointmentSummary, StoreError> {
        let store = self.store.lock().await;
        store
            .get(id)
            .map(AppointmentSummary::from)
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, StoreError> {
        self.store.lock().await.update_status(id, status).await
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        self.store.lock().await.delete(id).await
    }

    /// Pending persistence warning, rendered for response messages.
    pub async fn persistence_warning(&self) -> Option<String> {
        self.store
            .lock()
            .await
            .persistence_warning()
            .map(|e| e.to_string())
    }
}
