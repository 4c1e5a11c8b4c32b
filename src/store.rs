//! Appointment store.
//!
//! Insertion-ordered collection of [`AppointmentRecord`]s, mirrored as a JSON
//! array into a single [`SlotStore`] slot after every mutation. The in-memory
//! collection is the source of truth: a failed write leaves the change in
//! place and is reported through [`AppointmentStore::persistence_warning`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::SlotStore;
use crate::models::{AppointmentDetails, AppointmentRecord, AppointmentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("appointment {0} not found")]
    NotFound(Uuid),

    #[error("appointment storage unavailable: {0}")]
    PersistenceUnavailable(String),
}

pub struct AppointmentStore {
    slots: Arc<dyn SlotStore>,
    slot: String,
    records: Vec<AppointmentRecord>,
    last_write_error: Option<StoreError>,
}

impl AppointmentStore {
    /// Load the collection stored under `slot`.
    ///
    /// An unreachable substrate or an unparsable blob is logged and treated as
    /// an empty store so the wizard stays usable.
    pub async fn open(slots: Arc<dyn SlotStore>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let records = match Self::load(slots.as_ref(), &slot).await {
            Ok(records) => {
                info!("Loaded {} appointments from slot '{}'", records.len(), slot);
                records
            }
            Err(e) => {
                warn!("Starting with an empty appointment store: {}", e);
                Vec::new()
            }
        };

        Self {
            slots,
            slot,
            records,
            last_write_error: None,
        }
    }

    async fn load(slots: &dyn SlotStore, slot: &str) -> Result<Vec<AppointmentRecord>, StoreError> {
        let blob = slots
            .load(slot)
            .await
            .map_err(|e| StoreError::PersistenceUnavailable(e.to_string()))?;

        match blob {
            None => Ok(Vec::new()),
            Some(blob) => serde_json::from_str(&blob).map_err(|e| {
                StoreError::PersistenceUnavailable(format!("slot '{}' is corrupt: {}", slot, e))
            }),
        }
    }

    async fn persist(&mut self) {
        let result = match serde_json::to_string(&self.records) {
            Ok(blob) => self
                .slots
                .save(&self.slot, &blob)
                .await
                .map_err(|e| StoreError::PersistenceUnavailable(e.to_string())),
            Err(e) => Err(StoreError::PersistenceUnavailable(e.to_string())),
        };

        match result {
            Ok(()) => {
                debug!("Persisted {} appointments to slot '{}'", self.records.len(), self.slot);
                self.last_write_error = None;
            }
            Err(e) => {
                warn!("Appointment change kept in memory only: {}", e);
                self.last_write_error = Some(e);
            }
        }
    }

    /// Store a finalized booking as a new `Pending` record.
    pub async fn create(&mut self, details: AppointmentDetails, created_at: DateTime<Utc>) -> AppointmentRecord {
        // v7 ids are time-ordered and monotonic within the process, so two
        // creates in the same millisecond still get distinct ids.
        let record = AppointmentRecord {
            id: Uuid::now_v7(),
            created_at,
            status: AppointmentStatus::Pending,
            details,
        };
        self.records.push(record.clone());

        info!(
            "Appointment {} created for {} ({}) on {} {}",
            record.id,
            record.details.pet_name,
            record.details.service_type.label(),
            record.details.date,
            record.details.time
        );

        self.persist().await;
        record
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[AppointmentRecord] {
        &self.records
    }

    /// All records, most recently created first.
    pub fn list_newest_first(&self) -> Vec<AppointmentRecord> {
        self.records.iter().rev().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&AppointmentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the status of record `id`. Every other field is left as is.
    pub async fn update_status(
        &mut self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let previous = record.status;
        record.status = status;
        let updated = record.clone();

        info!(
            "Appointment {} status {} -> {}",
            id,
            previous.as_str(),
            status.as_str()
        );

        self.persist().await;
        Ok(updated)
    }

    /// Permanently remove record `id`. Returns `false` if it was not present.
    pub async fn delete(&mut self, id: Uuid) -> bool {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            debug!("Delete of unknown appointment {}", id);
            return false;
        };

        self.records.remove(index);
        info!("Appointment {} deleted", id);

        self.persist().await;
        true
    }

    /// The last failed write, if no write has succeeded since.
    pub fn persistence_warning(&self) -> Option<&StoreError> {
        self.last_write_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemorySlotStore, SlotError};
    use crate::models::{ServiceType, Species};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashSet;

    struct BrokenSlots;

    #[async_trait]
    impl SlotStore for BrokenSlots {
        async fn load(&self, _slot: &str) -> Result<Option<String>, SlotError> {
            Err(SlotError::Unavailable("disk gone".into()))
        }

        async fn save(&self, _slot: &str, _blob: &str) -> Result<(), SlotError> {
            Err(SlotError::Unavailable("disk gone".into()))
        }
    }

    fn details(pet: &str) -> AppointmentDetails {
        AppointmentDetails {
            owner_name: "Juan Pérez".into(),
            phone: "+57 300 123 4567".into(),
            email: "juan@example.com".into(),
            pet_name: pet.into(),
            pet_species: Species::Dog,
            breed: None,
            age: "3 years".into(),
            weight: Some("12 kg".into()),
            service_type: ServiceType::Vaccination,
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            time: "09:00".into(),
            address: "Calle 123".into(),
            city: "Medellín".into(),
            location_reference: None,
            notes: None,
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap()
    }

    async fn memory_store() -> (Arc<MemorySlotStore>, AppointmentStore) {
        let slots = Arc::new(MemorySlotStore::new());
        let store = AppointmentStore::open(slots.clone(), "appointments").await;
        (slots, store)
    }

    #[tokio::test]
    async fn test_create_assigns_pending_and_unique_ids() {
        let (_slots, mut store) = memory_store().await;

        let mut ids = HashSet::new();
        for i in 0..50 {
            let record = store.create(details(&format!("Pet {i}")), stamp()).await;
            assert_eq!(record.status, AppointmentStatus::Pending);
            assert_eq!(record.created_at, stamp());
            assert!(ids.insert(record.id), "duplicate id {}", record.id);
        }
        assert_eq!(store.len(), 50);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let (_slots, mut store) = memory_store().await;
        let first = store.create(details("Max"), stamp()).await;
        let second = store.create(details("Luna"), stamp()).await;

        let ids: Vec<_> = store.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        let newest: Vec<_> = store.list_newest_first().iter().map(|r| r.id).collect();
        assert_eq!(newest, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_status_touches_only_status() {
        let (_slots, mut store) = memory_store().await;
        let target = store.create(details("Max"), stamp()).await;
        let other = store.create(details("Luna"), stamp()).await;

        let updated = store
            .update_status(target.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.created_at, target.created_at);
        assert_eq!(updated.details, target.details);
        assert_eq!(store.get(other.id), Some(&other));

        // Any status may follow any other, including itself.
        for status in [
            AppointmentStatus::Cancelled,
            AppointmentStatus::Pending,
            AppointmentStatus::Pending,
        ] {
            let r = store.update_status(target.id, status).await.unwrap();
            assert_eq!(r.status, status);
        }
    }

    #[tokio::test]
    async fn test_update_status_unknown_id() {
        let (_slots, mut store) = memory_store().await;
        let existing = store.create(details("Max"), stamp()).await;
        let missing = Uuid::now_v7();

        let err = store
            .update_status(missing, AppointmentStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(missing));
        assert_eq!(store.list(), &[existing]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let (_slots, mut store) = memory_store().await;
        let keep = store.create(details("Max"), stamp()).await;
        let gone = store.create(details("Luna"), stamp()).await;

        assert!(store.delete(gone.id).await);
        assert_eq!(store.len(), 1);
        assert!(store.get(gone.id).is_none());

        assert!(!store.delete(gone.id).await);
        assert_eq!(store.list(), &[keep]);
    }

    #[tokio::test]
    async fn test_reopen_reads_persisted_records() {
        let (slots, mut store) = memory_store().await;
        let record = store.create(details("Max"), stamp()).await;
        store
            .update_status(record.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();

        let reopened = AppointmentStore::open(slots, "appointments").await;
        assert_eq!(reopened.len(), 1);
        let loaded = reopened.get(record.id).unwrap();
        assert_eq!(loaded.status, AppointmentStatus::Confirmed);
        assert_eq!(loaded.details, record.details);
    }

    #[tokio::test]
    async fn test_corrupt_slot_opens_empty() {
        let slots = Arc::new(MemorySlotStore::new());
        slots.save("appointments", "{not json").await.unwrap();

        let store = AppointmentStore::open(slots, "appointments").await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_is_a_warning() {
        let mut store = AppointmentStore::open(Arc::new(BrokenSlots), "appointments").await;
        assert!(store.is_empty());

        let record = store.create(details("Max"), stamp()).await;
        assert_eq!(store.list(), &[record]);
        assert!(matches!(
            store.persistence_warning(),
            Some(StoreError::PersistenceUnavailable(_))
        ));
    }
}
