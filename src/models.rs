//! Domain models for the booking service.
//!
//! An appointment starts life as an [`AppointmentDraft`] edited through the
//! booking wizard, is finalized into [`AppointmentDetails`] once every step
//! validates, and is stored as an [`AppointmentRecord`] carrying an id, a
//! creation timestamp and a mutable status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ============================================================================
// Enumerations
// ============================================================================

/// Species offered in the pet step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Hamster,
    Other,
}

impl Species {
    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Bird => "Bird",
            Species::Rabbit => "Rabbit",
            Species::Hamster => "Hamster",
            Species::Other => "Other",
        }
    }
}

/// Services the clinic books appointments for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    GeneralConsultation,
    Vaccination,
    UrgentCare,
    FollowUpControl,
    MinorSurgery,
    Other,
}

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::GeneralConsultation => "General consultation",
            ServiceType::Vaccination => "Vaccination",
            ServiceType::UrgentCare => "Urgent care",
            ServiceType::FollowUpControl => "Follow-up control",
            ServiceType::MinorSurgery => "Minor surgery",
            ServiceType::Other => "Other",
        }
    }
}

/// Lifecycle marker of a stored appointment.
///
/// There is no transition graph: any status may replace any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

// ============================================================================
// Draft, Details, Record
// ============================================================================

/// In-progress wizard form state. Never persisted directly.
///
/// Text fields use the empty string for "not filled in yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentDraft {
    // Owner
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    // Pet
    pub pet_name: String,
    pub pet_species: Option<Species>,
    pub breed: String,
    pub age: String,
    pub weight: String,
    // Service
    pub service_type: Option<ServiceType>,
    // Schedule
    pub date: Option<NaiveDate>,
    pub time: String,
    // Location
    pub address: String,
    pub city: String,
    pub location_reference: String,
    pub notes: String,
}

/// A partial edit of the draft. Fields left out of the patch are untouched;
/// an explicit `null` clears a species, service or date selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftPatch {
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pet_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub pet_species: Option<Option<Species>>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub service_type: Option<Option<ServiceType>>,
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<NaiveDate>>,
    pub time: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub location_reference: Option<String>,
    pub notes: Option<String>,
}

/// Any value that is present in the input, `null` included, becomes `Some`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DraftPatch {
    pub fn apply(self, draft: &mut AppointmentDraft) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut draft.owner_name, self.owner_name);
        set(&mut draft.phone, self.phone);
        set(&mut draft.email, self.email);
        set(&mut draft.pet_name, self.pet_name);
        set(&mut draft.pet_species, self.pet_species);
        set(&mut draft.breed, self.breed);
        set(&mut draft.age, self.age);
        set(&mut draft.weight, self.weight);
        set(&mut draft.service_type, self.service_type);
        set(&mut draft.date, self.date);
        set(&mut draft.time, self.time);
        set(&mut draft.address, self.address);
        set(&mut draft.city, self.city);
        set(&mut draft.location_reference, self.location_reference);
        set(&mut draft.notes, self.notes);
    }
}

/// A fully validated draft, ready to become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub owner_name: String,
    pub phone: String,
    pub email: String,
    pub pet_name: String,
    pub pet_species: Species,
    pub breed: Option<String>,
    pub age: String,
    pub weight: Option<String>,
    pub service_type: ServiceType,
    pub date: NaiveDate,
    pub time: String,
    pub address: String,
    pub city: String,
    pub location_reference: Option<String>,
    pub notes: Option<String>,
}

/// A stored appointment. `id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(flatten)]
    pub details: AppointmentDetails,
}

/// Field-level guidance for a step that does not validate yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Request Models (Deserialize from JSON input)
// ============================================================================

/// Request body for jumping straight to a wizard step.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub step: u8,
}

/// Request body for changing an appointment's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// Listing order for `GET /appointments`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Newest,
    Inserted,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: ListOrder,
}

// ============================================================================
// Response Models
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

/// Plain-data view of an appointment handed to document generation.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub owner: String,
    pub contact: String,
    pub pet: String,
    pub service: &'static str,
    pub scheduled_for: String,
    pub location: String,
    pub notes: Option<String>,
}

impl From<&AppointmentRecord> for AppointmentSummary {
    fn from(record: &AppointmentRecord) -> Self {
        let d = &record.details;

        let mut pet = format!("{} ({}", d.pet_name, d.pet_species.label());
        if let Some(breed) = &d.breed {
            pet.push_str(", ");
            pet.push_str(breed);
        }
        pet.push_str(", ");
        pet.push_str(&d.age);
        if let Some(weight) = &d.weight {
            pet.push_str(", ");
            pet.push_str(weight);
        }
        pet.push(')');

        let location = match &d.location_reference {
            Some(reference) => format!("{}, {} ({})", d.address, d.city, reference),
            None => format!("{}, {}", d.address, d.city),
        };

        Self {
            id: record.id,
            status: record.status,
            created_at: record.created_at,
            owner: d.owner_name.clone(),
            contact: format!("{} / {}", d.phone, d.email),
            pet,
            service: d.service_type.label(),
            scheduled_for: format!("{} {}", d.date.format("%Y-%m-%d"), d.time),
            location,
            notes: d.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chosen() -> AppointmentDraft {
        AppointmentDraft {
            pet_species: Some(Species::Cat),
            service_type: Some(ServiceType::Vaccination),
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..Default::default()
        }
    }

    #[test]
    fn test_patch_null_clears_selection() {
        let mut draft = chosen();
        let patch: DraftPatch = serde_json::from_value(json!({
            "pet_species": null,
            "date": null
        }))
        .unwrap();
        patch.apply(&mut draft);

        assert_eq!(draft.pet_species, None);
        assert_eq!(draft.date, None);
        assert_eq!(draft.service_type, Some(ServiceType::Vaccination));
    }

    #[test]
    fn test_patch_absent_fields_are_untouched() {
        let mut draft = chosen();
        let patch: DraftPatch = serde_json::from_value(json!({
            "service_type": "minor-surgery",
            "owner_name": "Ana"
        }))
        .unwrap();
        patch.apply(&mut draft);

        assert_eq!(draft.service_type, Some(ServiceType::MinorSurgery));
        assert_eq!(draft.pet_species, Some(Species::Cat));
        assert_eq!(draft.owner_name, "Ana");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let err = serde_json::from_value::<DraftPatch>(json!({ "ownerName": "Ana" })).unwrap_err();
        assert!(err.to_string().contains("unknown field `ownerName`"));
    }
}
