//! # Booking Wizard
//!
//! Step-gated state machine behind the appointment form. The user fills in a
//! draft across five linear steps and may only move forward once the current
//! step validates; moving back is always allowed.
//!
//! ## Steps
//!
//! 1. **Owner**: name, phone, email
//! 2. **Pet**: name, species, age (breed and weight optional)
//! 3. **Service**: one of the six bookable services
//! 4. **Schedule**: a date no earlier than today and a clinic time slot
//! 5. **Location**: address and city (reference and notes optional)
//!
//! Submitting from step 5 moves the wizard to `Submitting`, during which every
//! mutation is refused, and then to `Completed` once the record is stored.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AppointmentDetails, AppointmentDraft, DraftPatch, FieldIssue};

/// Bookable slots, every half hour while the clinic is open (08:00 to 18:00).
pub const CLINIC_SLOTS: [&str; 20] = [
    "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00", "17:30",
];

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Step {
    Owner = 1,
    Pet = 2,
    Service = 3,
    Schedule = 4,
    Location = 5,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Owner,
        Step::Pet,
        Step::Service,
        Step::Schedule,
        Step::Location,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.into_iter().find(|step| step.number() == n)
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Owner => "Owner",
            Step::Pet => "Pet",
            Step::Service => "Service",
            Step::Schedule => "Schedule",
            Step::Location => "Location",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> u8 {
        step.number()
    }
}

// ============================================================================
// Validation
// ============================================================================

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn optional(value: &str) -> Option<String> {
    (!blank(value)).then(|| value.to_string())
}

/// Parse `time` as one of the clinic slots.
pub fn parse_slot(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    if !CLINIC_SLOTS.contains(&time) {
        return None;
    }
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

/// Every reason `step` does not validate yet, in field order.
pub fn step_issues(draft: &AppointmentDraft, step: Step, now: NaiveDateTime) -> Vec<FieldIssue> {
    fn require(issues: &mut Vec<FieldIssue>, field: &'static str, value: &str, message: &str) {
        if blank(value) {
            issues.push(FieldIssue::new(field, message));
        }
    }

    let mut issues = Vec::new();
    match step {
        Step::Owner => {
            require(&mut issues, "owner_name", &draft.owner_name, "Owner name is required");
            require(&mut issues, "phone", &draft.phone, "Phone number is required");
            require(&mut issues, "email", &draft.email, "Email is required");
        }
        Step::Pet => {
            require(&mut issues, "pet_name", &draft.pet_name, "Pet name is required");
            if draft.pet_species.is_none() {
                issues.push(FieldIssue::new("pet_species", "Select a species"));
            }
            require(&mut issues, "age", &draft.age, "Pet age is required");
        }
        Step::Service => {
            if draft.service_type.is_none() {
                issues.push(FieldIssue::new("service_type", "Select a service"));
            }
        }
        Step::Schedule => {
            let today = now.date();
            match draft.date {
                None => issues.push(FieldIssue::new("date", "Pick a date")),
                Some(date) if date < today => {
                    issues.push(FieldIssue::new("date", "Date cannot be in the past"))
                }
                Some(_) => {}
            }

            if blank(&draft.time) {
                issues.push(FieldIssue::new("time", "Pick a time slot"));
            } else {
                match parse_slot(&draft.time) {
                    None => issues.push(FieldIssue::new(
                        "time",
                        format!(
                            "{} is not an available slot; the clinic books from 08:00 to 17:30",
                            draft.time.trim()
                        ),
                    )),
                    Some(slot) if draft.date == Some(today) && slot <= now.time() => {
                        issues.push(FieldIssue::new("time", "That time has already passed today"))
                    }
                    Some(_) => {}
                }
            }
        }
        Step::Location => {
            require(&mut issues, "address", &draft.address, "Address is required");
            require(&mut issues, "city", &draft.city, "City is required");
        }
    }

    issues
}

pub fn is_step_valid(draft: &AppointmentDraft, step: Step, now: NaiveDateTime) -> bool {
    step_issues(draft, step, now).is_empty()
}

fn check_step(draft: &AppointmentDraft, step: Step, now: NaiveDateTime) -> Result<(), WizardError> {
    let issues = step_issues(draft, step, now);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(WizardError::StepInvalid { step, issues })
    }
}

/// Turn a draft into finalized details, provided all five steps validate.
pub fn finalize(draft: &AppointmentDraft, now: NaiveDateTime) -> Result<AppointmentDetails, WizardError> {
    for step in Step::ALL {
        check_step(draft, step, now)?;
    }

    let missing = |step, field, message: &str| WizardError::StepInvalid {
        step,
        issues: vec![FieldIssue::new(field, message)],
    };
    let pet_species = draft
        .pet_species
        .ok_or_else(|| missing(Step::Pet, "pet_species", "Select a species"))?;
    let service_type = draft
        .service_type
        .ok_or_else(|| missing(Step::Service, "service_type", "Select a service"))?;
    let date = draft
        .date
        .ok_or_else(|| missing(Step::Schedule, "date", "Pick a date"))?;

    Ok(AppointmentDetails {
        owner_name: draft.owner_name.clone(),
        phone: draft.phone.clone(),
        email: draft.email.clone(),
        pet_name: draft.pet_name.clone(),
        pet_species,
        breed: optional(&draft.breed),
        age: draft.age.clone(),
        weight: optional(&draft.weight),
        service_type,
        date,
        time: draft.time.trim().to_string(),
        address: draft.address.clone(),
        city: draft.city.clone(),
        location_reference: optional(&draft.location_reference),
        notes: optional(&draft.notes),
    })
}

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing { step: Step },
    Submitting,
    Completed { record_id: Uuid },
}

/// A refused wizard operation. The wizard's state is unchanged whenever one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{step} is incomplete")]
    StepInvalid { step: Step, issues: Vec<FieldIssue> },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("already at the last step, submit the booking instead")]
    AtLastStep,

    #[error("bookings can only be submitted from the last step, currently at {0}")]
    NotAtFinalStep(Step),

    #[error("a submission is in progress")]
    Submitting,

    #[error("booking already completed, reset the wizard to start a new one")]
    Completed,

    #[error("the submission did not finish, please submit again")]
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepValidity {
    pub step: Step,
    pub title: &'static str,
    pub valid: bool,
}

/// Everything the form needs to render the wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub phase: WizardPhase,
    pub step: Step,
    pub total_steps: usize,
    pub draft: AppointmentDraft,
    pub steps: Vec<StepValidity>,
    pub issues: Vec<FieldIssue>,
    pub submitting: bool,
    pub completed: bool,
    pub time_slots: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct WizardController {
    draft: AppointmentDraft,
    phase: WizardPhase,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self {
            draft: AppointmentDraft::default(),
            phase: WizardPhase::Editing { step: Step::Owner },
        }
    }

    pub fn draft(&self) -> &AppointmentDraft {
        &self.draft
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    /// Step shown to the user. Submission and completion both sit on the
    /// last step.
    pub fn current_step(&self) -> Step {
        match self.phase {
            WizardPhase::Editing { step } => step,
            WizardPhase::Submitting | WizardPhase::Completed { .. } => Step::Location,
        }
    }

    pub fn is_step_valid(&self, step: Step, now: NaiveDateTime) -> bool {
        is_step_valid(&self.draft, step, now)
    }

    fn editing_step(&self) -> Result<Step, WizardError> {
        match self.phase {
            WizardPhase::Editing { step } => Ok(step),
            WizardPhase::Submitting => Err(WizardError::Submitting),
            WizardPhase::Completed { .. } => Err(WizardError::Completed),
        }
    }

    pub fn edit(&mut self, patch: DraftPatch) -> Result<(), WizardError> {
        self.editing_step()?;
        patch.apply(&mut self.draft);
        Ok(())
    }

    pub fn advance(&mut self, now: NaiveDateTime) -> Result<Step, WizardError> {
        let step = self.editing_step()?;
        let next = step.next().ok_or(WizardError::AtLastStep)?;
        check_step(&self.draft, step, now)?;
        self.phase = WizardPhase::Editing { step: next };
        Ok(next)
    }

    pub fn retreat(&mut self) -> Result<Step, WizardError> {
        let step = self.editing_step()?;
        let previous = step.previous().ok_or(WizardError::AtFirstStep)?;
        self.phase = WizardPhase::Editing { step: previous };
        Ok(previous)
    }

    /// Jump to `target` when every step before it validates. Use `retreat`
    /// to move back without any validation.
    pub fn jump_to(&mut self, target: Step, now: NaiveDateTime) -> Result<Step, WizardError> {
        self.editing_step()?;
        for step in Step::ALL.into_iter().take_while(|step| *step < target) {
            check_step(&self.draft, step, now)?;
        }
        self.phase = WizardPhase::Editing { step: target };
        Ok(target)
    }

    /// Validate the whole draft from the last step and enter `Submitting`.
    pub fn begin_submit(&mut self, now: NaiveDateTime) -> Result<AppointmentDetails, WizardError> {
        let step = self.editing_step()?;
        if step != Step::Location {
            return Err(WizardError::NotAtFinalStep(step));
        }
        let details = finalize(&self.draft, now)?;
        self.phase = WizardPhase::Submitting;
        Ok(details)
    }

    pub(crate) fn complete(&mut self, record_id: Uuid) {
        if self.phase == WizardPhase::Submitting {
            self.phase = WizardPhase::Completed { record_id };
        }
    }

    /// Return to the last step after a submission that never stored a record.
    pub(crate) fn abort_submit(&mut self) {
        if self.phase == WizardPhase::Submitting {
            self.phase = WizardPhase::Editing { step: Step::Location };
        }
    }

    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Submitting {
            return Err(WizardError::Submitting);
        }
        *self = Self::new();
        Ok(())
    }

    pub fn view(&self, now: NaiveDateTime) -> WizardView {
        let step = self.current_step();
        let steps = Step::ALL
            .into_iter()
            .map(|s| StepValidity {
                step: s,
                title: s.title(),
                valid: self.is_step_valid(s, now),
            })
            .collect();
        let issues = match self.phase {
            WizardPhase::Editing { step } => step_issues(&self.draft, step, now),
            _ => Vec::new(),
        };

        WizardView {
            phase: self.phase,
            step,
            total_steps: Step::ALL.len(),
            draft: self.draft.clone(),
            steps,
            issues,
            submitting: self.phase == WizardPhase::Submitting,
            completed: matches!(self.phase, WizardPhase::Completed { .. }),
            time_slots: &CLINIC_SLOTS,
        }
    }
}
