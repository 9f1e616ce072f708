//! Core domain types for the Neofeed scheduling tool.
//!
//! This module defines the fundamental types used throughout the system:
//! - Patient parameters (weight, prescribed rate, admission status)
//! - Computed feed schedules
//! - Suggestion board entries
//! - Visit records and application state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Patient Input Types
// ============================================================================

/// Admission status of the patient
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    /// Already on the ward; feeds on the full fixed daily cycle
    Resident,
    /// Admitted partway through a cycle; receives a pro-rated schedule
    NewlyAdmitted,
}

/// Clock time of admission, on a 5-minute grid
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdmissionTime {
    pub hour: u32,
    pub minute: u32,
}

impl AdmissionTime {
    /// Minutes since local midnight
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// "HH:MM" label as shown on the schedule
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Caller-supplied parameters for one schedule calculation
///
/// Weight and rate are optional so that a field left empty by the caller is
/// representable; validation rejects absent values with a field-specific
/// error instead of a panic or a silent default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientInput {
    /// Body weight in kilograms, (0, 99.99]
    pub weight_kg: Option<f64>,
    /// Prescribed daily volume in mL per kg of body weight, (0, 9999]
    pub ml_per_kg_per_day: Option<u32>,
    pub status: PatientStatus,
    /// Required when status is `NewlyAdmitted`
    pub admission: Option<AdmissionTime>,
}

// ============================================================================
// Schedule Output Types
// ============================================================================

/// Category marker for a feed entry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedMarker {
    /// Regular bottle feed at a fixed cycle slot
    Bottle,
    /// Synthetic entry at the literal admission time
    Admission,
}

/// One row of a computed schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    /// Clock time, "HH:MM"
    pub time: String,
    /// Always a multiple of the 5 mL dispensing unit
    pub volume_ml: u32,
    pub marker: FeedMarker,
}

/// A computed feed schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleResult {
    /// Full-day target: weight x rate, rounded up to the dispensing unit
    pub daily_total_ml: u32,
    /// Volume actually distributed (pro-rated for new admissions)
    pub effective_total_ml: u32,
    /// Chronological within the applicable cycle
    pub feeds: Vec<FeedEntry>,
}

// ============================================================================
// Suggestion Board Types
// ============================================================================

/// A reply on a suggestion, optionally flagged as an official admin reply
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub from_admin: bool,
}

/// A user-submitted improvement suggestion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

// ============================================================================
// Visit and State Types
// ============================================================================

/// One recorded use of the tool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Which entry point produced the visit (e.g. "calc")
    pub source: String,
}

/// Visit counters shown in admin mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitStats {
    /// Visits since local midnight
    pub today: usize,
    /// All visits on record, live log and archive combined
    pub total: usize,
}

/// Persistent application state
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AppState {
    pub admin_mode: bool,
    pub admin_enabled_at: Option<DateTime<Utc>>,
}
