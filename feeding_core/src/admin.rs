//! Admin unlock gate.
//!
//! The calculator form doubles as the admin unlock: submitting the exact
//! sentinel weight/rate combination for a resident patient switches the tool
//! into admin mode instead of producing a schedule. The check lives here,
//! outside the calculator, and callers run it before input validation so the
//! sentinel never reaches the numeric path.

use crate::{PatientInput, PatientStatus};

/// Sentinel weight that triggers the admin unlock
pub const UNLOCK_WEIGHT_KG: f64 = 99.99;

/// Sentinel rate that triggers the admin unlock
pub const UNLOCK_RATE_ML_PER_KG: u32 = 1725;

/// Whether this input is the admin unlock sequence rather than a calculation
pub fn is_unlock_request(input: &PatientInput) -> bool {
    input.status == PatientStatus::Resident
        && input.weight_kg == Some(UNLOCK_WEIGHT_KG)
        && input.ml_per_kg_per_day == Some(UNLOCK_RATE_ML_PER_KG)
}
