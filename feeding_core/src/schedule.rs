//! The per-feed volume calculator.
//!
//! Turns (weight, prescribed mL/kg/day, admission status, admission time)
//! into an ordered list of feed times and volumes that sum exactly to the
//! effective daily total. Every published volume is a multiple of the 5 mL
//! dispensing unit; leftover units from the integer division go to the
//! latest feeds first.

use crate::cycle::{
    FeedCycle, CYCLE_START_MIN, MINUTES_PER_DAY, MIN_GAP_AFTER_ADMISSION_MIN, VOLUME_UNIT_ML,
};
use crate::{
    AdmissionTime, Error, FeedEntry, FeedMarker, PatientInput, PatientStatus, Result,
    ScheduleResult,
};

const WEIGHT_MAX_KG: f64 = 99.99;
const RATE_MAX_ML_PER_KG: u32 = 9999;

/// Compute the per-feed schedule for one patient
///
/// Pure function of its input: no stored state, no side effects, safe to
/// call from any thread. Fails with `Error::InvalidInput` when a required
/// field is missing or out of domain; otherwise the result is complete and
/// internally consistent (volumes sum to `effective_total_ml`).
pub fn compute_schedule(cycle: &FeedCycle, input: &PatientInput) -> Result<ScheduleResult> {
    let (weight, rate) = validate_weight_and_rate(input)?;

    let daily_total_ml = round_up_unit(weight * f64::from(rate));

    let (effective_total_ml, mut feeds) = match input.status {
        PatientStatus::Resident => {
            let feeds = cycle
                .slots
                .iter()
                .map(|slot| FeedEntry {
                    time: slot.label.clone(),
                    volume_ml: 0,
                    marker: FeedMarker::Bottle,
                })
                .collect();
            (daily_total_ml, feeds)
        }
        PatientStatus::NewlyAdmitted => {
            let admission = validate_admission(input)?;
            partial_day_feeds(cycle, daily_total_ml, admission)
        }
    };

    distribute(effective_total_ml, &mut feeds);

    Ok(ScheduleResult {
        daily_total_ml,
        effective_total_ml,
        feeds,
    })
}

/// Round a fractional volume up to the next dispensing unit
fn round_up_unit(v: f64) -> u32 {
    (v / f64::from(VOLUME_UNIT_ML)).ceil() as u32 * VOLUME_UNIT_ML
}

/// Round a fractional volume down to the previous dispensing unit
fn round_down_unit(v: f64) -> u32 {
    (v / f64::from(VOLUME_UNIT_ML)).floor() as u32 * VOLUME_UNIT_ML
}

fn validate_weight_and_rate(input: &PatientInput) -> Result<(f64, u32)> {
    let weight = input.weight_kg.filter(|w| *w > 0.0);
    let rate = input.ml_per_kg_per_day.filter(|r| *r > 0);

    let (weight, rate) = match (weight, rate) {
        (Some(w), Some(r)) => (w, r),
        _ => return Err(Error::InvalidInput("weight and rate required".into())),
    };

    if weight > WEIGHT_MAX_KG {
        return Err(Error::InvalidInput(format!(
            "weight must be at most {} kg",
            WEIGHT_MAX_KG
        )));
    }
    if rate > RATE_MAX_ML_PER_KG {
        return Err(Error::InvalidInput(format!(
            "rate must be at most {} mL/kg/day",
            RATE_MAX_ML_PER_KG
        )));
    }

    Ok((weight, rate))
}

fn validate_admission(input: &PatientInput) -> Result<AdmissionTime> {
    let admission = input
        .admission
        .ok_or_else(|| Error::InvalidInput("admission time required".into()))?;

    if admission.hour > 23 {
        return Err(Error::InvalidInput("admission hour must be 0-23".into()));
    }
    if admission.minute > 55 || admission.minute % 5 != 0 {
        return Err(Error::InvalidInput(
            "admission minute must be on a 5-minute step".into(),
        ));
    }

    Ok(admission)
}

/// Build the pro-rated feed list for a patient admitted mid-cycle
fn partial_day_feeds(
    cycle: &FeedCycle,
    daily_total_ml: u32,
    admission: AdmissionTime,
) -> (u32, Vec<FeedEntry>) {
    // An early-morning admission belongs to the previous cycle day.
    let mut admit_min = admission.minute_of_day();
    if admit_min < CYCLE_START_MIN {
        admit_min += MINUTES_PER_DAY;
    }

    let remaining_hours = 24.0 - f64::from(admit_min - CYCLE_START_MIN) / 60.0;
    let effective_total_ml =
        round_up_unit(f64::from(daily_total_ml) / 24.0 * remaining_hours);

    let mut feeds = vec![FeedEntry {
        time: admission.label(),
        volume_ml: 0,
        marker: FeedMarker::Admission,
    }];

    let mut future: Vec<_> = cycle
        .slots
        .iter()
        .filter(|slot| slot.minute_of_day >= admit_min)
        .collect();

    // Too soon to feed again right after admission. Only the first survivor
    // needs checking while the table keeps slots at least the gap apart.
    if let Some(first) = future.first() {
        if first.minute_of_day - admit_min < MIN_GAP_AFTER_ADMISSION_MIN {
            future.remove(0);
        }
    }

    feeds.extend(future.into_iter().map(|slot| FeedEntry {
        time: slot.label.clone(),
        volume_ml: 0,
        marker: FeedMarker::Bottle,
    }));

    (effective_total_ml, feeds)
}

/// Spread the effective total across the feeds in dispensing units
///
/// Every feed gets the floored per-feed base; the remainder is handed out
/// in single units starting from the last feed and walking backward, so the
/// latest feeds absorb the rounding surplus.
fn distribute(effective_total_ml: u32, feeds: &mut [FeedEntry]) {
    if feeds.is_empty() {
        return;
    }

    let n = feeds.len() as u32;
    let base = round_down_unit(f64::from(effective_total_ml) / f64::from(n));
    let mut remainder = effective_total_ml - base * n;

    for feed in feeds.iter_mut() {
        feed.volume_ml = base;
    }
    for feed in feeds.iter_mut().rev() {
        if remainder == 0 {
            break;
        }
        feed.volume_ml += VOLUME_UNIT_ML;
        remainder -= VOLUME_UNIT_ML;
    }
}
