//! Visit counting across the live log and the CSV archive.
//!
//! Admin mode shows two counters: visits since local midnight and all
//! visits on record. Records appearing in both the log and the archive
//! (e.g. after an interrupted rollup) are deduplicated by id.

use crate::{Result, VisitRecord, VisitStats};
use chrono::{DateTime, Local, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived visits
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    recorded_at: String,
    source: String,
}

impl TryFrom<CsvRow> for VisitRecord {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(VisitRecord {
            id,
            recorded_at,
            source: row.source,
        })
    }
}

/// Count visits recorded today and in total
///
/// "Today" is the local calendar date of `now`. Both the live log and the
/// CSV archive are consulted; duplicates are counted once.
pub fn count_visits(log_path: &Path, csv_path: &Path, now: DateTime<Utc>) -> Result<VisitStats> {
    let today_local = now.with_timezone(&Local).date_naive();
    let is_today =
        |visit: &VisitRecord| visit.recorded_at.with_timezone(&Local).date_naive() == today_local;

    let mut seen_ids = HashSet::new();
    let mut stats = VisitStats { today: 0, total: 0 };

    // Live log first (most recent)
    if log_path.exists() {
        for visit in crate::visit_log::read_visits(log_path)? {
            seen_ids.insert(visit.id);
            stats.total += 1;
            if is_today(&visit) {
                stats.today += 1;
            }
        }
        tracing::debug!("Counted {} visits from log", stats.total);
    }

    // Archived visits
    if csv_path.exists() {
        for visit in load_visits_from_csv(csv_path)? {
            if seen_ids.insert(visit.id) {
                stats.total += 1;
                if is_today(&visit) {
                    stats.today += 1;
                }
            }
        }
    }

    tracing::info!(
        "Visit stats: {} today, {} total",
        stats.today,
        stats.total
    );

    Ok(stats)
}

/// Load all visits from a CSV archive
fn load_visits_from_csv(path: &Path) -> Result<Vec<VisitRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut visits = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match VisitRecord::try_from(row) {
                Ok(visit) => visits.push(visit),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(visits)
}
