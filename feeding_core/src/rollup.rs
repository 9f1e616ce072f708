//! CSV rollup for archiving the visit log.
//!
//! The live JSONL log is periodically drained into a CSV archive. The CSV
//! is synced before the log is renamed, so a crash between the two steps
//! duplicates rows rather than losing them (readers deduplicate by id).

use crate::{Result, VisitRecord};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    recorded_at: String,
    source: String,
}

impl From<&VisitRecord> for CsvRow {
    fn from(visit: &VisitRecord) -> Self {
        CsvRow {
            id: visit.id.to_string(),
            recorded_at: visit.recorded_at.to_rfc3339(),
            source: visit.source.clone(),
        }
    }
}

/// Roll up logged visits into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all visits from the log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of visits processed
pub fn visits_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let visits = crate::visit_log::read_visits(log_path)?;

    if visits.is_empty() {
        tracing::info!("No visits in log to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for visit in &visits {
        let row = CsvRow::from(visit);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} visits to CSV", visits.len());

    // Archive the log by renaming it; processed files can be cleaned up later
    let processed_path = log_path.with_extension("wal.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived visit log to {:?}", processed_path);

    Ok(visits.len())
}

/// Clean up old processed log files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }

    Ok(count)
}
