//! Append-only visit log.
//!
//! Each use of the tool appends one record to a JSONL (JSON Lines) file
//! with file locking so overlapping invocations cannot interleave partial
//! lines.

use crate::{Result, VisitRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Visit sink trait for recording visits
pub trait VisitSink {
    fn append(&mut self, visit: &VisitRecord) -> Result<()>;
}

/// JSONL-based visit log with file locking
pub struct JsonlVisitLog {
    path: PathBuf,
}

impl JsonlVisitLog {
    /// Create a new JSONL log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl VisitSink for JsonlVisitLog {
    fn append(&mut self, visit: &VisitRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(visit)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended visit {} to log", visit.id);
        Ok(())
    }
}

/// Read all visits from a log file
///
/// Malformed lines are skipped with a warning so one bad write cannot hide
/// the rest of the log.
pub fn read_visits(path: &Path) -> Result<Vec<VisitRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut visits = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<VisitRecord>(&line) {
            Ok(visit) => visits.push(visit),
            Err(e) => {
                tracing::warn!("Failed to parse visit at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} visits from log", visits.len());
    Ok(visits)
}
