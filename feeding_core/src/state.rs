//! Persistent JSON documents with file locking.
//!
//! Application state and the suggestion board are both single JSON documents
//! on disk. Loads take a shared lock and degrade to the default value when
//! the file is missing or corrupted; saves write a locked temp file and
//! atomically rename it over the original.

use crate::{AppState, Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Load a JSON document with shared locking
///
/// Returns the default value if the file doesn't exist. If the file is
/// unreadable or corrupted, logs a warning and returns the default value.
pub(crate) fn load_document<T>(path: &Path, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::info!("No {} file found, using default", what);
        return Ok(T::default());
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(
                "Unable to open {} file {:?}: {}. Using default.",
                what,
                path,
                e
            );
            return Ok(T::default());
        }
    };

    // Acquire shared lock for reading
    if let Err(e) = file.lock_shared() {
        tracing::warn!(
            "Unable to lock {} file {:?}: {}. Using default.",
            what,
            path,
            e
        );
        return Ok(T::default());
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!(
            "Failed to read {} file {:?}: {}. Using default.",
            what,
            path,
            e
        );
        return Ok(T::default());
    }

    file.unlock()?;

    match serde_json::from_str::<T>(&contents) {
        Ok(doc) => {
            tracing::debug!("Loaded {} from {:?}", what, path);
            Ok(doc)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {} file {:?}: {}. Using default.",
                what,
                path,
                e
            );
            Ok(T::default())
        }
    }
}

/// Save a JSON document with exclusive locking
///
/// Atomically writes the document by:
/// 1. Writing to a temp file
/// 2. Syncing to disk
/// 3. Renaming over the original
pub(crate) fn save_document<T>(path: &Path, doc: &T, what: &str) -> Result<()>
where
    T: Serialize,
{
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Create unique temp file in the same directory for atomic rename
    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
    })?)?;

    // Acquire exclusive lock on the temp file to serialize concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(doc)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    // Atomically replace the old document
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {} to {:?}", what, path);
    Ok(())
}

impl AppState {
    /// Load application state, defaulting when absent or corrupted
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path, "state")
    }

    /// Save application state atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        save_document(path, self, "state")
    }

    /// Load state, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut AppState) -> Result<()>,
    {
        let mut state = Self::load(path)?;
        f(&mut state)?;
        state.save(path)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let state = AppState {
            admin_mode: true,
            admin_enabled_at: Some(Utc::now()),
        };

        state.save(&state_path).unwrap();
        let loaded = AppState::load(&state_path).unwrap();

        assert!(loaded.admin_mode);
        assert!(loaded.admin_enabled_at.is_some());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("nonexistent.json");

        let state = AppState::load(&state_path).unwrap();
        assert!(!state.admin_mode);
        assert!(state.admin_enabled_at.is_none());
    }

    #[test]
    fn test_corrupted_state_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("corrupted.json");

        std::fs::write(&state_path, "{ invalid json }").unwrap();

        let state = AppState::load(&state_path).unwrap();
        assert!(!state.admin_mode);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        AppState::default().save(&state_path).unwrap();

        AppState::update(&state_path, |state| {
            state.admin_mode = true;
            Ok(())
        })
        .unwrap();

        let loaded = AppState::load(&state_path).unwrap();
        assert!(loaded.admin_mode);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        AppState::default().save(&state_path).unwrap();

        assert!(state_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only state.json, found extras: {:?}",
            extras
        );
    }
}
