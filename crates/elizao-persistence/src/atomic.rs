//! Crash-safe JSON file helpers.
//!
//! Record files are always replaced whole: the new content goes to a
//! temporary file in the same directory which is then renamed over the target,
//! so readers never observe a half-written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PersistenceError, Result};

/// Serializes `value` as pretty JSON and atomically replaces `path` with it.
///
/// Missing parent directories are created.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    staged.write_all(&bytes).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    staged.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Reads a JSON file, returning `T::default()` when the file does not exist.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    if data.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use elizao_models::LeadRecord;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/leads.json");

        write_json_atomic(&path, &vec![LeadRecord::new("Acme", "Jane")]).unwrap();

        assert!(path.exists());
        let leads: Vec<LeadRecord> = read_json_or_default(&path).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].contact_name, "Jane");
    }

    #[test]
    fn test_missing_file_reads_as_default() {
        let dir = tempdir().unwrap();
        let leads: Vec<LeadRecord> = read_json_or_default(&dir.path().join("none.json")).unwrap();
        assert!(leads.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![4]).unwrap();

        let values: Vec<i32> = read_json_or_default(&path).unwrap();
        assert_eq!(values, vec![4]);
        // No stray temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Vec<i32>> = read_json_or_default(&path);
        assert!(matches!(result, Err(PersistenceError::SerializeError(_))));
    }
}
