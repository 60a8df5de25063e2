use crate::domain::{Pin, PinStore};
use std::fs;
use std::path::Path;

/// Backing file used when the session was not started from an explicit file.
pub const DEFAULT_DATA_FILE: &str = "data/pins_data.json";

#[derive(Debug)]
pub enum StorageError {
    Read(String),
    Write(String),
    Format(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Read(msg) => write!(f, "{}", msg),
            StorageError::Write(msg) => write!(f, "{}", msg),
            StorageError::Format(msg) => write!(f, "Invalid file format - {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

pub struct FileRepository;

impl FileRepository {
    /// Writes the full pin list as a pretty-printed JSON array. The write
    /// goes through a sibling temp file renamed into place, so a crash
    /// mid-write never truncates the previous contents.
    pub fn save_pins(store: &PinStore, filename: &str) -> Result<String, StorageError> {
        let json = serde_json::to_string_pretty(store.pins())
            .map_err(|e| StorageError::Format(e.to_string()))?;

        let path = Path::new(filename);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
            }
        }

        let tmp = format!("{}.tmp", filename);
        fs::write(&tmp, &json).map_err(|e| StorageError::Write(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(filename.to_string())
    }

    /// Reads the backing file into a fresh store. A missing file is not an
    /// error: it loads as an empty store, matching first-run behavior.
    pub fn load_pins(filename: &str) -> Result<(PinStore, String), StorageError> {
        if !Path::new(filename).exists() {
            return Ok((PinStore::default(), filename.to_string()));
        }

        let content =
            fs::read_to_string(filename).map_err(|e| StorageError::Read(e.to_string()))?;
        let pins: Vec<Pin> =
            serde_json::from_str(&content).map_err(|e| StorageError::Format(e.to_string()))?;
        Ok((PinStore::from_pins(pins), filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn sample_store() -> PinStore {
        let mut store = PinStore::default();
        store
            .add(
                "Rome Trip",
                Location(41.9028, 12.4964),
                "Colosseum visit",
                vec!["trips".to_string()],
            )
            .unwrap();
        store
            .add(
                "Dinner",
                Location(-33.8688, 151.2093),
                "",
                vec!["food".to_string(), "trips".to_string()],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let path = path.to_str().unwrap();

        let store = sample_store();
        let saved = FileRepository::save_pins(&store, path).unwrap();
        assert_eq!(saved, path);

        let (loaded, filename) = FileRepository::load_pins(path).unwrap();
        assert_eq!(filename, path);
        assert_eq!(loaded.pins(), store.pins());
    }

    #[test]
    fn test_load_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let (store, _) = FileRepository::load_pins(path.to_str().unwrap()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_invalid_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result = FileRepository::load_pins(path.to_str().unwrap());
        assert!(matches!(result, Err(StorageError::Format(_))));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("pins_data.json");
        let path = path.to_str().unwrap();

        FileRepository::save_pins(&sample_store(), path).unwrap();
        let (loaded, _) = FileRepository::load_pins(path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let path = path.to_str().unwrap();

        FileRepository::save_pins(&sample_store(), path).unwrap();
        assert!(Path::new(path).exists());
        assert!(!Path::new(&format!("{}.tmp", path)).exists());
    }

    #[test]
    fn test_save_overwrites_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let path = path.to_str().unwrap();

        FileRepository::save_pins(&sample_store(), path).unwrap();

        let mut small = PinStore::default();
        small.add("Only", Location(0.0, 0.0), "", vec![]).unwrap();
        FileRepository::save_pins(&small, path).unwrap();

        let (loaded, _) = FileRepository::load_pins(path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.pins()[0].title, "Only");
    }

    #[test]
    fn test_reads_file_written_by_original_tool() {
        // Shape produced by the reference implementation: 4-space indent,
        // location as a [lat, lon] array.
        let content = r#"[
    {
        "title": "Rome Trip",
        "location": [
            41.9028,
            12.4964
        ],
        "note": "Colosseum visit",
        "tags": [
            "trips"
        ],
        "color": "purple"
    }
]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins_data.json");
        fs::write(&path, content).unwrap();

        let (store, _) = FileRepository::load_pins(path.to_str().unwrap()).unwrap();
        assert_eq!(store.len(), 1);
        let pin = &store.pins()[0];
        assert_eq!(pin.title, "Rome Trip");
        assert_eq!(pin.location, Location(41.9028, 12.4964));
        assert_eq!(pin.note, "Colosseum visit");
        assert_eq!(pin.tags, vec!["trips".to_string()]);
        assert_eq!(pin.color, "purple");
    }
}
