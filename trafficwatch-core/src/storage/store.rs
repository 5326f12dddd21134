use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use log::{debug, info};

use super::batch::{BatchId, date_token};
use crate::{
    Error,
    model::{IncidentRecord, RECORD_HEADERS},
    query::DateRange,
};

const PROCESSED_DIR: &str = "processed";
const RAW_PREFIX: &str = "raw_";
const PROCESSED_PREFIX: &str = "processed_";

/// Data directory holding raw payloads and processed batches.
///
/// ```text
/// <data_dir>/raw_<id>.json
/// <data_dir>/processed/processed_<id>.csv
/// ```
#[derive(Debug)]
pub struct BatchStore {
    data_dir: PathBuf,
    processed_dir: PathBuf,
    next_seq: AtomicU64,
}

impl BatchStore {
    /// Opens the store, creating the directory layout if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let data_dir = data_dir.into();
        let processed_dir = data_dir.join(PROCESSED_DIR);
        fs::create_dir_all(&processed_dir).map_err(|e| with_path(e, &processed_dir))?;

        info!("Batch store ready at {}", data_dir.display());
        Ok(Self {
            data_dir,
            processed_dir,
            next_seq: AtomicU64::new(0),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Allocates a fresh identifier for a batch ingested now
    pub fn next_batch_id(&self) -> BatchId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        BatchId::new(Utc::now(), seq)
    }

    pub fn raw_path(&self, id: &BatchId) -> PathBuf {
        self.data_dir.join(format!("{RAW_PREFIX}{id}.json"))
    }

    pub fn processed_path(&self, id: &BatchId) -> PathBuf {
        self.processed_dir.join(format!("{PROCESSED_PREFIX}{id}.csv"))
    }

    /// Stores the payload bytes exactly as received
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written
    pub fn write_raw(&self, id: &BatchId, payload: &[u8]) -> Result<PathBuf, Error> {
        let path = self.raw_path(id);
        let mut file = create_new(&path)?;
        file.write_all(payload).map_err(|e| with_path(e, &path))?;
        debug!("Wrote {} raw bytes to {}", payload.len(), path.display());
        Ok(path)
    }

    /// Stores the extracted records as CSV, header included even when empty
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written
    pub fn write_processed(
        &self,
        id: &BatchId,
        records: &[IncidentRecord],
    ) -> Result<PathBuf, Error> {
        let path = self.processed_path(id);
        let file = create_new(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(RECORD_HEADERS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| with_path(e, &path))?;

        info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Processed batch files whose date token falls in `range`, sorted by name
    ///
    /// # Errors
    ///
    /// Returns an error if the processed directory cannot be listed
    pub fn processed_files(&self, range: &DateRange) -> Result<Vec<PathBuf>, Error> {
        let entries =
            fs::read_dir(&self.processed_dir).map_err(|e| with_path(e, &self.processed_dir))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(PROCESSED_PREFIX) || !name.ends_with(".csv") {
                continue;
            }
            if date_token(name).is_some_and(|token| range.contains(token)) {
                files.push(entry.path());
            }
        }
        files.sort();

        debug!(
            "{} processed batches match {range} in {}",
            files.len(),
            self.processed_dir.display()
        );
        Ok(files)
    }
}

/// Loads every record of one processed batch file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a row is malformed
pub fn read_processed(path: &Path) -> Result<Vec<IncidentRecord>, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<IncidentRecord>, _>>()?;
    Ok(records)
}

fn create_new(path: &Path) -> Result<File, Error> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| with_path(e, path).into())
}

fn with_path(e: std::io::Error, path: &Path) -> std::io::Error {
    std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;
    use crate::model::IncidentType;

    fn sample_records() -> Vec<IncidentRecord> {
        vec![
            IncidentRecord {
                timestamp: 1_700_000_000_000,
                incident_type: IncidentType::Accident,
                street: "Paseo de la Reforma".to_string(),
                speed: None,
                distance_to_route: 123.456_789,
                delay_minutes: 10.0,
                hour: 22,
            },
            IncidentRecord {
                timestamp: 1_700_000_360_000,
                incident_type: IncidentType::TrafficJam,
                street: "unknown, \"quoted\"".to_string(),
                speed: Some(7.25),
                distance_to_route: 0.0,
                delay_minutes: -0.333_333_333_333_333_3,
                hour: 23,
            },
            IncidentRecord {
                timestamp: 1_700_000_720_000,
                incident_type: IncidentType::Other("WEATHERHAZARD".to_string()),
                street: String::new(),
                speed: None,
                distance_to_route: 499.999,
                delay_minutes: 5.0,
                hour: 23,
            },
        ]
    }

    #[test]
    fn open_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let store = BatchStore::open(&root).unwrap();
        assert!(store.processed_dir().is_dir());
        assert_eq!(store.data_dir(), root.as_path());
    }

    #[test]
    fn processed_batch_round_trips_field_for_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        let id = store.next_batch_id();
        let records = sample_records();

        let path = store.write_processed(&id, &records).unwrap();
        assert_eq!(read_processed(&path).unwrap(), records);
    }

    #[test]
    fn empty_batch_still_has_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        let path = store.write_processed(&store.next_batch_id(), &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), RECORD_HEADERS.join(","));
        assert!(read_processed(&path).unwrap().is_empty());
    }

    #[test]
    fn raw_payload_is_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        let body = br#"{ "alerts": [], "jams": [],  "extra": {"k": 1} }"#;

        let path = store.write_raw(&store.next_batch_id(), body).unwrap();
        assert_eq!(fs::read(&path).unwrap(), body);
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    #[test]
    fn batches_in_the_same_second_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        let first = store.next_batch_id();
        let second = store.next_batch_id();
        assert_ne!(first, second);

        store.write_processed(&first, &sample_records()[..1]).unwrap();
        store.write_processed(&second, &sample_records()[1..]).unwrap();
        assert_eq!(store.processed_files(&DateRange::default()).unwrap().len(), 2);
    }

    #[test]
    fn existing_batch_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        let id = store.next_batch_id();
        store.write_processed(&id, &sample_records()).unwrap();

        let err = store.write_processed(&id, &[]).unwrap_err();
        assert!(matches!(err, Error::IoError(ref e) if e.kind() == ErrorKind::AlreadyExists));
        assert_eq!(read_processed(&store.processed_path(&id)).unwrap().len(), 3);
    }

    #[test]
    fn listing_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = BatchStore::open(dir.path()).unwrap();
        store.write_processed(&store.next_batch_id(), &[]).unwrap();
        fs::write(store.processed_dir().join("notes.csv"), "x").unwrap();
        fs::write(store.processed_dir().join("processed_20240101.txt"), "x").unwrap();

        assert_eq!(store.processed_files(&DateRange::default()).unwrap().len(), 1);
    }

    #[test]
    fn malformed_rows_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_20240101_000000.csv");
        fs::write(
            &path,
            "timestamp,incident_type,street,speed,distance_to_route,delay_minutes,hour\n\
             soon,ACCIDENT,x,,1.0,10.0,3\n",
        )
        .unwrap();
        assert!(matches!(read_processed(&path), Err(Error::CsvError(_))));
    }
}
