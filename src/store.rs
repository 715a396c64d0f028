//! CSV-backed record store for contacts.
//!
//! The whole contact set lives in a single flat file with the header
//! `id,firstName,lastName,email,phone,createdAt`. Every write rewrites the
//! file from scratch; there is no append log and no atomic rename, so a crash
//! in the middle of [`ContactStore::save`] can leave a truncated file behind.
//!
//! [`ContactStore`] is an explicit handle: callers `load()` before reading and
//! the in-memory view is only valid until the next `load`/`save`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A stored contact. Serialized with camelCase keys both on the wire and in
/// the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: u64,
    pub created_at: String,
}

impl Contact {
    /// Build a new contact with a fresh UUID and the current UTC time.
    pub fn new(
        first_name: String,
        last_name: Option<String>,
        email: Option<String>,
        phone: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            phone,
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    /// Every value of the contact as text, in column order. The phone number
    /// is rendered as its decimal digits, matching how the file stores it.
    pub fn text_fields(&self) -> Vec<String> {
        let mut fields = vec![self.id.clone(), self.first_name.clone()];
        fields.extend(self.last_name.clone());
        fields.extend(self.email.clone());
        fields.push(self.phone.to_string());
        fields.push(self.created_at.clone());
        fields
    }
}

/// One raw CSV line. Every column is optional so that a damaged row can be
/// read and then rejected instead of aborting the whole load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    created_at: Option<String>,
}

impl CsvRow {
    fn into_contact(self) -> Option<Contact> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(Contact {
            id: non_empty(self.id)?,
            first_name: non_empty(self.first_name)?,
            last_name: non_empty(self.last_name),
            email: non_empty(self.email),
            phone: self.phone?.trim().parse().ok()?,
            created_at: non_empty(self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ContactStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ContactStore {
    path: PathBuf,
    records: Vec<Contact>,
}

impl ContactStore {
    /// Create a handle for the file at `path`. Nothing is read until
    /// [`load`](Self::load) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory view with the file's contents.
    ///
    /// Rows missing an id, first name, creation time or a numeric phone are
    /// skipped. A file that does not exist yet reads as an empty store.
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.records.clear();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(line = line + 2, "skipping unreadable contact row: {e}");
                    continue;
                }
            };
            match row.into_contact() {
                Some(contact) => self.records.push(contact),
                None => tracing::warn!(line = line + 2, "skipping malformed contact row"),
            }
        }
        Ok(())
    }

    /// Overwrite the file with `records` and make them the in-memory view.
    pub fn save(&mut self, records: Vec<Contact>) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        if records.is_empty() {
            // serde only emits the header alongside the first record.
            writer.write_record(["id", "firstName", "lastName", "email", "phone", "createdAt"])?;
        }
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        self.records = records;
        Ok(())
    }

    /// The contacts read by the last `load` (or written by the last `save`).
    pub fn all(&self) -> &[Contact] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.records.iter().find(|c| c.id == id)
    }

    /// Add `contact` to the current view and persist the result.
    pub fn append(&mut self, contact: Contact) -> Result<(), StoreError> {
        let mut records = self.records.clone();
        records.push(contact);
        self.save(records)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.save(Vec::new())
    }

    /// Reload, drop the contact with `id` and persist. Returns whether a
    /// record was removed.
    pub fn delete_by_id(&mut self, id: &str) -> Result<bool, StoreError> {
        self.load()?;
        let before = self.records.len();
        let remaining: Vec<Contact> = self.records.iter().filter(|c| c.id != id).cloned().collect();
        let removed = remaining.len() != before;
        self.save(remaining)?;
        Ok(removed)
    }
}
