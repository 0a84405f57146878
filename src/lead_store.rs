//! Append-only CSV storage for lead records.
//!
//! The backing file starts with a fixed header row followed by one row per
//! submission in submission order. Rows are never rewritten or removed.

use crate::errors::AppError;
use crate::models::{Contact, LeadRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Column order of the lead file.
pub const HEADER: [&str; 12] = [
    "ts",
    "brand_name",
    "tsd_request_name",
    "company",
    "name",
    "email",
    "role",
    "phone",
    "score_overall",
    "tier",
    "pillar_scores",
    "answers",
];

/// Flat CSV form of a `LeadRecord`. Field order must match `HEADER`.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    ts: String,
    brand_name: String,
    tsd_request_name: String,
    company: String,
    name: String,
    email: String,
    role: String,
    phone: String,
    score_overall: u8,
    tier: String,
    pillar_scores: String,
    answers: String,
}

impl CsvRow {
    fn from_record(record: &LeadRecord) -> Result<Self, AppError> {
        Ok(Self {
            ts: record.ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            brand_name: record.brand_name.clone(),
            tsd_request_name: record.contact.tsd_request_name.clone().unwrap_or_default(),
            company: record.contact.company.clone(),
            name: record.contact.name.clone(),
            email: record.contact.email.clone(),
            role: record.contact.role.clone(),
            phone: record.contact.phone.clone().unwrap_or_default(),
            score_overall: record.score_overall,
            tier: record.tier.clone(),
            pillar_scores: serde_json::to_string(&record.pillar_scores)?,
            answers: serde_json::to_string(&record.answers)?,
        })
    }

    fn into_record(self, position: usize) -> Result<LeadRecord, AppError> {
        let bad_row = |what: &str, e: &dyn std::fmt::Display| {
            AppError::StorageError(format!("Lead row {} has invalid {}: {}", position, what, e))
        };

        let ts = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| bad_row("ts", &e))?
            .with_timezone(&Utc);
        let pillar_scores =
            serde_json::from_str(&self.pillar_scores).map_err(|e| bad_row("pillar_scores", &e))?;
        let answers = serde_json::from_str(&self.answers).map_err(|e| bad_row("answers", &e))?;

        Ok(LeadRecord {
            ts,
            brand_name: self.brand_name,
            contact: Contact {
                company: self.company,
                name: self.name,
                email: self.email,
                role: self.role,
                phone: Some(self.phone).filter(|p| !p.is_empty()),
                tsd_request_name: Some(self.tsd_request_name).filter(|t| !t.is_empty()),
            },
            score_overall: self.score_overall,
            tier: self.tier,
            pillar_scores,
            answers,
        })
    }
}

/// Lead file handle shared by all requests.
#[derive(Debug)]
pub struct LeadStore {
    path: PathBuf,
    // Serialises access within this process only.
    lock: Mutex<()>,
}

impl LeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.lock
            .lock()
            .map_err(|_| AppError::InternalError("Lead store lock poisoned".to_string()))
    }

    /// Appends one record as the last row, writing the header first if the
    /// file is absent or empty.
    pub fn append(&self, record: &LeadRecord) -> Result<(), AppError> {
        let row = CsvRow::from_record(record)?;
        let _guard = self.guard()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(row)?;
        writer.flush()?;

        tracing::debug!("Appended lead for {} to {}", record.contact.company, self.path.display());
        Ok(())
    }

    /// Raw file content, header included. A missing file reads as empty.
    pub fn read_all(&self) -> Result<String, AppError> {
        let _guard = self.guard()?;
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Every stored record in file order.
    pub fn records(&self) -> Result<Vec<LeadRecord>, AppError> {
        let content = self.read_all()?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_reader(content.as_bytes());
        reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(index, row)| row?.into_record(index + 1))
            .collect()
    }

    /// Record at a 1-based row position.
    pub fn record(&self, position: usize) -> Result<Option<LeadRecord>, AppError> {
        if position == 0 {
            return Ok(None);
        }
        Ok(self.records()?.into_iter().nth(position - 1))
    }
}
