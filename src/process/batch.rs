// src/process/batch.rs
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::error::{Diagnostic, StoreError};
use crate::process::{
    calendar::Calendar,
    normalize::{backfill_months, IngestMode},
    workbook::walk,
};
use crate::record::Record;
use crate::store::{RecordStore, Session};

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    pub calendar: Calendar,
    pub mode: IngestMode,
}

/// Result of one ingestion request. Serializes as
/// `{"status": "success" | "no_valid_data" | "error", "saved"?: n, "debug": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Success { saved: usize, debug: Vec<Diagnostic> },
    NoValidData { debug: Vec<Diagnostic> },
    Error { debug: Vec<Diagnostic> },
}

impl IngestOutcome {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            IngestOutcome::Success { debug, .. }
            | IngestOutcome::NoValidData { debug }
            | IngestOutcome::Error { debug } => debug,
        }
    }

    pub fn saved(&self) -> usize {
        match self {
            IngestOutcome::Success { saved, .. } => *saved,
            _ => 0,
        }
    }
}

/// Normalize every upload and persist the records.
///
/// Per-file and per-sheet failures become diagnostics; only a storage
/// failure turns the outcome into [`IngestOutcome::Error`], in which case
/// nothing from this batch is kept.
#[instrument(level = "info", skip_all, fields(files = uploads.len()))]
pub fn ingest<S: RecordStore + ?Sized>(
    uploads: Vec<Upload>,
    store: &mut S,
    options: &IngestOptions,
) -> IngestOutcome {
    let start = Instant::now();
    let mut records: Vec<Record> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for upload in uploads {
        let out = walk(upload.content, &upload.filename, options);
        records.extend(out.records);
        diagnostics.extend(out.diagnostics);
    }

    if records.is_empty() {
        info!(diagnostics = diagnostics.len(), "no valid data");
        return IngestOutcome::NoValidData {
            debug: diagnostics,
        };
    }

    let filled = backfill_months(&mut records);
    match persist(store, &records) {
        Ok(saved) => {
            info!(
                saved,
                backfilled = filled,
                diagnostics = diagnostics.len(),
                elapsed = ?start.elapsed(),
                "ingestion complete"
            );
            IngestOutcome::Success {
                saved,
                debug: diagnostics,
            }
        }
        Err(err) => {
            error!(error = %err, records = records.len(), "persistence failed, batch rolled back");
            diagnostics.push(Diagnostic::new(None, None, err));
            IngestOutcome::Error {
                debug: diagnostics,
            }
        }
    }
}

/// Insert `records` one by one inside a single session, all or nothing.
pub fn persist<S: RecordStore + ?Sized>(
    store: &mut S,
    records: &[Record],
) -> Result<usize, StoreError> {
    let mut session = Session::open(store)?;
    for record in records {
        session.add(record)?;
    }
    session.commit()
}
