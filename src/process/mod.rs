// src/process/mod.rs
pub mod batch;
pub mod calendar;
pub mod classify;
pub mod date_parser;
pub mod normalize;
pub mod utils;
pub mod workbook;

pub use batch::{ingest, persist, IngestOptions, IngestOutcome, Upload};
pub use calendar::Calendar;
pub use normalize::{backfill_months, IngestMode, Strategy};
pub use workbook::{walk, walk_sheets, CalamineWorkbook, SheetSource, WalkOutput};

use crate::record::CellValue;

/// One sheet of a workbook, as read for the duration of a single upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name as shown on the workbook tab.
    pub name: String,
    /// Column labels from the first row, made unique.
    pub headers: Vec<String>,
    /// Data rows, each as wide as `headers`.
    pub rows: Vec<Vec<CellValue>>,
}
