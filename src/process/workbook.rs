// src/process/workbook.rs
use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use std::io::Cursor;
use tracing::{debug, info, instrument, warn};

use crate::error::{Diagnostic, WalkError};
use crate::process::{batch::IngestOptions, normalize::Strategy, utils::sheet_from_range, Sheet};
use crate::record::Record;

/// Anything that can hand out named sheets in workbook order.
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;
    fn read_sheet(&mut self, name: &str) -> Result<Sheet, WalkError>;
}

/// A workbook held in memory, in any format calamine can sniff
/// (xlsx, xlsm, xlsb, xls, ods).
pub struct CalamineWorkbook {
    inner: Sheets<Cursor<Vec<u8>>>,
}

impl CalamineWorkbook {
    pub fn open(content: Vec<u8>) -> Result<Self, WalkError> {
        let inner = open_workbook_auto_from_rs(Cursor::new(content)).map_err(WalkError::Open)?;
        Ok(Self { inner })
    }
}

impl SheetSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, WalkError> {
        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|source| WalkError::Sheet {
                sheet: name.to_string(),
                source,
            })?;
        Ok(sheet_from_range(name, &range))
    }
}

/// Records and diagnostics collected from one workbook.
#[derive(Debug, Default)]
pub struct WalkOutput {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Open `content` and normalize every sheet. Never fails: an unreadable
/// workbook yields one file-scoped diagnostic and no records.
#[instrument(level = "info", skip(content, options), fields(bytes = content.len()))]
pub fn walk(content: Vec<u8>, filename: &str, options: &IngestOptions) -> WalkOutput {
    match CalamineWorkbook::open(content) {
        Ok(mut workbook) => walk_sheets(&mut workbook, filename, options),
        Err(err) => {
            warn!(error = %err, "skipping unreadable workbook");
            WalkOutput {
                records: Vec::new(),
                diagnostics: vec![Diagnostic::new(Some(filename), None, err)],
            }
        }
    }
}

/// Sheet-level isolation: a sheet that fails to read is reported and the
/// remaining sheets are still processed.
pub fn walk_sheets<S: SheetSource + ?Sized>(
    source: &mut S,
    filename: &str,
    options: &IngestOptions,
) -> WalkOutput {
    let mut out = WalkOutput::default();

    for name in source.sheet_names() {
        let sheet = match source.read_sheet(&name) {
            Ok(sheet) => sheet,
            Err(err) => {
                warn!(sheet = %name, error = %err, "skipping sheet");
                out.diagnostics
                    .push(Diagnostic::new(Some(filename), Some(name.as_str()), err));
                continue;
            }
        };
        if sheet.headers.is_empty() {
            debug!(sheet = %name, "empty sheet");
            continue;
        }

        let strategy = Strategy::select(&sheet.headers, options.calendar, options.mode);
        out.records.extend(strategy.normalize(&sheet, filename));
    }

    info!(
        records = out.records.len(),
        diagnostics = out.diagnostics.len(),
        "walked workbook"
    );
    out
}
