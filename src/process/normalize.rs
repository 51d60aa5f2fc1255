// src/process/normalize.rs
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::process::{
    calendar::{strip_month, Calendar},
    classify::{classify, ClassifiedColumns},
    date_parser::infer_from_value,
    Sheet,
};
use crate::record::{CellValue, Fields, Month, Record, MONTH_KEY};

/// How sheets are dated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Month-bearing column labels if the sheet has any, cell values otherwise.
    #[default]
    Detect,
    /// Every row takes its sheet's name as its month.
    SheetName,
}

/// Row normalization strategy chosen for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Fan each row out into one record per month found in the labels.
    ColumnDriven(ClassifiedColumns),
    /// One record per row, dated by the first cell that parses as a date.
    ValueDriven,
    /// One record per row, dated by the sheet name.
    SheetName,
}

impl Strategy {
    pub fn select(headers: &[String], calendar: Calendar, mode: IngestMode) -> Self {
        match mode {
            IngestMode::SheetName => Strategy::SheetName,
            IngestMode::Detect => {
                let classified = classify(headers, calendar);
                if classified.is_monthless() {
                    Strategy::ValueDriven
                } else {
                    Strategy::ColumnDriven(classified)
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ColumnDriven(_) => "column_driven",
            Strategy::ValueDriven => "value_driven",
            Strategy::SheetName => "sheet_name",
        }
    }

    pub fn normalize(&self, sheet: &Sheet, source_file: &str) -> Vec<Record> {
        let records = match self {
            Strategy::ColumnDriven(classified) => column_driven(classified, sheet, source_file),
            Strategy::ValueDriven => value_driven(sheet, source_file),
            Strategy::SheetName => sheet_name(sheet, source_file),
        };
        debug!(
            sheet = %sheet.name,
            strategy = self.name(),
            rows = sheet.rows.len(),
            records = records.len(),
            "normalized sheet"
        );
        records
    }
}

fn cell(row: &[CellValue], index: usize) -> CellValue {
    row.get(index).cloned().unwrap_or(CellValue::Null)
}

fn whole_row(sheet: &Sheet, row: &[CellValue]) -> Fields {
    sheet
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), cell(row, i)))
        .collect()
}

/// Month-major: all rows for the first month, then all rows for the next.
fn column_driven(classified: &ClassifiedColumns, sheet: &Sheet, source_file: &str) -> Vec<Record> {
    let mut records = Vec::with_capacity(classified.months.len() * sheet.rows.len());

    for group in &classified.months {
        let renamed: Vec<(String, usize)> = group
            .columns
            .iter()
            .map(|&i| (strip_month(&sheet.headers[i], group.month), i))
            .collect();

        for row in &sheet.rows {
            let mut fields = Fields::with_capacity(classified.base.len() + renamed.len());
            for &i in &classified.base {
                fields.insert(sheet.headers[i].clone(), cell(row, i));
            }
            for (name, i) in &renamed {
                fields.insert(name.clone(), cell(row, *i));
            }
            records.push(Record::new(
                fields,
                Some(Month::Name(group.month)),
                Some(source_file.to_string()),
            ));
        }
    }
    records
}

fn value_driven(sheet: &Sheet, source_file: &str) -> Vec<Record> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let month = row.iter().find_map(infer_from_value).map(Month::Number);
            Record::new(whole_row(sheet, row), month, Some(source_file.to_string()))
        })
        .collect()
}

fn sheet_name(sheet: &Sheet, source_file: &str) -> Vec<Record> {
    sheet
        .rows
        .iter()
        .map(|row| {
            Record::new(
                whole_row(sheet, row),
                Some(Month::Sheet(sheet.name.clone())),
                Some(source_file.to_string()),
            )
        })
        .collect()
}

/// Second-chance dating right before persistence: every record still
/// without a month gets the first field value (other than `month`) that
/// parses as a date. Returns how many records were filled.
pub fn backfill_months(records: &mut [Record]) -> usize {
    let mut filled = 0;
    for record in records.iter_mut().filter(|r| r.month.is_none()) {
        let found = record
            .fields
            .iter()
            .filter(|(key, _)| *key != MONTH_KEY)
            .find_map(|(_, value)| infer_from_value(value));
        if let Some(n) = found {
            record.month = Some(Month::Number(n));
            filled += 1;
        }
    }
    filled
}
