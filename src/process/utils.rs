// src/process/utils.rs
use calamine::{Data, Range};
use std::collections::{HashMap, HashSet};

use crate::process::{date_parser, Sheet};
use crate::record::CellValue;

/// Coerce a calamine cell into a JSON-representable value.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Text(dt.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::DateTime(ndt),
            None => float_value(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match date_parser::parse_datetime(s) {
            Some(ndt) => CellValue::DateTime(ndt),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Whole floats become integers; spreadsheets store every number as f64.
fn float_value(f: f64) -> CellValue {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}

/// Text label for a header cell. Blank headers become `Unnamed: <index>`.
pub fn header_label(cell: &Data, index: usize) -> String {
    let label = match cell_value(cell) {
        CellValue::Null => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => f.to_string(),
        CellValue::Text(s) => s,
        CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    if label.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        label
    }
}

/// Make repeated labels unique: `A, A, A` → `A, A.1, A.2`. A generated
/// label never collides with a real one: `A, A, A.1` → `A, A.1, A.1.1`.
pub fn dedupe_headers(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    labels
        .into_iter()
        .map(|label| {
            if seen.insert(label.clone()) {
                return label;
            }
            let n = suffixes.entry(label.clone()).or_insert(0);
            let unique = loop {
                *n += 1;
                let candidate = format!("{}.{}", label, n);
                if !seen.contains(&candidate) {
                    break candidate;
                }
            };
            seen.insert(unique.clone());
            unique
        })
        .collect()
}

/// First row of the used range is the header; fully blank data rows are dropped.
pub fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => dedupe_headers(
            header
                .iter()
                .enumerate()
                .map(|(i, c)| header_label(c, i))
                .collect(),
        ),
        None => Vec::new(),
    };
    let rows: Vec<Vec<CellValue>> = rows
        .map(|r| r.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|r| r.iter().any(|c| !c.is_null()))
        .collect();

    Sheet {
        name: name.to_string(),
        headers,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Fields;

    #[test]
    fn coerces_scalars() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(cell_value(&Data::String(String::new())), CellValue::Null);
        assert_eq!(cell_value(&Data::Float(100.0)), CellValue::Int(100));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::String("nan".into())),
            CellValue::Text("nan".into())
        );
    }

    #[test]
    fn iso_strings_become_datetimes() {
        match cell_value(&Data::DateTimeIso("2024-03-15T08:30:00".into())) {
            CellValue::DateTime(dt) => assert_eq!(dt.to_string(), "2024-03-15 08:30:00"),
            other => panic!("expected datetime, got {:?}", other),
        }
        assert_eq!(
            cell_value(&Data::DurationIso("PT1H".into())),
            CellValue::Text("PT1H".into())
        );
    }

    #[test]
    fn headers_are_labelled_and_deduplicated() {
        let cells = [
            Data::String("Name".into()),
            Data::Empty,
            Data::Float(2024.0),
            Data::String("Name".into()),
            Data::String("Name".into()),
        ];
        let labels: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| header_label(c, i))
            .collect();
        assert_eq!(
            dedupe_headers(labels),
            vec!["Name", "Unnamed: 1", "2024", "Name.1", "Name.2"]
        );
    }

    #[test]
    fn generated_labels_never_shadow_real_headers() {
        let labels = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(
            dedupe_headers(labels(&["A", "A", "A.1"])),
            vec!["A", "A.1", "A.1.1"]
        );
        assert_eq!(
            dedupe_headers(labels(&["A", "A.1", "A", "A"])),
            vec!["A", "A.1", "A.2", "A.3"]
        );
    }

    #[test]
    fn colliding_headers_keep_every_cell() {
        let mut range = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("A".into()));
        range.set_value((0, 1), Data::String("A".into()));
        range.set_value((0, 2), Data::String("A.1".into()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::Float(2.0));
        range.set_value((1, 2), Data::Float(3.0));

        let sheet = sheet_from_range("S", &range);
        let fields: Fields = sheet
            .headers
            .iter()
            .cloned()
            .zip(sheet.rows[0].iter().cloned())
            .collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("A.1"), Some(&CellValue::Int(2)));
        assert_eq!(fields.get("A.1.1"), Some(&CellValue::Int(3)));
    }

    #[test]
    fn sheet_from_range_skips_blank_rows() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Name".into()));
        range.set_value((0, 1), Data::String("Qty".into()));
        range.set_value((1, 0), Data::String("Acme".into()));
        range.set_value((1, 1), Data::Float(3.0));
        range.set_value((3, 0), Data::String("Globex".into()));

        let sheet = sheet_from_range("Лист1", &range);
        assert_eq!(sheet.headers, vec!["Name", "Qty"]);
        assert_eq!(
            sheet.rows,
            vec![
                vec![CellValue::Text("Acme".into()), CellValue::Int(3)],
                vec![CellValue::Text("Globex".into()), CellValue::Null],
            ]
        );
    }

    #[test]
    fn empty_range_gives_empty_sheet() {
        let range: Range<Data> = Range::empty();
        let sheet = sheet_from_range("empty", &range);
        assert!(sheet.headers.is_empty());
        assert!(sheet.rows.is_empty());
    }
}
