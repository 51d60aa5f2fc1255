// src/record.rs
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Reserved key carrying the inferred month.
pub const MONTH_KEY: &str = "month";
/// Reserved key carrying the originating upload name.
pub const SOURCE_FILE_KEY: &str = "source_file";

/// Rendering used for date/time cells, e.g. `2024-03-15T00:00:00`.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single spreadsheet cell, coerced to something JSON can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            // JSON has no NaN/inf
            CellValue::Float(f) if !f.is_finite() => serializer.serialize_none(),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::DateTime(dt) => serializer.collect_str(&dt.format(ISO_FORMAT)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

/// Ordered field map. Inserting an existing key replaces its value in place,
/// keeping the key's original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, CellValue)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Month classification attached to a record, tagged by the evidence it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Month {
    /// Calendar name found in a column label.
    Name(&'static str),
    /// Month number (1–12) parsed out of a cell value.
    Number(u32),
    /// Name of the sheet the row came from, taken verbatim.
    Sheet(String),
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Month::Name(name) => f.write_str(name),
            Month::Number(n) => write!(f, "{}", n),
            Month::Sheet(name) => f.write_str(name),
        }
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Month::Name(name) => serializer.serialize_str(name),
            Month::Number(n) => serializer.serialize_u32(*n),
            Month::Sheet(name) => serializer.serialize_str(name),
        }
    }
}

/// One normalized row, ready to be stored as a schema-less JSON document.
///
/// Serializes flat: data fields in column order, then `month` (null when
/// undetermined), then `source_file`. A data column named like a reserved
/// key is shadowed by the reserved value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Fields,
    pub month: Option<Month>,
    pub source_file: Option<String>,
}

impl Record {
    pub fn new(fields: Fields, month: Option<Month>, source_file: Option<String>) -> Self {
        Self {
            fields,
            month,
            source_file,
        }
    }
}

fn is_reserved(key: &str) -> bool {
    key == MONTH_KEY || key == SOURCE_FILE_KEY
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.fields.iter().filter(|(k, _)| !is_reserved(k)) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(MONTH_KEY, &self.month)?;
        if let Some(source) = &self.source_file {
            map.serialize_entry(SOURCE_FILE_KEY, source)?;
        }
        map.end()
    }
}
