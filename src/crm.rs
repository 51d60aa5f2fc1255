// src/crm.rs
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::record::MONTH_KEY;

/// Bucket for records stored without a month.
pub const NO_MONTH_LABEL: &str = "Без месяца";

pub type Grouped = BTreeMap<String, Vec<Map<String, Value>>>;

/// Group stored documents by their `month` value, dropping `month` from
/// each entry. Strings key as-is, numbers by their decimal text; missing
/// or null months go to `fallback`.
pub fn group_by_month<I>(entries: I, fallback: &str) -> Grouped
where
    I: IntoIterator<Item = Value>,
{
    let mut grouped = Grouped::new();
    for entry in entries {
        let Value::Object(mut data) = entry else {
            warn!("skipping stored entry that is not an object");
            continue;
        };
        let bucket = match data.remove(MONTH_KEY) {
            Some(Value::String(s)) => s,
            None | Some(Value::Null) => fallback.to_string(),
            Some(other) => other.to_string(),
        };
        grouped.entry(bucket).or_default().push(data);
    }
    grouped
}
