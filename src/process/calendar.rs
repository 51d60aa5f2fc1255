// src/process/calendar.rs
use serde::{Deserialize, Serialize};

const RUSSIAN: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

const ENGLISH: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ENGLISH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Separators dropped together with a month name when de-suffixing a label.
const SEPARATORS: [char; 2] = ['_', ' '];

/// The fixed 12-name month vocabulary column labels are matched against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Calendar {
    /// Nominative Russian names, `Январь` … `Декабрь`.
    #[default]
    Russian,
    /// `January` … `December`.
    English,
    /// `Jan` … `Dec`.
    EnglishShort,
}

impl Calendar {
    pub fn names(self) -> &'static [&'static str; 12] {
        match self {
            Calendar::Russian => &RUSSIAN,
            Calendar::English => &ENGLISH,
            Calendar::EnglishShort => &ENGLISH_SHORT,
        }
    }

    /// Every vocabulary name occurring in `label`, in calendar order.
    /// Case-sensitive substring test.
    pub fn match_label(self, label: &str) -> Vec<&'static str> {
        self.names()
            .iter()
            .copied()
            .filter(|name| label.contains(name))
            .collect()
    }
}

/// Remove every occurrence of `month` from `label`, together with one
/// adjoining `_`/space separator (the preceding one if present, else the
/// following one), then trim leftover separators.
///
/// `"Sales_Jan"`, `"Jan_Sales"` and `"Sales Jan"` all become `"Sales"`.
/// A label that is nothing but the month name is returned unchanged.
pub fn strip_month(label: &str, month: &str) -> String {
    if month.is_empty() {
        return label.to_string();
    }

    let mut out = label.to_string();
    while let Some(start) = out.find(month) {
        let end = start + month.len();
        let before = out[..start]
            .chars()
            .next_back()
            .filter(|c| SEPARATORS.contains(c));
        let (cut_start, cut_end) = match before {
            Some(c) => (start - c.len_utf8(), end),
            None => {
                let after = out[end..]
                    .chars()
                    .next()
                    .filter(|c| SEPARATORS.contains(c));
                (start, end + after.map_or(0, char::len_utf8))
            }
        };
        out.replace_range(cut_start..cut_end, "");
    }

    let trimmed = out
        .trim_matches(|c: char| SEPARATORS.contains(&c))
        .trim();
    if trimmed.is_empty() {
        label.to_string()
    } else {
        trimmed.to_string()
    }
}
