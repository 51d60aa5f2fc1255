// src/process/classify.rs
use tracing::debug;

use crate::process::calendar::Calendar;

/// Columns whose label contains one particular month name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthColumns {
    pub month: &'static str,
    /// Indices into the sheet's header list.
    pub columns: Vec<usize>,
}

/// Partition of a sheet's columns into month-bearing groups and base columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedColumns {
    /// One group per month that occurs in at least one label, in calendar order.
    /// A label naming two months sits in both groups.
    pub months: Vec<MonthColumns>,
    /// Columns naming no month at all.
    pub base: Vec<usize>,
}

impl ClassifiedColumns {
    /// No label mentions a month; rows must be dated from their values instead.
    pub fn is_monthless(&self) -> bool {
        self.months.is_empty()
    }
}

pub fn classify(headers: &[String], calendar: Calendar) -> ClassifiedColumns {
    let matches: Vec<Vec<&'static str>> =
        headers.iter().map(|h| calendar.match_label(h)).collect();

    let base: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_empty())
        .map(|(i, _)| i)
        .collect();

    let months: Vec<MonthColumns> = calendar
        .names()
        .iter()
        .filter_map(|&month| {
            let columns: Vec<usize> = matches
                .iter()
                .enumerate()
                .filter(|(_, m)| m.contains(&month))
                .map(|(i, _)| i)
                .collect();
            (!columns.is_empty()).then_some(MonthColumns { month, columns })
        })
        .collect();

    debug!(
        columns = headers.len(),
        base = base.len(),
        months = ?months.iter().map(|m| m.month).collect::<Vec<_>>(),
        "classified columns"
    );

    ClassifiedColumns { months, base }
}
