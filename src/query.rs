//! Read-only views derived from a snapshot of records.
//!
//! Every function here takes a slice of entries and returns newly allocated results. Nothing in this
//! module can change the store, and the results stay valid after the store changes, so edits and
//! deletes triggered from a displayed view always go back through the store by `RecordId`.

use crate::model::{Amount, Category, Entry, YearMonth, DATE_FORMAT};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Returns the entries whose date falls in `month`, in their original order. `None` returns every
/// entry.
pub fn filter_by_month(entries: &[Entry], month: Option<YearMonth>) -> Vec<Entry> {
    match month {
        None => entries.to_vec(),
        Some(month) => entries
            .iter()
            .filter(|e| month.contains(e.record.date))
            .cloned()
            .collect(),
    }
}

/// Returns the entries whose category label or note contains `keyword`, ignoring case. A blank
/// keyword returns every entry.
pub fn filter_by_keyword(entries: &[Entry], keyword: &str) -> Vec<Entry> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| {
            e.record.category.label().to_lowercase().contains(&keyword)
                || e.record.note.to_lowercase().contains(&keyword)
        })
        .cloned()
        .collect()
}

/// Entries in date order. Only `sort_by_date` creates one, which is what lets
/// `group_consecutive_by_date` rely on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sorted {
    ascending: bool,
    entries: Vec<Entry>,
}

impl Sorted {
    pub fn ascending(&self) -> bool {
        self.ascending
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl Deref for Sorted {
    type Target = [Entry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

/// Sorts entries by date. The sort is stable: entries with the same date keep their insertion
/// order in both directions.
pub fn sort_by_date(entries: &[Entry], ascending: bool) -> Sorted {
    let mut entries = entries.to_vec();
    if ascending {
        entries.sort_by_key(|e| e.record.date);
    } else {
        entries.sort_by(|a, b| b.record.date.cmp(&a.record.date));
    }
    Sorted { ascending, entries }
}

/// One row of a date-grouped listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedRow {
    /// The date to display, or `None` when it repeats the row above.
    pub display_date: Option<NaiveDate>,
    pub entry: Entry,
}

impl GroupedRow {
    /// The date as it should be displayed, blank for a repeated date.
    pub fn date_label(&self) -> String {
        self.display_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// Blanks the date of every row whose date equals the date of the row before it.
pub fn group_consecutive_by_date(sorted: &Sorted) -> Vec<GroupedRow> {
    let mut previous: Option<NaiveDate> = None;
    sorted
        .iter()
        .map(|entry| {
            let date = entry.record.date;
            let display_date = (previous != Some(date)).then_some(date);
            previous = Some(date);
            GroupedRow {
                display_date,
                entry: entry.clone(),
            }
        })
        .collect()
}

/// Totals amounts per category. Categories without entries are absent.
pub fn sum_by_category(entries: &[Entry]) -> BTreeMap<Category, Amount> {
    let mut sums = BTreeMap::new();
    for e in entries {
        *sums.entry(e.record.category).or_insert(Amount::ZERO) += e.record.amount;
    }
    sums
}

pub fn total(entries: &[Entry]) -> Amount {
    entries.iter().map(|e| e.record.amount).sum()
}

/// The total of the entries dated `date`, zero if there are none.
pub fn total_for_date(entries: &[Entry], date: NaiveDate) -> Amount {
    entries
        .iter()
        .filter(|e| e.record.date == date)
        .map(|e| e.record.amount)
        .sum()
}

/// The total of the entries dated within `month`, zero if there are none.
pub fn total_for_month(entries: &[Entry], month: YearMonth) -> Amount {
    entries
        .iter()
        .filter(|e| month.contains(e.record.date))
        .map(|e| e.record.amount)
        .sum()
}

/// The filters and ordering a front end asks for when displaying or exporting records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub month: Option<YearMonth>,
    pub keyword: String,
    pub ascending: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            month: None,
            keyword: String::new(),
            ascending: true,
        }
    }
}

impl Query {
    /// Applies the month filter, then the keyword filter, then sorts by date.
    pub fn run(&self, entries: &[Entry]) -> Sorted {
        let by_month = filter_by_month(entries, self.month);
        let by_keyword = filter_by_keyword(&by_month, &self.keyword);
        sort_by_date(&by_keyword, self.ascending)
    }
}

/// The figures shown alongside a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Totals per category over the filtered records.
    pub by_category: BTreeMap<Category, Amount>,
    /// The total over the filtered records.
    pub total: Amount,
    /// How many records were summarized.
    pub count: usize,
    /// The total spent on `today`, over all records.
    pub today: Amount,
    /// The total spent in the month of `today`, over all records.
    pub this_month: Amount,
}

impl Summary {
    pub fn new(filtered: &[Entry], all: &[Entry], today: NaiveDate) -> Self {
        Self {
            by_category: sum_by_category(filtered),
            total: total(filtered),
            count: filtered.len(),
            today: total_for_date(all, today),
            this_month: total_for_month(all, YearMonth::of(today)),
        }
    }
}
