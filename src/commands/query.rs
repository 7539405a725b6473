//! Read-only commands: `list`, `show` and `summary`.

use crate::commands::{open_store, Out};
use crate::model::{Category, Entry, RecordId};
use crate::query::{self, GroupedRow, Query, Summary};
use crate::{Config, Result};
use chrono::NaiveDate;
use std::fmt::Write;

/// Lists the expenses matching `query` as a table in which a date is only printed on the first
/// row of each run of same-dated expenses.
pub fn list(config: Config, query: Query) -> Result<Out<Vec<GroupedRow>>> {
    let store = open_store(&config)?;
    let sorted = query.run(store.entries());
    let total = query::total(&sorted);
    let rows = query::group_consecutive_by_date(&sorted);

    let message = format!(
        "Listed {} of {} expense(s), totaling {}",
        rows.len(),
        store.len(),
        total.grouped()
    );
    let report = render_table(&rows);
    Ok(Out::new(message, rows).with_report(report))
}

/// Shows a single expense.
pub fn show(config: Config, id: RecordId) -> Result<Out<Entry>> {
    let store = open_store(&config)?;
    let entry = Entry::new(id, store.get(id)?.clone());
    let report = render_table(&query::group_consecutive_by_date(&query::sort_by_date(
        std::slice::from_ref(&entry),
        true,
    )));
    Ok(Out::new(format!("Found expense {id}"), entry).with_report(report))
}

/// Totals the expenses matching `query` per category. The today and this-month figures cover
/// every expense, regardless of the filters.
pub fn summary(config: Config, query: Query, today: NaiveDate) -> Result<Out<Summary>> {
    let store = open_store(&config)?;
    let filtered = query.run(store.entries());
    let summary = Summary::new(&filtered, store.entries(), today);

    let message = format!(
        "Summarized {} expense(s), totaling {}",
        summary.count,
        summary.total.grouped()
    );
    let report = render_summary(&summary);
    Ok(Out::new(message, summary).with_report(report))
}

const ID: &str = "ID";
const DATE: &str = "Date";
const CATEGORY: &str = "Category";
const AMOUNT: &str = "Amount";
const NOTE: &str = "Note";

fn render_table(rows: &[GroupedRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            let record = row.entry.record();
            [
                row.entry.id.to_string(),
                row.date_label(),
                record.category.to_string(),
                record.amount.grouped(),
                record.note.clone(),
            ]
        })
        .collect();

    let mut widths = [ID, DATE, CATEGORY, AMOUNT, NOTE].map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &[ID, DATE, CATEGORY, AMOUNT, NOTE], &widths);
    for row in &cells {
        push_row(&mut out, &row.each_ref().map(String::as_str), &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, cells: &[&str; 5], widths: &[usize; 5]) {
    let [id, date, category, amount, note] = *cells;
    let [w_id, w_date, w_category, w_amount, _] = *widths;
    // amounts are right aligned
    let _ = writeln!(
        out,
        "{id:>w_id$}  {date:<w_date$}  {category:<w_category$}  {amount:>w_amount$}  {note}"
    );
}

fn render_summary(summary: &Summary) -> String {
    let width = Category::ALL
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or_default()
        .max("This month".len());

    let mut out = String::new();
    for (category, amount) in &summary.by_category {
        let _ = writeln!(out, "{:<width$}  {:>14}", category.label(), amount.grouped());
    }
    let _ = writeln!(out, "{:<width$}  {:>14}", "Total", summary.total.grouped());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<width$}  {:>14}", "Today", summary.today.grouped());
    let _ = write!(
        out,
        "{:<width$}  {:>14}",
        "This month",
        summary.this_month.grouped()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::{Amount, YearMonth};
    use crate::test::{date, TestEnv};

    #[test]
    fn test_list_groups_dates() {
        let env = TestEnv::new();
        env.insert_test_records();

        let out = list(env.config(), Query::default()).unwrap();
        assert_eq!(out.message(), "Listed 3 of 3 expense(s), totaling 170.00");
        let labels: Vec<String> = out
            .structure()
            .unwrap()
            .iter()
            .map(GroupedRow::date_label)
            .collect();
        assert_eq!(labels, vec!["2024-01-05", "", "2024-01-06"]);

        let report = out.report().unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  Date"));
        assert!(lines[1].contains("2024-01-05"));
        assert!(lines[1].ends_with("noodles"));
        assert!(!lines[2].contains("2024-01-05"));
        assert!(lines[2].contains("Transport"));
    }

    #[test]
    fn test_list_filtered_descending() {
        let env = TestEnv::new();
        env.insert_test_records();
        let query = Query {
            month: YearMonth::new(2024, 1),
            keyword: "FOOD".to_string(),
            ascending: false,
        };
        let out = list(env.config(), query).unwrap();
        let ids: Vec<u64> = out
            .structure()
            .unwrap()
            .iter()
            .map(|row| row.entry.id.value())
            .collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(out.message(), "Listed 2 of 3 expense(s), totaling 120.00");
    }

    #[test]
    fn test_list_empty_ledger() {
        let env = TestEnv::new();
        let out = list(env.config(), Query::default()).unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.report().unwrap().lines().count(), 1);
    }

    #[test]
    fn test_show() {
        let env = TestEnv::new();
        let ids = env.insert_test_records();
        let out = show(env.config(), ids[1]).unwrap();
        assert_eq!(out.structure().unwrap().record.note, "bus pass");
        assert!(out.report().unwrap().contains("2024-01-05"));

        let err = show(env.config(), RecordId::new(42)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[test]
    fn test_summary() {
        let env = TestEnv::new();
        env.insert_test_records();
        let out = summary(env.config(), Query::default(), date("2024-01-05")).unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.by_category[&Category::Food], Amount::from(120));
        assert_eq!(summary.by_category[&Category::Transport], Amount::from(50));
        assert!(!summary.by_category.contains_key(&Category::Other));
        assert_eq!(summary.today, Amount::from(150));
        assert_eq!(summary.this_month, Amount::from(170));

        let report = out.report().unwrap();
        assert!(report.contains("Food"));
        assert!(report.contains("170.00"));
        assert!(!report.contains("Other"));
    }

    #[test]
    fn test_summary_filter_does_not_change_today() {
        let env = TestEnv::new();
        env.insert_test_records();
        let query = Query {
            keyword: "bus".to_string(),
            ..Default::default()
        };
        let out = summary(env.config(), query, date("2024-01-06")).unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.total, Amount::from(50));
        assert_eq!(summary.today, Amount::from(20));
    }
}
