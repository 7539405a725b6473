//! Renders records as a CSV table that spreadsheet tools open with the right encoding.
//!
//! The output starts with a UTF-8 byte-order mark, followed by a `date,category,amount,note` header
//! row and one row per entry, in the order given.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Entry, DATE_FORMAT};
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// The UTF-8 byte-order mark.
pub const BOM: &str = "\u{feff}";

const HEADER: [&str; 4] = ["date", "category", "amount", "note"];

#[derive(Debug, Serialize)]
struct Row<'a> {
    date: String,
    category: &'static str,
    amount: String,
    note: &'a str,
}

impl<'a> From<&'a Entry> for Row<'a> {
    fn from(entry: &'a Entry) -> Self {
        let record = entry.record();
        Self {
            date: record.date.format(DATE_FORMAT).to_string(),
            category: record.category.label(),
            amount: record.amount.to_string(),
            note: &record.note,
        }
    }
}

/// Renders `entries` to CSV bytes. The header is written even when there are no entries.
pub fn render(entries: &[Entry]) -> Result<Vec<u8>> {
    render_inner(entries).pub_result(ErrorType::Io)
}

fn render_inner(entries: &[Entry]) -> Res<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BOM.as_bytes().to_vec());
    wtr.write_record(HEADER)?;
    for entry in entries {
        wtr.serialize(Row::from(entry))?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("Unable to finish writing CSV: {}", e.error()))
}

/// Renders `entries` and writes them to `path`, replacing any existing file.
pub fn write_file(path: &Path, entries: &[Entry]) -> Result<()> {
    let data = render(entries)?;
    utils::write_atomic(path, data)
        .with_context(|| format!("Unable to write export to {}", path.display()))
        .pub_result(ErrorType::Io)?;
    debug!("Exported {} record(s) to {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::test::{entries, test_record};
    use tempfile::TempDir;

    #[test]
    fn test_render_empty_has_bom_and_header() {
        let bytes = render(&[]).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "\u{feff}date,category,amount,note\n"
        );
    }

    #[test]
    fn test_render_rows_in_order() {
        let rows = entries(vec![
            test_record("2024-01-06", Category::Food, 20, ""),
            test_record("2024-01-05", Category::Transport, 50, "bus, monthly"),
        ]);
        let text = String::from_utf8(render(&rows).unwrap()).unwrap();
        let text = text.strip_prefix(BOM).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,category,amount,note",
                "2024-01-06,Food,20,",
                "2024-01-05,Transport,50,\"bus, monthly\"",
            ]
        );
    }

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let rows = entries(vec![test_record("2024-01-05", Category::Other, 3, "gift")]);
        write_file(&path, &rows).unwrap();
        let text = utils::read(&path).unwrap();
        assert!(text.starts_with(BOM));
        assert!(text.ends_with("2024-01-05,Other,3,gift\n"));
    }

    #[test]
    fn test_write_file_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_file(&path, &[]).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }
}
