use crate::model::{Amount, Category};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// The one textual date format used in ledger files, exports and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The store-assigned surrogate identifier of a record.
///
/// Ids are assigned from a counter that only moves forward, so an id keeps pointing at the same
/// record no matter how the records are later filtered, sorted, or how many others are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id after this one, or `None` if the id space is exhausted.
    pub fn next(&self) -> Option<RecordId> {
        self.0.checked_add(1).map(RecordId)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// A single expense entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub category: Category,
    pub amount: Amount,
    #[serde(default)]
    pub note: String,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        category: Category,
        amount: impl Into<Amount>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            category,
            amount: amount.into(),
            note: note.into(),
        }
    }
}

/// A record together with its id, as handed out by the store and carried through every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: Record,
}

impl Entry {
    pub fn new(id: RecordId, record: Record) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// A partial edit of a record. Fields that are `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RecordUpdates {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.category.is_none() && self.amount.is_none() && self.note.is_none()
    }

    /// Returns a copy of `record` with these updates applied.
    pub fn apply(&self, record: &Record) -> Record {
        Record {
            date: self.date.unwrap_or(record.date),
            category: self.category.unwrap_or(record.category),
            amount: self.amount.unwrap_or(record.amount),
            note: self.note.clone().unwrap_or_else(|| record.note.clone()),
        }
    }
}

/// Serializes a `NaiveDate` as `YYYY-MM-DD`, and only accepts that form when reading.
pub(crate) mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let date = NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}")))?;
        // chrono accepts unpadded fields such as 2024-1-5
        if date.format(DATE_FORMAT).to_string() != s {
            return Err(serde::de::Error::custom(format!(
                "invalid date '{s}': expected YYYY-MM-DD"
            )));
        }
        Ok(date)
    }
}
