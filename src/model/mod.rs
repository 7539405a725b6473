//! Types that represent the core data model, such as `Record` and `Category`.
mod amount;
mod category;
mod record;
mod year_month;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub(crate) use record::date_format;
pub use record::{Entry, Record, RecordId, RecordUpdates, DATE_FORMAT};
pub use year_month::{YearMonth, YearMonthError};
