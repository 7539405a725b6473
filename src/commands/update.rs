//! Update command handler.

use crate::args::UpdateArgs;
use crate::commands::{open_store_for_edit, Out};
use crate::error::Error;
use crate::model::Entry;
use crate::{Config, Result};

/// Applies the fields given in `args` to an existing expense and returns the updated expense.
///
/// # Errors
/// - `ErrorType::Validation` if no fields were given or the new amount is not greater than zero.
/// - `ErrorType::NotFound` if the id does not exist.
pub fn update(config: Config, args: UpdateArgs) -> Result<Out<Entry>> {
    let updates = args.updates();
    if updates.is_empty() {
        return Err(Error::validation(
            "Nothing to update, pass at least one of --date, --category, --amount or --note",
        ));
    }

    let id = args.id();
    let mut store = open_store_for_edit(&config)?;
    let record = updates.apply(store.get(id)?);
    store.update(id, record.clone())?;

    Ok(Out::new(format!("Updated expense {id}"), Entry::new(id, record)))
}
