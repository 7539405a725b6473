use crate::commands::Out;
use crate::config::OnCorrupt;
use crate::{Config, Result};
use std::path::Path;

/// Creates the expenses home directory, its backups subdirectory and an initial `config.json`.
///
/// # Arguments
/// - `expenses_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/expenses`
/// - `backup_copies` - How many backups of the ledger file to keep.
/// - `data_file` - Where the ledger lives. Relative paths are resolved against `expenses_home`.
/// - `on_corrupt` - What to do at startup when the ledger file cannot be read.
///
/// # Errors
/// - Returns an error if any file operations fail or if the home directory is already set up.
pub fn init(
    expenses_home: &Path,
    backup_copies: u32,
    data_file: Option<&Path>,
    on_corrupt: OnCorrupt,
) -> Result<Out<()>> {
    let config = Config::create(
        expenses_home,
        backup_copies,
        data_file.map(Path::to_path_buf),
        on_corrupt,
    )
    .map_err(|e| e.context("Unable to create the expenses directory and config"))?;
    Ok(format!(
        "Successfully created the expenses directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use tempfile::TempDir;

    #[test]
    fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        let out = init(&home, 4, None, OnCorrupt::StartEmpty).unwrap();
        assert!(out.message().starts_with("Successfully created"));

        let config = Config::load(&home).unwrap();
        assert_eq!(config.backup_copies(), 4);
        assert_eq!(config.on_corrupt(), OnCorrupt::StartEmpty);
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), 5, None, OnCorrupt::Abort).unwrap();
        let err = init(dir.path(), 5, None, OnCorrupt::Abort).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().starts_with("Unable to create"));
    }
}
