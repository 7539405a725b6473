//! Export command handler.

use crate::commands::{open_store, Out};
use crate::query::Query;
use crate::{export, Config, Result};
use std::path::Path;

/// Writes the expenses matching `query` to `output` as CSV and returns how many were written.
pub fn export(config: Config, query: Query, output: &Path) -> Result<Out<usize>> {
    let store = open_store(&config)?;
    let sorted = query.run(store.entries());
    export::write_file(output, &sorted)?;
    Ok(Out::new(
        format!("Exported {} expense(s) to {}", sorted.len(), output.display()),
        sorted.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::utils;

    #[test]
    fn test_export() {
        let env = TestEnv::new();
        env.insert_test_records();
        let output = env.config().root().join("january.csv");
        let query = Query {
            ascending: false,
            ..Default::default()
        };

        let out = export(env.config(), query, &output).unwrap();
        assert_eq!(out.structure(), Some(&3));

        let text = utils::read(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "\u{feff}date,category,amount,note",
                "2024-01-06,Food,20,",
                "2024-01-05,Food,100,noodles",
                "2024-01-05,Transport,50,bus pass",
            ]
        );
    }
}
