use serde::{Deserialize, Serialize};

/// The closed set of expense categories.
///
/// Categories serialize with their English label. Ledger files written by the first, Chinese
/// language version of the app used localized labels; those are accepted as aliases when reading
/// so that old files still load.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Category {
    #[serde(alias = "餐飲")]
    Food,
    #[serde(alias = "交通")]
    Transport,
    #[serde(alias = "娛樂")]
    Entertainment,
    #[serde(alias = "生活用品")]
    Household,
    #[serde(alias = "其他")]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Household,
        Category::Other,
    ];

    /// The label shown to users and written to files, e.g. `Food`.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => FOOD_STR,
            Category::Transport => TRANSPORT_STR,
            Category::Entertainment => ENTERTAINMENT_STR,
            Category::Household => HOUSEHOLD_STR,
            Category::Other => OTHER_STR,
        }
    }
}

const FOOD_STR: &str = "Food";
const TRANSPORT_STR: &str = "Transport";
const ENTERTAINMENT_STR: &str = "Entertainment";
const HOUSEHOLD_STR: &str = "Household";
const OTHER_STR: &str = "Other";

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_matches_label() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.label());
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Category::from_str("Transport").unwrap(), Category::Transport);
        assert!(Category::from_str("Groceries").is_err());
    }

    #[test]
    fn test_localized_aliases() {
        assert_eq!(Category::from_str("餐飲").unwrap(), Category::Food);
        assert_eq!(Category::from_str("交通").unwrap(), Category::Transport);
        assert_eq!(Category::from_str("娛樂").unwrap(), Category::Entertainment);
        assert_eq!(Category::from_str("生活用品").unwrap(), Category::Household);
        assert_eq!(Category::from_str("其他").unwrap(), Category::Other);
    }

    #[test]
    fn test_serialize_uses_english_label() {
        let c: Category = serde_json::from_str("\"生活用品\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"Household\"");
    }
}
