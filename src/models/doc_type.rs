use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Logical document kinds stored in the single heterogeneous bucket.
///
/// The wire form is the value of each document's `type` field. Strings that
/// do not name a known kind map to [`DocType::Unknown`] instead of failing,
/// so callers must match on it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
pub enum DocType {
    #[strum(serialize = "FOOD")]
    #[serde(rename = "FOOD")]
    Food,
    #[strum(serialize = "NUTDATA")]
    #[serde(rename = "NUTDATA")]
    NutrientData,
    #[strum(serialize = "NUT")]
    #[serde(rename = "NUT")]
    NutrientDictionary,
    #[strum(serialize = "DERV")]
    #[serde(rename = "DERV")]
    Derivation,
    #[strum(serialize = "FGSR")]
    #[serde(rename = "FGSR")]
    FoodGroupSr,
    #[strum(serialize = "FGFNDDS")]
    #[serde(rename = "FGFNDDS")]
    FoodGroupFndds,
    #[strum(serialize = "FGGPC")]
    #[serde(rename = "FGGPC")]
    FoodGroupGpc,
    #[strum(serialize = "USER")]
    #[serde(rename = "USER")]
    User,
    #[strum(serialize = "BFPD")]
    #[serde(rename = "BFPD")]
    Bfpd,
    #[strum(serialize = "SR")]
    #[serde(rename = "SR")]
    Sr,
    #[strum(serialize = "FNDDS")]
    #[serde(rename = "FNDDS")]
    Fndds,
    #[strum(disabled)]
    #[serde(other)]
    Unknown,
}

impl DocType {
    /// Map a wire string to its kind, falling back to the `Unknown` sentinel.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or(DocType::Unknown)
    }

    /// Wire representation. `Unknown` has none and renders as an empty string.
    pub fn as_wire(self) -> &'static str {
        match self {
            DocType::Food => "FOOD",
            DocType::NutrientData => "NUTDATA",
            DocType::NutrientDictionary => "NUT",
            DocType::Derivation => "DERV",
            DocType::FoodGroupSr => "FGSR",
            DocType::FoodGroupFndds => "FGFNDDS",
            DocType::FoodGroupGpc => "FGGPC",
            DocType::User => "USER",
            DocType::Bfpd => "BFPD",
            DocType::Sr => "SR",
            DocType::Fndds => "FNDDS",
            DocType::Unknown => "",
        }
    }

    /// Data source tags accepted by the browse `source` filter.
    pub fn is_source(self) -> bool {
        matches!(self, DocType::Bfpd | DocType::Sr | DocType::Fndds)
    }

    /// Dictionary kinds served by the dictionary browse endpoint.
    pub fn is_dictionary(self) -> bool {
        matches!(
            self,
            DocType::NutrientDictionary
                | DocType::Derivation
                | DocType::FoodGroupSr
                | DocType::FoodGroupFndds
                | DocType::FoodGroupGpc
        )
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_map_both_ways() {
        for (wire, kind) in [
            ("FOOD", DocType::Food),
            ("NUTDATA", DocType::NutrientData),
            ("NUT", DocType::NutrientDictionary),
            ("DERV", DocType::Derivation),
            ("FGSR", DocType::FoodGroupSr),
            ("FGFNDDS", DocType::FoodGroupFndds),
            ("FGGPC", DocType::FoodGroupGpc),
            ("USER", DocType::User),
            ("BFPD", DocType::Bfpd),
            ("SR", DocType::Sr),
            ("FNDDS", DocType::Fndds),
        ] {
            assert_eq!(DocType::from_wire(wire), kind);
            assert_eq!(kind.as_wire(), wire);
            assert_eq!(kind.to_string(), wire);
        }
    }

    #[test]
    fn test_unrecognized_string_is_unknown_sentinel() {
        assert_eq!(DocType::from_wire("GDSN"), DocType::Unknown);
        assert_eq!(DocType::from_wire(""), DocType::Unknown);
        assert_eq!(DocType::from_wire("food"), DocType::Unknown);
        assert_eq!(DocType::Unknown.as_wire(), "");
    }

    #[test]
    fn test_unknown_type_field_deserializes_to_sentinel() {
        let kind: DocType = serde_json::from_str("\"COUNTS\"").unwrap();
        assert_eq!(kind, DocType::Unknown);
    }

    #[test]
    fn test_source_and_dictionary_groups() {
        assert!(DocType::Bfpd.is_source());
        assert!(DocType::Sr.is_source());
        assert!(!DocType::Food.is_source());
        assert!(DocType::FoodGroupGpc.is_dictionary());
        assert!(!DocType::User.is_dictionary());
        assert!(!DocType::Unknown.is_dictionary());
    }
}
