use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::doc_type::DocType;
use crate::models::lenient::{int_or_string, opt_string_or_number, string_or_number};

/// Food group reference embedded in a food document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodGroup {
    #[serde(default, deserialize_with = "int_or_string")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
}

/// One branded product or ingredient record (`type = "FOOD"`).
///
/// Fields not modelled here are kept in `extra` so browse and lookup
/// responses pass the stored document through. Identifier fields accept
/// strings, numbers and `null`, and are always written back as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fdc_id: String,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub upc: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub food_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_group: Option<FoodGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(rename = "type", default = "food_doc_type")]
    pub doc_type: DocType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn food_doc_type() -> DocType {
    DocType::Food
}

/// Aggregate row returned by the counts endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocCount {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unmodelled_fields_survive_decode() {
        let doc = json!({
            "fdcId": "356425",
            "upc": "070038630012",
            "foodDescription": "MOCHI ICE CREAM BONBONS",
            "company": "G. T. Japan, Inc.",
            "dataSource": "LI",
            "foodGroup": {"id": 19, "description": "Sweets"},
            "ingredients": "ICE CREAM INGREDIENTS: MILK, CREAM",
            "type": "FOOD"
        });

        let food: Food = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(food.fdc_id, "356425");
        assert_eq!(food.food_group.as_ref().map(|g| g.id), Some(19));
        assert_eq!(food.doc_type, DocType::Food);

        let back = serde_json::to_value(&food).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_numeric_and_null_identifiers_decode() {
        let doc = json!({
            "fdcId": 356425,
            "upc": null,
            "foodDescription": null,
            "company": null,
            "foodGroup": {"id": "19", "description": "Sweets"},
            "type": "FOOD"
        });

        let food: Food = serde_json::from_value(doc).unwrap();
        assert_eq!(food.fdc_id, "356425");
        assert!(food.upc.is_none());
        assert_eq!(food.food_description, "");
        assert!(food.company.is_none());
        assert_eq!(food.food_group.map(|g| g.id), Some(19));
    }
}
