use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lenient::string_or_number;

/// One nutrient value on a food's panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientFoodBrowseItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub nutrient_number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub nutrient_name: String,
    #[serde(default)]
    pub value_per_portion: f64,
    #[serde(default, rename = "valuePer100UnitServing")]
    pub value_per_100_unit_serving: f64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
}

/// A food's nutrient panel: food-level fields plus its nutrient items in
/// query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientFoodBrowse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fdc_id: String,
    #[serde(default, rename = "foodDescription", deserialize_with = "string_or_number")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub portion: String,
    #[serde(default, rename = "company", deserialize_with = "string_or_number")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub upc: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub category: String,
    #[serde(default)]
    pub nutrients: Vec<NutrientFoodBrowseItem>,
}

impl NutrientFoodBrowse {
    /// Food-level view of a flat nutrient row. The returned panel has no
    /// nutrients attached.
    pub fn header_from_row(row: &Value) -> Result<Self, serde_json::Error> {
        let mut header = NutrientFoodBrowse::deserialize(row)?;
        header.nutrients.clear();
        Ok(header)
    }
}

impl NutrientFoodBrowseItem {
    /// Nutrient-level view of a flat nutrient row.
    pub fn from_row(row: &Value) -> Result<Self, serde_json::Error> {
        NutrientFoodBrowseItem::deserialize(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_panel() -> NutrientFoodBrowse {
        NutrientFoodBrowse {
            fdc_id: "356425".to_string(),
            description: "MOCHI ICE CREAM BONBONS".to_string(),
            portion: "1 PIECE".to_string(),
            manufacturer: "G. T. Japan, Inc.".to_string(),
            upc: "070038630012".to_string(),
            category: "Ice Cream".to_string(),
            nutrients: vec![
                NutrientFoodBrowseItem {
                    nutrient_number: "208".to_string(),
                    nutrient_name: "Energy".to_string(),
                    value_per_portion: 90.0,
                    value_per_100_unit_serving: 225.0,
                    unit: "kcal".to_string(),
                    derivation: Some("LCCS".to_string()),
                },
                NutrientFoodBrowseItem {
                    nutrient_number: "203".to_string(),
                    nutrient_name: "Protein".to_string(),
                    value_per_portion: 1.0,
                    value_per_100_unit_serving: 2.5,
                    unit: "g".to_string(),
                    derivation: None,
                },
            ],
        }
    }

    #[test]
    fn test_wire_round_trip_preserves_panel() {
        let panel = sample_panel();
        let encoded = serde_json::to_string(&panel).unwrap();
        let decoded: NutrientFoodBrowse = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.fdc_id, panel.fdc_id);
        assert_eq!(decoded.description, panel.description);
        assert_eq!(decoded.portion, panel.portion);
        assert_eq!(decoded.nutrients, panel.nutrients);
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(sample_panel()).unwrap();
        assert_eq!(value["foodDescription"], "MOCHI ICE CREAM BONBONS");
        assert_eq!(value["company"], "G. T. Japan, Inc.");
        assert_eq!(value["nutrients"][0]["valuePer100UnitServing"], 225.0);
        assert_eq!(value["nutrients"][0]["nutrientNumber"], "208");
        assert!(value["nutrients"][1].get("derivation").is_none());
    }

    #[test]
    fn test_flat_row_decodes_into_both_views() {
        let row = json!({
            "fdcId": 356425,
            "upc": "070038630012",
            "portion": "1 PIECE",
            "valuePerPortion": 90,
            "foodDescription": "MOCHI ICE CREAM BONBONS",
            "company": "G. T. Japan, Inc.",
            "category": "Ice Cream",
            "valuePer100UnitServing": 225,
            "unit": "kcal",
            "nutrientNumber": 208,
            "nutrientName": "Energy"
        });

        let header = NutrientFoodBrowse::header_from_row(&row).unwrap();
        assert_eq!(header.fdc_id, "356425");
        assert_eq!(header.manufacturer, "G. T. Japan, Inc.");
        assert!(header.nutrients.is_empty());

        let item = NutrientFoodBrowseItem::from_row(&row).unwrap();
        assert_eq!(item.nutrient_number, "208");
        assert_eq!(item.value_per_portion, 90.0);
        assert_eq!(item.value_per_100_unit_serving, 225.0);
    }
}
