//! Datastore documents and rows shaped like the production bucket

use serde_json::{json, Value};

pub const CHEDDAR_ID: &str = "356425";
pub const CHEDDAR_UPC: &str = "070038630012";
pub const CRACKER_ID: &str = "1105904";

pub fn food(fdc_id: &str, description: &str, upc: &str) -> Value {
    json!({
        "fdcId": fdc_id,
        "upc": upc,
        "foodDescription": description,
        "company": "ACME FOODS",
        "category": "Cheese",
        "foodGroup": { "id": 1, "description": "Dairy and Egg Products" },
        "dataSource": "LI",
        "type": "FOOD",
        "ingredients": "PASTEURIZED MILK, CHEESE CULTURE, SALT, ENZYMES"
    })
}

pub fn cheddar() -> Value {
    food(CHEDDAR_ID, "SHARP CHEDDAR CHEESE", CHEDDAR_UPC)
}

pub fn cracker() -> Value {
    food(CRACKER_ID, "WHEAT CRACKERS", "044000032029")
}

/// One flat nutrient data row as returned by the panel projections.
pub fn nutrient_row(fdc_id: &str, number: &str, name: &str, per_100: f64) -> Value {
    json!({
        "fdcId": fdc_id,
        "upc": CHEDDAR_UPC,
        "foodDescription": format!("FOOD {fdc_id}"),
        "company": "ACME FOODS",
        "category": "Cheese",
        "portion": "1 oz",
        "valuePerPortion": per_100 * 0.28,
        "valuePer100UnitServing": per_100,
        "unit": "g",
        "nutrientNumber": number,
        "nutrientName": name
    })
}

pub fn dictionary_entry(number: &str, name: &str) -> Value {
    json!({ "nutrientno": number, "name": name, "unit": "g", "type": "NUT" })
}
