//! Reshaping flat nutrient rows into per-food panels.
//!
//! Grouping is a single forward pass that starts a new group whenever the
//! key changes. Rows must arrive sorted by the key; unsorted input is not
//! rejected, it produces one group per run of equal keys.

use serde_json::Value;
use tracing::warn;

use crate::models::nutrient::{NutrientFoodBrowse, NutrientFoodBrowseItem};

/// Whether `keys` never decreases, i.e. grouping will not fragment.
pub fn is_grouped<K: PartialOrd>(keys: &[K]) -> bool {
    keys.windows(2).all(|w| w[0] <= w[1])
}

/// Group consecutive rows sharing a key.
///
/// Each row yields a parent view and a child view. The parent is taken from
/// the first row of each run and its children are the run's child views in
/// input order. The last open group is always emitted.
pub fn group_consecutive<R, K, P, C>(
    rows: impl IntoIterator<Item = R>,
    key: impl Fn(&R) -> K,
    parent: impl Fn(&R) -> P,
    child: impl Fn(&R) -> C,
) -> Vec<(P, Vec<C>)>
where
    K: PartialEq,
{
    let mut groups = Vec::new();
    let mut open: Option<(K, P, Vec<C>)> = None;

    for row in rows {
        let k = key(&row);
        let item = child(&row);
        match open.as_mut() {
            Some((current, _, items)) if *current == k => items.push(item),
            _ => {
                if let Some((_, p, items)) = open.take() {
                    groups.push((p, items));
                }
                open = Some((k, parent(&row), vec![item]));
            }
        }
    }
    if let Some((_, p, items)) = open {
        groups.push((p, items));
    }
    groups
}

/// A row paired with both of its decoded views.
struct DecodedRow {
    header: NutrientFoodBrowse,
    item: NutrientFoodBrowseItem,
}

fn decode_rows(rows: Vec<Value>) -> Result<Vec<DecodedRow>, serde_json::Error> {
    rows.iter()
        .map(|row| {
            Ok(DecodedRow {
                header: NutrientFoodBrowse::header_from_row(row)?,
                item: NutrientFoodBrowseItem::from_row(row)?,
            })
        })
        .collect()
}

/// Nutrient panels for rows sorted by fdcId, one panel per food.
///
/// The trailing group is always emitted, so no rows yields a single empty
/// panel rather than an empty list.
pub fn group_nutrient_rows(rows: Vec<Value>) -> Result<Vec<NutrientFoodBrowse>, serde_json::Error> {
    let decoded = decode_rows(rows)?;

    let keys: Vec<&str> = decoded.iter().map(|r| r.header.fdc_id.as_str()).collect();
    if !is_grouped(&keys) {
        warn!(rows = keys.len(), "Nutrient rows are not sorted by fdcId; panels will fragment");
    }

    let mut panels: Vec<NutrientFoodBrowse> = group_consecutive(
        decoded,
        |r| r.header.fdc_id.clone(),
        |r| r.header.clone(),
        |r| r.item.clone(),
    )
    .into_iter()
    .map(|(mut panel, items)| {
        panel.nutrients = items;
        panel
    })
    .collect();

    if panels.is_empty() {
        panels.push(NutrientFoodBrowse::default());
    }
    Ok(panels)
}

/// The panel for a single food: food-level fields from the first row and
/// every row as a nutrient item. No rows yields an empty panel.
pub fn single_panel(rows: Vec<Value>) -> Result<NutrientFoodBrowse, serde_json::Error> {
    let decoded = decode_rows(rows)?;
    let mut panel = decoded
        .first()
        .map(|r| r.header.clone())
        .unwrap_or_default();
    panel.nutrients = decoded.into_iter().map(|r| r.item).collect();
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(fdc_id: &str, nutrient: &str, value: f64) -> Value {
        json!({
            "fdcId": fdc_id,
            "foodDescription": format!("FOOD {fdc_id}"),
            "company": "ACME",
            "portion": "1 CUP",
            "nutrientNumber": nutrient,
            "nutrientName": format!("Nutrient {nutrient}"),
            "valuePerPortion": value,
            "valuePer100UnitServing": value * 2.0,
            "unit": "g"
        })
    }

    fn rows(keys: &[&str]) -> Vec<Value> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| row(k, &format!("{}", 200 + i), i as f64))
            .collect()
    }

    #[test]
    fn test_sorted_rows_group_by_food() {
        let panels = group_nutrient_rows(rows(&["A", "A", "A", "B", "B", "C"])).unwrap();

        let ids: Vec<&str> = panels.iter().map(|p| p.fdc_id.as_str()).collect();
        let counts: Vec<usize> = panels.iter().map(|p| p.nutrients.len()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn test_items_keep_input_order_within_group() {
        let panels = group_nutrient_rows(rows(&["A", "A", "A"])).unwrap();
        let numbers: Vec<&str> = panels[0]
            .nutrients
            .iter()
            .map(|n| n.nutrient_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["200", "201", "202"]);
    }

    #[test]
    fn test_unsorted_rows_fragment() {
        // Known hazard: the pass trusts the upstream ORDER BY.
        let panels = group_nutrient_rows(rows(&["A", "B", "A"])).unwrap();

        let ids: Vec<&str> = panels.iter().map(|p| p.fdc_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "A"]);
        assert!(panels.iter().all(|p| p.nutrients.len() == 1));
    }

    #[test]
    fn test_parent_fields_come_from_first_row_of_group() {
        let mut input = rows(&["A", "A"]);
        input[1]["foodDescription"] = json!("SHOULD NOT WIN");
        let panels = group_nutrient_rows(input).unwrap();
        assert_eq!(panels[0].description, "FOOD A");
        assert_eq!(panels[0].manufacturer, "ACME");
        assert_eq!(panels[0].portion, "1 CUP");
    }

    #[test]
    fn test_single_row_and_empty_input() {
        let panels = group_nutrient_rows(rows(&["A"])).unwrap();
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].nutrients.len(), 1);

        let empty = group_nutrient_rows(Vec::new()).unwrap();
        assert_eq!(empty, vec![NutrientFoodBrowse::default()]);
        assert!(empty[0].nutrients.is_empty());
    }

    #[test]
    fn test_is_grouped() {
        assert!(is_grouped(&["A", "A", "B", "C"]));
        assert!(is_grouped::<&str>(&[]));
        assert!(!is_grouped(&["A", "B", "A"]));
    }

    #[test]
    fn test_generic_grouping_law() {
        let input = vec![(1, 'a'), (1, 'b'), (1, 'c'), (2, 'd'), (2, 'e'), (3, 'f')];
        let groups = group_consecutive(input, |r| r.0, |r| r.0, |r| r.1);
        assert_eq!(
            groups,
            vec![(1, vec!['a', 'b', 'c']), (2, vec!['d', 'e']), (3, vec!['f'])]
        );
    }

    #[test]
    fn test_single_panel_flattens_all_rows() {
        let panel = single_panel(rows(&["A", "A"])).unwrap();
        assert_eq!(panel.fdc_id, "A");
        assert_eq!(panel.nutrients.len(), 2);

        let empty = single_panel(Vec::new()).unwrap();
        assert_eq!(empty, NutrientFoodBrowse::default());
    }
}
