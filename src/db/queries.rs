use serde_json::{json, Map, Value};

use crate::db::id_list::{build_id_list, composite_keys, QueryError};
use crate::db::{SearchQuery, Statement};
use crate::models::doc_type::DocType;
use crate::models::request::{
    BrowseRequest, DictionaryRequest, FoodGroupFilter, NutrientReport, SearchSpec, SearchType,
};

/// Field nutrient rows are grouped by. Statements feeding the grouped
/// aggregation must sort on it.
pub const NUTRIENT_GROUP_KEY: &str = "fdcId";

const PANEL_PROJECTION: &str = "nutrient.fdcId, nutrient.upc, nutrient.portion, \
     nutrient.portionValue AS valuePerPortion, nutrient.foodDescription, nutrient.company, \
     nutrient.category, nutrient.valuePer100UnitServing, nutrient.unit, \
     nutrient.nutrientNumber, nutrient.nutrientName";

const PANELS_PROJECTION: &str = "nutrient.fdcId, nutrient.upc, nutrient.servingSizes, \
     nutrient.foodDescription, nutrient.company, nutrient.category, nutrient.derivation, \
     nutrient.valuePer100UnitServing, nutrient.portion, nutrient.portionValue AS valuePerPortion, \
     nutrient.unit, nutrient.nutrientNumber, nutrient.nutrientName";

const REPORT_PROJECTION: &str = "nutrient.fdcId, nutrient.upc, nutrient.foodDescription, \
     nutrient.company, nutrient.nutrientNumber, nutrient.nutrientName, nutrient.unit, \
     nutrient.portion, nutrient.portionValue AS valuePerPortion, nutrient.valuePer100UnitServing";

/// Legacy tags the branded-foods source is stored under.
const BFPD_SOURCES: [&str; 2] = ["LI", "GDSN"];

/// Builds every statement the API issues against one bucket.
///
/// Free-text values are always bound as parameters. Only whitelisted field
/// names, sort keywords, parsed integers and allow-listed identifier lists
/// are written into statement text.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    keyspace: String,
    fts_index: String,
}

impl QueryBuilder {
    pub fn new(bucket: &str, fts_index: &str) -> Self {
        Self {
            keyspace: format!("`{}`", bucket.replace('`', "")),
            fts_index: fts_index.to_string(),
        }
    }

    /// Look up the fdcId of the food carrying a UPC/GTIN.
    pub fn resolve_upc(&self, upc: &str) -> Statement {
        Statement::new(format!(
            "SELECT RAW food.fdcId FROM {} AS food WHERE food.upc = $upc AND food.type = $type",
            self.keyspace
        ))
        .bind("upc", upc)
        .bind("type", DocType::Food.as_wire())
    }

    /// Foods for an explicit list of fdcIds.
    pub fn foods_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Statement, QueryError> {
        let list = build_id_list(ids)?;
        Ok(Statement::new(format!(
            "SELECT RAW food FROM {} AS food WHERE food.type = $type AND food.fdcId IN {list}",
            self.keyspace
        ))
        .bind("type", DocType::Food.as_wire()))
    }

    pub fn browse(&self, req: &BrowseRequest) -> Statement {
        let mut predicate = String::from("food.type = $type");
        let mut fg_description = None;
        let mut source = None;

        match &req.food_group {
            Some(FoodGroupFilter::Id(id)) => {
                predicate.push_str(&format!(" AND food.foodGroup.id = {id}"));
            }
            Some(FoodGroupFilter::Description(description)) => {
                predicate.push_str(" AND food.foodGroup.description = $fgDescription");
                fg_description = Some(description.clone());
            }
            None => {}
        }

        match req.source {
            Some(DocType::Bfpd) => {
                let [a, b] = BFPD_SOURCES;
                predicate.push_str(&format!(
                    " AND ( food.dataSource = \"{a}\" OR food.dataSource = \"{b}\" )"
                ));
            }
            Some(other) => {
                predicate.push_str(" AND food.dataSource = $source");
                source = Some(other.as_wire());
            }
            None => {}
        }

        let mut stmt = Statement::new(format!(
            "SELECT RAW food FROM {} AS food WHERE {predicate} ORDER BY food.{} {} LIMIT $limit OFFSET $offset",
            self.keyspace,
            req.sort.field(),
            req.order.keyword(),
        ))
        .bind("type", DocType::Food.as_wire())
        .bind("limit", req.max)
        .bind("offset", req.offset());

        if let Some(description) = fg_description {
            stmt = stmt.bind("fgDescription", description);
        }
        if let Some(source) = source {
            stmt = stmt.bind("source", source);
        }
        stmt
    }

    pub fn dictionary(&self, req: &DictionaryRequest) -> Statement {
        Statement::new(format!(
            "SELECT RAW doc FROM {} AS doc WHERE doc.type = $type ORDER BY META(doc).id LIMIT $limit OFFSET $offset",
            self.keyspace
        ))
        .bind("type", req.kind.as_wire())
        .bind("limit", req.max)
        .bind("offset", req.offset)
    }

    /// Document count for any `type` value, known to [`DocType`] or not.
    pub fn count(&self, doc_type: &str) -> Statement {
        Statement::new(format!(
            "SELECT COUNT(*) AS count FROM {} AS doc WHERE doc.type = $type",
            self.keyspace
        ))
        .bind("type", doc_type)
    }

    /// Nutrient rows for one food, optionally limited to some nutrient
    /// numbers.
    pub fn nutrient_panel<N: AsRef<str>>(
        &self,
        fdc_id: &str,
        nutrients: &[N],
    ) -> Result<Statement, QueryError> {
        let filter = if nutrients.is_empty() {
            None
        } else {
            Some(build_id_list(&composite_keys(&[fdc_id], nutrients))?)
        };

        let stmt = match filter {
            Some(keys) => Statement::new(format!(
                "SELECT {PANEL_PROJECTION} FROM {} AS nutrient WHERE nutrient.type = $type AND META(nutrient).id IN {keys}",
                self.keyspace
            )),
            None => Statement::new(format!(
                "SELECT {PANEL_PROJECTION} FROM {} AS nutrient WHERE nutrient.type = $type AND nutrient.fdcId = $fdcId",
                self.keyspace
            ))
            .bind("fdcId", fdc_id),
        };
        Ok(stmt.bind("type", DocType::NutrientData.as_wire()))
    }

    /// Nutrient rows for several foods, sorted by [`NUTRIENT_GROUP_KEY`] so
    /// they can be grouped in one pass.
    pub fn nutrient_panels<S: AsRef<str>, N: AsRef<str>>(
        &self,
        ids: &[S],
        nutrients: &[N],
    ) -> Result<Statement, QueryError> {
        let predicate = if nutrients.is_empty() {
            format!("nutrient.fdcId IN {}", build_id_list(ids)?)
        } else {
            format!(
                "META(nutrient).id IN {}",
                build_id_list(&composite_keys(ids, nutrients))?
            )
        };

        let mut stmt = Statement::new(format!(
            "SELECT {PANELS_PROJECTION} FROM {} AS nutrient WHERE nutrient.type = $type AND {predicate} ORDER BY nutrient.{NUTRIENT_GROUP_KEY}",
            self.keyspace
        ))
        .bind("type", DocType::NutrientData.as_wire());
        stmt.ordered_by = Some(NUTRIENT_GROUP_KEY);
        Ok(stmt)
    }

    pub fn nutrient_report(&self, report: &NutrientReport) -> Statement {
        let field = report.sort.field();
        let mut predicate = format!(
            "nutrient.type = $type AND nutrient.{field} BETWEEN $valueGTE AND $valueLTE"
        );
        if report.nutrient_number.is_some() {
            predicate.push_str(" AND nutrient.nutrientNumber = $nutrientNumber");
        }

        let mut stmt = Statement::new(format!(
            "SELECT {REPORT_PROJECTION} FROM {} AS nutrient WHERE {predicate} ORDER BY nutrient.{field} {} LIMIT $limit OFFSET $offset",
            self.keyspace,
            report.order.keyword(),
        ))
        .bind("type", DocType::NutrientData.as_wire())
        .bind("valueGTE", report.value_gte)
        .bind("valueLTE", report.value_lte)
        .bind("limit", report.max)
        .bind("offset", report.offset());

        if let Some(number) = &report.nutrient_number {
            stmt = stmt.bind("nutrientNumber", number.as_str());
        }
        stmt
    }

    pub fn search(&self, spec: &SearchSpec) -> SearchQuery {
        let operator = match spec.search_type {
            SearchType::Match => "match",
            SearchType::Phrase => "match_phrase",
            SearchType::Regex => "regexp",
        };
        let mut query = Map::new();
        query.insert(operator.to_string(), Value::String(spec.query.clone()));
        if let Some(field) = &spec.field {
            query.insert("field".to_string(), Value::String(field.clone()));
        }

        SearchQuery {
            index: self.fts_index.clone(),
            body: json!({
                "query": query,
                "size": spec.max,
                "from": spec.offset,
            }),
        }
    }

    /// Keyed fetch of several documents, used to hydrate search hits.
    pub fn documents_by_keys(&self, keys: &[String]) -> Statement {
        Statement::new(format!(
            "SELECT META(doc).id AS id, doc FROM {} AS doc USE KEYS $keys",
            self.keyspace
        ))
        .bind("keys", keys.to_vec())
    }

    pub fn get_by_key(&self, key: &str) -> Statement {
        Statement::new(format!("SELECT RAW doc FROM {} AS doc USE KEYS $key", self.keyspace))
            .bind("key", key)
    }

    pub fn upsert(&self, key: &str, doc: &Value) -> Statement {
        Statement::new(format!(
            "UPSERT INTO {} (KEY, VALUE) VALUES ($key, $doc)",
            self.keyspace
        ))
        .bind("key", key)
        .bind("doc", doc.clone())
    }

    pub fn delete_by_key(&self, key: &str) -> Statement {
        Statement::new(format!(
            "DELETE FROM {} AS doc USE KEYS $key RETURNING META(doc).id",
            self.keyspace
        ))
        .bind("key", key)
    }
}
