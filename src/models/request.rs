//! Inbound request shapes and their normalization.
//!
//! Each wire struct is deserialized leniently (unparseable numbers fall back
//! to defaults, as the public API always has) and then normalized into a
//! validated request the query builder can consume without further checks.

use std::str::FromStr;

use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ApiError;
use crate::models::doc_type::DocType;

/// Upper bound on `max` for every paginated food endpoint.
pub const MAX_LIST_SIZE: i64 = 150;

/// Page size used when `max` is absent, unparseable or zero.
pub const DEFAULT_LIST_MAX: i64 = 50;

/// Page size used by dictionary browse when `max` is absent.
pub const DEFAULT_DICTIONARY_MAX: i64 = 300;

/// Upper bound of the nutrient value range when none is requested.
pub const DEFAULT_VALUE_CEILING: f64 = 100_000.0;

/// Largest row offset or page size a request may reach. Pages and sizes are
/// 32-bit on the wire.
pub const MAX_ROW_OFFSET: i64 = i32::MAX as i64;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Fields a food browse may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum BrowseSort {
    #[default]
    #[strum(serialize = "fdcId")]
    #[serde(rename = "fdcId")]
    FdcId,
    #[strum(serialize = "foodDescription")]
    #[serde(rename = "foodDescription")]
    FoodDescription,
    #[strum(serialize = "company")]
    #[serde(rename = "company")]
    Company,
}

impl BrowseSort {
    /// Document field the sort applies to.
    pub fn field(self) -> &'static str {
        match self {
            BrowseSort::FdcId => "fdcId",
            BrowseSort::FoodDescription => "foodDescription",
            BrowseSort::Company => "company",
        }
    }
}

/// Food group restriction on a browse, by numeric id or by description.
#[derive(Debug, Clone, PartialEq)]
pub enum FoodGroupFilter {
    Id(i64),
    Description(String),
}

impl FoodGroupFilter {
    /// A numeric value is always taken as an id.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => FoodGroupFilter::Id(id),
            Err(_) => FoodGroupFilter::Description(raw.to_string()),
        }
    }
}

fn lenient_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn page_size(raw: Option<i64>, default: i64) -> i64 {
    match raw {
        None | Some(0) => default,
        Some(n) => n,
    }
}

fn parse_choice<T: FromStr + Default>(raw: Option<&str>, message: &str) -> Result<T, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(T::default()),
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::Validation(message.to_string())),
    }
}

/// Row offset of `page` at `max` rows per page, rejected when it leaves the
/// 32-bit range instead of overflowing.
fn page_offset(page: i64, max: i64) -> Result<i64, ApiError> {
    page.checked_mul(max)
        .filter(|offset| *offset <= MAX_ROW_OFFSET)
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "page parameter {page} is out of range for a page size of {max}"
            ))
        })
}

fn validated<T: Validate<Context = ()>>(request: T) -> Result<T, ApiError> {
    request
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string().trim().to_string()))?;
    Ok(request)
}

/// Query string of `GET /foods/browse`.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    pub max: Option<String>,
    pub page: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub fg: Option<String>,
    pub source: Option<String>,
}

/// Validated food browse.
#[derive(Debug, Clone, Validate)]
pub struct BrowseRequest {
    #[garde(range(min = 1, max = MAX_LIST_SIZE))]
    pub max: i64,
    #[garde(range(min = 0))]
    pub page: i64,
    #[garde(skip)]
    pub sort: BrowseSort,
    #[garde(skip)]
    pub order: SortOrder,
    #[garde(skip)]
    pub food_group: Option<FoodGroupFilter>,
    #[garde(skip)]
    pub source: Option<DocType>,
}

impl BrowseRequest {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.max)
    }
}

impl BrowseParams {
    pub fn normalize(self) -> Result<BrowseRequest, ApiError> {
        let sort = parse_choice(
            self.sort.as_deref(),
            "Unrecognized sort parameter.  Must be 'company', 'foodDescription' or 'fdcId'",
        )?;
        let order = parse_choice(
            self.order.as_deref(),
            "Unrecognized order parameter.  Must be 'asc' or 'desc'",
        )?;

        let source = match self.source.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match DocType::from_wire(raw) {
                kind if kind.is_source() => Some(kind),
                _ => {
                    return Err(ApiError::Validation(
                        "Unrecognized source parameter.  Must be BFPD, SR or FNDDS".to_string(),
                    ))
                }
            },
        };

        let food_group = self
            .fg
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(FoodGroupFilter::parse);

        let max = page_size(lenient_number(self.max.as_deref()), DEFAULT_LIST_MAX);
        if max > MAX_LIST_SIZE {
            return Err(ApiError::Validation(format!(
                "max parameter {max} exceeds maximum allowed size of {MAX_LIST_SIZE}"
            )));
        }

        let page = lenient_number(self.page.as_deref()).unwrap_or(0).max(0);
        page_offset(page, max.max(0))?;

        validated(BrowseRequest {
            max,
            page,
            sort,
            order,
            food_group,
            source,
        })
    }
}

/// Query string of `GET /dictionary/{type}`.
#[derive(Debug, Default, Deserialize)]
pub struct DictionaryParams {
    pub max: Option<String>,
    pub page: Option<String>,
}

/// Validated dictionary browse.
#[derive(Debug, Clone, Copy)]
pub struct DictionaryRequest {
    pub kind: DocType,
    pub max: i64,
    pub offset: i64,
}

impl DictionaryParams {
    pub fn normalize(self, kind: &str) -> Result<DictionaryRequest, ApiError> {
        let kind = match DocType::from_wire(kind) {
            k if k.is_dictionary() => k,
            _ => {
                return Err(ApiError::Validation(
                    "one of type parameter is required: NUT, DERV, FGSR, FGFNDDS, FGGPC"
                        .to_string(),
                ))
            }
        };
        let max = match lenient_number(self.max.as_deref()) {
            Some(n) if n > 0 => n,
            _ => DEFAULT_DICTIONARY_MAX,
        };
        if max > MAX_ROW_OFFSET {
            return Err(ApiError::Validation(format!(
                "max parameter {max} exceeds maximum allowed size of {MAX_ROW_OFFSET}"
            )));
        }
        let page = lenient_number(self.page.as_deref()).unwrap_or(0).max(0);
        Ok(DictionaryRequest {
            kind,
            max,
            offset: page_offset(page, max)?,
        })
    }
}

/// How a full-text query string is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchType {
    /// Analyzed keyword match.
    #[default]
    #[serde(alias = "match", alias = "keyword", alias = "KEYWORD")]
    Match,
    /// Exact phrase.
    #[serde(alias = "phrase", alias = "exact", alias = "EXACT")]
    Phrase,
    /// Regular expression against the un-analyzed keyword field.
    #[serde(alias = "regex")]
    Regex,
}

/// Fields a search may target. Omitted means every indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum SearchField {
    #[strum(serialize = "foodDescription")]
    #[serde(rename = "foodDescription")]
    FoodDescription,
    #[strum(serialize = "company")]
    #[serde(rename = "company")]
    Company,
    #[strum(serialize = "upc")]
    #[serde(rename = "upc")]
    Upc,
    #[strum(serialize = "ingredients")]
    #[serde(rename = "ingredients")]
    Ingredients,
}

/// Query string of `GET /foods/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub max: Option<String>,
    pub page: Option<String>,
}

/// Body of `POST /foods/search`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, rename = "q", alias = "query")]
    pub query: String,
    #[serde(default, rename = "searchField", alias = "field")]
    pub field: Option<String>,
    #[serde(default, rename = "searchType", alias = "type")]
    pub search_type: SearchType,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub max: i64,
}

/// Validated search. `field` already carries the `_kw` suffix for regex
/// searches.
#[derive(Debug, Clone, Validate)]
pub struct SearchSpec {
    #[garde(length(min = 1))]
    pub query: String,
    #[garde(skip)]
    pub field: Option<String>,
    #[garde(skip)]
    pub search_type: SearchType,
    #[garde(range(min = 1, max = MAX_LIST_SIZE))]
    pub max: i64,
    #[garde(range(min = 0))]
    pub offset: i64,
}

impl SearchParams {
    pub fn normalize(self) -> Result<SearchSpec, ApiError> {
        let query = self.q.unwrap_or_default();
        if query.trim().is_empty() {
            return Err(ApiError::Validation(
                "A search string in the q parameter is required".to_string(),
            ));
        }
        SearchRequest {
            query,
            field: None,
            search_type: SearchType::Match,
            page: lenient_number(self.page.as_deref()).unwrap_or(0),
            max: lenient_number(self.max.as_deref()).unwrap_or(0),
        }
        .normalize()
    }
}

impl SearchRequest {
    pub fn normalize(self) -> Result<SearchSpec, ApiError> {
        if self.query.trim().is_empty() {
            return Err(ApiError::Validation("Search query is required.".to_string()));
        }
        let max = page_size(Some(self.max), DEFAULT_LIST_MAX);
        if !(1..=MAX_LIST_SIZE).contains(&max) {
            return Err(ApiError::Validation(format!(
                "max parameter {max} must be > 0 or <= {MAX_LIST_SIZE}"
            )));
        }

        let field = match self.field.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let field: SearchField = raw.parse().map_err(|_| {
                    ApiError::Validation(
                        "searchField must be one of foodDescription, company, upc, ingredients"
                            .to_string(),
                    )
                })?;
                Some(field.to_string())
            }
        };
        let field = match (self.search_type, field) {
            (SearchType::Regex, Some(f)) => Some(format!("{f}_kw")),
            (_, f) => f,
        };

        validated(SearchSpec {
            query: self.query,
            field,
            search_type: self.search_type,
            max,
            offset: page_offset(self.page.max(0), max)?,
        })
    }
}

/// Value field a nutrient report filters and sorts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ReportSort {
    #[strum(serialize = "portion")]
    #[serde(rename = "portion")]
    Portion,
    #[default]
    #[strum(serialize = "100value")]
    #[serde(rename = "100value")]
    Per100Units,
}

impl ReportSort {
    pub fn field(self) -> &'static str {
        match self {
            ReportSort::Portion => "portionValue",
            ReportSort::Per100Units => "valuePer100UnitServing",
        }
    }
}

/// Body of `POST /nutrients/report`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientReportRequest {
    #[serde(default, alias = "nutrientno")]
    pub nutrient_number: Option<String>,
    #[serde(default, rename = "valueGTE", alias = "ValueGTE")]
    pub value_gte: f64,
    #[serde(default, rename = "valueLTE", alias = "ValueLTE")]
    pub value_lte: f64,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub max: i64,
}

/// Validated nutrient report, echoed back in the response.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[garde(allow_unvalidated)]
pub struct NutrientReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_number: Option<String>,
    #[serde(rename = "valueGTE")]
    #[garde(range(min = 0.0))]
    pub value_gte: f64,
    #[serde(rename = "valueLTE")]
    #[garde(range(min = 0.0))]
    pub value_lte: f64,
    pub sort: ReportSort,
    pub order: SortOrder,
    #[garde(range(min = 0))]
    pub page: i64,
    #[garde(range(min = 1, max = MAX_LIST_SIZE))]
    pub max: i64,
}

impl NutrientReport {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.max)
    }
}

impl NutrientReportRequest {
    pub fn normalize(self) -> Result<NutrientReport, ApiError> {
        let max = if self.max <= 0 { DEFAULT_LIST_MAX } else { self.max };
        if max > MAX_LIST_SIZE {
            return Err(ApiError::Validation(format!(
                "max parameter {max} must be > 0 or <= {MAX_LIST_SIZE}"
            )));
        }
        let sort = parse_choice(
            self.sort.as_deref(),
            "Value sort values are 'portion' and '100value'",
        )?;
        let order = match self.order.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => SortOrder::Desc,
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::Validation("Order value should be 'asc' and 'desc'".to_string())
            })?,
        };

        if self.value_gte < 0.0 || self.value_lte < 0.0 {
            return Err(ApiError::Validation(
                "ValueGTE and ValueLTE must be greater than or equal to 0".to_string(),
            ));
        }
        let (value_gte, value_lte) = if self.value_gte == 0.0 && self.value_lte == 0.0 {
            (0.0, DEFAULT_VALUE_CEILING)
        } else if self.value_gte > self.value_lte {
            return Err(ApiError::Validation(format!(
                "ValueGTE {} must be less than or equal to ValueLTE {}",
                self.value_gte, self.value_lte
            )));
        } else {
            (self.value_gte, self.value_lte)
        };

        let page = self.page.max(0);
        page_offset(page, max)?;

        validated(NutrientReport {
            nutrient_number: self
                .nutrient_number
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            value_gte,
            value_lte,
            sort,
            order,
            page,
            max,
        })
    }
}
