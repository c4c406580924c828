//! Branded food and nutrient database API.
//!
//! Serves food lookups, browsing, full-text search, nutrient panels and
//! nutrient reports over a Couchbase document bucket. UPC/GTIN codes are
//! accepted wherever an fdcId is and are resolved before querying.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
