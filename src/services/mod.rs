pub mod aggregation;
pub mod resolver;
