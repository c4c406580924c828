pub mod browse;
pub mod doc_type;
pub mod food;
pub mod lenient;
pub mod nutrient;
pub mod request;
