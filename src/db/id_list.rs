//! Identifier list literals for `IN [...]` predicates.

use thiserror::Error;

/// Hard cap on identifiers in one request.
pub const MAX_BATCH_IDS: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Cannot request more than {MAX_BATCH_IDS} id's (got {0})")]
    TooManyIdentifiers(usize),

    #[error("Identifier {0:?} contains characters that are not allowed")]
    UnsafeIdentifier(String),
}

/// Fail fast on oversized batches, before any identifier is resolved.
pub fn check_batch_len(len: usize) -> Result<(), QueryError> {
    if len > MAX_BATCH_IDS {
        return Err(QueryError::TooManyIdentifiers(len));
    }
    Ok(())
}

/// Identifiers are interpolated into statement text, so only characters
/// that occur in fdcIds, UPCs and nutrient keys are accepted. An empty
/// identifier (an unresolved UPC) is allowed and simply matches nothing.
fn is_safe_identifier(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Reject any identifier outside the allowed character set. Run on raw
/// request values before anything is resolved or queried.
pub fn check_identifiers<S: AsRef<str>>(ids: &[S]) -> Result<(), QueryError> {
    match ids.iter().map(AsRef::as_ref).find(|id| !is_safe_identifier(id)) {
        Some(id) => Err(QueryError::UnsafeIdentifier(id.to_string())),
        None => Ok(()),
    }
}

/// Render identifiers as `["a","b",...]` in input order.
pub fn build_id_list<S: AsRef<str>>(ids: &[S]) -> Result<String, QueryError> {
    check_batch_len(ids.len())?;
    check_identifiers(ids)?;

    let quoted: Vec<String> = ids.iter().map(|id| format!("\"{}\"", id.as_ref())).collect();
    Ok(format!("[{}]", quoted.join(",")))
}

/// Nutrient data document keys, `<fdcId>_<nutrientNumber>`, food-major.
pub fn composite_keys<S: AsRef<str>, N: AsRef<str>>(ids: &[S], nutrients: &[N]) -> Vec<String> {
    ids.iter()
        .flat_map(|id| {
            nutrients
                .iter()
                .map(move |n| format!("{}_{}", id.as_ref(), n.as_ref()))
        })
        .collect()
}
