use serde_json::Value;
use tracing::{debug, warn};

use super::WikidataError;
use super::query::{ITEM_VAR, LABEL_VAR};
use super::types::{ResultRecord, ResultSet, SparqlResponse};

const ENTITY_PREFIXES: &[&str] = &[
    "http://www.wikidata.org/entity/",
    "https://www.wikidata.org/entity/",
];

/// Map `results.bindings` to records, skipping rows that lack an item or a label.
///
/// A missing `results.bindings` makes the whole response unusable; an empty one is
/// simply no matches.
pub fn normalize(response: &SparqlResponse) -> Result<ResultSet, WikidataError> {
    let bindings = response
        .results
        .as_ref()
        .and_then(|r| r.bindings.as_ref())
        .ok_or_else(|| {
            WikidataError::MalformedResponse("response has no results.bindings".into())
        })?;

    let mut set = ResultSet::default();
    for (index, binding) in bindings.iter().enumerate() {
        match extract_record(binding) {
            Ok(record) => set.records.push(record),
            Err(field) => {
                warn!(index, field, "skipping binding without a usable value");
                set.skipped += 1;
            }
        }
    }

    debug!(
        records = set.records.len(),
        skipped = set.skipped,
        "normalized bindings"
    );
    Ok(set)
}

/// Returns the name of the first missing field on failure.
fn extract_record(binding: &Value) -> Result<ResultRecord, &'static str> {
    let entity_ref = term_value(binding, ITEM_VAR)
        .and_then(shorten_entity)
        .ok_or(ITEM_VAR)?;
    let label = term_value(binding, LABEL_VAR).ok_or(LABEL_VAR)?;
    Ok(ResultRecord {
        label: label.to_string(),
        entity_ref: entity_ref.to_string(),
    })
}

/// `binding[var].value` as a non-blank string.
fn term_value<'a>(binding: &'a Value, var: &str) -> Option<&'a str> {
    binding
        .get(var)?
        .get("value")?
        .as_str()
        .filter(|v| !v.trim().is_empty())
}

fn shorten_entity(uri: &str) -> Option<&str> {
    match ENTITY_PREFIXES.iter().find_map(|p| uri.strip_prefix(p)) {
        Some(id) if id.is_empty() => None,
        Some(id) => Some(id),
        None => Some(uri),
    }
}
