use serde::{Deserialize, Serialize};

/// SPARQL 1.1 JSON results envelope.
///
/// `results` and `bindings` are optional so that an absent section is reported by
/// the normalizer rather than as a decode failure. Bindings stay untyped: one bad
/// row must not fail deserialization of the whole document.
#[derive(Debug, Deserialize)]
pub struct SparqlResponse {
    pub results: Option<SparqlResults>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub bindings: Option<Vec<serde_json::Value>>,
}

/// One matched item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub label: String,
    /// Bare item id (`Q123`) for Wikidata entities, the raw value otherwise.
    pub entity_ref: String,
}

/// Records in response order, plus how many bindings were dropped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub records: Vec<ResultRecord>,
    pub skipped: usize,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
