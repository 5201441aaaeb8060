use std::fmt;

use crate::lang::{CategoryId, LanguageCode, QueryError, parse_language_tag};

/// Result variable holding the matched item URI.
pub(crate) const ITEM_VAR: &str = "item";
/// Result variable filled in by the label service.
pub(crate) const LABEL_VAR: &str = "itemLabel";

const INSTANCE_OF: &str = "wdt:P31";
const LANGUAGE_OF_WORK: &str = "wdt:P407";
const ISO_639_1: &str = "wdt:P218";
const ISO_639_3: &str = "wdt:P220";
const IETF_TAG: &str = "wdt:P305";
const AUTO_LANGUAGE: &str = "[AUTO_LANGUAGE]";

/// Rendered SPARQL text, ready to be sent to the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument(String);

impl QueryDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// "All items that are instances of `category` and whose language is `language`",
/// labelled in `language` first and `fallback_language` second.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    language: LanguageCode,
    category: CategoryId,
    fallback_language: String,
    limit: Option<u32>,
}

impl ItemQuery {
    pub fn new(
        language: LanguageCode,
        category: CategoryId,
        fallback_language: &str,
    ) -> Result<Self, QueryError> {
        let fallback_language = parse_language_tag(fallback_language)
            .ok_or_else(|| QueryError::InvalidFallbackLanguage(fallback_language.to_string()))?;
        Ok(Self {
            language,
            category,
            fallback_language,
            limit: None,
        })
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Label language preference, most preferred first.
    ///
    /// Items outside the built-in alias table have no known code and fall back to
    /// the service's own language choice.
    fn label_languages(&self) -> Vec<&str> {
        let first = self.language.resource_code().unwrap_or(AUTO_LANGUAGE);
        if first == self.fallback_language {
            vec![first]
        } else {
            vec![first, self.fallback_language.as_str()]
        }
    }

    pub fn render(&self) -> QueryDocument {
        let mut q = format!("SELECT ?{ITEM_VAR} ?{LABEL_VAR}\nWHERE {{\n");
        q.push_str(&format!(
            "  ?{ITEM_VAR} {INSTANCE_OF} wd:{} .\n",
            self.category
        ));
        match &self.language {
            LanguageCode::Item(id) => {
                q.push_str(&format!("  ?{ITEM_VAR} {LANGUAGE_OF_WORK} wd:{id} .\n"));
            }
            LanguageCode::Tag(tag) => {
                q.push_str(&format!(
                    "  ?language {} \"{}\" .\n",
                    code_property(tag),
                    escape_literal(tag)
                ));
                q.push_str(&format!("  ?{ITEM_VAR} {LANGUAGE_OF_WORK} ?language .\n"));
            }
        }
        q.push_str(&format!(
            "  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{}\" . }}\n}}",
            escape_literal(&self.label_languages().join(","))
        ));
        if let Some(limit) = self.limit {
            q.push_str(&format!("\nLIMIT {limit}"));
        }
        QueryDocument(q)
    }
}

/// Property that maps a language item to a tag of this shape.
fn code_property(tag: &str) -> &'static str {
    if tag.contains('-') {
        IETF_TAG
    } else if tag.len() == 3 {
        ISO_639_3
    } else {
        ISO_639_1
    }
}

/// Escape a value for a double-quoted SPARQL string literal.
fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
pub(crate) fn build_query(
    language: &str,
    category: &str,
    fallback_language: &str,
) -> Result<QueryDocument, QueryError> {
    let query = ItemQuery::new(
        LanguageCode::parse(language)?,
        CategoryId::parse(category)?,
        fallback_language,
    )?;
    Ok(query.render())
}
