//! Language and category identifiers accepted on the command line.
//!
//! Both are validated before they get anywhere near a query: only Wikidata item
//! ids (`Q…`) and plain language tags (`en`, `pt-br`) pass, so nothing the user
//! types can break out of the SPARQL it is embedded in.

use std::fmt;

/// Wikidata items of common languages and their ISO 639-1 codes.
const LANGUAGE_ITEMS: &[(&str, &str)] = &[
    ("Q1860", "en"),
    ("Q150", "fr"),
    ("Q188", "de"),
    ("Q1321", "es"),
    ("Q652", "it"),
    ("Q5146", "pt"),
    ("Q7411", "nl"),
    ("Q9027", "sv"),
    ("Q9035", "da"),
    ("Q9043", "no"),
    ("Q1412", "fi"),
    ("Q809", "pl"),
    ("Q9056", "cs"),
    ("Q9067", "hu"),
    ("Q7913", "ro"),
    ("Q9129", "el"),
    ("Q7737", "ru"),
    ("Q8798", "uk"),
    ("Q256", "tr"),
    ("Q13955", "ar"),
    ("Q9288", "he"),
    ("Q9168", "fa"),
    ("Q1568", "hi"),
    ("Q9610", "bn"),
    ("Q5885", "ta"),
    ("Q7850", "zh"),
    ("Q5287", "ja"),
    ("Q9176", "ko"),
    ("Q9199", "vi"),
    ("Q9217", "th"),
    ("Q9240", "id"),
    ("Q7838", "sw"),
    ("Q143", "eo"),
    ("Q397", "la"),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("language must not be empty")]
    EmptyLanguage,

    #[error(
        "invalid language {0:?}: expected a Wikidata item (e.g. Q1860) or a language code (e.g. en, pt-br)"
    )]
    InvalidLanguage(String),

    #[error("data type must not be empty")]
    EmptyCategory,

    #[error("invalid data type {0:?}: expected a Wikidata item (e.g. Q5 for human)")]
    InvalidCategory(String),

    #[error("invalid fallback language {0:?}: expected a language code such as en")]
    InvalidFallbackLanguage(String),
}

/// The language a lookup is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageCode {
    /// Wikidata item for the language, e.g. `Q1860`.
    Item(String),
    /// Language tag, lowercased, e.g. `en` or `pt-br`.
    Tag(String),
}

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyLanguage);
        }
        if let Some(id) = parse_item_id(trimmed) {
            return Ok(Self::Item(id));
        }
        parse_language_tag(trimmed)
            .map(Self::Tag)
            .ok_or_else(|| QueryError::InvalidLanguage(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Item(id) | Self::Tag(id) => id,
        }
    }

    /// Code used to look up per-language resources such as suggestion corpora.
    ///
    /// Items resolve through the built-in table; unknown items have none.
    pub fn resource_code(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) => Some(tag.as_str()),
            Self::Item(id) => LANGUAGE_ITEMS
                .iter()
                .find(|(item, _)| *item == id.as_str())
                .map(|(_, code)| *code),
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wikidata class the returned items must be instances of, e.g. `Q5` (human).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyCategory);
        }
        parse_item_id(trimmed)
            .map(Self)
            .ok_or_else(|| QueryError::InvalidCategory(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `Q123`, `q123` and `wd:Q123`; returns the canonical `Q123`.
fn parse_item_id(s: &str) -> Option<String> {
    let s = s.strip_prefix("wd:").unwrap_or(s);
    let digits = s.strip_prefix(['Q', 'q'])?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("Q{digits}"))
}

/// Parse a language tag: a 2–3 letter primary subtag followed by optional
/// `-` separated subtags of 1–8 alphanumerics. Returns it lowercased.
pub fn parse_language_tag(s: &str) -> Option<String> {
    let s = s.trim();
    let mut parts = s.split('-');
    let primary = parts.next()?;
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let subtags_ok = parts.all(|p| {
        (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric())
    });
    subtags_ok.then(|| s.to_ascii_lowercase())
}
