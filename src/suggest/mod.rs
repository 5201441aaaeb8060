//! Autosuggestion capability and the adapter that drives it.

pub mod corpus;

use std::path::PathBuf;

use tracing::debug;

use crate::lang::LanguageCode;

pub use corpus::CorpusGenerator;

/// Lazily produced suggestions, in the generator's own order.
pub type Suggestions<'a> = Box<dyn Iterator<Item = String> + Send + 'a>;

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("no autosuggestion data available for language '{0}'")]
    UnsupportedLanguage(String),

    #[error("failed to read corpus {}: {source}", path.display())]
    Corpus {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("autosuggestion task did not complete: {0}")]
    Interrupted(String),
}

/// Source of suggested words for a language.
///
/// Every call starts a fresh sequence; it never resumes one handed out earlier.
pub trait SuggestionGenerator: Send + Sync {
    fn generate(&self, language: &LanguageCode) -> Result<Suggestions<'_>, SuggestError>;
}

/// Collect up to `limit` display strings from `generator`.
///
/// An empty list means the generator ran and found nothing.
pub fn suggest(
    generator: &dyn SuggestionGenerator,
    language: &LanguageCode,
    limit: usize,
) -> Result<Vec<String>, SuggestError> {
    let suggestions: Vec<String> = generator
        .generate(language)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect();
    debug!(language = %language, count = suggestions.len(), "suggestions generated");
    Ok(suggestions)
}
