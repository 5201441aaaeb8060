mod errors;

pub use errors::{Exit, exit_for};
pub(crate) use errors::hint;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::lang::{CategoryId, LanguageCode, QueryError};
use crate::report::Report;
use crate::suggest::{CorpusGenerator, SuggestError, SuggestionGenerator, suggest};
use crate::wikidata::query::ItemQuery;
use crate::wikidata::types::ResultSet;
use crate::wikidata::{QueryClient, WikidataClient, WikidataError};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One lookup as asked for on the command line.
#[derive(Debug, Clone)]
pub struct Request {
    pub language: String,
    pub category: String,
    pub autosuggest: bool,
    pub suggestion_limit: usize,
    pub limit: Option<u32>,
    pub fallback_language: String,
}

/// Both paths' results; neither hides the other's failure.
#[derive(Debug)]
pub struct Outcome {
    pub language: String,
    pub category: String,
    pub results: Result<ResultSet, WikidataError>,
    /// `None` when suggestions were not requested.
    pub suggestions: Option<Result<Vec<String>, SuggestError>>,
}

impl Outcome {
    pub fn report(&self) -> Report<'_> {
        Report {
            language: &self.language,
            category: &self.category,
            results: self.results.as_ref(),
            suggestions: self
                .suggestions
                .as_ref()
                .map(|s| s.as_ref().map(Vec::as_slice)),
        }
    }
}

/// Runs the item lookup and, when asked, autosuggestions.
pub struct LangData<Q = WikidataClient> {
    client: Q,
    generator: Arc<dyn SuggestionGenerator>,
}

impl LangData {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()?;
        let client = WikidataClient::new(http, config.endpoint.clone())
            .with_max_attempts(config.max_attempts);
        let generator = Arc::new(CorpusGenerator::new(&config.corpus_dir));
        Ok(Self { client, generator })
    }
}

impl<Q: QueryClient> LangData<Q> {
    #[cfg(test)]
    fn with_parts(client: Q, generator: Arc<dyn SuggestionGenerator>) -> Self {
        Self { client, generator }
    }

    /// Validate input, then run the query path and the suggestion path concurrently.
    ///
    /// Only invalid input is an `Err`; failures of either path are carried in the outcome.
    pub async fn run(&self, request: &Request) -> Result<Outcome, QueryError> {
        let language = LanguageCode::parse(&request.language)?;
        let category = CategoryId::parse(&request.category)?;
        let query = ItemQuery::new(language.clone(), category.clone(), &request.fallback_language)?
            .with_limit(request.limit)
            .render();

        info!(language = %language, category = %category, "fetching items");
        debug!(query = %query, "built query");

        let suggestion_path = async {
            if request.autosuggest {
                Some(self.suggest_blocking(language.clone(), request.suggestion_limit).await)
            } else {
                None
            }
        };
        let (results, suggestions) = tokio::join!(self.client.fetch_items(&query), suggestion_path);

        match &results {
            Ok(set) => info!(records = set.records.len(), skipped = set.skipped, "items fetched"),
            Err(e) => warn!(error = %e, "item query failed"),
        }
        if let Some(Err(e)) = &suggestions {
            warn!(error = %e, "autosuggestions failed");
        }

        Ok(Outcome {
            language: language.to_string(),
            category: category.to_string(),
            results,
            suggestions,
        })
    }

    async fn suggest_blocking(
        &self,
        language: LanguageCode,
        limit: usize,
    ) -> Result<Vec<String>, SuggestError> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || suggest(generator.as_ref(), &language, limit))
            .await
            .unwrap_or_else(|e| Err(SuggestError::Interrupted(e.to_string())))
    }
}
