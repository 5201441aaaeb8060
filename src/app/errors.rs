use std::process::ExitCode;

use super::Outcome;
use crate::wikidata::{WikidataError, is_retriable};

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// The query path failed: transport, service, or response shape.
    QueryFailed,
    /// Bad identifiers or configuration; nothing was sent.
    InvalidInput,
    /// Only the suggestion path failed.
    SuggestionsFailed,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::QueryFailed => 1,
            Exit::InvalidInput => 2,
            Exit::SuggestionsFailed => 3,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

pub fn exit_for(outcome: &Outcome) -> Exit {
    match (&outcome.results, &outcome.suggestions) {
        (Err(_), _) => Exit::QueryFailed,
        (Ok(_), Some(Err(_))) => Exit::SuggestionsFailed,
        (Ok(_), _) => Exit::Success,
    }
}

/// Follow-up advice shown under a query failure.
pub(crate) fn hint(e: &WikidataError) -> Option<&'static str> {
    match e {
        WikidataError::Transport(inner) if inner.is_timeout() => {
            Some("the query timed out; raise --timeout or LANGDATA_TIMEOUT_SECS")
        }
        WikidataError::Transport(_) => {
            Some("check network connectivity and the endpoint (--endpoint / LANGDATA_ENDPOINT)")
        }
        WikidataError::Service { code: 400, .. } => {
            Some("the query service rejected the query; check that both items exist")
        }
        e if is_retriable(e) => Some("the query service is busy or failing; retry later"),
        WikidataError::Protocol(_) | WikidataError::MalformedResponse(_) => {
            Some("the endpoint did not return SPARQL JSON results; check --endpoint")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::SuggestError;
    use crate::wikidata::types::ResultSet;

    fn outcome(
        results: Result<ResultSet, WikidataError>,
        suggestions: Option<Result<Vec<String>, SuggestError>>,
    ) -> Outcome {
        Outcome {
            language: "en".into(),
            category: "Q5".into(),
            results,
            suggestions,
        }
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            Exit::Success,
            Exit::QueryFailed,
            Exit::InvalidInput,
            Exit::SuggestionsFailed,
        ]
        .map(Exit::code);
        assert_eq!(codes, [0, 1, 2, 3]);
    }

    #[test]
    fn empty_results_succeed() {
        let o = outcome(Ok(ResultSet::default()), Some(Ok(vec![])));
        assert_eq!(exit_for(&o), Exit::Success);
    }

    #[test]
    fn query_failure_wins_over_suggestion_failure() {
        let o = outcome(
            Err(WikidataError::RateLimited),
            Some(Err(SuggestError::UnsupportedLanguage("en".into()))),
        );
        assert_eq!(exit_for(&o), Exit::QueryFailed);
    }

    #[test]
    fn suggestion_failure_alone_is_reported() {
        let o = outcome(
            Ok(ResultSet::default()),
            Some(Err(SuggestError::UnsupportedLanguage("en".into()))),
        );
        assert_eq!(exit_for(&o), Exit::SuggestionsFailed);
    }

    #[test]
    fn hints_for_service_errors() {
        assert!(hint(&WikidataError::RateLimited).unwrap().contains("retry"));
        assert!(
            hint(&WikidataError::Service {
                code: 502,
                message: "bad gateway".into()
            })
            .unwrap()
            .contains("retry")
        );
        assert!(
            hint(&WikidataError::Service {
                code: 400,
                message: "bad".into()
            })
            .unwrap()
            .contains("items exist")
        );
        assert!(hint(&WikidataError::Service {
            code: 404,
            message: "nope".into()
        })
        .is_none());
    }
}
