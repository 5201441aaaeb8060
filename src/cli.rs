use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::report::OutputFormat;

const DEFAULT_SUGGESTIONS: usize = 10;

/// Single-dash long flags kept for older invocations.
const LEGACY_FLAGS: &[&str] = &["-lang", "-dt"];

#[derive(Parser, Debug)]
#[command(name = "langdata")]
#[command(version)]
#[command(about = "Get language data from Wikidata.")]
pub struct Cli {
    /// Language: Wikidata item (e.g. Q1860 for English) or language code (e.g. en)
    #[arg(long = "lang", value_name = "LANGUAGE")]
    pub language: String,

    /// Data type: Wikidata item of the category (e.g. Q5 for human)
    #[arg(long = "dt", value_name = "ITEM")]
    pub data_type: String,

    /// Enable autosuggestions
    #[arg(long)]
    pub autosuggest: bool,

    /// Maximum number of autosuggestions to show
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_SUGGESTIONS,
        value_parser = parse_suggestion_count
    )]
    pub suggestions: usize,

    /// Maximum number of items to request from the query service
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// SPARQL endpoint (overrides LANGDATA_ENDPOINT)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (overrides LANGDATA_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Attempts for transient query failures (overrides LANGDATA_MAX_RETRIES)
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Label language used when no label exists in the requested one (overrides LANGDATA_FALLBACK_LANG)
    #[arg(long, value_name = "CODE")]
    pub fallback_lang: Option<String>,

    /// Directory of <code>.txt corpora for autosuggestions (overrides LANGDATA_CORPUS_DIR)
    #[arg(long, value_name = "DIR")]
    pub corpus_dir: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_suggestion_count(raw: &str) -> Result<usize, String> {
    let count = raw
        .parse::<usize>()
        .map_err(|_| format!("'{raw}' is not a positive integer"))?;
    if count == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(count)
}

/// Rewrite `-lang x` / `-dt=x` into the double-dash form clap understands.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if is_legacy_flag(s) => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}

fn is_legacy_flag(arg: &str) -> bool {
    LEGACY_FLAGS.iter().any(|flag| {
        arg.strip_prefix(flag)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_legacy_flags(args.iter().map(OsString::from)))
    }

    #[test]
    fn accepts_legacy_single_dash_flags() {
        let cli = parse(&["langdata", "-lang", "Q1860", "-dt", "Q5", "--autosuggest"]).unwrap();
        assert_eq!(cli.language, "Q1860");
        assert_eq!(cli.data_type, "Q5");
        assert!(cli.autosuggest);
        assert_eq!(cli.suggestions, DEFAULT_SUGGESTIONS);
        assert!(matches!(cli.format, OutputFormat::Text));
    }

    #[test]
    fn accepts_legacy_flags_with_equals() {
        let cli = parse(&["langdata", "-lang=en", "-dt=Q5"]).unwrap();
        assert_eq!(cli.language, "en");
        assert!(!cli.autosuggest);
    }

    #[test]
    fn accepts_double_dash_flags_and_options() {
        let cli = parse(&[
            "langdata", "--lang", "fr", "--dt", "Q5", "--limit", "20", "--format", "json",
            "--retries", "1",
        ])
        .unwrap();
        assert_eq!(cli.limit, Some(20));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.retries, Some(1));
    }

    #[test]
    fn suggestion_count_must_be_positive() {
        let cli = parse(&["langdata", "--lang", "en", "--dt", "Q5", "--suggestions", "3"]).unwrap();
        assert_eq!(cli.suggestions, 3);

        let err = parse(&["langdata", "--lang", "en", "--dt", "Q5", "--suggestions", "0"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(parse(&["langdata", "--lang", "en", "--dt", "Q5", "--suggestions", "-2"]).is_err());
    }

    #[test]
    fn requires_language_and_data_type() {
        assert!(parse(&["langdata", "-lang", "en"]).is_err());
        assert!(parse(&["langdata", "-dt", "Q5"]).is_err());
    }

    #[test]
    fn leaves_values_and_other_flags_alone() {
        let args = normalize_legacy_flags(
            ["langdata", "-language", "-v", "-dtx"].into_iter().map(OsString::from),
        );
        assert_eq!(args, vec!["langdata", "-language", "-v", "-dtx"]);
    }
}
