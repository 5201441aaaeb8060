//! Rendering of lookup results and autosuggestions.

use std::io::{self, Write};

use serde::Serialize;

use crate::app::hint;
use crate::suggest::SuggestError;
use crate::wikidata::WikidataError;
use crate::wikidata::types::{ResultRecord, ResultSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything one invocation produced, borrowed for rendering.
pub struct Report<'a> {
    pub language: &'a str,
    pub category: &'a str,
    pub results: Result<&'a ResultSet, &'a WikidataError>,
    /// `None` when suggestions were not requested.
    pub suggestions: Option<Result<&'a [String], &'a SuggestError>>,
}

pub fn present(out: &mut impl Write, report: &Report<'_>, format: OutputFormat) -> io::Result<()> {
    let rendered = match format {
        OutputFormat::Text => format_text(report),
        OutputFormat::Json => format_json(report)?,
    };
    out.write_all(rendered.as_bytes())?;
    out.flush()
}

/// Status line printed before the query is sent.
///
/// The values are still raw user input here, so control characters are escaped.
pub fn format_fetch_notice(language: &str, category: &str) -> String {
    format!(
        "Fetching data for language: {}, data type: {}...\n",
        language.escape_debug(),
        category.escape_debug()
    )
}

pub fn format_text(report: &Report<'_>) -> String {
    let mut out = String::new();
    format_results_section(report, &mut out);
    format_suggestions_section(report, &mut out);
    out
}

fn format_results_section(report: &Report<'_>, out: &mut String) {
    let (language, category) = (report.language, report.category);
    match report.results {
        Ok(set) if set.is_empty() => {
            out.push_str(&format!(
                "No data found for language {language} and type {category}.\n"
            ));
        }
        Ok(set) => {
            out.push_str(&format!(
                "Data fetched for language {language} and type {category}:\n"
            ));
            for record in &set.records {
                out.push_str(&format!(" - {} ({})\n", record.label, record.entity_ref));
            }
        }
        Err(e) => {
            out.push_str(&format!(
                "Failed to fetch data for language {language} and type {category}: {e}\n"
            ));
            if let Some(h) = hint(e) {
                out.push_str(&format!("   hint: {h}\n"));
            }
        }
    }
    if let Ok(set) = report.results
        && set.skipped > 0
    {
        let plural = if set.skipped == 1 { "" } else { "s" };
        out.push_str(&format!(
            "({} malformed result{plural} skipped)\n",
            set.skipped
        ));
    }
}

fn format_suggestions_section(report: &Report<'_>, out: &mut String) {
    let language = report.language;
    match report.suggestions {
        None => out.push_str("Autosuggestions not requested (use --autosuggest).\n"),
        Some(Ok([])) => {
            out.push_str(&format!("No autosuggestions generated for {language}.\n"));
        }
        Some(Ok(items)) => {
            out.push_str(&format!("Autosuggestions for {language}:\n"));
            for item in items {
                out.push_str(&format!(" - {item}\n"));
            }
        }
        Some(Err(e)) => {
            out.push_str(&format!(
                "Failed to generate autosuggestions for {language}: {e}\n"
            ));
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    language: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<&'a [ResultRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    skipped: usize,
    suggestions: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion_error: Option<String>,
}

pub fn format_json(report: &Report<'_>) -> serde_json::Result<String> {
    let (results, error, skipped) = match report.results {
        Ok(set) => (Some(set.records.as_slice()), None, set.skipped),
        Err(e) => (None, Some(e.to_string()), 0),
    };
    let (suggestions, suggestion_error) = match report.suggestions {
        None => (None, None),
        Some(Ok(items)) => (Some(items), None),
        Some(Err(e)) => (None, Some(e.to_string())),
    };
    let json = JsonReport {
        language: report.language,
        category: report.category,
        results,
        error,
        skipped,
        suggestions,
        suggestion_error,
    };
    let mut text = serde_json::to_string_pretty(&json)?;
    text.push('\n');
    Ok(text)
}
