mod app;
mod cli;
mod config;
mod lang;
mod report;
mod suggest;
mod wikidata;

pub const USER_AGENT: &str = concat!(
    "langdata/",
    env!("CARGO_PKG_VERSION"),
    " (Wikidata language data CLI)"
);

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use app::{Exit, LangData, Request};
use cli::Cli;
use config::Config;
use report::OutputFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(cli::normalize_legacy_flags(std::env::args_os()));
    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!("{e}");
            eprintln!("langdata: {e}");
            Exit::QueryFailed.into()
        }
    }
}

async fn run(cli: Cli) -> Result<Exit, Box<dyn std::error::Error>> {
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("langdata={level}").parse()?),
        )
        .init();

    let config = match Config::from_env().and_then(|c| c.with_overrides(&cli)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return Ok(Exit::InvalidInput);
        }
    };

    let app = LangData::new(&config)?;
    let request = Request {
        language: cli.language.clone(),
        category: cli.data_type.clone(),
        autosuggest: cli.autosuggest,
        suggestion_limit: cli.suggestions,
        limit: cli.limit,
        fallback_language: config.fallback_language.clone(),
    };

    if cli.format == OutputFormat::Text {
        let mut out = std::io::stdout();
        out.write_all(report::format_fetch_notice(&cli.language, &cli.data_type).as_bytes())?;
        out.flush()?;
    }

    let outcome = match app.run(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!(
                "Invalid input for language {} and type {}: {e}",
                cli.language.escape_debug(),
                cli.data_type.escape_debug()
            );
            return Ok(Exit::InvalidInput);
        }
    };

    report::present(&mut std::io::stdout().lock(), &outcome.report(), cli.format)?;
    Ok(app::exit_for(&outcome))
}
