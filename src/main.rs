mod client;
mod commands;
mod views;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eventdir_core::{EventDirConfig, ViewId};

use crate::client::{Client, Source};
use crate::commands::Session;

#[derive(Parser)]
#[command(name = "eventdir")]
#[command(about = "Browse an event directory with faceted filters")]
struct Cli {
    /// Catalog server URL (defaults to server_url from config.toml)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Read events straight from this data directory instead of a server
    #[arg(long, global = true, conflicts_with = "server")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one view and exit
    Show {
        /// list, calendar or map
        view: ViewId,

        /// Filters as a query string (e.g. "country=us,de&free=true")
        #[arg(short, long)]
        query: Option<String>,

        /// Month for the calendar view (YYYY-MM, defaults to this month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Interactive session with live filters
    Browse {
        /// Initial filters as a query string
        #[arg(short, long)]
        query: Option<String>,

        /// Month for the calendar view (YYYY-MM, defaults to this month)
        #[arg(long)]
        month: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Warnings only, so log lines don't interleave with rendered views
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = resolve_source(cli.server, cli.data)?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Show { view, query, month } => {
            let session = Session {
                source,
                today,
                month: parse_month(month.as_deref(), today)?,
            };
            commands::show::run(session, view, query).await
        }
        Commands::Browse { query, month } => {
            let session = Session {
                source,
                today,
                month: parse_month(month.as_deref(), today)?,
            };
            commands::browse::run(session, query).await
        }
    }
}

/// Flags win over config.toml.
fn resolve_source(server: Option<String>, data: Option<PathBuf>) -> Result<Source> {
    if let Some(dir) = data {
        let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
        return Ok(Source::Local(PathBuf::from(expanded)));
    }

    let server_url = match server {
        Some(url) => url,
        None => EventDirConfig::load()
            .context("Failed to load eventdir config")?
            .server_url,
    };
    Ok(Source::Server(Client::new(&server_url)?))
}

/// First day of a "YYYY-MM" month, or of the current month.
fn parse_month(month: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match month {
        Some(m) => NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{m}', expected YYYY-MM")),
        None => Ok(today.with_day(1).unwrap_or(today)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            parse_month(Some("2025-09"), today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
        assert_eq!(
            parse_month(None, today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert!(parse_month(Some("September"), today).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "eventdir",
            "show",
            "calendar",
            "--query",
            "country=us&free=true",
            "--data",
            "/srv/events",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("/srv/events")));
        assert!(matches!(
            cli.command,
            Commands::Show { view: ViewId::Calendar, .. }
        ));

        assert!(Cli::try_parse_from(["eventdir", "show", "globe"]).is_err());
        assert!(
            Cli::try_parse_from(["eventdir", "browse", "--server", "http://x", "--data", "/d"])
                .is_err()
        );
    }

    #[test]
    fn test_data_flag_wins() {
        let source = resolve_source(None, Some(PathBuf::from("/srv/events"))).unwrap();
        assert!(matches!(source, Source::Local(ref dir) if dir == &PathBuf::from("/srv/events")));
    }
}
