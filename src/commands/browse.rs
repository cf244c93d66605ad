//! Interactive session: one facet change per line, views kept in sync.

use std::io::Write;

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use eventdir_core::{
    CoordinateMap, Dispatcher, EnrichmentTicket, Facet, FacetChange, MemoryAddress, TimeWindow,
    ViewId, query,
};

use super::{Session, reveal_deep_link, summary};
use crate::client::Source;
use crate::views::Screen;

const HELP: &str = "\
Commands:
  search <text>             Free-text search (empty clears)
  type|country|city|organizer|language|tags <a,b,...>
                            Replace a facet's selection (empty clears)
  toggle <facet> <value>    Add or remove one value
  time future|past|all      Time window
  free [on|off]             Only free events
  online [on|off]           Only online events
  show list|calendar|map    Switch view
  open <id>                 Highlight an event in the list
  options <facet>           Values available for a facet
  link [id]                 Shareable link (to one event when given an id)
  reset                     Clear every filter
  reload                    Fetch the catalog again
  help                      This text
  quit                      Leave";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Change(FacetChange),
    Show(ViewId),
    Open(String),
    Options(Facet),
    Link(Option<String>),
    Reload,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    if let Ok(facet) = word.parse::<Facet>() {
        let values = rest
            .split(',')
            .map(|v| normalize(facet, v))
            .filter(|v| !v.is_empty())
            .collect();
        return Ok(Command::Change(FacetChange::Select(facet, values)));
    }

    let command = match word {
        "search" => Command::Change(FacetChange::Search(rest.to_string())),
        "toggle" => {
            let (facet, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("Usage: toggle <facet> <value>")?;
            let facet: Facet = facet.parse()?;
            let value = normalize(facet, value);
            if value.is_empty() {
                return Err("Usage: toggle <facet> <value>".to_string());
            }
            Command::Change(FacetChange::Toggle(facet, value))
        }
        "time" => match rest {
            "future" => Command::Change(FacetChange::TimeWindow(TimeWindow::Future)),
            "past" => Command::Change(FacetChange::TimeWindow(TimeWindow::Past)),
            "all" => Command::Change(FacetChange::TimeWindow(TimeWindow::All)),
            _ => return Err("Usage: time future|past|all".to_string()),
        },
        "free" => Command::Change(FacetChange::FreeOnly(parse_switch(rest)?)),
        "online" => Command::Change(FacetChange::OnlineOnly(parse_switch(rest)?)),
        "show" => Command::Show(rest.parse()?),
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "open" => return Err("Usage: open <id>".to_string()),
        "options" => Command::Options(rest.parse()?),
        "link" => Command::Link(Some(rest.to_string()).filter(|id| !id.is_empty())),
        "reset" => Command::Change(FacetChange::Reset),
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type `help` for commands.")),
    };

    Ok(command)
}

/// Country values are matched lowercased.
fn normalize(facet: Facet, value: &str) -> String {
    let value = value.trim();
    if facet == Facet::Country {
        value.to_lowercase()
    } else {
        value.to_string()
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value {
        "" | "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("Expected on or off, got '{other}'")),
    }
}

type Enrichment = (EnrichmentTicket, Result<CoordinateMap>);

fn spawn_enrichment(
    source: &Source,
    dispatcher: &Dispatcher<MemoryAddress>,
    tx: &mpsc::Sender<Enrichment>,
) {
    let ticket = dispatcher.begin_enrichment();
    let source = source.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = source.coordinates().await;
        let _ = tx.send((ticket, result)).await;
    });
}

fn prompt() {
    print!("{} ", ">".cyan());
    let _ = std::io::stdout().flush();
}

pub async fn run(session: Session, initial_query: Option<String>) -> Result<()> {
    let catalog = session.load_catalog().await?;
    let initial_query = initial_query.unwrap_or_default();
    let (mut dispatcher, screen) = session.dispatcher(catalog, &initial_query, ViewId::List);

    dispatcher.start(ViewId::List);
    reveal_deep_link(&mut dispatcher, &screen, &initial_query);
    println!();
    println!("{}", summary(&dispatcher).dimmed());

    let (tx, mut rx) = mpsc::channel::<Enrichment>(4);
    spawn_enrichment(&session.source, &dispatcher, &tx);

    println!("{}", "Type `help` for commands.".dimmed());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        tokio::select! {
            Some((ticket, result)) = rx.recv() => {
                println!();
                apply_enrichment(&mut dispatcher, ticket, result);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Reload) => {
                        reload(&session, &mut dispatcher, &tx).await;
                    }
                    Ok(command) => execute(&mut dispatcher, &screen, command),
                    Err(message) => println!("{}", message.red()),
                }
            }
        }
    }

    Ok(())
}

/// Fetch the catalog again. A failure is reported and the current catalog,
/// filters and views are kept.
async fn reload(
    session: &Session,
    dispatcher: &mut Dispatcher<MemoryAddress>,
    tx: &mpsc::Sender<Enrichment>,
) -> bool {
    match session.load_catalog().await {
        Ok(catalog) => {
            dispatcher.replace_catalog(catalog);
            spawn_enrichment(&session.source, dispatcher, tx);
            println!("{}", summary(dispatcher).dimmed());
            true
        }
        Err(e) => {
            tracing::warn!("Catalog reload failed: {e:#}");
            println!("{}", format!("Reload failed, keeping current results: {e:#}").red());
            false
        }
    }
}

fn apply_enrichment(
    dispatcher: &mut Dispatcher<MemoryAddress>,
    ticket: EnrichmentTicket,
    result: Result<CoordinateMap>,
) {
    match result {
        Ok(coordinates) => {
            if dispatcher.apply_coordinates(ticket, &coordinates).is_some() {
                println!("{}", "Map coordinates loaded.".dimmed());
            }
        }
        Err(e) => {
            tracing::warn!("Coordinate enrichment failed: {e:#}");
            println!("{}", format!("Map markers unavailable: {e}").yellow());
        }
    }
}

fn execute(dispatcher: &mut Dispatcher<MemoryAddress>, screen: &Screen, command: Command) {
    match command {
        Command::Change(change) => match dispatcher.update(change) {
            Some(_) => {
                println!();
                println!("{}", summary(dispatcher).dimmed());
                println!("{} {}", "→".cyan(), dispatcher.address().href().underline());
            }
            None => println!("{}", "Filters unchanged.".dimmed()),
        },
        Command::Show(view) => {
            screen.set(view);
            dispatcher.show(view);
        }
        Command::Open(id) => {
            // The list only prints while on screen, so bring it up first
            if screen.replace(ViewId::List) != ViewId::List {
                dispatcher.show(ViewId::List);
            }
            if !dispatcher.reveal(&id) {
                println!("{}", format!("Event '{id}' is not among the current results").yellow());
            }
        }
        Command::Options(facet) => {
            let selected = dispatcher.state().selection(facet);
            for option in dispatcher.options(facet) {
                let mark = if selected.contains(&option.value) { "✓".green().to_string() } else { " ".to_string() };
                if option.label == option.value {
                    println!("{mark} {}", option.value);
                } else {
                    println!("{mark} {} {}", option.value, format!("({})", option.label).dimmed());
                }
            }
        }
        Command::Link(id) => {
            let address = dispatcher.address();
            let link = match id {
                Some(id) => query::with_query(&address.path, &query::share_query(dispatcher.state(), &id)),
                None => address.href(),
            };
            println!("{}", link.underline());
        }
        Command::Help => println!("{HELP}"),
        Command::Reload | Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::date;

    fn change(line: &str) -> FacetChange {
        match parse_command(line) {
            Ok(Command::Change(change)) => change,
            other => panic!("expected a facet change, got {other:?}"),
        }
    }

    fn write_event(root: &std::path::Path, id: &str, country: &str) {
        let dir = root.join("events").join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("event.toml"),
            format!(
                "title = \"{id}\"\ntype = \"Meetup\"\ndate = \"2025-07-01\"\n\
                 [location]\ncountry = \"{country}\"\ncity = \"Somewhere\"\n"
            ),
        )
        .unwrap();
    }

    fn session(data_dir: &std::path::Path) -> Session {
        Session {
            source: Source::Local(data_dir.to_path_buf()),
            today: date("2025-06-15"),
            month: date("2025-06-01"),
        }
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        write_event(dir.path(), "berlin", "DE");
        write_event(dir.path(), "seattle", "US");

        let session = session(dir.path());
        let catalog = session.load_catalog().await.unwrap();
        let (mut dispatcher, _screen) = session.dispatcher(catalog, "country=de", ViewId::List);
        dispatcher.start(ViewId::List);
        let (tx, _rx) = mpsc::channel::<Enrichment>(4);

        std::fs::remove_dir_all(dir.path()).unwrap();
        assert!(!reload(&session, &mut dispatcher, &tx).await);

        assert_eq!(dispatcher.catalog().len(), 2);
        assert_eq!(dispatcher.state().countries.iter().collect::<Vec<_>>(), ["de"]);
        assert_eq!(dispatcher.visible().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_swaps_catalog_and_keeps_filters() {
        let dir = tempfile::tempdir().unwrap();
        write_event(dir.path(), "berlin", "DE");

        let session = session(dir.path());
        let catalog = session.load_catalog().await.unwrap();
        let (mut dispatcher, _screen) = session.dispatcher(catalog, "country=de", ViewId::List);
        dispatcher.start(ViewId::List);
        let (tx, _rx) = mpsc::channel::<Enrichment>(4);

        write_event(dir.path(), "munich", "DE");
        assert!(reload(&session, &mut dispatcher, &tx).await);

        assert_eq!(dispatcher.catalog().len(), 2);
        assert_eq!(dispatcher.visible().len(), 2);
    }

    #[test]
    fn test_parse_selections() {
        assert_eq!(
            change("country US, de"),
            FacetChange::Select(Facet::Country, vec!["us".into(), "de".into()])
        );
        assert_eq!(
            change("tags rust,,go "),
            FacetChange::Select(Facet::Tag, vec!["rust".into(), "go".into()])
        );
        assert_eq!(change("city"), FacetChange::Select(Facet::City, vec![]));
        assert_eq!(
            change("types Meetup"),
            FacetChange::Select(Facet::EventType, vec!["Meetup".into()])
        );
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!(change("search  rust   berlin "), FacetChange::Search("rust   berlin".into()));
        assert_eq!(change("search"), FacetChange::Search(String::new()));
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(
            change("toggle city New York"),
            FacetChange::Toggle(Facet::City, "New York".into())
        );
        assert!(parse_command("toggle city").is_err());
        assert!(parse_command("toggle colour red").is_err());
    }

    #[test]
    fn test_parse_switches_and_time() {
        assert_eq!(change("free"), FacetChange::FreeOnly(true));
        assert_eq!(change("online off"), FacetChange::OnlineOnly(false));
        assert_eq!(change("time past"), FacetChange::TimeWindow(TimeWindow::Past));
        assert!(parse_command("time tomorrow").is_err());
        assert!(parse_command("free maybe").is_err());
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse_command("show map"), Ok(Command::Show(ViewId::Map)));
        assert_eq!(parse_command("open rustconf"), Ok(Command::Open("rustconf".into())));
        assert_eq!(parse_command("options cities"), Ok(Command::Options(Facet::City)));
        assert_eq!(parse_command("link"), Ok(Command::Link(None)));
        assert_eq!(parse_command("link rustconf"), Ok(Command::Link(Some("rustconf".into()))));
        assert_eq!(parse_command("reset"), Ok(Command::Change(FacetChange::Reset)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert!(parse_command("show globe").is_err());
        assert!(parse_command("open").is_err());
        assert!(parse_command("dance").is_err());
    }
}
