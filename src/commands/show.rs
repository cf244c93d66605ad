use anyhow::Result;
use owo_colors::OwoColorize;

use eventdir_core::ViewId;

use super::{Session, reveal_deep_link, summary};

/// Render one view once and exit.
pub async fn run(session: Session, view: ViewId, query: Option<String>) -> Result<()> {
    let mut catalog = session.load_catalog().await?;

    // Only the map needs coordinates, and it stays usable without them
    if view == ViewId::Map {
        match session.source.coordinates().await {
            Ok(coordinates) => {
                catalog.merge_coordinates(&coordinates);
            }
            Err(e) => {
                tracing::warn!("Coordinate enrichment failed: {e:#}");
                println!("{}", format!("Map markers unavailable: {e}").yellow());
            }
        }
    }

    let query = query.unwrap_or_default();
    let (mut dispatcher, screen) = session.dispatcher(catalog, &query, view);

    dispatcher.start(view);
    if view == ViewId::List {
        reveal_deep_link(&mut dispatcher, &screen, &query);
    }

    println!();
    println!("{}", summary(&dispatcher).dimmed());
    Ok(())
}
