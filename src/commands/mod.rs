pub mod browse;
pub mod show;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use eventdir_core::{Catalog, Dispatcher, MemoryAddress, ViewId, query};

use crate::client::Source;
use crate::views::{self, Screen};

/// Everything a command needs to render the directory
pub struct Session {
    pub source: Source,
    pub today: NaiveDate,
    pub month: NaiveDate,
}

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

impl Session {
    /// Fetch the catalog. A failure here ends the command before anything
    /// is rendered.
    pub async fn load_catalog(&self) -> Result<Catalog> {
        let spinner = create_spinner("Loading events".to_string());
        let result = self.source.catalog().await;
        spinner.finish_and_clear();
        result.context("Could not load the event catalog")
    }

    /// Dispatcher hydrated from `query`, with all three views registered.
    pub fn dispatcher(
        &self,
        catalog: Catalog,
        query: &str,
        initial: ViewId,
    ) -> (Dispatcher<MemoryAddress>, Screen) {
        let address = MemoryAddress::new(&self.source.base_path(), query);
        let mut dispatcher = Dispatcher::hydrate(catalog, query, address, self.today);

        let screen: Screen = Rc::new(Cell::new(initial));
        views::register_all(&mut dispatcher, &screen, self.month, self.today);
        (dispatcher, screen)
    }
}

/// Highlight the `event=` deep link of `query`, if any.
pub fn reveal_deep_link(dispatcher: &mut Dispatcher<MemoryAddress>, screen: &Screen, query: &str) {
    let Some(id) = query::deep_link(query) else {
        return;
    };
    screen.set(ViewId::List);
    if !dispatcher.reveal(&id) {
        println!(
            "{}",
            format!("Linked event '{id}' is not among the current results").yellow()
        );
    }
}

/// One-line summary of the last dispatch.
pub fn summary(dispatcher: &Dispatcher<MemoryAddress>) -> String {
    let matched = dispatcher.visible().len();
    format!(
        "{} of {} · {} upcoming",
        views::pluralize(matched, "event"),
        dispatcher.catalog().len(),
        dispatcher.active_count()
    )
}
