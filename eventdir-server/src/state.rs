use std::path::PathBuf;

use anyhow::{Result, bail};
use eventdir_core::ics::IcsOptions;
use eventdir_core::{Catalog, store};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // The catalog is reloaded on each request to pick up filesystem changes
    pub data_dir: PathBuf,
    pub ics: IcsOptions,
}

impl AppState {
    pub fn new(data_dir: PathBuf, ics: IcsOptions) -> Result<Self> {
        if !data_dir.is_dir() {
            bail!("Data directory {} does not exist", data_dir.display());
        }
        Ok(AppState { data_dir, ics })
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Ok(store::load_catalog(&self.data_dir)?)
    }
}
