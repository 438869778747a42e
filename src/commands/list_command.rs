//! Store listing command
//!
//! Shows which models and dates the raster store holds, which is the
//! first thing to check when a composite request keeps coming back
//! empty.

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::compositor::CompositeResult;
use crate::store::RasterStore;
use crate::tiff::errors::TiffError;
use crate::utils::logger::Logger;

/// Command for listing store contents
pub struct ListCommand<'a> {
    /// Store directory to scan
    store_dir: PathBuf,
    /// Restrict the listing to one model
    model: Option<String>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> CompositeResult<Self> {
        let store_dir = args.get_one::<String>("store")
            .map(PathBuf::from)
            .ok_or_else(|| TiffError::GenericError("Missing store directory".to_string()))?;
        let model = args.get_one::<String>("model").cloned();

        Ok(ListCommand { store_dir, model, logger })
    }
}

impl<'a> Command for ListCommand<'a> {
    fn execute(&self) -> CompositeResult<()> {
        self.logger.log(&format!("Listing store {}", self.store_dir.display()))?;
        let store = RasterStore::new(&self.store_dir);

        match &self.model {
            Some(model) => {
                info!("Dates for model '{}':", model);
                for date in store.dates(model)? {
                    info!("  {}", date);
                }
            }
            None => {
                info!("Models in {}:", self.store_dir.display());
                for model in store.models()? {
                    let dates = store.dates(&model)?;
                    info!("  {} ({} dates)", model, dates.len());
                }
            }
        }
        Ok(())
    }
}
