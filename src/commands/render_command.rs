//! Overlay rendering command
//!
//! Builds a composite and writes it as a colorized PNG overlay, logging
//! the bounding box the map layer needs to place it. Without --model it
//! renders every model in the store in one pass.

use clap::ArgMatches;
use log::info;
use std::fs;
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::compositor::{render, Compositor, CompositeResult};
use crate::palette::{Palette, DEFAULT_PALETTE};
use crate::store::{DateSelection, RasterStore, ALL_DATES};
use crate::tiff::errors::TiffError;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Command for rendering composite overlays to PNG
pub struct RenderCommand<'a> {
    /// Store directory to read from
    store_dir: PathBuf,
    /// Model to render; absent means every model in the store
    model: Option<String>,
    /// Date string, "All Dates" for the full average
    date: String,
    /// Output PNG path (single model) or directory (batch)
    output: Option<PathBuf>,
    /// Palette to colorize with
    palette: Palette,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> RenderCommand<'a> {
    /// Create a new render command
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> CompositeResult<Self> {
        let store_dir = args.get_one::<String>("store")
            .map(PathBuf::from)
            .ok_or_else(|| TiffError::GenericError("Missing store directory".to_string()))?;
        let model = args.get_one::<String>("model").cloned();
        let date = args.get_one::<String>("date")
            .cloned()
            .unwrap_or_else(|| ALL_DATES.to_string());
        let output = args.get_one::<String>("output").map(PathBuf::from);

        let palette_name = args.get_one::<String>("palette")
            .map(String::as_str)
            .unwrap_or(DEFAULT_PALETTE);
        let palette = match args.get_one::<String>("palette-file") {
            Some(path) => Palette::from_file(PathBuf::from(path).as_path(), palette_name)?,
            None => Palette::named(palette_name)?,
        };

        Ok(RenderCommand { store_dir, model, date, output, palette, logger })
    }

    fn render_one(&self, store: &RasterStore, model: &str,
                  output: &PathBuf) -> CompositeResult<()> {
        let compositor = Compositor::new(store, self.logger);
        let composite = compositor.composite(model, &DateSelection::parse(&self.date))?;
        let overlay = render(&composite.grid, &self.palette)?;

        fs::write(output, &overlay.png)?;
        info!("Rendered '{}' ({} layers) to {}",
              model, composite.layer_count, output.display());
        info!("Bounds: left={} right={} top={} bottom={}",
              overlay.bounds.left(), overlay.bounds.right(),
              overlay.bounds.top(), overlay.bounds.bottom());
        Ok(())
    }
}

impl<'a> Command for RenderCommand<'a> {
    fn execute(&self) -> CompositeResult<()> {
        let store = RasterStore::new(&self.store_dir);

        if let Some(model) = &self.model {
            let output = self.output.clone()
                .unwrap_or_else(|| PathBuf::from(format!("overlay_{}.png", model)));
            return self.render_one(&store, model, &output);
        }

        // Batch mode: every model, output files named per model inside
        // the output directory (or the working directory).
        let models = store.models()?;
        if models.is_empty() {
            return Err(TiffError::GenericError(format!(
                "No raster files in {}", self.store_dir.display())).into());
        }

        let directory = self.output.clone().unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&directory)?;

        let progress = ProgressTracker::new(models.len() as u64, "Rendering models");
        for model in &models {
            progress.set_message(model);
            let output = directory.join(format!("overlay_{}.png", model));
            self.render_one(&store, model, &output)?;
            progress.increment(1);
        }
        progress.finish();
        Ok(())
    }
}
