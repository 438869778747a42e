//! Average export command
//!
//! Builds a composite and writes it back out as a single-band GeoTIFF,
//! the raw-download counterpart of the rendered overlay. NaN pixels go
//! out as the -9999 sentinel so GIS tools can mask them again.

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::compositor::{CompositeError, CompositeResult, Compositor};
use crate::store::{DateSelection, RasterStore, ALL_DATES};
use crate::tiff::errors::TiffError;
use crate::tiff::GeoTiffEncoder;
use crate::utils::logger::Logger;

/// No-data sentinel written into exported rasters
const EXPORT_NODATA: f64 = -9999.0;

/// Command for exporting a composite as a GeoTIFF file
pub struct AverageCommand<'a> {
    /// Store directory to read from
    store_dir: PathBuf,
    /// Model identifier to composite
    model: String,
    /// Date string, "All Dates" for the full average
    date: String,
    /// Output GeoTIFF path
    output: PathBuf,
    /// Optional compression name (none, deflate, zstd)
    compression: Option<String>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> AverageCommand<'a> {
    /// Create a new average export command
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> CompositeResult<Self> {
        let store_dir = args.get_one::<String>("store")
            .map(PathBuf::from)
            .ok_or_else(|| TiffError::GenericError("Missing store directory".to_string()))?;
        let model = args.get_one::<String>("model")
            .ok_or_else(|| TiffError::GenericError(
                "GeoTIFF export needs --model".to_string()))?
            .clone();
        let date = args.get_one::<String>("date")
            .cloned()
            .unwrap_or_else(|| ALL_DATES.to_string());
        let output = args.get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("pm25_{}_average.tif", model)));
        let compression = args.get_one::<String>("compression").cloned();

        Ok(AverageCommand { store_dir, model, date, output, compression, logger })
    }
}

impl<'a> Command for AverageCommand<'a> {
    fn execute(&self) -> CompositeResult<()> {
        self.logger.log(&format!(
            "Exporting average for model '{}', date '{}'", self.model, self.date))?;

        let store = RasterStore::new(&self.store_dir);
        let compositor = Compositor::new(&store, self.logger);
        let composite = compositor.composite(
            &self.model, &DateSelection::parse(&self.date))?;
        let grid = &composite.grid;

        let data: Vec<f32> = grid.data.iter()
            .map(|&v| if v.is_nan() { EXPORT_NODATA as f32 } else { v })
            .collect();

        let encoder = match &self.compression {
            Some(name) => GeoTiffEncoder::with_compression(self.logger, name)?,
            None => GeoTiffEncoder::new(self.logger),
        };
        encoder.write(
            &self.output,
            grid.width(),
            grid.height(),
            &data,
            &grid.layout.transform,
            grid.layout.epsg,
            Some(EXPORT_NODATA),
        ).map_err(|e| CompositeError::ProcessingFailed(format!(
            "Could not write {}: {}", self.output.display(), e)))?;

        info!("Exported {} layer average for '{}' to {}",
              composite.layer_count, self.model, self.output.display());
        Ok(())
    }
}
