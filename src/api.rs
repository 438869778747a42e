use std::path::Path;
use log::info;

use crate::compositor::{
    extract_samples, render, Composite, CompositeError, CompositeResult,
    Compositor, RenderedOverlay, Sample,
};
use crate::palette::{Palette, DEFAULT_PALETTE};
use crate::store::{DateSelection, RasterStore};
use crate::tiff::errors::TiffResult;
use crate::tiff::GeoTiffEncoder;
use crate::utils::logger::Logger;

/// Sentinel written for NaN pixels in exported rasters
const EXPORT_NODATA: f64 = -9999.0;

/// Main interface to the PlumeKit library
pub struct PlumeKit {
    store: RasterStore,
    logger: Logger,
    palette: Palette,
}

impl PlumeKit {
    /// Create a new PlumeKit instance over a raster store directory
    ///
    /// # Arguments
    /// * `store_dir` - Directory of `pm25_{model}_{date}.tif` files
    /// * `log_file` - Optional path to log file, defaults to "plumekit.log"
    ///
    /// # Returns
    /// A PlumeKit instance or an error if initialization fails
    pub fn new(store_dir: &Path, log_file: Option<&str>) -> TiffResult<Self> {
        let log_path = log_file.unwrap_or("plumekit.log");
        let logger = Logger::new(log_path)?;
        Ok(PlumeKit {
            store: RasterStore::new(store_dir),
            logger,
            palette: Palette::named(DEFAULT_PALETTE)?,
        })
    }

    /// Switch to a built-in palette by name
    pub fn set_palette(&mut self, name: &str) -> TiffResult<()> {
        self.palette = Palette::named(name)?;
        Ok(())
    }

    /// Load a palette from a TOML palette file
    pub fn set_palette_from_file(&mut self, path: &Path, name: &str) -> TiffResult<()> {
        self.palette = Palette::from_file(path, name)?;
        Ok(())
    }

    /// Distinct model identifiers available in the store
    pub fn list_models(&self) -> CompositeResult<Vec<String>> {
        Ok(self.store.models()?)
    }

    /// Available dates for one model, sorted ascending
    pub fn list_dates(&self, model: &str) -> CompositeResult<Vec<String>> {
        Ok(self.store.dates(model)?)
    }

    /// Build the composite grid for a model and date string
    ///
    /// The literal date "All Dates" averages every available file of the
    /// model; any other string selects the single file for that date.
    pub fn composite(&self, model: &str, date: &str) -> CompositeResult<Composite> {
        let selection = DateSelection::parse(date);
        Compositor::new(&self.store, &self.logger).composite(model, &selection)
    }

    /// Extract the composite as point samples
    pub fn samples(&self, model: &str, date: &str) -> CompositeResult<Vec<Sample>> {
        let composite = self.composite(model, date)?;
        Ok(extract_samples(&composite.grid))
    }

    /// Render the composite as a PNG overlay with its bounding box
    pub fn render(&self, model: &str, date: &str) -> CompositeResult<RenderedOverlay> {
        let composite = self.composite(model, date)?;
        render(&composite.grid, &self.palette)
    }

    /// Write the composite as a single-band GeoTIFF file
    ///
    /// NaN pixels are written as the no-data sentinel so downstream GIS
    /// tools can mask them again.
    pub fn write_average_geotiff(&self, model: &str, date: &str,
                                 output_path: &Path) -> CompositeResult<()> {
        let composite = self.composite(model, date)?;
        let grid = &composite.grid;

        let data: Vec<f32> = grid.data.iter()
            .map(|&v| if v.is_nan() { EXPORT_NODATA as f32 } else { v })
            .collect();

        let encoder = GeoTiffEncoder::new(&self.logger);
        encoder.write(
            output_path,
            grid.width(),
            grid.height(),
            &data,
            &grid.layout.transform,
            grid.layout.epsg,
            Some(EXPORT_NODATA),
        ).map_err(|e| CompositeError::ProcessingFailed(format!(
            "Could not write {}: {}", output_path.display(), e)))?;

        info!("Wrote {} layer average for '{}' to {}",
              composite.layer_count, model, output_path.display());
        Ok(())
    }
}
