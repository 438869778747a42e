//! Grid alignment and averaging
//!
//! Turns the files matching a (model, date selection) request into one
//! grid. The first readable file fixes the reference layout; every later
//! layer is resampled onto it before entering a NaN-ignoring mean.
//! Stateless: each call re-reads, re-aligns and re-combines from disk.

use log::{info, warn};

use crate::coordinate::BoundingBox;
use crate::raster::{resample_to_layout, BandReader, GridLayout, RasterGrid};
use crate::store::{DateSelection, RasterEntry, RasterStore};
use crate::utils::logger::Logger;

use super::errors::{CompositeError, CompositeResult};

/// The combined grid of a request
#[derive(Debug, Clone)]
pub struct Composite {
    /// Averaged samples on the reference layout, NaN where no layer
    /// had a value
    pub grid: RasterGrid,
    /// Number of layers that contributed
    pub layer_count: usize,
}

impl Composite {
    /// Geographic extent of the reference grid
    pub fn bounding_box(&self) -> BoundingBox {
        self.grid.bounding_box()
    }
}

/// Running element-wise mean that ignores NaN entries
///
/// Accumulating sums and counts keeps the result independent of the
/// order layers arrive in.
struct MeanAccumulator {
    layout: GridLayout,
    sums: Vec<f64>,
    counts: Vec<u32>,
}

impl MeanAccumulator {
    fn new(layout: GridLayout) -> Self {
        MeanAccumulator {
            layout,
            sums: vec![0.0; layout.pixel_count()],
            counts: vec![0; layout.pixel_count()],
        }
    }

    /// Add a layer already on the reference layout
    fn add(&mut self, layer: &RasterGrid) {
        for (index, &value) in layer.data.iter().enumerate() {
            if !value.is_nan() {
                self.sums[index] += value as f64;
                self.counts[index] += 1;
            }
        }
    }

    /// Finish into a grid; pixels no layer covered stay NaN
    fn finish(self) -> RasterGrid {
        let data = self.sums.iter().zip(&self.counts)
            .map(|(&sum, &count)| {
                if count > 0 { (sum / count as f64) as f32 } else { f32::NAN }
            })
            .collect();
        RasterGrid::new(self.layout, data)
    }
}

/// Builds composites from a raster store
pub struct Compositor<'a> {
    store: &'a RasterStore,
    reader: BandReader<'a>,
}

impl<'a> Compositor<'a> {
    /// Create a compositor over a store
    pub fn new(store: &'a RasterStore, logger: &'a Logger) -> Self {
        Compositor { store, reader: BandReader::new(logger) }
    }

    /// Combine the files matching a model and date selection
    ///
    /// A corrupt file aborts a single-date request but is skipped with a
    /// warning when combining several, as long as one file remains
    /// readable.
    pub fn composite(&self, model: &str, selection: &DateSelection) -> CompositeResult<Composite> {
        let entries = self.store.select(model, selection)?;
        if entries.is_empty() {
            return Err(CompositeError::NotFound(match selection {
                DateSelection::AllDates => {
                    format!("No raster files for model '{}'", model)
                }
                DateSelection::Date(date) => {
                    format!("No raster file for model '{}' on {}", model, date)
                }
            }));
        }

        if entries.len() == 1 {
            return self.single(&entries[0]);
        }
        self.combine(model, &entries)
    }

    fn single(&self, entry: &RasterEntry) -> CompositeResult<Composite> {
        let grid = self.reader.read(&entry.path).map_err(|e| {
            CompositeError::ProcessingFailed(format!(
                "Could not read {}: {}", entry.path.display(), e))
        })?;
        Ok(Composite { grid, layer_count: 1 })
    }

    fn combine(&self, model: &str, entries: &[RasterEntry]) -> CompositeResult<Composite> {
        let mut accumulator: Option<MeanAccumulator> = None;
        let mut layer_count = 0usize;

        for entry in entries {
            let grid = match self.reader.read(&entry.path) {
                Ok(grid) => grid,
                Err(e) => {
                    warn!("Skipping unreadable raster {}: {}", entry.path.display(), e);
                    continue;
                }
            };

            let accumulator = accumulator.get_or_insert_with(|| {
                info!("Reference grid for '{}': {}x{} from {}",
                      model, grid.width(), grid.height(), entry.path.display());
                MeanAccumulator::new(grid.layout)
            });

            let aligned = if grid.layout.matches(&accumulator.layout, 1e-9) {
                grid
            } else {
                match resample_to_layout(&grid, &accumulator.layout) {
                    Ok(aligned) => aligned,
                    Err(e) => {
                        warn!("Skipping unalignable raster {}: {}",
                              entry.path.display(), e);
                        continue;
                    }
                }
            };

            accumulator.add(&aligned);
            layer_count += 1;
        }

        match accumulator {
            Some(accumulator) if layer_count > 0 => Ok(Composite {
                grid: accumulator.finish(),
                layer_count,
            }),
            _ => Err(CompositeError::ProcessingFailed(format!(
                "None of the {} raster files for model '{}' could be read",
                entries.len(), model))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::GeoTransform;

    fn layout() -> GridLayout {
        GridLayout::new(2, 2, GeoTransform::new(0.0, 1.0, 2.0, -1.0), 4326)
    }

    #[test]
    fn mean_ignores_nan_per_pixel() {
        let mut accumulator = MeanAccumulator::new(layout());
        accumulator.add(&RasterGrid::new(layout(), vec![1.0, f32::NAN, 3.0, f32::NAN]));
        accumulator.add(&RasterGrid::new(layout(), vec![3.0, 4.0, f32::NAN, f32::NAN]));

        let grid = accumulator.finish();
        assert_eq!(grid.get(0, 0), 2.0);
        assert_eq!(grid.get(1, 0), 4.0);
        assert_eq!(grid.get(0, 1), 3.0);
        assert!(grid.get(1, 1).is_nan());
    }

    #[test]
    fn mean_is_order_independent() {
        let layers = [
            RasterGrid::new(layout(), vec![1.0, 2.0, f32::NAN, 4.0]),
            RasterGrid::new(layout(), vec![5.0, f32::NAN, 7.0, 8.0]),
            RasterGrid::new(layout(), vec![9.0, 10.0, 11.0, f32::NAN]),
        ];

        let mut forward = MeanAccumulator::new(layout());
        for layer in &layers {
            forward.add(layer);
        }
        let mut backward = MeanAccumulator::new(layout());
        for layer in layers.iter().rev() {
            backward.add(layer);
        }

        let forward = forward.finish();
        let backward = backward.finish();
        for (a, b) in forward.data.iter().zip(&backward.data) {
            assert!((a - b).abs() < 1e-6 || (a.is_nan() && b.is_nan()));
        }
    }
}
