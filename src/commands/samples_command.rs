//! Numeric extraction command
//!
//! Builds a composite and writes its valid pixels as JSON point
//! samples, either to stdout or to a file. This is the same payload the
//! dashboard's sample endpoint serves.

use clap::ArgMatches;
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::compositor::{extract_samples, Compositor, CompositeResult};
use crate::store::{DateSelection, RasterStore, ALL_DATES};
use crate::tiff::errors::TiffError;
use crate::utils::logger::Logger;

/// Command for extracting composite point samples as JSON
pub struct SamplesCommand<'a> {
    /// Store directory to read from
    store_dir: PathBuf,
    /// Model identifier to composite
    model: String,
    /// Date string, "All Dates" for the full average
    date: String,
    /// Output file, stdout when absent
    output: Option<PathBuf>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> SamplesCommand<'a> {
    /// Create a new samples command
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> CompositeResult<Self> {
        let store_dir = args.get_one::<String>("store")
            .map(PathBuf::from)
            .ok_or_else(|| TiffError::GenericError("Missing store directory".to_string()))?;
        let model = args.get_one::<String>("model")
            .ok_or_else(|| TiffError::GenericError(
                "Sample extraction needs --model".to_string()))?
            .clone();
        let date = args.get_one::<String>("date")
            .cloned()
            .unwrap_or_else(|| ALL_DATES.to_string());
        let output = args.get_one::<String>("output").map(PathBuf::from);

        Ok(SamplesCommand { store_dir, model, date, output, logger })
    }
}

impl<'a> Command for SamplesCommand<'a> {
    fn execute(&self) -> CompositeResult<()> {
        self.logger.log(&format!(
            "Extracting samples for model '{}', date '{}'", self.model, self.date))?;

        let store = RasterStore::new(&self.store_dir);
        let compositor = Compositor::new(&store, self.logger);
        let composite = compositor.composite(
            &self.model, &DateSelection::parse(&self.date))?;
        let samples = extract_samples(&composite.grid);

        info!("{} samples from {} layers", samples.len(), composite.layer_count);

        match &self.output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer_pretty(&mut writer, &samples)?;
                writeln!(writer)?;
                writer.flush()?;
                info!("Samples written to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                serde_json::to_writer_pretty(&mut lock, &samples)?;
                writeln!(lock)?;
            }
        }
        Ok(())
    }
}
