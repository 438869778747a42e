//! Directory catalog of model raster files

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sentinel date string selecting every available file of a model
pub const ALL_DATES: &str = "All Dates";

lazy_static! {
    /// Matches `pm25_{model}_{date}.tif`; the date is everything after
    /// the last underscore so model names may themselves contain one.
    static ref FILENAME_PATTERN: Regex =
        Regex::new(r"^pm25_(?P<model>.+)_(?P<date>[^_]+)\.tif$").unwrap();
}

/// Which dates of a model a request addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelection {
    /// Every available date
    AllDates,
    /// One concrete date, matched literally against filenames
    Date(String),
}

impl DateSelection {
    /// Parse a request date string; the literal "All Dates" selects all
    pub fn parse(date: &str) -> Self {
        if date == ALL_DATES {
            DateSelection::AllDates
        } else {
            DateSelection::Date(date.to_string())
        }
    }
}

/// One raster file resolved from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterEntry {
    /// Model identifier encoded in the filename
    pub model: String,
    /// Date encoded in the filename
    pub date: String,
    /// Full path to the file
    pub path: PathBuf,
}

/// A directory of `pm25_{model}_{date}.tif` files
pub struct RasterStore {
    directory: PathBuf,
}

impl RasterStore {
    /// Create a store over the given directory
    pub fn new(directory: &Path) -> Self {
        RasterStore { directory: directory.to_path_buf() }
    }

    /// Directory this store reads from
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Every entry in the store, sorted by model then date
    pub fn entries(&self) -> io::Result<Vec<RasterEntry>> {
        let mut entries = Vec::new();
        for item in fs::read_dir(&self.directory)? {
            let item = item?;
            let name = item.file_name();
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            if let Some(captures) = FILENAME_PATTERN.captures(name) {
                entries.push(RasterEntry {
                    model: captures["model"].to_string(),
                    date: captures["date"].to_string(),
                    path: item.path(),
                });
            }
        }
        // Directory iteration order is platform-defined; sort so every
        // listing and combine walks files in the same order.
        entries.sort_by(|a, b| a.model.cmp(&b.model).then(a.date.cmp(&b.date)));
        debug!("Store {} holds {} raster files", self.directory.display(), entries.len());
        Ok(entries)
    }

    /// Distinct model identifiers present in the store
    pub fn models(&self) -> io::Result<Vec<String>> {
        let models: BTreeSet<String> = self.entries()?
            .into_iter()
            .map(|entry| entry.model)
            .collect();
        Ok(models.into_iter().collect())
    }

    /// Available dates for a model, sorted ascending
    pub fn dates(&self, model: &str) -> io::Result<Vec<String>> {
        Ok(self.entries()?
            .into_iter()
            .filter(|entry| entry.model == model)
            .map(|entry| entry.date)
            .collect())
    }

    /// Entries of a model matching the date selection, date-sorted
    ///
    /// An empty result means the store has nothing for the request; the
    /// caller decides whether that is an error.
    pub fn select(&self, model: &str, selection: &DateSelection) -> io::Result<Vec<RasterEntry>> {
        Ok(self.entries()?
            .into_iter()
            .filter(|entry| entry.model == model)
            .filter(|entry| match selection {
                DateSelection::AllDates => true,
                DateSelection::Date(date) => entry.date == *date,
            })
            .collect())
    }

    /// Whether a model has any file at all
    pub fn has_model(&self, model: &str) -> io::Result<bool> {
        Ok(self.entries()?.iter().any(|entry| entry.model == model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn store_with(test: &str, names: &[&str]) -> RasterStore {
        let dir = std::env::temp_dir()
            .join(format!("plumekit_catalog_{}_{}", test, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
        RasterStore::new(&dir)
    }

    #[test]
    fn filename_pattern_extracts_model_and_date() {
        let captures = FILENAME_PATTERN.captures("pm25_geos_2025-08-14.tif").unwrap();
        assert_eq!(&captures["model"], "geos");
        assert_eq!(&captures["date"], "2025-08-14");

        let captures = FILENAME_PATTERN.captures("pm25_cams_hires_2025-08-14.tif").unwrap();
        assert_eq!(&captures["model"], "cams_hires");

        assert!(FILENAME_PATTERN.captures("pm10_geos_2025-08-14.tif").is_none());
        assert!(FILENAME_PATTERN.captures("pm25_geos_2025-08-14.png").is_none());
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(DateSelection::parse("All Dates"), DateSelection::AllDates);
        assert_eq!(DateSelection::parse("2025-08-14"),
                   DateSelection::Date("2025-08-14".to_string()));
    }

    #[test]
    fn listing_is_sorted_and_filtered() {
        let store = store_with("listing", &[
            "pm25_geos_2025-08-15.tif",
            "pm25_geos_2025-08-14.tif",
            "pm25_cams_2025-08-14.tif",
            "notes.txt",
        ]);

        assert_eq!(store.models().unwrap(), vec!["cams", "geos"]);
        assert_eq!(store.dates("geos").unwrap(),
                   vec!["2025-08-14", "2025-08-15"]);

        let selected = store.select("geos", &DateSelection::AllDates).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].date, "2025-08-14");

        let one = store.select(
            "geos", &DateSelection::Date("2025-08-15".to_string())).unwrap();
        assert_eq!(one.len(), 1);

        let none = store.select(
            "geos", &DateSelection::Date("2025-01-01".to_string())).unwrap();
        assert!(none.is_empty());
    }
}
