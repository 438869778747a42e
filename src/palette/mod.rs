//! Color palettes for rendering composite grids
//!
//! A palette is a continuous value-to-color function built from a small
//! list of stops over a fixed value domain, clamped at both ends. The
//! built-in palettes live in `palettes.toml`, compiled into the binary;
//! additional palettes can be loaded from a file of the same shape so a
//! deployment can restyle the overlay without a rebuild.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    // Parse the built-in palette table at startup
    static ref BUILTIN_PALETTES: HashMap<String, Palette> = {
        let content = include_str!("../../palettes.toml");
        parse_palette_table(content).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse built-in palettes: {}", e);
            HashMap::new()
        })
    };
}

/// Name of the palette used when a request names none
pub const DEFAULT_PALETTE: &str = "aqi";

/// One color stop of a palette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Sample value this stop anchors
    pub value: f32,
    /// RGB color at that value
    pub color: [u8; 3],
}

/// A continuous value-to-color function over a fixed domain
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Inclusive value domain; values outside are clamped
    pub domain: (f32, f32),
    /// Color stops, ascending by value
    stops: Vec<ColorStop>,
}

impl Palette {
    /// Build a palette from stops, which must be ascending by value
    pub fn new(domain: (f32, f32), stops: Vec<ColorStop>) -> TiffResult<Self> {
        if stops.len() < 2 {
            return Err(TiffError::GenericError(
                "A palette needs at least two color stops".to_string()));
        }
        if stops.windows(2).any(|pair| pair[0].value >= pair[1].value) {
            return Err(TiffError::GenericError(
                "Palette stops must be strictly ascending".to_string()));
        }
        if domain.0 >= domain.1 {
            return Err(TiffError::GenericError(
                "Palette domain must be a non-empty range".to_string()));
        }
        Ok(Palette { domain, stops })
    }

    /// Look up a built-in palette by name
    pub fn named(name: &str) -> TiffResult<Palette> {
        BUILTIN_PALETTES.get(name).cloned().ok_or_else(|| {
            let known: Vec<&str> = BUILTIN_PALETTES.keys()
                .map(|k| k.as_str()).collect();
            TiffError::GenericError(format!(
                "Unknown palette '{}' (available: {})", name, known.join(", ")))
        })
    }

    /// Load a palette table from a file and pick one palette from it
    pub fn from_file(path: &Path, name: &str) -> TiffResult<Palette> {
        let content = fs::read_to_string(path)?;
        let table = parse_palette_table(&content)?;
        table.get(name).cloned().ok_or_else(|| TiffError::GenericError(
            format!("Palette '{}' not found in {}", name, path.display())))
    }

    /// RGB color for a sample value, clamped to the domain
    pub fn color_for(&self, value: f32) -> [u8; 3] {
        let value = value.max(self.domain.0).min(self.domain.1);

        if value <= self.stops[0].value {
            return self.stops[0].color;
        }
        let last = &self.stops[self.stops.len() - 1];
        if value >= last.value {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if value >= lower.value && value < upper.value {
                let t = (value - lower.value) / (upper.value - lower.value);
                return interpolate(lower.color, upper.color, t);
            }
        }
        last.color
    }
}

/// Linear interpolation between two colors
fn interpolate(lower: [u8; 3], upper: [u8; 3], t: f32) -> [u8; 3] {
    let mut color = [0u8; 3];
    for channel in 0..3 {
        color[channel] = (lower[channel] as f32 * (1.0 - t)
            + upper[channel] as f32 * t) as u8;
    }
    color
}

/// Parse a `[palettes.<name>]` TOML table into palettes
fn parse_palette_table(content: &str) -> TiffResult<HashMap<String, Palette>> {
    let toml_value: toml::Value = match content.parse() {
        Ok(value) => value,
        Err(e) => return Err(TiffError::GenericError(
            format!("Failed to parse palette TOML: {}", e))),
    };

    let mut palettes = HashMap::new();
    let table = toml_value.get("palettes").and_then(|v| v.as_table())
        .ok_or_else(|| TiffError::GenericError(
            "Palette file has no [palettes] table".to_string()))?;

    for (name, entry) in table {
        let domain = entry.get("domain").and_then(|v| v.as_array())
            .and_then(|a| match (a.first(), a.get(1)) {
                (Some(lo), Some(hi)) => Some((lo.as_float()?, hi.as_float()?)),
                _ => None,
            })
            .ok_or_else(|| TiffError::GenericError(
                format!("Palette '{}' has no valid domain", name)))?;

        let stop_values = entry.get("stops").and_then(|v| v.as_array())
            .ok_or_else(|| TiffError::GenericError(
                format!("Palette '{}' has no stops", name)))?;

        let mut stops = Vec::with_capacity(stop_values.len());
        for stop in stop_values {
            let value = stop.get("value").and_then(|v| v.as_float())
                .ok_or_else(|| TiffError::GenericError(
                    format!("Palette '{}' has a stop without a value", name)))?;
            let color = stop.get("color").and_then(|v| v.as_array())
                .filter(|a| a.len() == 3)
                .map(|a| {
                    let mut rgb = [0u8; 3];
                    for (slot, component) in rgb.iter_mut().zip(a) {
                        *slot = component.as_integer().unwrap_or(0) as u8;
                    }
                    rgb
                })
                .ok_or_else(|| TiffError::GenericError(
                    format!("Palette '{}' has a stop without a color", name)))?;
            stops.push(ColorStop { value: value as f32, color });
        }

        palettes.insert(
            name.clone(),
            Palette::new((domain.0 as f32, domain.1 as f32), stops)?,
        );
    }
    Ok(palettes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_palettes_are_available() {
        let aqi = Palette::named("aqi").unwrap();
        assert_eq!(aqi.domain, (0.0, 80.0));
        let heat = Palette::named("heat").unwrap();
        assert_eq!(heat.domain, (0.0, 80.0));
        assert!(Palette::named("plasma").is_err());
    }

    #[test]
    fn colors_clamp_at_domain_ends() {
        let palette = Palette::named("aqi").unwrap();
        assert_eq!(palette.color_for(-10.0), palette.color_for(0.0));
        assert_eq!(palette.color_for(500.0), palette.color_for(80.0));
        assert_eq!(palette.color_for(0.0), [0, 228, 0]);
        assert_eq!(palette.color_for(80.0), [143, 63, 151]);
    }

    #[test]
    fn interpolation_between_stops() {
        let palette = Palette::new(
            (0.0, 10.0),
            vec![
                ColorStop { value: 0.0, color: [0, 0, 0] },
                ColorStop { value: 10.0, color: [100, 200, 50] },
            ],
        ).unwrap();
        assert_eq!(palette.color_for(5.0), [50, 100, 25]);
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        assert!(Palette::new((0.0, 1.0), vec![
            ColorStop { value: 0.0, color: [0, 0, 0] },
        ]).is_err());
        assert!(Palette::new((0.0, 1.0), vec![
            ColorStop { value: 1.0, color: [0, 0, 0] },
            ColorStop { value: 0.0, color: [1, 1, 1] },
        ]).is_err());
        assert!(Palette::new((5.0, 5.0), vec![
            ColorStop { value: 0.0, color: [0, 0, 0] },
            ColorStop { value: 1.0, color: [1, 1, 1] },
        ]).is_err());
    }

    #[test]
    fn palette_table_parsing() {
        let table = parse_palette_table(r#"
            [palettes.simple]
            domain = [0.0, 1.0]
            stops = [
                { value = 0.0, color = [0, 0, 0] },
                { value = 1.0, color = [255, 255, 255] },
            ]
        "#).unwrap();
        let palette = &table["simple"];
        assert_eq!(palette.color_for(1.0), [255, 255, 255]);

        assert!(parse_palette_table("not = 'a palette table'").is_err());
    }
}
