//! Coordinate reference system identification

/// The coordinate reference systems the compositor can convert between
///
/// Anything else is carried through by EPSG code; grids sharing such a
/// code still align, but cross-CRS resampling against them is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// WGS84 geographic coordinates (EPSG:4326)
    Wgs84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// Any other system, identified by its EPSG code
    Other(u32),
}

impl Crs {
    /// Resolve an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        match code {
            4326 => Crs::Wgs84,
            3857 => Crs::WebMercator,
            other => Crs::Other(other),
        }
    }

    /// The EPSG code of this system
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Other(code) => *code,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            Crs::Wgs84 => "WGS84 geographic (EPSG:4326)".to_string(),
            Crs::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            Crs::Other(code) => format!("EPSG:{}", code),
        }
    }
}
