use crate::error::Result;
use metfor::Meters;
use optional::Optioned;
use serde::Deserialize;

/// Station information including location data and identification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationInfo {
    /// Station identifier, eg OUN or 72357
    id: Option<String>,
    /// Latitude and longitude.
    location: Option<(f64, f64)>,
    /// Elevation in meters.
    elevation: Optioned<Meters>,
}

impl StationInfo {
    /// Create a new object with default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_thermo::StationInfo;
    ///
    /// assert!(StationInfo::new().station_id().is_none());
    /// assert!(StationInfo::new().location().is_none());
    /// assert!(StationInfo::new().elevation().is_none());
    ///
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a station identifier.
    #[inline]
    pub fn with_station_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to add a location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_thermo::StationInfo;
    ///
    /// assert_eq!(
    ///     StationInfo::new().with_lat_lon((45.0, -116.0)).location().unwrap(), (45.0, -116.0));
    /// assert_eq!(
    ///     StationInfo::new().with_lat_lon(Some((45.0, -116.0)))
    ///         .location()
    ///         .unwrap(),
    ///     (45.0, -116.0));
    ///
    /// ```
    #[inline]
    pub fn with_lat_lon<T>(mut self, coords: T) -> Self
    where
        Option<(f64, f64)>: From<T>,
    {
        self.location = Option::from(coords);
        self
    }

    /// Builder method to add elevation.
    #[inline]
    pub fn with_elevation<T>(mut self, elev: T) -> Self
    where
        Optioned<Meters>: From<T>,
    {
        self.elevation = Optioned::from(elev);
        self
    }

    /// Station identifier.
    #[inline]
    pub fn station_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Latitude and longitude.
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    /// Elevation in meters.
    #[inline]
    pub fn elevation(&self) -> Optioned<Meters> {
        self.elevation
    }
}

/// A radiosonde launch site as listed in a station network table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Station {
    /// Station identifier.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Elevation in meters.
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl Station {
    /// Convert to the `StationInfo` attached to a sounding.
    pub fn info(&self) -> StationInfo {
        StationInfo::new()
            .with_station_id(self.id.as_str())
            .with_lat_lon((self.lat, self.lon))
            .with_elevation(Optioned::from(self.elevation.map(Meters)))
    }
}

/// Read-only lookup table of launch sites.
///
/// Load it once and pass it around by reference, nothing ever modifies it.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: Vec<Station>,
}

#[derive(Deserialize)]
struct StationDocument {
    data: Vec<Station>,
}

/// Most matches returned from `StationTable::search`.
pub const MAX_SEARCH_RESULTS: usize = 5;

const EARTH_RADIUS_KM: f64 = 6371.0;

impl StationTable {
    /// Build a table from a list of stations.
    pub fn new(stations: Vec<Station>) -> Self {
        StationTable { stations }
    }

    /// Load a station network document, `{"data": [{"id", "name", "lat", "lon"}, ..]}`.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: StationDocument = serde_json::from_str(text)?;
        Ok(Self::new(doc.data))
    }

    /// All stations in the table.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Stations whose name contains `query` (ignoring case) or whose id is `query`.
    ///
    /// Returns at most `MAX_SEARCH_RESULTS` stations in table order.
    pub fn search(&self, query: &str) -> Vec<&Station> {
        let lower = query.to_lowercase();
        let upper = query.to_uppercase();

        self.stations
            .iter()
            .filter(|stn| stn.name.to_lowercase().contains(&lower) || stn.id == upper)
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }

    /// The station closest to a point by great circle distance.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&Station> {
        self.stations
            .iter()
            .map(|stn| (great_circle_km((lat, lon), (stn.lat, stn.lon)), stn))
            .filter(|(dist, _)| dist.is_finite())
            .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, stn)| stn)
    }
}

fn great_circle_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat0, lon0) = (from.0.to_radians(), from.1.to_radians());
    let (lat1, lon1) = (to.0.to_radians(), to.1.to_radians());

    let a = ((lat1 - lat0) / 2.0).sin().powi(2)
        + lat0.cos() * lat1.cos() * ((lon1 - lon0) / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
