//! Data type and methods to store a validated atmospheric sounding.

use crate::{
    config::AnalysisConfig,
    error::{ProfileDefect, Result},
    interpolation,
};
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Meters, Quantity};
use tracing::warn;

pub use self::{
    level::{DataQualityNote, Level},
    raw::{parse_raob_json, RawLevel, RawSounding},
    station_info::{Station, StationInfo, StationTable},
};

/// An immutable, validated vertical profile.
///
/// Levels are stored surface first with strictly decreasing pressure and non-decreasing height.
/// There are always at least two of them. The only way to build one is through validation, so
/// every function taking a `&SoundingProfile` may rely on those invariants.
#[derive(Clone, Debug)]
pub struct SoundingProfile {
    levels: Vec<Level>,
    notes: Vec<DataQualityNote>,

    // Description of the source of the sounding.
    source: Option<String>,
    // Station info
    station: StationInfo,
    // Valid time of sounding
    valid_time: Option<NaiveDateTime>,
}

impl SoundingProfile {
    /// Validate a list of levels and build a profile from them.
    ///
    /// Levels repeating the pressure of the level below them are dropped, and dew points slightly
    /// above the temperature are clamped. Both are recorded in `quality_notes`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, HectoPascal, Meters};
    /// use sounding_thermo::{AnalysisConfig, Level, SoundingProfile};
    ///
    /// let levels = vec![
    ///     Level::new(HectoPascal(1000.0), Meters(100.0), Celsius(20.0), Celsius(15.0)),
    ///     Level::new(HectoPascal(850.0), Meters(1500.0), Celsius(10.0), Celsius(10.2)),
    ///     Level::new(HectoPascal(700.0), Meters(3100.0), Celsius(0.0), Celsius(-8.0)),
    /// ];
    ///
    /// let profile = SoundingProfile::new(levels, &AnalysisConfig::default()).unwrap();
    /// assert_eq!(profile.len(), 3);
    /// assert_eq!(profile.quality_notes().len(), 1); // The 850 hPa dew point was clamped.
    ///
    /// // Pressure going the wrong way is rejected.
    /// let levels = vec![
    ///     Level::new(HectoPascal(850.0), Meters(1500.0), Celsius(10.0), Celsius(5.0)),
    ///     Level::new(HectoPascal(1000.0), Meters(100.0), Celsius(20.0), Celsius(15.0)),
    /// ];
    /// assert!(SoundingProfile::new(levels, &AnalysisConfig::default()).is_err());
    /// ```
    pub fn new(levels: Vec<Level>, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let (levels, notes) = validate_levels(levels, config.dew_point_clamp_tolerance)?;

        Ok(SoundingProfile {
            levels,
            notes,
            source: None,
            station: StationInfo::default(),
            valid_time: None,
        })
    }

    /// Build a profile from raw decoded levels.
    ///
    /// Levels missing pressure, height, temperature, or dew point are skipped before validation.
    pub fn from_raw(raw: &[RawLevel], config: &AnalysisConfig) -> Result<Self> {
        let levels: Vec<Level> = raw.iter().filter_map(RawLevel::to_level).collect();
        Self::new(levels, config)
    }

    /// Build a profile from a decoded raob document, keeping the station and valid time.
    pub fn from_raw_sounding(raw: &RawSounding, config: &AnalysisConfig) -> Result<Self> {
        let mut station = StationInfo::new();
        if let Some(id) = raw.station.as_ref() {
            station = station.with_station_id(id.as_str());
        }

        Ok(Self::from_raw(&raw.data, config)?
            .with_station_info(station)
            .with_valid_time(raw.valid_time()))
    }

    /// Add a source description to this sounding.
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this sounding.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Builder function for setting the station info.
    #[inline]
    pub fn with_station_info(mut self, new_value: StationInfo) -> Self {
        self.station = new_value;
        self
    }

    /// Get the station info
    #[inline]
    pub fn station_info(&self) -> &StationInfo {
        &self.station
    }

    /// Builder method to set the valid time of the sounding.
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Valid time of the sounding.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// All levels, surface first.
    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Number of levels, always at least 2.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false, a profile can't be built with fewer than 2 levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The lowest level.
    #[inline]
    pub fn surface(&self) -> &Level {
        &self.levels[0]
    }

    /// The highest level.
    #[inline]
    pub fn top(&self) -> &Level {
        &self.levels[self.levels.len() - 1]
    }

    /// Largest pressure in the profile.
    #[inline]
    pub fn bottom_pressure(&self) -> HectoPascal {
        self.surface().pressure
    }

    /// Smallest pressure in the profile.
    #[inline]
    pub fn top_pressure(&self) -> HectoPascal {
        self.top().pressure
    }

    /// Problems repaired during validation.
    #[inline]
    pub fn quality_notes(&self) -> &[DataQualityNote] {
        &self.notes
    }

    /// Interpolated temperature, see `interpolation::temperature_at`.
    #[inline]
    pub fn temperature_at(&self, p: HectoPascal) -> Result<Celsius> {
        interpolation::temperature_at(self, p)
    }

    /// Interpolated dew point, see `interpolation::dew_point_at`.
    #[inline]
    pub fn dew_point_at(&self, p: HectoPascal) -> Result<Celsius> {
        interpolation::dew_point_at(self, p)
    }

    /// Interpolated height, see `interpolation::height_at`.
    #[inline]
    pub fn height_at(&self, p: HectoPascal) -> Result<Meters> {
        interpolation::height_at(self, p)
    }
}

fn validate_levels(
    raw: Vec<Level>,
    clamp_tolerance: f64,
) -> Result<(Vec<Level>, Vec<DataQualityNote>)> {
    let mut levels: Vec<Level> = Vec::with_capacity(raw.len());
    let mut notes: Vec<DataQualityNote> = vec![];

    for (index, mut lvl) in raw.into_iter().enumerate() {
        let p = lvl.pressure.unpack();
        let h = lvl.height.unpack();
        let t = lvl.temperature.unpack();
        let dp = lvl.dew_point.unpack();

        let wind_finite = lvl
            .wind
            .into_option()
            .map(|w| w.speed.unpack().is_finite() && w.direction.is_finite())
            .unwrap_or(true);

        if !(p.is_finite() && h.is_finite() && t.is_finite() && dp.is_finite() && wind_finite) {
            return Err(ProfileDefect::NonFinite { index }.into());
        }

        if p <= 0.0 {
            return Err(ProfileDefect::NonPositivePressure { index }.into());
        }

        if t <= -273.15 || dp <= -273.15 {
            return Err(ProfileDefect::UnphysicalTemperature { pressure: p }.into());
        }

        if let Some(w) = lvl.wind.into_option() {
            if w.speed.unpack() < 0.0 || w.direction < 0.0 || w.direction > 360.0 {
                return Err(ProfileDefect::InvalidWind { pressure: p }.into());
            }
        }

        let excess = dp - t;
        if excess > clamp_tolerance {
            return Err(ProfileDefect::DewPointAboveTemperature {
                pressure: p,
                excess,
            }
            .into());
        } else if excess > 0.0 {
            warn!(pressure = p, excess, "dew point above temperature, clamping");
            lvl.dew_point = lvl.temperature;
            notes.push(DataQualityNote::DewPointClamped { pressure: p, excess });
        }

        if let Some(below) = levels.last() {
            let below_p = below.pressure.unpack();

            if p == below_p {
                warn!(pressure = p, "duplicate pressure level dropped");
                notes.push(DataQualityNote::DuplicatePressureDropped { pressure: p });
                continue;
            } else if p > below_p {
                return Err(ProfileDefect::PressureNotDecreasing { pressure: p }.into());
            } else if h < below.height.unpack() {
                return Err(ProfileDefect::HeightDecreasing { pressure: p }.into());
            }
        }

        levels.push(lvl);
    }

    if levels.len() < 2 {
        return Err(ProfileDefect::TooFewLevels.into());
    }

    Ok((levels, notes))
}

// FIXME: only configure for test and doc tests, not possible as of 1.41
#[doc(hidden)]
pub mod doctest {
    use super::*;

    /// A warm, moist, unstable sounding with a well mixed boundary layer.
    pub fn make_test_sounding() -> SoundingProfile {
        let rows: [(f64, f64, f64, f64, f64, f64); 16] = [
            (1000.0, 300.0, 30.0, 24.0, 10.0, 160.0),
            (975.0, 526.1, 27.6, 22.0, 15.0, 170.0),
            (950.0, 756.1, 25.4, 20.0, 20.0, 180.0),
            (925.0, 990.3, 23.2, 18.0, 25.0, 190.0),
            (900.0, 1228.9, 21.0, 16.0, 25.0, 200.0),
            (850.0, 1723.1, 20.0, 8.0, 30.0, 210.0),
            (800.0, 2242.1, 16.5, 2.0, 30.0, 220.0),
            (700.0, 3362.2, 9.0, -6.0, 35.0, 230.0),
            (600.0, 4617.6, 0.5, -18.0, 40.0, 240.0),
            (500.0, 6058.4, -7.0, -30.0, 45.0, 250.0),
            (400.0, 7764.0, -17.0, -40.0, 55.0, 255.0),
            (300.0, 9861.5, -31.0, -52.0, 65.0, 260.0),
            (250.0, 11126.6, -41.0, -60.0, 70.0, 260.0),
            (200.0, 12609.8, -51.0, -68.0, 65.0, 265.0),
            (150.0, 14454.5, -57.0, -75.0, 50.0, 270.0),
            (100.0, 16989.2, -62.0, -82.0, 30.0, 270.0),
        ];

        let levels = rows
            .iter()
            .map(|&(p, h, t, dp, spd, dir)| {
                Level::new(HectoPascal(p), Meters(h), Celsius(t), Celsius(dp)).with_wind(spd, dir)
            })
            .collect();

        SoundingProfile::new(levels, &AnalysisConfig::default())
            .expect("test sounding is valid")
            .with_source_description("Synthetic warm season sounding".to_owned())
    }
}


mod level;
mod raw;
mod station_info;
