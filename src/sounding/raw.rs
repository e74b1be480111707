use crate::{error::Result, sounding::Level};
use chrono::{DateTime, NaiveDateTime};
use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use serde::Deserialize;

/// One level as decoded from a raob JSON document. Any value may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct RawLevel {
    /// Pressure in hPa
    #[serde(default)]
    pub pres: Option<f64>,
    /// Height in meters
    #[serde(default)]
    pub hght: Option<f64>,
    /// Temperature in C
    #[serde(default)]
    pub tmpc: Option<f64>,
    /// Dew point in C
    #[serde(default)]
    pub dwpc: Option<f64>,
    /// Wind direction in degrees
    #[serde(default)]
    pub drct: Option<f64>,
    /// Wind speed in knots
    #[serde(default)]
    pub sknt: Option<f64>,
}

impl RawLevel {
    /// Convert to a `Level`, `None` if any of the thermodynamic values or the height is missing.
    ///
    /// A wind missing either its speed or its direction is treated as missing.
    pub fn to_level(&self) -> Option<Level> {
        let mut lvl = Level::new(
            HectoPascal(self.pres?),
            Meters(self.hght?),
            Celsius(self.tmpc?),
            Celsius(self.dwpc?),
        );

        if let (Some(speed), Some(direction)) = (self.sknt, self.drct) {
            lvl.wind = optional::some(WindSpdDir {
                speed: Knots(speed),
                direction,
            });
        }

        Some(lvl)
    }
}

/// One sounding from a raob JSON document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawSounding {
    /// Station identifier.
    #[serde(default)]
    pub station: Option<String>,
    /// Valid time as an RFC 3339 / ISO 8601 string.
    #[serde(default)]
    pub valid: Option<String>,
    /// The levels, surface first.
    #[serde(default)]
    pub data: Vec<RawLevel>,
}

impl RawSounding {
    /// Parse the valid time, `None` if it is missing or not understood.
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        let valid = self.valid.as_deref()?;

        DateTime::parse_from_rfc3339(valid)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(valid, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

#[derive(Deserialize)]
struct RaobDocument {
    #[serde(default)]
    profiles: Vec<RawSounding>,
}

/// Decode a raob JSON document, `{"profiles": [{"station": .., "valid": .., "data": [..]}]}`.
///
/// Returns the first sounding in the document, or `None` if there are no soundings in it.
///
/// # Examples
///
/// ```rust
/// use sounding_thermo::parse_raob_json;
///
/// let doc = r#"{"profiles": [{"data": [{"pres": 1000.0, "hght": 110.0, "tmpc": 25.0,
///     "dwpc": 18.0, "drct": 180.0, "sknt": 10.0}]}]}"#;
///
/// let raw = parse_raob_json(doc).unwrap().unwrap();
/// assert_eq!(raw.data.len(), 1);
///
/// assert!(parse_raob_json(r#"{"profiles": []}"#).unwrap().is_none());
/// assert!(parse_raob_json("{").is_err());
/// ```
pub fn parse_raob_json(text: &str) -> Result<Option<RawSounding>> {
    let doc: RaobDocument = serde_json::from_str(text)?;
    Ok(doc.profiles.into_iter().next())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_level_requires_thermo_fields() {
        let full = RawLevel {
            pres: Some(850.0),
            hght: Some(1500.0),
            tmpc: Some(10.0),
            dwpc: Some(2.0),
            drct: Some(250.0),
            sknt: Some(30.0),
        };
        let lvl = full.to_level().unwrap();
        assert_eq!(lvl.pressure, HectoPascal(850.0));
        assert!(lvl.wind.is_some());

        let no_dew_point = RawLevel { dwpc: None, ..full };
        assert!(no_dew_point.to_level().is_none());

        let no_height = RawLevel { hght: None, ..full };
        assert!(no_height.to_level().is_none());

        let half_wind = RawLevel { sknt: None, ..full };
        assert!(half_wind.to_level().unwrap().wind.is_none());
    }

    #[test]
    fn test_valid_time() {
        let snd = RawSounding {
            valid: Some("2024-05-20T00:00:00Z".to_owned()),
            ..RawSounding::default()
        };
        assert_eq!(
            snd.valid_time().unwrap().to_string(),
            "2024-05-20 00:00:00"
        );

        let snd = RawSounding {
            valid: Some("2024-05-20T12:00:00".to_owned()),
            ..RawSounding::default()
        };
        assert!(snd.valid_time().is_some());

        let snd = RawSounding {
            valid: Some("yesterday".to_owned()),
            ..RawSounding::default()
        };
        assert!(snd.valid_time().is_none());
    }
}
