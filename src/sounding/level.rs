use crate::met_formulas;
use metfor::{Celsius, HectoPascal, Kelvin, Knots, Meters, WindSpdDir};
use optional::Optioned;

/// One observation in the vertical profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Level {
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Geopotential height in meters
    pub height: Meters,
    /// Temperature in C
    pub temperature: Celsius,
    /// Dew point in C
    pub dew_point: Celsius,
    /// Wind, direction is where the wind blows from. Radiosondes routinely lose the wind, so this
    /// may be missing.
    pub wind: Optioned<WindSpdDir<Knots>>,
}

impl Level {
    /// Create a level without wind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, HectoPascal, Meters};
    /// use sounding_thermo::Level;
    ///
    /// let lvl = Level::new(HectoPascal(850.0), Meters(1500.0), Celsius(12.0), Celsius(4.0))
    ///     .with_wind(25.0, 240.0);
    ///
    /// assert!(lvl.wind.is_some());
    /// ```
    #[inline]
    pub fn new(
        pressure: HectoPascal,
        height: Meters,
        temperature: Celsius,
        dew_point: Celsius,
    ) -> Self {
        Level {
            pressure,
            height,
            temperature,
            dew_point,
            wind: optional::none(),
        }
    }

    /// Builder method to add a wind, speed in knots and direction in degrees.
    #[inline]
    pub fn with_wind(mut self, speed_kt: f64, direction: f64) -> Self {
        self.wind = optional::some(WindSpdDir {
            speed: Knots(speed_kt),
            direction,
        });
        self
    }

    /// Mixing ratio of the air at this level in kg/kg.
    #[inline]
    pub fn mixing_ratio(&self) -> Option<f64> {
        met_formulas::mixing_ratio(self.dew_point, self.pressure)
    }

    /// Virtual temperature of the air at this level.
    #[inline]
    pub fn virtual_temperature(&self) -> Option<Kelvin> {
        self.mixing_ratio()
            .map(|mw| met_formulas::virtual_temperature(self.temperature, mw))
    }
}

/// A non-fatal data quality problem that was repaired during validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataQualityNote {
    /// The dew point was slightly above the temperature and was set equal to it.
    DewPointClamped {
        /// Pressure of the level in hPa.
        pressure: f64,
        /// How far the dew point was above the temperature in C.
        excess: f64,
    },
    /// A level repeated the pressure of the level below it and was dropped.
    DuplicatePressureDropped {
        /// Pressure of the dropped level in hPa.
        pressure: f64,
    },
}
