//! Tunable parameters for validation, parcel lifting, and buoyancy integration.
use crate::{
    error::{AnalysisError, Result},
    keys::{CinPolicy, ParcelKind},
};
use serde::{Deserialize, Serialize};

/// Smallest allowed `pressure_step` in hPa.
pub const MIN_PRESSURE_STEP: f64 = 0.01;
/// Largest allowed `pressure_step` in hPa.
pub const MAX_PRESSURE_STEP: f64 = 50.0;
/// Upper bound on `lcl_tolerance` in hPa.
pub const MAX_LCL_TOLERANCE: f64 = 0.1;
/// Upper bound on `moist_tolerance` in C.
pub const MAX_MOIST_TOLERANCE: f64 = 0.01;

/// Every knob the engine exposes, with defaults suitable for radiosonde data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pressure step (hPa) for the parcel ascent. Smaller steps resolve the buoyancy profile
    /// better, 5 hPa keeps CAPE within about 1% of the converged value.
    pub pressure_step: f64,
    /// Width (hPa) the LCL bisection must reach.
    pub lcl_tolerance: f64,
    /// Width (C) the pseudo-adiabat step solve must reach.
    pub moist_tolerance: f64,
    /// Iteration cap for every root find.
    pub max_iterations: usize,
    /// Largest dew point excess over temperature (C) that is clamped instead of rejected.
    pub dew_point_clamp_tolerance: f64,
    /// Smallest positive area (J/kg) a buoyant layer needs before its base counts as the LFC.
    pub lfc_min_positive_area: f64,
    /// Which negative area counts toward CIN.
    pub cin_policy: CinPolicy,
    /// Which parcel the analysis lifts.
    pub parcel: ParcelKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            pressure_step: 5.0,
            lcl_tolerance: 0.01,
            moist_tolerance: 0.001,
            max_iterations: 100,
            dew_point_clamp_tolerance: 0.5,
            lfc_min_positive_area: 1.0,
            cin_policy: CinPolicy::default(),
            parcel: ParcelKind::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from JSON, missing fields take their default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_thermo::{AnalysisConfig, CinPolicy};
    ///
    /// let config = AnalysisConfig::from_json(r#"{"pressure_step": 2.0, "cin_policy": "below_el"}"#)
    ///     .unwrap();
    /// assert_eq!(config.pressure_step, 2.0);
    /// assert_eq!(config.cin_policy, CinPolicy::BelowEl);
    /// assert_eq!(config.max_iterations, AnalysisConfig::default().max_iterations);
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is inside the range the algorithms were designed for.
    pub fn validate(&self) -> Result<()> {
        let step = self.pressure_step;
        if !(step >= MIN_PRESSURE_STEP && step <= MAX_PRESSURE_STEP) {
            return Err(AnalysisError::InvalidConfig(
                "pressure_step must be in [0.01, 50] hPa",
            ));
        }
        if !(self.lcl_tolerance > 0.0 && self.lcl_tolerance <= MAX_LCL_TOLERANCE) {
            return Err(AnalysisError::InvalidConfig(
                "lcl_tolerance must be in (0, 0.1] hPa",
            ));
        }
        if !(self.moist_tolerance > 0.0 && self.moist_tolerance <= MAX_MOIST_TOLERANCE) {
            return Err(AnalysisError::InvalidConfig(
                "moist_tolerance must be in (0, 0.01] C",
            ));
        }
        if self.max_iterations == 0 {
            return Err(AnalysisError::InvalidConfig("max_iterations must be non-zero"));
        }
        if !(self.dew_point_clamp_tolerance >= 0.0 && self.dew_point_clamp_tolerance.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "dew_point_clamp_tolerance must be non-negative",
            ));
        }
        if !(self.lfc_min_positive_area >= 0.0 && self.lfc_min_positive_area.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "lfc_min_positive_area must be non-negative",
            ));
        }
        if let ParcelKind::Pressure(p) = self.parcel {
            if !(p.is_finite() && p > 0.0) {
                return Err(AnalysisError::InvalidConfig("parcel pressure must be positive"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            AnalysisConfig {
                pressure_step: 0.0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                pressure_step: 1.0e-12,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                pressure_step: 100.0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                pressure_step: std::f64::NAN,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                lcl_tolerance: 0.5,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                moist_tolerance: 0.1,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                max_iterations: 0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                dew_point_clamp_tolerance: -1.0,
                ..AnalysisConfig::default()
            },
            AnalysisConfig {
                parcel: ParcelKind::Pressure(-5.0),
                ..AnalysisConfig::default()
            },
        ];

        for config in &bad {
            match config.validate() {
                Err(AnalysisError::InvalidConfig(_)) => {}
                other => panic!("expected InvalidConfig, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_pressure_step_bounds_are_inclusive() {
        for &step in &[MIN_PRESSURE_STEP, MAX_PRESSURE_STEP] {
            let config = AnalysisConfig {
                pressure_step: step,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_from_json() {
        let config = AnalysisConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());

        assert!(AnalysisConfig::from_json(r#"{"pressure_step": -1.0}"#).is_err());
        assert!(matches!(
            AnalysisConfig::from_json("not json"),
            Err(AnalysisError::MalformedInput(_))
        ));
    }
}
