//! Functions for choosing the parcel to lift, specifically related to convection.
use crate::{
    error::{AnalysisError, ProfileDefect, Result},
    interpolation::level_at,
    keys::ParcelKind,
    met_formulas,
    sounding::SoundingProfile,
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
use std::iter::once;

/// Depth of the layer averaged for a mixed layer parcel.
pub const MIXED_LAYER_DEPTH: HectoPascal = HectoPascal(100.0);

/// Depth of the layer searched for the most unstable parcel.
pub const MOST_UNSTABLE_SEARCH_DEPTH: HectoPascal = HectoPascal(300.0);

/// Variables defining a parcel as used in parcel analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature in C
    pub temperature: Celsius,
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Dew point in C
    pub dew_point: Celsius,
}

impl Parcel {
    /// Get the potential temperature of the parcel.
    #[inline]
    pub fn theta(&self) -> Kelvin {
        met_formulas::potential_temperature(self.temperature, self.pressure)
    }

    /// Get the equivalent potential temperature of the parcel.
    pub fn theta_e(&self) -> Result<Kelvin> {
        met_formulas::equivalent_potential_temperature(
            self.temperature,
            self.dew_point,
            self.pressure,
        )
        .ok_or_else(|| self.unphysical())
    }

    /// Get the mixing ratio of the parcel in kg/kg.
    pub fn mixing_ratio(&self) -> Result<f64> {
        met_formulas::mixing_ratio(self.dew_point, self.pressure).ok_or_else(|| self.unphysical())
    }

    /// Get the virtual temperature of the parcel.
    pub fn virtual_temperature(&self) -> Result<Kelvin> {
        self.mixing_ratio()
            .map(|mw| met_formulas::virtual_temperature(self.temperature, mw))
    }

    /// Dew point depression, zero for a saturated parcel.
    #[inline]
    pub fn dew_point_depression(&self) -> f64 {
        self.temperature.unpack() - self.dew_point.unpack()
    }

    fn unphysical(&self) -> AnalysisError {
        ProfileDefect::UnphysicalTemperature {
            pressure: self.pressure.unpack(),
        }
        .into()
    }
}

/// Get a surface parcel.
pub fn surface_parcel(profile: &SoundingProfile) -> Parcel {
    let sfc = profile.surface();

    Parcel {
        temperature: sfc.temperature,
        pressure: sfc.pressure,
        dew_point: sfc.dew_point,
    }
}

/// Get a parcel from the profile at an arbitrary pressure, for elevated convection.
///
/// # Examples
///
/// ```rust
/// use metfor::{Celsius, HectoPascal};
/// use sounding_thermo::{doctest::make_test_sounding, parcel::pressure_parcel};
///
/// let snd = make_test_sounding();
///
/// let pcl = pressure_parcel(&snd, HectoPascal(850.0)).unwrap();
/// assert_eq!(pcl.temperature, Celsius(20.0));
///
/// assert!(pressure_parcel(&snd, HectoPascal(1050.0)).is_err());
/// ```
pub fn pressure_parcel(profile: &SoundingProfile, pressure: HectoPascal) -> Result<Parcel> {
    let lvl = level_at(profile, pressure)?;

    Ok(Parcel {
        temperature: lvl.temperature,
        pressure: lvl.pressure,
        dew_point: lvl.dew_point,
    })
}

/// Create a mixed layer parcel.
///
/// The potential temperature and mixing ratio are averaged over the lowest 100 hPa of the profile,
/// weighted by pressure, and the parcel is placed at the surface with those values. If the profile
/// is shallower than 100 hPa the whole profile is used.
pub fn mixed_layer_parcel(profile: &SoundingProfile) -> Result<Parcel> {
    let bottom_p = profile.bottom_pressure();
    let top_p = HectoPascal(
        (bottom_p.unpack() - MIXED_LAYER_DEPTH.unpack()).max(profile.top_pressure().unpack()),
    );

    let top_lvl = level_at(profile, top_p)?;

    let layer: Vec<(f64, f64, f64)> = profile
        .levels()
        .iter()
        .take_while(|lvl| lvl.pressure > top_p)
        .chain(once(&top_lvl))
        .map(|lvl| {
            let theta = met_formulas::potential_temperature(lvl.temperature, lvl.pressure);
            lvl.mixing_ratio()
                .map(|mw| (lvl.pressure.unpack(), theta.unpack(), mw))
                .ok_or_else(|| AnalysisError::from(ProfileDefect::UnphysicalTemperature {
                    pressure: lvl.pressure.unpack(),
                }))
        })
        .collect::<Result<_>>()?;

    // Trapezoid rule in pressure
    let (sum_theta, sum_mw, depth) = layer.iter().tuple_windows::<(_, _)>().fold(
        (0.0, 0.0, 0.0),
        |acc, ((p0, theta0, mw0), (p1, theta1, mw1))| {
            let (sum_theta, sum_mw, depth) = acc;
            let dp = p0 - p1;

            (
                sum_theta + (theta0 + theta1) * dp,
                sum_mw + (mw0 + mw1) * dp,
                depth + dp,
            )
        },
    );

    if depth <= 0.0 {
        return Err(AnalysisError::InsufficientData);
    }

    let theta = Kelvin(sum_theta / (2.0 * depth));
    let mw = sum_mw / (2.0 * depth);

    let temperature = met_formulas::temperature_from_theta(theta, bottom_p);
    let dew_point = met_formulas::dew_point_from_mixing_ratio(mw, bottom_p)
        .ok_or(AnalysisError::InsufficientData)?;

    Ok(Parcel {
        temperature,
        pressure: bottom_p,
        // Averaging can't make the air supersaturated, but rounding could.
        dew_point: if dew_point > temperature {
            temperature
        } else {
            dew_point
        },
    })
}

/// Get the most unstable parcel.
///
/// This is defined as the parcel in the lowest 300 hPa of the sounding with the highest equivalent
/// potential temperature. Ties go to the lowest level.
pub fn most_unstable_parcel(profile: &SoundingProfile) -> Result<Parcel> {
    let top_p =
        HectoPascal(profile.bottom_pressure().unpack() - MOST_UNSTABLE_SEARCH_DEPTH.unpack());

    profile
        .levels()
        .iter()
        .take_while(|lvl| lvl.pressure >= top_p)
        .map(|lvl| Parcel {
            temperature: lvl.temperature,
            pressure: lvl.pressure,
            dew_point: lvl.dew_point,
        })
        .filter_map(|pcl| pcl.theta_e().ok().map(|theta_e| (pcl, theta_e)))
        .fold(None, |best: Option<(Parcel, Kelvin)>, (pcl, theta_e)| match best {
            Some((_, best_theta_e)) if best_theta_e >= theta_e => best,
            _ => Some((pcl, theta_e)),
        })
        .map(|(pcl, _)| pcl)
        .ok_or(AnalysisError::InsufficientData)
}

/// Select the parcel described by `kind`.
pub fn parcel_for(profile: &SoundingProfile, kind: ParcelKind) -> Result<Parcel> {
    match kind {
        ParcelKind::Surface => Ok(surface_parcel(profile)),
        ParcelKind::MixedLayer => mixed_layer_parcel(profile),
        ParcelKind::MostUnstable => most_unstable_parcel(profile),
        ParcelKind::Pressure(p) => pressure_parcel(profile, HectoPascal(p)),
    }
}
