//! Create and analyze a profile from lifting a parcel.
use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    keys::CinPolicy,
    met_formulas,
    parcel::Parcel,
    sounding::SoundingProfile,
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, JpKg, Kelvin, Meters, MetersPSec, Quantity};
use optional::{none, Optioned};
use tracing::debug;

pub(crate) mod buoyancy;
pub(crate) mod lift;

/// Whether the parcel is still unsaturated or has reached its LCL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Below the LCL, following a dry adiabat.
    Dry,
    /// At or above the LCL, following a pseudo-adiabat.
    Saturated,
}

/// One point along the path of a lifted parcel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParcelLevel {
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Parcel temperature in C
    pub temperature: Celsius,
    /// Water vapor carried by the parcel in kg/kg. Conserved below the LCL, the saturation mixing
    /// ratio above it.
    pub mixing_ratio: f64,
    /// Dry or saturated
    pub phase: Phase,
}

impl ParcelLevel {
    /// Virtual temperature of the parcel at this level.
    #[inline]
    pub fn virtual_temperature(&self) -> Kelvin {
        met_formulas::virtual_temperature(self.temperature, self.mixing_ratio)
    }
}

/// The temperature path of a lifted parcel, ordered by decreasing pressure.
#[derive(Debug, Clone)]
pub struct ParcelPath {
    parcel: Parcel,
    levels: Vec<ParcelLevel>,
}

impl ParcelPath {
    /// Wrap a path computed elsewhere. Levels must be ordered by decreasing pressure.
    pub fn new(parcel: Parcel, levels: Vec<ParcelLevel>) -> Self {
        debug_assert!(levels
            .iter()
            .tuple_windows::<(_, _)>()
            .all(|(a, b)| a.pressure > b.pressure));

        ParcelPath { parcel, levels }
    }

    /// Retrieve the original parcel.
    #[inline]
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// Every level of the path, starting level first.
    #[inline]
    pub fn levels(&self) -> &[ParcelLevel] {
        &self.levels
    }

    /// Index of the first saturated level.
    #[inline]
    pub fn lcl_index(&self) -> Option<usize> {
        self.levels
            .iter()
            .position(|lvl| lvl.phase == Phase::Saturated)
    }

    /// The first saturated level, this is the lifting condensation level.
    #[inline]
    pub fn lcl(&self) -> Option<&ParcelLevel> {
        self.lcl_index().map(|i| &self.levels[i])
    }

    /// Whether the parcel ever saturated.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.lcl_index().is_some()
    }

    /// Parcel temperature at a pressure, linear in ln(p) between path levels.
    pub fn temperature_at(&self, tgt_p: HectoPascal) -> Option<Celsius> {
        let target = tgt_p.unpack();

        self.levels
            .iter()
            .tuple_windows::<(_, _)>()
            .find_map(|(lvl0, lvl1)| {
                let (p0, p1) = (lvl0.pressure.unpack(), lvl1.pressure.unpack());
                if (p0 - target).abs() < std::f64::EPSILON {
                    Some(lvl0.temperature)
                } else if (p1 - target).abs() < std::f64::EPSILON {
                    Some(lvl1.temperature)
                } else if p0 > target && p1 < target {
                    let frac = (p0.ln() - target.ln()) / (p0.ln() - p1.ln());
                    let (t0, t1) = (lvl0.temperature.unpack(), lvl1.temperature.unpack());
                    Some(Celsius(t0 + frac * (t1 - t0)))
                } else {
                    None
                }
            })
    }
}

/// Parcel analysis, this is a way to package the analysis of a parcel.
///
/// CAPE and CIN are always defined: a parcel that never saturates has neither, and that is
/// reported through `saturated`. Everything tied to a level that may not exist is an `Optioned`.
#[derive(Debug, Clone)]
pub struct ThermoResult {
    // The orginal parcel and how CIN was counted
    parcel: Parcel,
    cin_policy: CinPolicy,
    saturated: bool,

    // Indicies from analysis
    cape: JpKg,
    cin: JpKg,
    hail_cape: JpKg,
    ncape: Optioned<f64>,
    lifted_index: Optioned<f64>,
    lcl_pressure: Optioned<HectoPascal>, // plotting on skew-t
    lcl_height_asl: Optioned<Meters>,
    lcl_height_agl: Optioned<Meters>,  // cloud base for aviation
    lcl_temperature: Optioned<Celsius>, // ice or ice/water cloud?
    lfc_pressure: Optioned<HectoPascal>,
    lfc_height_asl: Optioned<Meters>,
    el_pressure: Optioned<HectoPascal>,
    el_height_asl: Optioned<Meters>,    // convective cloud tops for aviation
    el_temperature: Optioned<Celsius>, // useful for comparing to satellite
}

impl ThermoResult {
    /// The result for a parcel that never reaches saturation, no CAPE and no CIN.
    pub fn unsaturated(parcel: Parcel, cin_policy: CinPolicy) -> Self {
        ThermoResult {
            parcel,
            cin_policy,
            saturated: false,
            cape: JpKg(0.0),
            cin: JpKg(0.0),
            hail_cape: JpKg(0.0),
            ncape: none(),
            lifted_index: none(),
            lcl_pressure: none(),
            lcl_height_asl: none(),
            lcl_height_agl: none(),
            lcl_temperature: none(),
            lfc_pressure: none(),
            lfc_height_asl: none(),
            el_pressure: none(),
            el_height_asl: none(),
            el_temperature: none(),
        }
    }

    /// Retrieve the original parcel.
    #[inline]
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// The convention used to count CIN.
    #[inline]
    pub fn cin_policy(&self) -> CinPolicy {
        self.cin_policy
    }

    /// False if the parcel never reached saturation within the profile.
    #[inline]
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Get the CAPE, never negative.
    #[inline]
    pub fn cape(&self) -> JpKg {
        self.cape
    }

    /// Get the CIN, never positive.
    #[inline]
    pub fn cin(&self) -> JpKg {
        self.cin
    }

    /// Get the CAPE in the hail growth zone, where the parcel is between -10C and -30C.
    #[inline]
    pub fn hail_cape(&self) -> JpKg {
        self.hail_cape
    }

    /// Get the normalized cape, CAPE divided by the depth from the LFC to the EL.
    #[inline]
    pub fn ncape(&self) -> Optioned<f64> {
        self.ncape
    }

    /// Environment minus parcel temperature at 500 hPa in C.
    #[inline]
    pub fn lifted_index(&self) -> Optioned<f64> {
        self.lifted_index
    }

    /// Get the LCL pressrue level.
    #[inline]
    pub fn lcl_pressure(&self) -> Optioned<HectoPascal> {
        self.lcl_pressure
    }

    /// Get the LCL height above mean sea level.
    #[inline]
    pub fn lcl_height_asl(&self) -> Optioned<Meters> {
        self.lcl_height_asl
    }

    /// Get the LCL height above the lowest level of the profile.
    #[inline]
    pub fn lcl_height_agl(&self) -> Optioned<Meters> {
        self.lcl_height_agl
    }

    /// Get the temperature at the LCL.
    #[inline]
    pub fn lcl_temperature(&self) -> Optioned<Celsius> {
        self.lcl_temperature
    }

    /// Get the pressure at the LFC.
    #[inline]
    pub fn lfc_pressure(&self) -> Optioned<HectoPascal> {
        self.lfc_pressure
    }

    /// Get the height ASL of the LFC.
    #[inline]
    pub fn lfc_height_asl(&self) -> Optioned<Meters> {
        self.lfc_height_asl
    }

    /// Get the pressure at the equilibrium level.
    #[inline]
    pub fn el_pressure(&self) -> Optioned<HectoPascal> {
        self.el_pressure
    }

    /// Get the height ASL of the equilibrium level.
    #[inline]
    pub fn el_height_asl(&self) -> Optioned<Meters> {
        self.el_height_asl
    }

    /// Get the environment temperature at the equilibrium level.
    #[inline]
    pub fn el_temperature(&self) -> Optioned<Celsius> {
        self.el_temperature
    }

    /// Calculate the parcel vertical speed at the equilibrium level. Note that this is an over
    /// estimate of updraft speed due to the effects of entrainment and water/ice loading.
    #[inline]
    pub fn calculate_cape_speed(&self) -> MetersPSec {
        MetersPSec(f64::sqrt(2.0 * self.cape.unpack()))
    }
}

/// Lift a parcel through the profile.
///
/// The parcel follows a dry adiabat to its LCL, found by bisection, and a pseudo-adiabat above
/// it, one `config.pressure_step` at a time, up to the top of the profile.
///
/// Fails with `SaturationNeverReached` if the parcel is still unsaturated at the top of the
/// profile, `NumericDivergence` if a root find does not converge, and `OutOfRange` if the parcel
/// starts outside the profile.
///
/// # Examples
///
/// ```rust
/// use sounding_thermo::{
///     doctest::make_test_sounding,
///     parcel::surface_parcel,
///     parcel_profile::{lift_parcel, Phase},
///     AnalysisConfig,
/// };
///
/// let snd = make_test_sounding();
/// let path = lift_parcel(&snd, surface_parcel(&snd), &AnalysisConfig::default()).unwrap();
///
/// let lcl = path.lcl().unwrap();
/// assert!(lcl.pressure < snd.bottom_pressure());
/// assert_eq!(path.levels()[0].phase, Phase::Dry);
/// assert_eq!(path.levels().last().unwrap().pressure, snd.top_pressure());
/// ```
pub fn lift_parcel(
    profile: &SoundingProfile,
    parcel: Parcel,
    config: &AnalysisConfig,
) -> Result<ParcelPath> {
    lift::lift_parcel(profile, parcel, config)
}

/// Integrate the buoyancy of a parcel path against its environment.
///
/// Buoyancy uses virtual temperatures and is integrated over height with the trapezoid rule.
/// `config.cin_policy` decides which negative area counts as CIN and
/// `config.lfc_min_positive_area` filters out shallow positive layers when locating the LFC.
pub fn integrate(
    profile: &SoundingProfile,
    path: &ParcelPath,
    config: &AnalysisConfig,
) -> Result<ThermoResult> {
    buoyancy::integrate(profile, path, config)
}

/// Lift a parcel and integrate its buoyancy in one call.
///
/// A parcel that never saturates is not an error here, it gets a result with no CAPE, no CIN,
/// and `saturated() == false`. Other failures are passed on.
pub fn parcel_ascent_analysis(
    profile: &SoundingProfile,
    parcel: Parcel,
    config: &AnalysisConfig,
) -> Result<ThermoResult> {
    match lift_parcel(profile, parcel, config) {
        Ok(path) => integrate(profile, &path, config),
        Err(AnalysisError::SaturationNeverReached) => {
            debug!(
                pressure = parcel.pressure.unpack(),
                "parcel never saturated, reporting no CAPE or CIN"
            );
            Ok(ThermoResult::unsaturated(parcel, config.cin_policy))
        }
        Err(err) => Err(err),
    }
}
