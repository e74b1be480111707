//! Data type and methods for building and describing an analysis.
//!
//! `analyze` runs everything the crate knows how to compute for one profile. Each derived
//! quantity keeps its own `Result`, so a parcel that fails to converge still leaves the wind
//! analysis intact.
use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    keys::{CinPolicy, ParcelKind},
    parcel::{parcel_for, Parcel},
    parcel_profile::{integrate, lift_parcel, ParcelPath, ThermoResult},
    sounding::SoundingProfile,
    wind::{band_shear, bunkers_storm_motion, components, ShearBand, WindComponents},
};
use chrono::NaiveDateTime;
use metfor::{Knots, Quantity, WindUV};
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::debug;

/// Convenient package for commonly requested analysis values.
#[derive(Debug, Clone)]
pub struct SoundingAnalysis {
    // Where the sounding came from
    station_id: Option<String>,
    valid_time: Option<NaiveDateTime>,
    config: AnalysisConfig,

    // Parcel analysis
    parcel: Result<Parcel>,
    parcel_path: Result<ParcelPath>,
    thermo: Result<ThermoResult>,

    // Wind analysis
    wind_components: Vec<WindComponents>,
    shear: Vec<(ShearBand, Result<WindUV<Knots>>)>,
    storm_motion: Result<(WindUV<Knots>, WindUV<Knots>)>,
}

/// Analyze the sounding to get as much information as you can.
///
/// Only an invalid configuration fails the whole analysis. A parcel that never saturates gets a
/// `ThermoResult` with no CAPE and no CIN, any other parcel failure is kept and reported by
/// `thermo()` while the wind analysis is still available.
///
/// # Examples
///
/// ```rust
/// use metfor::Quantity;
/// use sounding_thermo::{analyze, doctest::make_test_sounding, AnalysisConfig};
///
/// let snd = make_test_sounding();
/// let anal = analyze(&snd, &AnalysisConfig::default()).unwrap();
///
/// let thermo = anal.thermo().unwrap();
/// assert!(thermo.cape().unpack() > 1000.0);
///
/// let summary = anal.summary();
/// assert_eq!(summary.cape_jkg, Some((thermo.cape().unpack() * 10.0).round() / 10.0));
/// ```
pub fn analyze(profile: &SoundingProfile, config: &AnalysisConfig) -> Result<SoundingAnalysis> {
    config.validate()?;

    let parcel = parcel_for(profile, config.parcel);
    let parcel_path = parcel
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|&pcl| lift_parcel(profile, pcl, config));

    let thermo = match (&parcel, &parcel_path) {
        (_, Ok(path)) => integrate(profile, path, config),
        (Ok(pcl), Err(AnalysisError::SaturationNeverReached)) => {
            debug!(
                pressure = pcl.pressure.unpack(),
                "parcel never saturated, reporting no CAPE or CIN"
            );
            Ok(ThermoResult::unsaturated(*pcl, config.cin_policy))
        }
        (_, Err(err)) => Err(err.clone()),
    };

    let wind_components = components(profile.levels());
    let shear = ShearBand::iter()
        .map(|band| (band, band_shear(profile, band)))
        .collect();
    let storm_motion = bunkers_storm_motion(profile);

    debug!(
        station = profile.station_info().station_id().unwrap_or("unknown"),
        parcel_ok = parcel.is_ok(),
        thermo_ok = thermo.is_ok(),
        wind_levels = wind_components.len(),
        "sounding analysis complete"
    );

    Ok(SoundingAnalysis {
        station_id: profile.station_info().station_id().map(str::to_owned),
        valid_time: profile.valid_time(),
        config: *config,
        parcel,
        parcel_path,
        thermo,
        wind_components,
        shear,
        storm_motion,
    })
}

impl SoundingAnalysis {
    /// The configuration the analysis ran with.
    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The parcel that was lifted.
    pub fn parcel(&self) -> Result<&Parcel> {
        self.parcel.as_ref().map_err(Clone::clone)
    }

    /// The path of the lifted parcel, for plotting.
    pub fn parcel_path(&self) -> Result<&ParcelPath> {
        self.parcel_path.as_ref().map_err(Clone::clone)
    }

    /// CAPE, CIN, and the levels found while integrating.
    pub fn thermo(&self) -> Result<&ThermoResult> {
        self.thermo.as_ref().map_err(Clone::clone)
    }

    /// Wind components at every level with a wind report.
    #[inline]
    pub fn wind_components(&self) -> &[WindComponents] {
        &self.wind_components
    }

    /// The bulk shear vector over a layer.
    pub fn shear(&self, band: ShearBand) -> Result<WindUV<Knots>> {
        self.shear
            .iter()
            .find(|(b, _)| *b == band)
            .map(|(_, shear)| shear.clone())
            .unwrap_or(Err(AnalysisError::InsufficientData))
    }

    /// Bunkers right and left mover storm motions.
    pub fn storm_motion(&self) -> Result<(WindUV<Knots>, WindUV<Knots>)> {
        self.storm_motion.clone()
    }

    /// Condense the analysis into a flat, serializable summary for client tools.
    pub fn summary(&self) -> IndexSummary {
        let thermo = self.thermo.as_ref().ok();

        let bulk_shear_kt = self
            .shear
            .iter()
            .filter_map(|(band, shear)| {
                shear
                    .as_ref()
                    .ok()
                    .map(|uv| (band.as_ref().to_owned(), round_tenth(magnitude(uv))))
            })
            .collect();

        let (bunkers_right_kt, bunkers_left_kt) = match &self.storm_motion {
            Ok((right, left)) => (Some(uv_pair(right)), Some(uv_pair(left))),
            Err(_) => (None, None),
        };

        IndexSummary {
            station_id: self.station_id.clone(),
            valid_time: self
                .valid_time
                .map(|vt| vt.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            parcel: self.config.parcel,
            cin_policy: self.config.cin_policy,
            saturated: thermo.map(ThermoResult::saturated),
            cape_jkg: thermo_value(thermo, |t| Some(t.cape().unpack())),
            cin_jkg: thermo_value(thermo, |t| Some(t.cin().unpack())),
            hail_cape_jkg: thermo_value(thermo, |t| Some(t.hail_cape().unpack())),
            lifted_index: thermo_value(thermo, |t| t.lifted_index().into_option()),
            lcl_hpa: thermo_value(thermo, |t| {
                t.lcl_pressure().into_option().map(Quantity::unpack)
            }),
            lcl_m_agl: thermo_value(thermo, |t| {
                t.lcl_height_agl().into_option().map(Quantity::unpack)
            }),
            lfc_hpa: thermo_value(thermo, |t| {
                t.lfc_pressure().into_option().map(Quantity::unpack)
            }),
            lfc_m_asl: thermo_value(thermo, |t| {
                t.lfc_height_asl().into_option().map(Quantity::unpack)
            }),
            el_hpa: thermo_value(thermo, |t| {
                t.el_pressure().into_option().map(Quantity::unpack)
            }),
            el_m_asl: thermo_value(thermo, |t| {
                t.el_height_asl().into_option().map(Quantity::unpack)
            }),
            bulk_shear_kt,
            bunkers_right_kt,
            bunkers_left_kt,
            error: self.thermo.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Flat summary of an analysis, every value rounded to a tenth.
///
/// Missing values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    /// Station identifier, if known.
    pub station_id: Option<String>,
    /// Valid time in ISO 8601, if known.
    pub valid_time: Option<String>,
    /// Which parcel was lifted.
    pub parcel: ParcelKind,
    /// How CIN was counted.
    pub cin_policy: CinPolicy,
    /// Whether the parcel saturated, `None` if the parcel analysis failed.
    pub saturated: Option<bool>,
    /// CAPE in J/kg.
    pub cape_jkg: Option<f64>,
    /// CIN in J/kg.
    pub cin_jkg: Option<f64>,
    /// CAPE in the hail growth zone in J/kg.
    pub hail_cape_jkg: Option<f64>,
    /// Lifted index at 500 hPa.
    pub lifted_index: Option<f64>,
    /// LCL pressure in hPa.
    pub lcl_hpa: Option<f64>,
    /// LCL height above the surface in meters.
    pub lcl_m_agl: Option<f64>,
    /// LFC pressure in hPa.
    pub lfc_hpa: Option<f64>,
    /// LFC height above sea level in meters.
    pub lfc_m_asl: Option<f64>,
    /// EL pressure in hPa.
    pub el_hpa: Option<f64>,
    /// EL height above sea level in meters.
    pub el_m_asl: Option<f64>,
    /// Bulk shear magnitude in knots keyed by layer name, e.g. "0-6km".
    pub bulk_shear_kt: BTreeMap<String, f64>,
    /// Bunkers right mover (u, v) in knots.
    pub bunkers_right_kt: Option<(f64, f64)>,
    /// Bunkers left mover (u, v) in knots.
    pub bunkers_left_kt: Option<(f64, f64)>,
    /// Why the parcel analysis failed, if it did.
    pub error: Option<String>,
}

fn thermo_value<F>(thermo: Option<&ThermoResult>, f: F) -> Option<f64>
where
    F: FnOnce(&ThermoResult) -> Option<f64>,
{
    thermo.and_then(f).map(round_tenth)
}

#[inline]
fn round_tenth(val: f64) -> f64 {
    let rounded = (val * 10.0).round() / 10.0;
    // No negative zero in the summary.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[inline]
fn magnitude(uv: &WindUV<Knots>) -> f64 {
    uv.u.unpack().hypot(uv.v.unpack())
}

#[inline]
fn uv_pair(uv: &WindUV<Knots>) -> (f64, f64) {
    (round_tenth(uv.u.unpack()), round_tenth(uv.v.unpack()))
}
