use super::{ParcelPath, ThermoResult};
use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    interpolation::{height_at, temperature_at, virtual_temperature_at},
    keys::CinPolicy,
    met_formulas,
    sounding::SoundingProfile,
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, JpKg, Meters, Quantity};
use optional::{none, some, Optioned};
use tracing::debug;

/// Pressure level used for the lifted index.
const LIFTED_INDEX_PRESSURE: HectoPascal = HectoPascal(500.0);

// Parcel temperature range of the hail growth zone.
const HAIL_ZONE_WARM: f64 = -10.0;
const HAIL_ZONE_COLD: f64 = -30.0;

/// A point where the buoyancy is known, either a level of the parcel path or an interpolated
/// crossing where the buoyancy changes sign.
#[derive(Debug, Clone, Copy)]
struct BuoyancyPoint {
    pressure: f64,
    height: f64,
    // Buoyant acceleration in m/s^2
    buoyancy: f64,
    // Actual (not virtual) parcel temperature in C
    parcel_t: f64,
}

impl BuoyancyPoint {
    fn zero_crossing(lower: &Self, upper: &Self) -> Self {
        let frac = lower.buoyancy / (lower.buoyancy - upper.buoyancy);
        let ln_p = lower.pressure.ln() + frac * (upper.pressure.ln() - lower.pressure.ln());

        BuoyancyPoint {
            pressure: ln_p.exp(),
            height: lower.height + frac * (upper.height - lower.height),
            buoyancy: 0.0,
            parcel_t: lower.parcel_t + frac * (upper.parcel_t - lower.parcel_t),
        }
    }
}

/// Area between two consecutive points by the trapezoid rule, in J/kg.
#[inline]
fn layer_area(lower: &BuoyancyPoint, upper: &BuoyancyPoint) -> f64 {
    (lower.buoyancy + upper.buoyancy) / 2.0 * (upper.height - lower.height)
}

pub(crate) fn integrate(
    profile: &SoundingProfile,
    path: &ParcelPath,
    config: &AnalysisConfig,
) -> Result<ThermoResult> {
    let lcl_index = match path.lcl_index() {
        Some(i) => i,
        None => {
            return Ok(ThermoResult::unsaturated(
                *path.parcel(),
                config.cin_policy,
            ))
        }
    };

    let g = met_formulas::gravity();

    //
    // Buoyancy at every level of the path
    //
    let raw_points: Vec<BuoyancyPoint> = path
        .levels()
        .iter()
        .map(|lvl| {
            let env_tv = virtual_temperature_at(profile, lvl.pressure)?.unpack();
            let pcl_tv = lvl.virtual_temperature().unpack();
            let height = height_at(profile, lvl.pressure)?.unpack();

            Ok(BuoyancyPoint {
                pressure: lvl.pressure.unpack(),
                height,
                buoyancy: g * (pcl_tv - env_tv) / env_tv,
                parcel_t: lvl.temperature.unpack(),
            })
        })
        .collect::<Result<_>>()?;

    //
    // Insert the zero crossings so every layer has a single sign, and remember where the LCL went.
    //
    let mut points: Vec<BuoyancyPoint> = Vec::with_capacity(raw_points.len() * 2);
    let mut lcl_pnt = 0;
    for (i, pnt) in raw_points.iter().enumerate() {
        if let Some(prev) = points.last().copied() {
            if (prev.buoyancy > 0.0 && pnt.buoyancy < 0.0)
                || (prev.buoyancy < 0.0 && pnt.buoyancy > 0.0)
            {
                points.push(BuoyancyPoint::zero_crossing(&prev, pnt));
            }
        }

        if i == lcl_index {
            lcl_pnt = points.len();
        }
        points.push(*pnt);
    }

    // Layer i lies between points i and i + 1.
    let areas: Vec<f64> = points
        .iter()
        .tuple_windows::<(_, _)>()
        .map(|(lower, upper)| layer_area(lower, upper))
        .collect();

    //
    // LFC: bottom of the first positive layer at or above the LCL with enough area.
    //
    let lfc_pnt: Option<usize> = positive_runs(&areas, lcl_pnt)
        .find(|&(start, end)| areas[start..end].iter().sum::<f64>() >= config.lfc_min_positive_area)
        .map(|(start, _)| start);

    //
    // EL: top of the last positive layer above the LFC, as long as the parcel is not still buoyant
    // at the top of the profile.
    //
    let last_pnt = points.len() - 1;
    let el_pnt: Option<usize> = lfc_pnt.and_then(|lfc| {
        positive_runs(&areas, lfc)
            .last()
            .map(|(_, end)| end)
            .filter(|&end| !(end == last_pnt && points[end].buoyancy > 0.0))
    });

    //
    // CAPE and CIN
    //
    let sum_where = |from: usize, to: usize, keep: &dyn Fn(f64) -> bool| -> f64 {
        areas[from..to].iter().filter(|&&a| keep(a)).sum()
    };
    let positive = |a: f64| a > 0.0;
    let negative = |a: f64| a < 0.0;

    let (cape, cin, hail_cape) = match lfc_pnt {
        Some(lfc) => {
            let top = el_pnt.unwrap_or(last_pnt);

            let cape = sum_where(lfc, top, &positive);
            let cin = match config.cin_policy {
                CinPolicy::BelowLfc => sum_where(0, lfc, &negative),
                CinPolicy::BelowEl => sum_where(0, top, &negative),
            };

            let hail_cape: f64 = (lfc..top)
                .filter(|&i| areas[i] > 0.0)
                .filter(|&i| {
                    let mean_t = (points[i].parcel_t + points[i + 1].parcel_t) / 2.0;
                    mean_t <= HAIL_ZONE_WARM && mean_t >= HAIL_ZONE_COLD
                })
                .map(|i| areas[i])
                .sum();

            (cape, cin, hail_cape)
        }
        // No LFC, no CAPE, and all the negative area is inhibition.
        None => (0.0, sum_where(0, areas.len(), &negative), 0.0),
    };

    //
    // Finalize the levels.
    //
    let sfc_height = profile.surface().height;
    let lcl = points[lcl_pnt];
    let lcl_temperature = path.levels()[lcl_index].temperature;

    let (lfc_pressure, lfc_height_asl) = level_values(&points, lfc_pnt);
    let (el_pressure, el_height_asl) = level_values(&points, el_pnt);

    let el_temperature: Optioned<Celsius> = match el_pressure.into_option() {
        Some(el_p) => some(temperature_at(profile, el_p)?),
        None => none(),
    };

    let ncape = match (lfc_height_asl.into_option(), el_height_asl.into_option()) {
        (Some(lfc_h), Some(el_h)) if el_h > lfc_h => some(cape / (el_h.unpack() - lfc_h.unpack())),
        _ => none(),
    };

    let lifted_index = lifted_index(profile, path)?;

    debug!(
        cape,
        cin,
        lfc = ?lfc_pressure.into_option().map(|p| p.unpack()),
        el = ?el_pressure.into_option().map(|p| p.unpack()),
        "integrated parcel buoyancy"
    );

    Ok(ThermoResult {
        parcel: *path.parcel(),
        cin_policy: config.cin_policy,
        saturated: true,
        cape: JpKg(if cape > 0.0 { cape } else { 0.0 }),
        cin: JpKg(if cin < 0.0 { cin } else { 0.0 }),
        hail_cape: JpKg(if hail_cape > 0.0 { hail_cape } else { 0.0 }),
        ncape,
        lifted_index,
        lcl_pressure: some(HectoPascal(lcl.pressure)),
        lcl_height_asl: some(Meters(lcl.height)),
        lcl_height_agl: some(Meters(lcl.height - sfc_height.unpack())),
        lcl_temperature: some(lcl_temperature),
        lfc_pressure,
        lfc_height_asl,
        el_pressure,
        el_height_asl,
        el_temperature,
    })
}

/// Iterate over the runs of consecutive positive layers starting at or above layer `from`.
///
/// Each item is `(start, end)`, the indices of the bottom and top points of the run, so the layers
/// of the run are `areas[start..end]`.
fn positive_runs(areas: &[f64], from: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut i = from;

    std::iter::from_fn(move || {
        while i < areas.len() && areas[i] <= 0.0 {
            i += 1;
        }
        if i >= areas.len() {
            return None;
        }

        let start = i;
        while i < areas.len() && areas[i] > 0.0 {
            i += 1;
        }

        Some((start, i))
    })
}

fn level_values(
    points: &[BuoyancyPoint],
    idx: Option<usize>,
) -> (Optioned<HectoPascal>, Optioned<Meters>) {
    match idx.map(|i| points[i]) {
        Some(pnt) => (some(HectoPascal(pnt.pressure)), some(Meters(pnt.height))),
        None => (none(), none()),
    }
}

fn lifted_index(profile: &SoundingProfile, path: &ParcelPath) -> Result<Optioned<f64>> {
    let parcel_t = match path.temperature_at(LIFTED_INDEX_PRESSURE) {
        Some(t) => t,
        None => return Ok(none()),
    };

    match temperature_at(profile, LIFTED_INDEX_PRESSURE) {
        Ok(env_t) => Ok(some(env_t.unpack() - parcel_t.unpack())),
        Err(AnalysisError::OutOfRange { .. }) => Ok(none()),
        Err(err) => Err(err),
    }
}
