//! Query a profile at arbitrary pressures and heights.
//!
//! Temperature, dew point, and height are linear in the logarithm of pressure between the
//! bracketing levels. Winds are interpolated on their u and v components. Nothing is ever
//! extrapolated, queries outside the profile fail with `OutOfRange`.
use crate::{
    error::{AnalysisError, ProfileDefect, Result},
    met_formulas,
    sounding::{Level, SoundingProfile},
    wind,
};
use itertools::Itertools;
use metfor::{Celsius, HectoPascal, Kelvin, Knots, Meters, Quantity, WindSpdDir, WindUV};
use optional::Optioned;

// What kind of bracket is this?
#[derive(Clone, Copy, Debug)]
enum Bracket {
    // The target matched a level, index of that level.
    EndEquals(usize),
    // Index of the level below, index of the level above, and the fraction of the way up.
    Between(usize, usize, f64),
}

fn pressure_bracket(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Bracket> {
    let out_of_range = || AnalysisError::OutOfRange {
        pressure: tgt_p.unpack(),
    };

    let target = tgt_p.unpack();
    if !target.is_finite() || target <= 0.0 {
        return Err(out_of_range());
    }
    let ln_target = target.ln();

    // Map this pair of slice index and pressure points to a Bracket
    let make_bracket = |pnt_0: (usize, f64), pnt_1: (usize, f64)| -> Option<Bracket> {
        let (i0, p0) = pnt_0;
        let (i1, p1) = pnt_1;

        // Validation guarantees pressure is sorted in descending order
        debug_assert!(p0 > p1);
        if (p0 - target).abs() < std::f64::EPSILON {
            Some(Bracket::EndEquals(i0))
        } else if (p1 - target).abs() < std::f64::EPSILON {
            Some(Bracket::EndEquals(i1))
        } else if p0 > target && p1 < target {
            let frac = (p0.ln() - ln_target) / (p0.ln() - p1.ln());
            Some(Bracket::Between(i0, i1, frac))
        } else {
            None
        }
    };

    profile
        .levels()
        .iter()
        .map(|lvl| lvl.pressure.unpack())
        .enumerate()
        // Look at the levels two at a time...
        .tuple_windows::<(_, _)>()
        // ...and keep the first pair that brackets the target.
        .find_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .ok_or_else(out_of_range)
}

#[inline]
fn lerp(y0: f64, y1: f64, frac: f64) -> f64 {
    y0 + frac * (y1 - y0)
}

fn interpolate_by<Q, F>(profile: &SoundingProfile, tgt_p: HectoPascal, select: F) -> Result<Q>
where
    Q: Quantity,
    F: Fn(&Level) -> Q,
{
    let levels = profile.levels();

    match pressure_bracket(profile, tgt_p)? {
        Bracket::EndEquals(i) => Ok(select(&levels[i])),
        Bracket::Between(i0, i1, frac) => Ok(Q::pack(lerp(
            select(&levels[i0]).unpack(),
            select(&levels[i1]).unpack(),
            frac,
        ))),
    }
}

/// Temperature at pressure `tgt_p`, linear in ln(p).
///
/// # Examples
///
/// ```rust
/// use metfor::{Celsius, HectoPascal};
/// use sounding_thermo::{doctest::make_test_sounding, interpolation::temperature_at, AnalysisError};
///
/// let snd = make_test_sounding();
///
/// // Exactly on a level returns the recorded value.
/// assert_eq!(temperature_at(&snd, HectoPascal(850.0)).unwrap(), Celsius(20.0));
///
/// // Between levels the value lies between the neighbors.
/// let t = temperature_at(&snd, HectoPascal(750.0)).unwrap();
/// assert!(t < Celsius(16.5) && t > Celsius(9.0));
///
/// // Never extrapolates.
/// assert!(matches!(
///     temperature_at(&snd, HectoPascal(1013.0)),
///     Err(AnalysisError::OutOfRange { .. })
/// ));
/// ```
pub fn temperature_at(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Celsius> {
    interpolate_by(profile, tgt_p, |lvl| lvl.temperature)
}

/// Dew point at pressure `tgt_p`, linear in ln(p).
pub fn dew_point_at(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Celsius> {
    interpolate_by(profile, tgt_p, |lvl| lvl.dew_point)
}

/// Geopotential height at pressure `tgt_p`, linear in ln(p).
pub fn height_at(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Meters> {
    interpolate_by(profile, tgt_p, |lvl| lvl.height)
}

/// Virtual temperature of the environment at pressure `tgt_p`.
///
/// Temperature and dew point are interpolated first, then corrected for the water vapor the
/// interpolated dew point implies.
pub fn virtual_temperature_at(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Kelvin> {
    let t = temperature_at(profile, tgt_p)?;
    let dp = dew_point_at(profile, tgt_p)?;

    met_formulas::mixing_ratio(dp, tgt_p)
        .map(|mw| met_formulas::virtual_temperature(t, mw))
        .ok_or_else(|| {
            ProfileDefect::UnphysicalTemperature {
                pressure: tgt_p.unpack(),
            }
            .into()
        })
}

/// Interpolate a complete level at pressure `tgt_p`.
///
/// The wind is only present when the levels on both sides of the target have one.
pub fn level_at(profile: &SoundingProfile, tgt_p: HectoPascal) -> Result<Level> {
    let levels = profile.levels();

    let (i0, i1, frac) = match pressure_bracket(profile, tgt_p)? {
        Bracket::EndEquals(i) => return Ok(levels[i]),
        Bracket::Between(i0, i1, frac) => (i0, i1, frac),
    };

    let (below, above) = (&levels[i0], &levels[i1]);

    let mut result = Level::new(
        tgt_p,
        Meters(lerp(below.height.unpack(), above.height.unpack(), frac)),
        Celsius(lerp(
            below.temperature.unpack(),
            above.temperature.unpack(),
            frac,
        )),
        Celsius(lerp(below.dew_point.unpack(), above.dew_point.unpack(), frac)),
    );

    result.wind = interpolate_wind(below.wind, above.wind, frac);

    Ok(result)
}

/// Wind at a height above mean sea level, u and v linear in height.
///
/// Levels without a wind are skipped, so a missing wind is bridged by the winds on either side.
/// Fails with `InsufficientData` if no pair of levels with winds brackets the height.
pub fn wind_at_height(profile: &SoundingProfile, tgt_h: Meters) -> Result<WindUV<Knots>> {
    let target = tgt_h.unpack();

    profile
        .levels()
        .iter()
        .filter_map(|lvl| {
            lvl.wind
                .into_option()
                .map(|w| (lvl.height.unpack(), wind::uv_from_spd_dir(w)))
        })
        .tuple_windows::<(_, _)>()
        .find_map(|((h0, w0), (h1, w1))| {
            if (h0 - target).abs() < std::f64::EPSILON {
                Some(w0)
            } else if (h1 - target).abs() < std::f64::EPSILON {
                Some(w1)
            } else if h0 < target && h1 > target {
                let frac = (target - h0) / (h1 - h0);
                Some(WindUV {
                    u: Knots(lerp(w0.u.unpack(), w1.u.unpack(), frac)),
                    v: Knots(lerp(w0.v.unpack(), w1.v.unpack(), frac)),
                })
            } else {
                None
            }
        })
        .ok_or(AnalysisError::InsufficientData)
}

fn interpolate_wind(
    below: Optioned<WindSpdDir<Knots>>,
    above: Optioned<WindSpdDir<Knots>>,
    frac: f64,
) -> Optioned<WindSpdDir<Knots>> {
    // Special interpolation for vectors
    if let (Some(w_below), Some(w_above)) = (below.into_option(), above.into_option()) {
        let WindUV::<Knots> {
            u: x_below,
            v: y_below,
        } = wind::uv_from_spd_dir(w_below);
        let WindUV::<Knots> {
            u: x_above,
            v: y_above,
        } = wind::uv_from_spd_dir(w_above);

        let x = lerp(x_below.unpack(), x_above.unpack(), frac);
        let y = lerp(y_below.unpack(), y_above.unpack(), frac);

        optional::some(wind::spd_dir_from_uv(WindUV {
            u: Knots(x),
            v: Knots(y),
        }))
    } else {
        Optioned::default()
    }
}
