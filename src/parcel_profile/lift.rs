use super::{ParcelLevel, ParcelPath, Phase};
use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, Result},
    met_formulas::{
        mixing_ratio, potential_temperature, saturated_moist_entropy, temperature_from_theta,
    },
    parcel::Parcel,
    sounding::SoundingProfile,
    utility::find_root,
};
use metfor::{Celsius, HectoPascal, Quantity};
use tracing::{debug, warn};

// Width of the initial temperature bracket for a pseudo-adiabat step, and how many times it may
// be pushed colder before giving up.
const MOIST_BRACKET_WIDTH: f64 = 30.0;
const MAX_BRACKET_EXPANSIONS: usize = 8;

pub(crate) fn lift_parcel(
    profile: &SoundingProfile,
    parcel: Parcel,
    config: &AnalysisConfig,
) -> Result<ParcelPath> {
    config.validate()?;

    let p0 = parcel.pressure.unpack();
    let bottom = profile.bottom_pressure().unpack();
    let top = profile.top_pressure().unpack();

    if !(p0.is_finite() && p0 <= bottom && p0 >= top) {
        return Err(AnalysisError::OutOfRange { pressure: p0 });
    }

    let mw0 = parcel.mixing_ratio()?;
    let theta = potential_temperature(parcel.temperature, parcel.pressure);
    let step = config.pressure_step;

    let dry_t = |p: f64| temperature_from_theta(theta, HectoPascal(p));

    // Saturation mixing ratio along the dry adiabat minus the parcel's mixing ratio. Positive
    // while the parcel is unsaturated.
    let deficit = |p: f64| {
        mixing_ratio(dry_t(p), HectoPascal(p))
            .map(|ws| ws - mw0)
            .unwrap_or(std::f64::INFINITY)
    };

    let mut levels: Vec<ParcelLevel> = vec![];

    //
    // Dry ascent to the LCL
    //
    let (lcl_p, lcl_t) = if parcel.dew_point_depression() <= 0.0 || deficit(p0) <= 0.0 {
        // Saturated at the start, the LCL is the starting level.
        (p0, parcel.temperature)
    } else {
        levels.push(ParcelLevel {
            pressure: parcel.pressure,
            temperature: parcel.temperature,
            mixing_ratio: mw0,
            phase: Phase::Dry,
        });

        let mut p = p0;
        let lcl_p = loop {
            if p <= top {
                debug!(
                    start_pressure = p0,
                    top_pressure = top,
                    "parcel never saturated"
                );
                return Err(AnalysisError::SaturationNeverReached);
            }

            let p_next = (p - step).max(top);

            if deficit(p_next) <= 0.0 {
                break find_root(
                    &deficit,
                    p_next,
                    p,
                    config.lcl_tolerance,
                    config.max_iterations,
                )
                .ok_or_else(|| divergence("LCL", p))?;
            }

            levels.push(ParcelLevel {
                pressure: HectoPascal(p_next),
                temperature: dry_t(p_next),
                mixing_ratio: mw0,
                phase: Phase::Dry,
            });
            p = p_next;
        };

        (lcl_p, dry_t(lcl_p))
    };

    debug!(
        lcl_pressure = lcl_p,
        lcl_temperature = lcl_t.unpack(),
        "found LCL"
    );

    levels.push(ParcelLevel {
        pressure: HectoPascal(lcl_p),
        temperature: lcl_t,
        mixing_ratio: mixing_ratio(lcl_t, HectoPascal(lcl_p)).unwrap_or(mw0),
        phase: Phase::Saturated,
    });

    //
    // Pseudo-adiabatic ascent from the LCL to the top of the profile
    //
    let entropy = saturated_moist_entropy(lcl_t, HectoPascal(lcl_p))
        .ok_or_else(|| divergence("moist adiabat", lcl_p))?;

    let (mut p, mut t) = (lcl_p, lcl_t);
    while p > top {
        let p_next = (p - step).max(top);

        t = moist_step(t, p_next, entropy, config)
            .ok_or_else(|| divergence("moist adiabat", p_next))?;

        levels.push(ParcelLevel {
            pressure: HectoPascal(p_next),
            temperature: t,
            mixing_ratio: mixing_ratio(t, HectoPascal(p_next)).unwrap_or(0.0),
            phase: Phase::Saturated,
        });
        p = p_next;
    }

    Ok(ParcelPath::new(parcel, levels))
}

/// Solve for the temperature at `p` on the pseudo-adiabat through `entropy`, starting from the
/// temperature `t_below` at the previous (higher pressure) step.
fn moist_step(
    t_below: Celsius,
    p: f64,
    entropy: f64,
    config: &AnalysisConfig,
) -> Option<Celsius> {
    let pressure = HectoPascal(p);
    let f = |t: f64| {
        saturated_moist_entropy(Celsius(t), pressure)
            .map(|s| s - entropy)
            .unwrap_or(std::f64::INFINITY)
    };

    // A rising parcel only cools, so the previous temperature is the warm end of the bracket.
    let high = t_below.unpack();
    let mut low = high - MOIST_BRACKET_WIDTH;
    let mut expansions = 0;
    while f(low) > 0.0 {
        if expansions >= MAX_BRACKET_EXPANSIONS {
            return None;
        }
        low -= MOIST_BRACKET_WIDTH;
        expansions += 1;
    }

    find_root(
        f,
        low,
        high,
        config.moist_tolerance,
        config.max_iterations,
    )
    .map(Celsius)
}

fn divergence(what: &str, pressure: f64) -> AnalysisError {
    warn!(pressure, solve = what, "root finding failed to converge");
    AnalysisError::NumericDivergence { pressure }
}
