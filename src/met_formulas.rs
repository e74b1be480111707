//! Thermodynamic formulas shared by the parcel lifting and buoyancy integration.
//!
//! Every routine that compares a parcel to its environment goes through these functions, so the
//! LCL solve, the pseudo-adiabat step solve, and the buoyancy integrand all agree on what
//! "saturated" means. Saturation vapor pressure follows Bolton (1980) over liquid water.
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// Latent heat of vaporization of water at 0C in J/kg.
pub const LV: f64 = 2.501e6;

/// Reference pressure for potential temperature.
pub const P0: HectoPascal = HectoPascal(1000.0);

/// Poisson constant, Rd / cpd.
#[inline]
pub fn kappa() -> f64 {
    metfor::Rd / metfor::cpd
}

/// Magnitude of the acceleration of gravity in m/s^2.
///
/// `metfor::g` is signed as a downward vector.
#[inline]
pub fn gravity() -> f64 {
    metfor::g.abs()
}

/// Saturation vapor pressure over liquid water.
#[inline]
pub fn saturation_vapor_pressure(t: Celsius) -> HectoPascal {
    let t = t.unpack();
    HectoPascal(6.112 * f64::exp(17.67 * t / (t + 243.5)))
}

/// Mixing ratio (kg/kg) of air with dew point `dp` at pressure `p`.
///
/// Returns `None` where the vapor pressure meets or exceeds the total pressure, which only happens
/// for absurdly warm temperatures at very low pressure.
#[inline]
pub fn mixing_ratio(dp: Celsius, p: HectoPascal) -> Option<f64> {
    let e = saturation_vapor_pressure(dp).unpack();
    let p = p.unpack();

    if e >= p || !e.is_finite() {
        None
    } else {
        Some(metfor::epsilon * e / (p - e))
    }
}

/// Dew point for a given mixing ratio (kg/kg) and pressure, the inverse of `mixing_ratio`.
pub fn dew_point_from_mixing_ratio(mw: f64, p: HectoPascal) -> Option<Celsius> {
    if mw <= 0.0 {
        return None;
    }

    let e = p.unpack() * mw / (metfor::epsilon + mw);
    let ln_ratio = (e / 6.112).ln();
    let denom = 17.67 - ln_ratio;
    if denom <= 0.0 {
        return None;
    }

    Some(Celsius(243.5 * ln_ratio / denom))
}

/// Virtual temperature of air at temperature `t` carrying `mw` kg/kg of water vapor.
#[inline]
pub fn virtual_temperature(t: Celsius, mw: f64) -> Kelvin {
    let t_k = Kelvin::from(t).unpack();
    Kelvin(t_k * (1.0 + mw / metfor::epsilon) / (1.0 + mw))
}

/// Potential temperature.
#[inline]
pub fn potential_temperature(t: Celsius, p: HectoPascal) -> Kelvin {
    let t_k = Kelvin::from(t).unpack();
    Kelvin(t_k * (P0.unpack() / p.unpack()).powf(kappa()))
}

/// Temperature at pressure `p` of air with potential temperature `theta`.
#[inline]
pub fn temperature_from_theta(theta: Kelvin, p: HectoPascal) -> Celsius {
    Celsius::from(Kelvin(
        theta.unpack() * (p.unpack() / P0.unpack()).powf(kappa()),
    ))
}

/// Pseudo-adiabatic invariant of saturated air, in J/kg/K up to an additive constant.
///
/// `cpd ln(T) - Rd ln(p) + Lv rs(T, p) / T` is conserved along a pseudo-adiabat when the
/// condensate falls out as soon as it forms.
#[inline]
pub fn saturated_moist_entropy(t: Celsius, p: HectoPascal) -> Option<f64> {
    let rs = mixing_ratio(t, p)?;
    let t_k = Kelvin::from(t).unpack();

    let (cpd, rd) = (metfor::cpd.unpack(), metfor::Rd.unpack());

    Some(cpd * t_k.ln() - rd * p.unpack().ln() + LV * rs / t_k)
}

/// Equivalent potential temperature, Bolton (1980) equation 43.
///
/// Only used to rank candidate parcels, the lifting itself never uses this approximation.
pub fn equivalent_potential_temperature(
    t: Celsius,
    dp: Celsius,
    p: HectoPascal,
) -> Option<Kelvin> {
    let t_k = Kelvin::from(t).unpack();
    let dp_k = Kelvin::from(dp).unpack();
    let r = mixing_ratio(dp, p)? * 1000.0; // g/kg

    let t_lcl = 1.0 / (1.0 / (dp_k - 56.0) + (t_k / dp_k).ln() / 800.0) + 56.0;
    let theta = t_k * (P0.unpack() / p.unpack()).powf(0.2854 * (1.0 - 0.28e-3 * r));

    Some(Kelvin(
        theta * ((3.376 / t_lcl - 0.00254) * r * (1.0 + 0.81e-3 * r)).exp(),
    ))
}
