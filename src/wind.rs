//! Wind components, bulk shear, and storm motion from the wind profile.
//!
//! Everything here works in knots, the unit the profile records winds in.
use crate::{
    error::{AnalysisError, Result},
    interpolation::wind_at_height,
    sounding::{Level, SoundingProfile},
};
use itertools::Itertools;
use metfor::{HectoPascal, Knots, Meters, Quantity, WindSpdDir, WindUV};
use std::iter::once;
use strum_macros::{AsRefStr, EnumIter};

/// The u and v components of the wind at one level.
#[derive(Debug, Clone, Copy)]
pub struct WindComponents {
    /// Pressure of the level.
    pub pressure: HectoPascal,
    /// Height of the level above mean sea level.
    pub height: Meters,
    /// Positive toward the east.
    pub u: Knots,
    /// Positive toward the north.
    pub v: Knots,
}

/// Deviation of supercell motion from the mean wind, 7.5 m/s.
const BUNKERS_DEVIATION_KT: f64 = 7.5 * 3600.0 / 1852.0;

/// Convert a meteorological speed and direction to u and v.
///
/// Direction is where the wind blows *from*, so a west wind has a positive u.
///
/// # Examples
///
/// ```rust
/// use metfor::{Knots, WindSpdDir, Quantity};
/// use sounding_thermo::wind::uv_from_spd_dir;
///
/// let uv = uv_from_spd_dir(WindSpdDir { speed: Knots(10.0), direction: 270.0 });
/// assert!((uv.u.unpack() - 10.0).abs() < 1.0e-9);
/// assert!(uv.v.unpack().abs() < 1.0e-9);
/// ```
#[inline]
pub fn uv_from_spd_dir(wind: WindSpdDir<Knots>) -> WindUV<Knots> {
    let speed = wind.speed.unpack();
    let rads = wind.direction.to_radians();

    WindUV {
        u: Knots(-speed * rads.sin()),
        v: Knots(-speed * rads.cos()),
    }
}

/// Convert u and v back to a speed and the direction the wind blows from.
///
/// A calm wind gets a direction of zero.
#[inline]
pub fn spd_dir_from_uv(uv: WindUV<Knots>) -> WindSpdDir<Knots> {
    let (u, v) = (uv.u.unpack(), uv.v.unpack());
    let speed = u.hypot(v);

    let direction = if speed == 0.0 {
        0.0
    } else {
        let dir = f64::atan2(-u, -v).to_degrees();
        if dir < 0.0 {
            dir + 360.0
        } else {
            dir
        }
    };

    WindSpdDir {
        speed: Knots(speed),
        direction,
    }
}

/// Project every level with a wind onto u and v components.
///
/// Levels without a wind are skipped.
pub fn components(levels: &[Level]) -> Vec<WindComponents> {
    levels
        .iter()
        .filter_map(|lvl| {
            lvl.wind.into_option().map(|w| {
                let WindUV { u, v } = uv_from_spd_dir(w);
                WindComponents {
                    pressure: lvl.pressure,
                    height: lvl.height,
                    u,
                    v,
                }
            })
        })
        .collect()
}

/// Standard layers for bulk shear, heights above ground level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
pub enum ShearBand {
    /// Surface to 1 km
    #[strum(serialize = "0-1km")]
    ZeroToOneKm,
    /// Surface to 3 km
    #[strum(serialize = "0-3km")]
    ZeroToThreeKm,
    /// Surface to 6 km, the usual deep layer shear
    #[strum(serialize = "0-6km")]
    ZeroToSixKm,
    /// Surface to 8 km
    #[strum(serialize = "0-8km")]
    ZeroToEightKm,
}

impl ShearBand {
    /// Bottom of the band above ground level.
    #[inline]
    pub fn bottom_agl(self) -> Meters {
        Meters(0.0)
    }

    /// Top of the band above ground level.
    #[inline]
    pub fn top_agl(self) -> Meters {
        use ShearBand::*;

        match self {
            ZeroToOneKm => Meters(1000.0),
            ZeroToThreeKm => Meters(3000.0),
            ZeroToSixKm => Meters(6000.0),
            ZeroToEightKm => Meters(8000.0),
        }
    }
}

/// Bulk shear, the vector difference between the winds at two heights above ground level.
///
/// Winds are interpolated linearly in height. Fails with `InsufficientData` if either height is
/// not bracketed by levels with winds.
pub fn bulk_shear(
    profile: &SoundingProfile,
    bottom_agl: Meters,
    top_agl: Meters,
) -> Result<WindUV<Knots>> {
    let sfc = profile.surface().height.unpack();

    let bottom = wind_at_height(profile, Meters(sfc + bottom_agl.unpack()))?;
    let top = wind_at_height(profile, Meters(sfc + top_agl.unpack()))?;

    Ok(WindUV {
        u: Knots(top.u.unpack() - bottom.u.unpack()),
        v: Knots(top.v.unpack() - bottom.v.unpack()),
    })
}

/// Bulk shear over one of the standard bands.
#[inline]
pub fn band_shear(profile: &SoundingProfile, band: ShearBand) -> Result<WindUV<Knots>> {
    bulk_shear(profile, band.bottom_agl(), band.top_agl())
}

/// Calculate the mean wind in a layer given by heights above ground level.
///
/// This is NOT the pressure weighted mean, it is the height weighted mean found with the
/// trapezoid rule.
pub fn mean_wind(
    profile: &SoundingProfile,
    bottom_agl: Meters,
    top_agl: Meters,
) -> Result<WindUV<Knots>> {
    let sfc = profile.surface().height.unpack();
    let (min_hgt, max_hgt) = (sfc + bottom_agl.unpack(), sfc + top_agl.unpack());

    if !(max_hgt > min_hgt) {
        return Err(AnalysisError::InsufficientData);
    }

    let bottom_wind = wind_at_height(profile, Meters(min_hgt))?;
    let top_wind = wind_at_height(profile, Meters(max_hgt))?;

    let intermediate_layers = profile
        .levels()
        .iter()
        .filter_map(|lvl| {
            lvl.wind
                .into_option()
                .map(|w| (lvl.height.unpack(), uv_from_spd_dir(w)))
        })
        // Skip values at or below the layer
        .skip_while(|&(hgt, _)| hgt <= min_hgt)
        // Only take values below the top of the layer
        .take_while(|&(hgt, _)| hgt < max_hgt);

    let (iu, iv, dz) =
        // Start at the bottom of the layer
        once((min_hgt, bottom_wind))
        // Add in any intermediate layers
        .chain(intermediate_layers)
        // Finish with the top layer
        .chain(once((max_hgt, top_wind)))
        // Make windows to see two points at a time for trapezoid rule integration
        .tuple_windows::<(_, _)>()
        // Integration with the trapezoid rule to find the mean value
        .fold(
            (
                0.0, // integrated u component so far
                0.0, // integrated v component so far
                0.0, // the total distance integrated so far
            ),
            |acc, ((h0, w0), (h1, w1))| {
                let (mut iu, mut iv, mut acc_dz) = acc;

                let dz = h1 - h0;

                iu += (w0.u.unpack() + w1.u.unpack()) * dz;
                iv += (w0.v.unpack() + w1.v.unpack()) * dz;
                acc_dz += dz;

                (iu, iv, acc_dz)
            },
        );

    // divide by height and constant of 2 for trapezoid rule
    Ok(WindUV {
        u: Knots(iu / (2.0 * dz)),
        v: Knots(iv / (2.0 * dz)),
    })
}

/// Calculate the supercell storm motion with the Bunkers "id" method.
///
/// The 0-6 km mean wind is deviated 7.5 m/s normal to the 0-6 km bulk shear. Returns the storm
/// motions of the (right mover, left mover).
pub fn bunkers_storm_motion(profile: &SoundingProfile) -> Result<(WindUV<Knots>, WindUV<Knots>)> {
    let (bottom, top) = (
        ShearBand::ZeroToSixKm.bottom_agl(),
        ShearBand::ZeroToSixKm.top_agl(),
    );

    let WindUV {
        u: mean_u,
        v: mean_v,
    } = mean_wind(profile, bottom, top)?;

    let WindUV {
        u: shear_u,
        v: shear_v,
    } = bulk_shear(profile, bottom, top)?;

    let (mean_u, mean_v) = (mean_u.unpack(), mean_v.unpack());
    let (shear_u, shear_v) = (shear_u.unpack(), shear_v.unpack());

    let shear_mag = shear_u.hypot(shear_v);
    if shear_mag == 0.0 {
        // No direction to deviate in.
        return Err(AnalysisError::InsufficientData);
    }

    let scale = BUNKERS_DEVIATION_KT / shear_mag;
    let (delta_u, delta_v) = (shear_v * scale, -shear_u * scale);

    Ok((
        WindUV {
            u: Knots(mean_u + delta_u),
            v: Knots(mean_v + delta_v),
        },
        WindUV {
            u: Knots(mean_u - delta_u),
            v: Knots(mean_v - delta_v),
        },
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::AnalysisConfig, doctest::make_test_sounding};
    use approx::assert_abs_diff_eq;
    use metfor::Celsius;
    use strum::IntoEnumIterator;

    #[test]
    fn test_uv_conventions() {
        let cases = [
            (10.0, 0.0, 0.0, -10.0),  // north wind blows south
            (10.0, 90.0, -10.0, 0.0), // east wind blows west
            (10.0, 180.0, 0.0, 10.0), // south wind blows north
            (10.0, 270.0, 10.0, 0.0), // west wind blows east
            (0.0, 123.0, 0.0, 0.0),
        ];

        for &(speed, direction, u, v) in &cases {
            let uv = uv_from_spd_dir(WindSpdDir {
                speed: Knots(speed),
                direction,
            });
            assert_abs_diff_eq!(uv.u.unpack(), u, epsilon = 1.0e-9);
            assert_abs_diff_eq!(uv.v.unpack(), v, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn test_spd_dir_from_uv() {
        for &direction in &[0.0, 45.0, 135.0, 225.0, 300.0] {
            let back = spd_dir_from_uv(uv_from_spd_dir(WindSpdDir {
                speed: Knots(25.0),
                direction,
            }));
            assert_abs_diff_eq!(back.speed.unpack(), 25.0, epsilon = 1.0e-9);
            assert_abs_diff_eq!(back.direction, direction, epsilon = 1.0e-9);
        }

        let calm = spd_dir_from_uv(WindUV {
            u: Knots(0.0),
            v: Knots(0.0),
        });
        assert_eq!(calm.direction, 0.0);
    }

    #[test]
    fn test_components_skip_missing() {
        let levels = [
            Level::new(HectoPascal(1000.0), Meters(0.0), Celsius(20.0), Celsius(10.0))
                .with_wind(10.0, 180.0),
            Level::new(HectoPascal(900.0), Meters(900.0), Celsius(15.0), Celsius(5.0)),
            Level::new(HectoPascal(800.0), Meters(1900.0), Celsius(9.0), Celsius(1.0))
                .with_wind(20.0, 270.0),
        ];

        let comps = components(&levels);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[1].pressure, HectoPascal(800.0));
        assert_abs_diff_eq!(comps[1].u.unpack(), 20.0, epsilon = 1.0e-9);
    }

    #[test]
    fn test_shear_identical_heights_is_zero() {
        let snd = make_test_sounding();

        for &h in &[0.0, 1000.0, 4321.0] {
            let shear = bulk_shear(&snd, Meters(h), Meters(h)).unwrap();
            assert_eq!(shear.u, Knots(0.0));
            assert_eq!(shear.v, Knots(0.0));
        }
    }

    #[test]
    fn test_shear_bands() {
        let snd = make_test_sounding();

        let variants: Vec<ShearBand> = ShearBand::iter().collect();
        let names: Vec<&str> = variants.iter().map(|b| b.as_ref()).collect();
        assert_eq!(names, vec!["0-1km", "0-3km", "0-6km", "0-8km"]);

        // Veering and strengthening winds, deeper layers have more shear.
        let mags: Vec<f64> = ShearBand::iter()
            .map(|band| band_shear(&snd, band).unwrap())
            .map(|uv| spd_dir_from_uv(uv).speed.unpack())
            .collect();
        assert!(mags.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_shear_needs_wind_data() {
        let levels = vec![
            Level::new(HectoPascal(1000.0), Meters(0.0), Celsius(20.0), Celsius(10.0))
                .with_wind(10.0, 180.0),
            Level::new(HectoPascal(900.0), Meters(900.0), Celsius(15.0), Celsius(5.0))
                .with_wind(20.0, 200.0),
            Level::new(HectoPascal(500.0), Meters(5500.0), Celsius(-15.0), Celsius(-25.0)),
        ];
        let snd = SoundingProfile::new(levels, &AnalysisConfig::default()).unwrap();

        assert!(band_shear(&snd, ShearBand::ZeroToOneKm).is_err());
        assert!(matches!(
            band_shear(&snd, ShearBand::ZeroToSixKm),
            Err(AnalysisError::InsufficientData)
        ));
        assert!(bulk_shear(&snd, Meters(0.0), Meters(500.0)).is_ok());
    }

    #[test]
    fn test_mean_wind() {
        let levels = vec![
            Level::new(HectoPascal(1000.0), Meters(0.0), Celsius(20.0), Celsius(10.0))
                .with_wind(10.0, 270.0),
            Level::new(HectoPascal(900.0), Meters(1000.0), Celsius(15.0), Celsius(5.0))
                .with_wind(30.0, 270.0),
            Level::new(HectoPascal(800.0), Meters(2000.0), Celsius(9.0), Celsius(1.0))
                .with_wind(10.0, 270.0),
        ];
        let snd = SoundingProfile::new(levels, &AnalysisConfig::default()).unwrap();

        let mean = mean_wind(&snd, Meters(0.0), Meters(2000.0)).unwrap();
        assert_abs_diff_eq!(mean.u.unpack(), 20.0, epsilon = 1.0e-9);
        assert_abs_diff_eq!(mean.v.unpack(), 0.0, epsilon = 1.0e-9);

        assert!(mean_wind(&snd, Meters(500.0), Meters(500.0)).is_err());
    }

    #[test]
    fn test_bunkers() {
        let snd = make_test_sounding();

        let (right, left) = bunkers_storm_motion(&snd).unwrap();
        let mean = mean_wind(&snd, Meters(0.0), Meters(6000.0)).unwrap();
        let shear = bulk_shear(&snd, Meters(0.0), Meters(6000.0)).unwrap();

        let (du, dv) = (
            right.u.unpack() - mean.u.unpack(),
            right.v.unpack() - mean.v.unpack(),
        );

        // Deviation is 7.5 m/s, normal to the shear, and to its right.
        assert_abs_diff_eq!(du.hypot(dv), 14.579, epsilon = 1.0e-3);
        assert_abs_diff_eq!(
            du * shear.u.unpack() + dv * shear.v.unpack(),
            0.0,
            epsilon = 1.0e-9
        );
        assert!(shear.u.unpack() * dv - shear.v.unpack() * du < 0.0);

        // Left mover is the mirror image.
        assert_abs_diff_eq!(
            left.u.unpack() + right.u.unpack(),
            2.0 * mean.u.unpack(),
            epsilon = 1.0e-9
        );
    }
}
