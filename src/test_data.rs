//! Profiles used in tests.

use crate::{
    config::AnalysisConfig,
    sounding::{Level, SoundingProfile},
};
use metfor::{Celsius, HectoPascal, Meters};

fn build(rows: &[(f64, f64, f64, f64)]) -> SoundingProfile {
    let levels = rows
        .iter()
        .map(|&(p, h, t, dp)| Level::new(HectoPascal(p), Meters(h), Celsius(t), Celsius(dp)))
        .collect();

    SoundingProfile::new(levels, &AnalysisConfig::default()).expect("test profile is valid")
}

fn isothermal(t: f64, dp: f64, heights: &[(f64, f64)]) -> SoundingProfile {
    let rows: Vec<(f64, f64, f64, f64)> = heights.iter().map(|&(p, h)| (p, h, t, dp)).collect();
    build(&rows)
}

/// Moist boundary layer under a warm nose at 900 hPa, a sizable cap with CAPE above it.
pub(crate) fn capped_sounding() -> SoundingProfile {
    build(&[
        (1000.0, 300.0, 28.0, 19.0),
        (975.0, 524.1, 25.8, 18.0),
        (950.0, 752.3, 23.6, 17.0),
        (925.0, 984.7, 21.4, 16.0),
        (900.0, 1222.8, 22.5, 10.0),
        (850.0, 1717.9, 20.5, 6.0),
        (800.0, 2237.2, 16.5, 2.0),
        (700.0, 3357.3, 9.0, -6.0),
        (600.0, 4612.7, 0.5, -18.0),
        (500.0, 6050.8, -8.0, -30.0),
        (400.0, 7749.9, -18.0, -40.0),
        (300.0, 9838.9, -32.0, -52.0),
        (250.0, 11098.8, -42.0, -60.0),
        (200.0, 12575.4, -52.0, -68.0),
        (150.0, 14415.9, -57.0, -75.0),
        (100.0, 16950.6, -62.0, -82.0),
    ])
}

/// The standard test sounding with a warm layer at 600 hPa, buoyancy goes negative above the LFC
/// and recovers before the EL.
pub(crate) fn stable_layer_aloft() -> SoundingProfile {
    build(&[
        (1000.0, 300.0, 30.0, 24.0),
        (975.0, 526.1, 27.6, 22.0),
        (950.0, 756.1, 25.4, 20.0),
        (925.0, 990.3, 23.2, 18.0),
        (900.0, 1228.9, 21.0, 16.0),
        (850.0, 1723.1, 20.0, 8.0),
        (800.0, 2242.1, 16.5, 2.0),
        (700.0, 3362.2, 9.0, -6.0),
        (600.0, 4643.5, 12.0, -18.0),
        (500.0, 6115.0, -7.0, -30.0),
        (400.0, 7820.6, -17.0, -40.0),
        (300.0, 9918.1, -31.0, -52.0),
        (250.0, 11183.3, -41.0, -60.0),
        (200.0, 12666.4, -51.0, -68.0),
        (150.0, 14511.2, -57.0, -75.0),
        (100.0, 17045.9, -62.0, -82.0),
    ])
}

/// Saturated at 10C from the surface up, saturated from the first level and never buoyant.
pub(crate) fn saturated_isothermal() -> SoundingProfile {
    isothermal(
        10.0,
        10.0,
        &[
            (1000.0, 0.0),
            (950.0, 427.0),
            (900.0, 877.2),
            (850.0, 1353.3),
            (800.0, 1858.4),
            (750.0, 2396.3),
            (700.0, 2971.6),
            (600.0, 4258.0),
            (500.0, 5781.5),
        ],
    )
}

/// Isothermal at 10C with a 1C dew point depression, saturates just above the surface.
pub(crate) fn near_saturated_isothermal() -> SoundingProfile {
    isothermal(
        10.0,
        9.0,
        &[
            (1000.0, 0.0),
            (950.0, 426.9),
            (900.0, 876.9),
            (850.0, 1352.8),
            (800.0, 1857.8),
            (750.0, 2395.5),
            (700.0, 2970.5),
            (600.0, 4256.3),
            (500.0, 5778.9),
        ],
    )
}

/// Shallow and very dry, a surface parcel can't saturate before the top.
pub(crate) fn dry_isothermal() -> SoundingProfile {
    isothermal(
        10.0,
        -40.0,
        &[(1000.0, 0.0), (950.0, 425.0), (900.0, 873.0)],
    )
}
