#![warn(missing_docs)]
//! Parcel thermodynamics and hodograph diagnostics for upper air soundings.
//!
//! A `SoundingProfile` is built from raw levels through validation. From there a parcel is
//! chosen, lifted along a dry adiabat to its LCL and a pseudo-adiabat above it, and its buoyancy
//! is integrated against the environment to find CAPE, CIN, the LFC and the EL. The wind profile
//! gives bulk shear and storm motion. `analyze` runs all of it and `SoundingAnalysis::summary`
//! packs the results for client tools.
//!
//! # Examples
//!
//! ```rust
//! use sounding_thermo::{analyze, parse_raob_json, AnalysisConfig, SoundingProfile};
//!
//! let doc = r#"{"profiles": [{"station": "KTST", "data": [
//!     {"pres": 1000.0, "hght": 300.0, "tmpc": 30.0, "dwpc": 24.0, "drct": 160.0, "sknt": 10.0},
//!     {"pres": 850.0, "hght": 1723.1, "tmpc": 20.0, "dwpc": 8.0, "drct": 210.0, "sknt": 30.0},
//!     {"pres": 700.0, "hght": 3362.2, "tmpc": 9.0, "dwpc": -6.0, "drct": 230.0, "sknt": 35.0},
//!     {"pres": 500.0, "hght": 6058.4, "tmpc": -7.0, "dwpc": -30.0, "drct": 250.0, "sknt": 45.0},
//!     {"pres": 300.0, "hght": 9861.5, "tmpc": -31.0, "dwpc": -52.0, "drct": 260.0, "sknt": 65.0}
//! ]}]}"#;
//!
//! let config = AnalysisConfig::default();
//! let raw = parse_raob_json(doc).unwrap().unwrap();
//! let profile = SoundingProfile::from_raw_sounding(&raw, &config).unwrap();
//!
//! let summary = analyze(&profile, &config).unwrap().summary();
//! assert_eq!(summary.station_id.as_deref(), Some("KTST"));
//! assert!(summary.cape_jkg.unwrap() > 0.0);
//! assert!(summary.cin_jkg.unwrap() <= 0.0);
//! ```

//
// API
//
pub use crate::{
    analysis::{analyze, IndexSummary, SoundingAnalysis},
    config::AnalysisConfig,
    error::{AnalysisError, ProfileDefect, Result},
    keys::{CinPolicy, ParcelKind},
    parcel::Parcel,
    parcel_profile::{ParcelPath, ThermoResult},
    sounding::{
        parse_raob_json, DataQualityNote, Level, RawLevel, RawSounding, SoundingProfile, Station,
        StationInfo, StationTable,
    },
    wind::{ShearBand, WindComponents},
};

#[doc(hidden)]
pub use crate::sounding::doctest;

pub mod analysis;
pub mod config;
pub mod interpolation;
pub mod keys;
pub mod met_formulas;
pub mod parcel;
pub mod parcel_profile;
pub mod sounding;
pub mod wind;

//
// Internal use only
//

// Modules
mod error;
mod utility;

#[cfg(test)]
mod test_data;
