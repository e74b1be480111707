use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Once;

use serde::Deserialize;
use sounding_thermo::{parse_raob_json, AnalysisConfig, SoundingProfile};

static INIT_TRACING: Once = Once::new();

/// Route the crate's log events to the test output, filtered with `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Values a test file says the analysis should find. `None` means the value must be missing.
#[derive(Debug, Deserialize)]
pub struct Expected {
    pub saturated: bool,
    pub cape_jkg: Option<f64>,
    pub cin_jkg: Option<f64>,
    pub lcl_hpa: Option<f64>,
    pub lfc_hpa: Option<f64>,
    pub el_hpa: Option<f64>,
    pub shear_0_6km_kt: Option<f64>,
}

#[derive(Deserialize)]
struct ExpectedDoc {
    expected: Expected,
}

pub fn load_test_file(fname: &str) -> (SoundingProfile, Expected) {
    init_tracing();

    let mut path = PathBuf::new();
    path.push("tests");
    path.push("data");
    path.push(fname);

    let mut f = File::open(&path).unwrap_or_else(|_| panic!("Error opening file: {:?}", path));
    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .unwrap_or_else(|_| panic!("Error reading file: {:?}", path));

    let raw = parse_raob_json(&contents)
        .expect("valid raob json")
        .expect("at least one profile");
    let snd = SoundingProfile::from_raw_sounding(&raw, &AnalysisConfig::default())
        .expect("test profile is valid");

    let expected: ExpectedDoc = serde_json::from_str(&contents).expect("expected values");

    (snd, expected.expected)
}

/// Compare an optional value from the analysis to its target within `tol`.
pub fn check_value(name: &str, analyzed: Option<f64>, target: Option<f64>, tol: f64) {
    match (analyzed, target) {
        (Some(analyzed), Some(target)) => assert!(
            (analyzed - target).abs() <= tol,
            "{}: analyzed {} target {} tolerance {}",
            name,
            analyzed,
            target,
            tol
        ),
        (None, None) => {}
        (analyzed, target) => panic!("{}: analyzed {:?} target {:?}", name, analyzed, target),
    }
}

macro_rules! test_file {
    ($test_name:ident, $fname:expr) => {
        mod $test_name {
            use super::*;
            use sounding_thermo::{analyze, AnalysisConfig};

            #[test]
            fn test_parcel_analysis() {
                let (snd, expected) = utils::load_test_file($fname);
                let summary = analyze(&snd, &AnalysisConfig::default())
                    .expect("valid config")
                    .summary();

                assert_eq!(summary.saturated, Some(expected.saturated));

                // CAPE within 2% of the converged value, or a couple J/kg near zero.
                let cape_tol = expected.cape_jkg.map(|c| (0.02 * c).max(2.0)).unwrap_or(0.0);
                utils::check_value("cape", summary.cape_jkg, expected.cape_jkg, cape_tol);
                let cin_tol = expected.cin_jkg.map(|c| (0.02 * c.abs()).max(2.0)).unwrap_or(0.0);
                utils::check_value("cin", summary.cin_jkg, expected.cin_jkg, cin_tol);

                utils::check_value("lcl", summary.lcl_hpa, expected.lcl_hpa, 0.5);
                utils::check_value("lfc", summary.lfc_hpa, expected.lfc_hpa, 2.0);
                utils::check_value("el", summary.el_hpa, expected.el_hpa, 2.0);
            }

            #[test]
            fn test_wind_analysis() {
                let (snd, expected) = utils::load_test_file($fname);
                let summary = analyze(&snd, &AnalysisConfig::default())
                    .expect("valid config")
                    .summary();

                utils::check_value(
                    "0-6km shear",
                    summary.bulk_shear_kt.get("0-6km").copied(),
                    expected.shear_0_6km_kt,
                    0.5,
                );
            }

            #[test]
            fn test_cin_policies_agree_on_cape() {
                let (snd, _) = utils::load_test_file($fname);

                let below_lfc = analyze(&snd, &AnalysisConfig::default()).unwrap();
                let below_el = analyze(
                    &snd,
                    &AnalysisConfig {
                        cin_policy: sounding_thermo::CinPolicy::BelowEl,
                        ..AnalysisConfig::default()
                    },
                )
                .unwrap();

                let (a, b) = (below_lfc.summary(), below_el.summary());
                assert_eq!(a.cape_jkg, b.cape_jkg);
                assert_eq!(a.lfc_hpa, b.lfc_hpa);
                assert!(b.cin_jkg.unwrap_or(0.0) <= a.cin_jkg.unwrap_or(0.0));
            }
        }
    };
}
