//! Enums used as keys for setting options in functions.
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter};

/// Which negative buoyancy counts toward convective inhibition.
///
/// Meteorological software does not agree on this, so the choice is always explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CinPolicy {
    /// Only negative area between the parcel's starting level and the LFC. Negative layers above
    /// the LFC are excluded.
    #[strum(serialize = "below_lfc")]
    BelowLfc,
    /// All negative area between the parcel's starting level and the EL, including stable layers
    /// embedded between the LFC and the EL.
    #[strum(serialize = "below_el")]
    BelowEl,
}

/// The CIN convention used unless configured otherwise.
pub const DEFAULT_CIN_POLICY: CinPolicy = CinPolicy::BelowLfc;

impl Default for CinPolicy {
    fn default() -> Self {
        DEFAULT_CIN_POLICY
    }
}

/// How to choose the parcel that gets lifted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelKind {
    /// The lowest level of the profile.
    Surface,
    /// Mean potential temperature and mixing ratio of the lowest 100 hPa.
    MixedLayer,
    /// Highest equivalent potential temperature in the lowest 300 hPa.
    MostUnstable,
    /// An elevated parcel taken from the profile at this pressure (hPa).
    Pressure(f64),
}

impl Default for ParcelKind {
    fn default() -> Self {
        ParcelKind::Surface
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_cin_policy_names() {
        let variants: Vec<CinPolicy> = CinPolicy::iter().collect();
        let names: Vec<&str> = variants.iter().map(|p| p.as_ref()).collect();
        assert_eq!(names, vec!["below_lfc", "below_el"]);
        assert_eq!(CinPolicy::default(), CinPolicy::BelowLfc);
    }

    #[test]
    fn test_deserialize_keys() {
        let policy: CinPolicy = serde_json::from_str("\"below_el\"").unwrap();
        assert_eq!(policy, CinPolicy::BelowEl);

        let kind: ParcelKind = serde_json::from_str("{\"pressure\": 850.0}").unwrap();
        assert_eq!(kind, ParcelKind::Pressure(850.0));

        let kind: ParcelKind = serde_json::from_str("\"most_unstable\"").unwrap();
        assert_eq!(kind, ParcelKind::MostUnstable);
    }
}
