use std::fmt;

use regplan::{Band, Bandwidth, NetworkMode, OffsetBucket, RegulatoryTables, TableKey};
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::station::Scenario;

/// Minimum separation (km) between a requested carrier and an existing station.
///
/// `tx` is the requester's bandwidth, `rx` the existing station's. Same-family
/// pairs (LAN/LAN, WAN/WAN) read the band's own matrix under the request's
/// scenario; mixed pairs read the cross matrix. Offsets of 30 kHz or more
/// need no separation. Grids absent from the tables resolve to the
/// conservative `fallback_distance_km`.
pub fn required_distance(
    tables: &RegulatoryTables,
    band: Band,
    scenario: Scenario,
    existing: NetworkMode,
    tx: Bandwidth,
    offset_khz: f64,
    rx: Bandwidth,
) -> f64 {
    let Some(offset) = OffsetBucket::from_offset_khz(offset_khz) else {
        return 0.0;
    };

    let (matrix, table) = if scenario.main_mode.same_family(existing) {
        (tables.matrices.intra(band), TableKey::from(scenario.key))
    } else {
        match TableKey::cross(scenario.main_mode, existing) {
            Some(key) => (&tables.matrices.cross, key),
            None => return tables.fallback_distance_km,
        }
    };

    match matrix.lookup(table, tx, offset, rx) {
        Some(km) => km,
        None => {
            trace!(%table, %tx, ?offset, %rx, "no grid; using fallback distance");
            tables.fallback_distance_km
        }
    }
}

/// How two carriers relate in frequency, as reported in conflicts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterferenceClass {
    Bucket(OffsetBucket),
    /// Separation beyond the adjacent-channel classes, in kHz.
    Offset(f64),
}

impl InterferenceClass {
    pub fn from_offset_khz(offset_khz: f64) -> Self {
        match OffsetBucket::from_offset_khz(offset_khz) {
            Some(bucket) => InterferenceClass::Bucket(bucket),
            None => InterferenceClass::Offset(offset_khz.abs()),
        }
    }
}

impl fmt::Display for InterferenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterferenceClass::Bucket(b) => fmt::Display::fmt(b, f),
            InterferenceClass::Offset(khz) => write!(f, "offset {khz:.2} kHz"),
        }
    }
}

impl Serialize for InterferenceClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use regplan::ScenarioKey;

    fn scenario(main_mode: NetworkMode, key: ScenarioKey) -> Scenario {
        Scenario { main_mode, key }
    }

    #[test]
    fn lan_province_grid() {
        let t = regplan::embedded_tables().unwrap();
        let s = scenario(NetworkMode::Lan, ScenarioKey::LanProvince);
        let bw = Bandwidth::Khz12_5;
        let d = |offset| required_distance(&t, Band::Vhf, s, NetworkMode::Lan, bw, offset, bw);
        assert_relative_eq!(d(0.0), 30.0);
        assert_relative_eq!(d(12.5), 4.5);
        assert_relative_eq!(d(25.0), 0.9);
        assert_relative_eq!(d(30.0), 0.0);
        assert_relative_eq!(d(100.0), 0.0);
    }

    #[test]
    fn wan_pair_uses_intra_matrix_under_request_mode() {
        let t = regplan::embedded_tables().unwrap();
        let s = scenario(NetworkMode::WanSimplex, ScenarioKey::WanSimplex);
        let d = required_distance(
            &t,
            Band::Vhf,
            s,
            NetworkMode::WanDuplex,
            Bandwidth::Khz12_5,
            0.0,
            Bandwidth::Khz12_5,
        );
        assert_relative_eq!(d, 80.0);
    }

    #[test]
    fn mixed_pair_uses_cross_matrix() {
        let t = regplan::embedded_tables().unwrap();
        let s = scenario(NetworkMode::Lan, ScenarioKey::LanBigCityHigh);
        let d = required_distance(
            &t,
            Band::Uhf,
            s,
            NetworkMode::WanDuplex,
            Bandwidth::Khz12_5,
            1.0,
            Bandwidth::Khz25,
        );
        assert_relative_eq!(d, 70.0);
    }

    #[test]
    fn missing_grid_falls_back_conservatively() {
        let t = regplan::RegulatoryTables::default();
        let s = scenario(NetworkMode::Lan, ScenarioKey::LanProvince);
        let bw = Bandwidth::Khz12_5;
        assert_relative_eq!(
            required_distance(&t, Band::Uhf, s, NetworkMode::Lan, bw, 6.25, bw),
            150.0
        );
        assert_relative_eq!(
            required_distance(&t, Band::Uhf, s, NetworkMode::Lan, bw, 40.0, bw),
            0.0
        );
    }

    #[test]
    fn class_labels() {
        assert_eq!(InterferenceClass::from_offset_khz(0.0).to_string(), "co-channel");
        assert_eq!(InterferenceClass::from_offset_khz(12.5).to_string(), "adjacent 12.5 kHz");
        assert_eq!(InterferenceClass::from_offset_khz(18.75).to_string(), "adjacent 18.75 kHz");
        assert_eq!(InterferenceClass::from_offset_khz(31.25).to_string(), "offset 31.25 kHz");
    }
}
