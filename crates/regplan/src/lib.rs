//! Regulatory reference data for private land-mobile frequency assignment:
//! the national allocation plan, excluded bands and channels, and the
//! minimum-separation grids used to judge co- and adjacent-channel interference.

use lazy_static::lazy_static;
use std::sync::Arc;

mod error;
mod tables;
mod types;

pub use error::{Result, TableError};
pub use tables::{
    AllocationEntry, FrequencyRange, Grid, InterferenceMatrix, MatrixKey, MatrixSet,
    ProvinceGate, RegulatoryTables,
};
pub use types::{Band, Bandwidth, NetworkMode, OffsetBucket, ScenarioKey, TableKey};

/// Guard added to both edges of every forbidden band (25 kHz).
pub const FORBIDDEN_GUARD_MHZ: f64 = 0.025;

/// Two carriers closer than 0.1 kHz are the same shared channel.
pub const SHARED_MATCH_TOLERANCE_MHZ: f64 = 0.0001;

const EMBEDDED_TABLES_JSON: &str = include_str!("../static_data/default_tables.json");

lazy_static! {
    static ref EMBEDDED_TABLES: std::result::Result<Arc<RegulatoryTables>, String> =
        RegulatoryTables::from_json_str(EMBEDDED_TABLES_JSON)
            .map(Arc::new)
            .map_err(|e| e.to_string());
}

/// The plan compiled into the crate. Parsed once, shared afterwards.
pub fn embedded_tables() -> Result<Arc<RegulatoryTables>> {
    match &*EMBEDDED_TABLES {
        Ok(tables) => Ok(Arc::clone(tables)),
        Err(msg) => Err(TableError::Embedded(msg.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_parse() {
        let tables = embedded_tables().unwrap();
        assert!(!tables.vhf_plan.is_empty());
        assert!(!tables.uhf_plan.is_empty());
        for band in [Band::Vhf, Band::Uhf] {
            let m = tables.matrices.intra(band);
            for key in [
                TableKey::LanBigCityHigh,
                TableKey::LanBigCityLow,
                TableKey::LanProvince,
                TableKey::WanSimplex,
                TableKey::WanDuplex,
            ] {
                assert!(m.has_table(key), "{band} missing {key}");
            }
        }
        for key in [
            TableKey::LanVsWanSimplex,
            TableKey::LanVsWanDuplex,
            TableKey::WanSimplexVsLan,
            TableKey::WanDuplexVsLan,
        ] {
            assert!(tables.matrices.cross.has_table(key), "cross missing {key}");
        }
    }

    #[test]
    fn embedded_tables_are_shared() {
        let a = embedded_tables().unwrap();
        let b = embedded_tables().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn plan_entries_are_ordered() {
        let tables = embedded_tables().unwrap();
        for plan in [&tables.vhf_plan, &tables.uhf_plan] {
            for pair in plan.windows(2) {
                assert!(pair[0].range.start < pair[1].range.start);
            }
        }
    }
}
