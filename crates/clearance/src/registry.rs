use std::io::Read;

use regplan::RegulatoryTables;
use tracing::{info, warn};

use crate::constants::*;
use crate::ingest::read_records;
use crate::normalize::{normalize_record, sort_dedup, RawRecord};
use crate::station::Station;

/// Licensed stations indexed by frequency, plus the nationwide reserved set.
///
/// Built once from a register and read-only afterwards, so it can be shared
/// between concurrent queries.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>, // sorted by frequency
    reserved: Vec<f64>,     // sorted, deduplicated
    usable: bool,
}

impl StationRegistry {
    /// An unusable registry: every query against it reports "no station data".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(records: &[RawRecord], tables: &RegulatoryTables) -> Self {
        let mut stations = Vec::new();
        let mut reserved = Vec::new();
        let mut dropped = 0usize;
        for record in records {
            let normalized = normalize_record(record, tables);
            if normalized.stations.is_empty() && normalized.reserved.is_empty() {
                dropped += 1;
            }
            stations.extend(normalized.stations);
            reserved.extend(normalized.reserved);
        }
        Self::from_parts(stations, reserved, records.len(), dropped)
    }

    /// Builds directly from stations and reserved frequencies.
    pub fn from_stations(stations: Vec<Station>, reserved: Vec<f64>) -> Self {
        let count = stations.len();
        Self::from_parts(stations, reserved, count, 0)
    }

    /// Reads and normalizes a CSV register. An unreadable register degrades
    /// to an unusable registry instead of failing.
    pub fn from_csv<R: Read>(reader: R, tables: &RegulatoryTables) -> Self {
        match read_records(reader) {
            Ok(records) => Self::build(&records, tables),
            Err(e) => {
                warn!(error = %e, "register could not be read; no station data");
                Self::empty()
            }
        }
    }

    fn from_parts(
        mut stations: Vec<Station>,
        mut reserved: Vec<f64>,
        records: usize,
        dropped: usize,
    ) -> Self {
        stations.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        sort_dedup(&mut reserved);
        info!(
            records,
            dropped,
            stations = stations.len(),
            reserved = reserved.len(),
            "station registry built"
        );
        StationRegistry {
            usable: !stations.is_empty() || !reserved.is_empty(),
            stations,
            reserved,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn reserved(&self) -> &[f64] {
        &self.reserved
    }

    /// Stations whose frequency is strictly within `window` MHz of `freq`.
    pub fn near(&self, freq: f64, window: f64) -> &[Station] {
        let lo = self.stations.partition_point(|s| s.frequency <= freq - window);
        let hi = self.stations.partition_point(|s| s.frequency < freq + window);
        &self.stations[lo..hi.max(lo)]
    }

    /// Stations on the same carrier as `freq`.
    pub fn exact(&self, freq: f64) -> &[Station] {
        self.near(freq, EXACT_MATCH_TOLERANCE_MHZ)
    }

    pub fn is_reserved(&self, freq: f64) -> bool {
        self.reserved_match(freq).is_some()
    }

    /// The reserved frequency within 1 kHz of `freq`, if any.
    pub fn reserved_match(&self, freq: f64) -> Option<f64> {
        let i = self
            .reserved
            .partition_point(|r| *r <= freq - RESERVED_MATCH_TOLERANCE_MHZ);
        self.reserved
            .get(i)
            .copied()
            .filter(|r| (r - freq).abs() < RESERVED_MATCH_TOLERANCE_MHZ)
    }
}
