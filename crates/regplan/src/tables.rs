use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TableError};
use crate::types::{Band, Bandwidth, NetworkMode, OffsetBucket, TableKey};
use crate::{FORBIDDEN_GUARD_MHZ, SHARED_MATCH_TOLERANCE_MHZ};

/// One separation grid: rows are offset buckets (co-channel, 6.25, 12.5,
/// 18.75, 25 kHz), columns are receiver bandwidths (6.25, 12.5, 25 kHz).
/// Values are required distances in km.
pub type Grid = [[f64; 3]; 5];

const DEFAULT_FALLBACK_DISTANCE_KM: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub start: f64, // MHz
    pub end: f64,   // MHz
}

impl FrequencyRange {
    pub fn new(start: f64, end: f64) -> Self {
        FrequencyRange { start, end }
    }

    pub fn contains(&self, freq: f64) -> bool {
        self.start <= freq && freq <= self.end
    }

    /// Containment after widening both edges by `guard` MHz.
    pub fn contains_with_guard(&self, freq: f64, guard: f64) -> bool {
        self.start - guard <= freq && freq <= self.end + guard
    }

    pub fn intersects(&self, other: &FrequencyRange) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    fn checked(section: &'static str, (start, end): (f64, f64)) -> Result<Self> {
        if start > end {
            return Err(TableError::InvertedRange {
                section,
                start,
                end,
            });
        }
        Ok(FrequencyRange { start, end })
    }
}

/// A sub-band of the national allocation plan.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub range: FrequencyRange,
    pub modes: Vec<NetworkMode>,
    pub label: String,
}

impl AllocationEntry {
    pub fn allows(&self, mode: NetworkMode) -> bool {
        self.modes.contains(&mode)
    }
}

/// LAN sub-bands reserved to a short list of provinces.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceGate {
    pub ranges: Vec<FrequencyRange>,
    /// Normalized province tokens (upper-case, ASCII only).
    pub allowed: Vec<String>,
}

impl ProvinceGate {
    pub fn covers(&self, freq: f64) -> bool {
        self.ranges.iter().any(|r| r.contains(freq))
    }

    pub fn admits(&self, province_key: &str) -> bool {
        self.allowed.iter().any(|p| p == province_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixKey {
    pub table: TableKey,
    pub tx: Bandwidth,
    pub offset: OffsetBucket,
    pub rx: Bandwidth,
}

/// Required separation distances keyed by (table, tx bandwidth, offset, rx bandwidth).
#[derive(Debug, Clone, Default)]
pub struct InterferenceMatrix {
    cells: HashMap<MatrixKey, f64>,
    grids: HashSet<(TableKey, Bandwidth)>,
}

impl InterferenceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_grid(&mut self, table: TableKey, tx: Bandwidth, grid: Grid) {
        for offset in OffsetBucket::ALL {
            for rx in Bandwidth::ALL {
                let key = MatrixKey {
                    table,
                    tx,
                    offset,
                    rx,
                };
                self.cells.insert(key, grid[offset.row()][rx.column()]);
            }
        }
        self.grids.insert((table, tx));
    }

    pub fn has_table(&self, table: TableKey) -> bool {
        self.grids.iter().any(|(t, _)| *t == table)
    }

    pub fn get(&self, key: &MatrixKey) -> Option<f64> {
        self.cells.get(key).copied()
    }

    /// Looks up a distance, falling back to the 12.5 kHz transmitter grid
    /// when the requested transmitter bandwidth has none.
    pub fn lookup(
        &self,
        table: TableKey,
        tx: Bandwidth,
        offset: OffsetBucket,
        rx: Bandwidth,
    ) -> Option<f64> {
        let tx = if self.grids.contains(&(table, tx)) {
            tx
        } else {
            Bandwidth::Khz12_5
        };
        self.get(&MatrixKey {
            table,
            tx,
            offset,
            rx,
        })
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatrixSet {
    pub vhf: InterferenceMatrix,
    pub uhf: InterferenceMatrix,
    pub cross: InterferenceMatrix,
}

impl MatrixSet {
    pub fn intra(&self, band: Band) -> &InterferenceMatrix {
        match band {
            Band::Vhf => &self.vhf,
            Band::Uhf => &self.uhf,
        }
    }
}

/// Immutable regulatory reference data for one engine instance.
#[derive(Debug, Clone)]
pub struct RegulatoryTables {
    pub vhf_plan: Vec<AllocationEntry>,
    pub uhf_plan: Vec<AllocationEntry>,
    pub forbidden_bands: Vec<FrequencyRange>,
    pub shared_frequencies: Vec<f64>,
    pub priority_bands: Vec<FrequencyRange>,
    pub province_gates: Vec<ProvinceGate>,
    /// Distance used when no grid exists for a table/bandwidth combination.
    pub fallback_distance_km: f64,
    pub matrices: MatrixSet,
}

impl Default for RegulatoryTables {
    fn default() -> Self {
        RegulatoryTables {
            vhf_plan: Vec::new(),
            uhf_plan: Vec::new(),
            forbidden_bands: Vec::new(),
            shared_frequencies: Vec::new(),
            priority_bands: Vec::new(),
            province_gates: Vec::new(),
            fallback_distance_km: DEFAULT_FALLBACK_DISTANCE_KM,
            matrices: MatrixSet::default(),
        }
    }
}

impl RegulatoryTables {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawTables = serde_json::from_str(json)?;
        raw.into_tables()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn plan(&self, band: Band) -> &[AllocationEntry] {
        match band {
            Band::Vhf => &self.vhf_plan,
            Band::Uhf => &self.uhf_plan,
        }
    }

    /// First plan entry of `band` containing `freq`.
    pub fn allocation_at(&self, band: Band, freq: f64) -> Option<&AllocationEntry> {
        self.plan(band).iter().find(|e| e.range.contains(freq))
    }

    pub fn is_forbidden(&self, freq: f64) -> bool {
        self.forbidden_bands
            .iter()
            .any(|r| r.contains_with_guard(freq, FORBIDDEN_GUARD_MHZ))
    }

    pub fn is_shared(&self, freq: f64) -> bool {
        self.shared_frequencies
            .iter()
            .any(|s| (freq - s).abs() < SHARED_MATCH_TOLERANCE_MHZ)
    }

    pub fn is_priority(&self, freq: f64) -> bool {
        self.priority_bands.iter().any(|r| r.contains(freq))
    }

    /// True when `freq` sits in a province-gated sub-band that `province_key` may not use.
    pub fn gate_blocks(&self, freq: f64, province_key: &str) -> bool {
        self.province_gates
            .iter()
            .any(|g| g.covers(freq) && !g.admits(province_key))
    }

    /// Network type implied by the plan entry a licensed frequency falls in.
    pub fn infer_network_type(&self, freq: f64) -> NetworkMode {
        let entry = Band::of_frequency(freq).and_then(|band| self.allocation_at(band, freq));
        match entry {
            Some(e) if e.allows(NetworkMode::WanSimplex) => NetworkMode::WanSimplex,
            Some(e) if e.allows(NetworkMode::WanDuplex) => NetworkMode::WanDuplex,
            _ => NetworkMode::Lan,
        }
    }
}

// JSON shapes. Kept private: everything past `into_tables` is typed.

fn default_fallback_distance() -> f64 {
    DEFAULT_FALLBACK_DISTANCE_KM
}

#[derive(Deserialize)]
struct RawTables {
    allocations: RawAllocations,
    #[serde(default)]
    forbidden_bands: Vec<(f64, f64)>,
    #[serde(default)]
    shared_frequencies: Vec<f64>,
    #[serde(default)]
    priority_bands: Vec<(f64, f64)>,
    #[serde(default)]
    province_gates: Vec<RawGate>,
    #[serde(default = "default_fallback_distance")]
    fallback_distance_km: f64,
    #[serde(default)]
    matrices: RawMatrices,
}

#[derive(Deserialize)]
struct RawAllocations {
    #[serde(default)]
    vhf: Vec<(f64, f64, Vec<NetworkMode>, String)>,
    #[serde(default)]
    uhf: Vec<(f64, f64, Vec<NetworkMode>, String)>,
}

#[derive(Deserialize)]
struct RawGate {
    ranges: Vec<(f64, f64)>,
    allowed: Vec<String>,
}

type RawMatrix = BTreeMap<String, BTreeMap<String, Grid>>;

#[derive(Deserialize, Default)]
struct RawMatrices {
    #[serde(default)]
    vhf: RawMatrix,
    #[serde(default)]
    uhf: RawMatrix,
    #[serde(default)]
    cross: RawMatrix,
}

impl RawTables {
    fn into_tables(self) -> Result<RegulatoryTables> {
        if self.fallback_distance_km < 0.0 {
            return Err(TableError::NegativeDistance(self.fallback_distance_km));
        }

        let ranges = |section: &'static str, raw: Vec<(f64, f64)>| -> Result<Vec<FrequencyRange>> {
            raw.into_iter()
                .map(|r| FrequencyRange::checked(section, r))
                .collect()
        };

        let province_gates = self
            .province_gates
            .into_iter()
            .map(|g| -> Result<ProvinceGate> {
                Ok(ProvinceGate {
                    ranges: ranges("province_gates", g.ranges)?,
                    allowed: g
                        .allowed
                        .into_iter()
                        .map(|p| p.trim().to_uppercase())
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RegulatoryTables {
            vhf_plan: plan("allocations.vhf", self.allocations.vhf)?,
            uhf_plan: plan("allocations.uhf", self.allocations.uhf)?,
            forbidden_bands: ranges("forbidden_bands", self.forbidden_bands)?,
            shared_frequencies: self.shared_frequencies,
            priority_bands: ranges("priority_bands", self.priority_bands)?,
            province_gates,
            fallback_distance_km: self.fallback_distance_km,
            matrices: MatrixSet {
                vhf: matrix("vhf", self.matrices.vhf, false)?,
                uhf: matrix("uhf", self.matrices.uhf, false)?,
                cross: matrix("cross", self.matrices.cross, true)?,
            },
        })
    }
}

fn plan(
    section: &'static str,
    raw: Vec<(f64, f64, Vec<NetworkMode>, String)>,
) -> Result<Vec<AllocationEntry>> {
    raw.into_iter()
        .map(|(start, end, modes, label)| {
            Ok(AllocationEntry {
                range: FrequencyRange::checked(section, (start, end))?,
                modes,
                label,
            })
        })
        .collect()
}

fn matrix(name: &'static str, raw: RawMatrix, cross: bool) -> Result<InterferenceMatrix> {
    let mut matrix = InterferenceMatrix::new();
    for (key, by_tx) in raw {
        let table = TableKey::from_str(&key)?;
        let is_cross_key = matches!(
            table,
            TableKey::LanVsWanSimplex
                | TableKey::LanVsWanDuplex
                | TableKey::WanSimplexVsLan
                | TableKey::WanDuplexVsLan
        );
        if is_cross_key != cross {
            return Err(TableError::MisplacedTable { matrix: name, key });
        }
        for (tx_key, grid) in by_tx {
            let tx = Bandwidth::from_str(&tx_key)?;
            if let Some(bad) = grid.iter().flatten().find(|d| **d < 0.0) {
                return Err(TableError::NegativeDistance(*bad));
            }
            matrix.insert_grid(table, tx, grid);
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SMALL: &str = r#"{
        "allocations": {
            "vhf": [[138.0, 144.0, ["LAN"], "LAN 1"], [148.0, 149.9, ["WAN_SIMPLEX"], "WAN S"]],
            "uhf": [[410.0, 415.0, ["WAN_DUPLEX", "LAN"], "mixed"]]
        },
        "forbidden_bands": [[156.0, 162.05]],
        "shared_frequencies": [141.0],
        "priority_bands": [[155.0, 156.0]],
        "province_gates": [{"ranges": [[418.5, 419.5]], "allowed": ["hcm", "DANANG"]}],
        "matrices": {
            "vhf": {"LAN_PROVINCE": {"12.5": [[30,30,30],[12,15,18],[4,6,10],[1,2,5],[0,1,2]]}},
            "cross": {"LAN_VS_WAN_SIMPLEX": {"25": [[50,50,50],[20,20,20],[8,8,8],[3,3,3],[1,1,1]]}}
        }
    }"#;

    #[test]
    fn parses_and_applies_guards() {
        let t = RegulatoryTables::from_json_str(SMALL).unwrap();
        assert_eq!(t.vhf_plan.len(), 2);
        assert_relative_eq!(t.fallback_distance_km, 150.0);
        assert!(t.is_forbidden(155.976));
        assert!(t.is_forbidden(162.07));
        assert!(!t.is_forbidden(155.97));
        assert!(t.is_shared(141.00005));
        assert!(!t.is_shared(141.0002));
        assert!(t.is_priority(155.5));
    }

    #[test]
    fn province_gates_use_uppercase_tokens() {
        let t = RegulatoryTables::from_json_str(SMALL).unwrap();
        assert!(!t.gate_blocks(419.0, "HCM"));
        assert!(t.gate_blocks(419.0, "HANOI"));
        assert!(!t.gate_blocks(420.0, "HANOI"));
    }

    #[test]
    fn infers_network_type_from_plan() {
        let t = RegulatoryTables::from_json_str(SMALL).unwrap();
        assert_eq!(t.infer_network_type(142.0), NetworkMode::Lan);
        assert_eq!(t.infer_network_type(148.5), NetworkMode::WanSimplex);
        assert_eq!(t.infer_network_type(412.0), NetworkMode::WanDuplex);
        assert_eq!(t.infer_network_type(300.0), NetworkMode::Lan);
    }

    #[test]
    fn lookup_falls_back_to_narrowband_grid() {
        let t = RegulatoryTables::from_json_str(SMALL).unwrap();
        let vhf = t.matrices.intra(Band::Vhf);
        let d = vhf.lookup(
            TableKey::LanProvince,
            Bandwidth::Khz25,
            OffsetBucket::Adjacent6_25,
            Bandwidth::Khz25,
        );
        assert_eq!(d, Some(18.0));

        // A cross grid only exists for 25 kHz; there is no 12.5 kHz grid to fall back to.
        let cross = &t.matrices.cross;
        assert_eq!(
            cross.lookup(
                TableKey::LanVsWanSimplex,
                Bandwidth::Khz12_5,
                OffsetBucket::CoChannel,
                Bandwidth::Khz12_5
            ),
            None
        );
        assert!(!vhf.has_table(TableKey::LanBigCityHigh));
    }

    #[test]
    fn rejects_bad_documents() {
        let inverted = SMALL.replace("[156.0, 162.05]", "[162.05, 156.0]");
        assert!(matches!(
            RegulatoryTables::from_json_str(&inverted),
            Err(TableError::InvertedRange { .. })
        ));

        let misplaced = SMALL.replace(
            "\"vhf\": {\"LAN_PROVINCE\"",
            "\"vhf\": {\"LAN_VS_WAN_DUPLEX\"",
        );
        assert!(matches!(
            RegulatoryTables::from_json_str(&misplaced),
            Err(TableError::MisplacedTable { .. })
        ));

        let bad_bw = SMALL.replace("\"12.5\": [[30", "\"10\": [[30");
        assert!(matches!(
            RegulatoryTables::from_json_str(&bad_bw),
            Err(TableError::UnknownBandwidth(_))
        ));

        assert!(matches!(
            RegulatoryTables::from_json_str("{"),
            Err(TableError::Json(_))
        ));
    }
}
