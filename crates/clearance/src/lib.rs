//! Frequency clearance for private land-mobile radio.
//!
//! Given a register of licensed stations and the national regulatory
//! tables, ranks the frequencies a new applicant can be assigned, checks a
//! single frequency with full conflict detail, and lists every conflicting
//! frequency in a scan window.

mod candidates;
mod columns;
mod conflict;
mod constants;
mod engine;
mod error;
mod geometry;
mod ingest;
mod interference;
mod normalize;
mod ranking;
mod registry;
mod scenario;
mod station;

pub use candidates::generate as generate_candidates;
pub use columns::{resolve_columns, ColumnMap, Field};
pub use conflict::{evaluate, Conflict, Evaluation, EvaluationMode};
pub use constants::{
    COLOCATED_KM, EXACT_MATCH_TOLERANCE_MHZ, GUARD_WINDOW_MHZ, MAX_CANDIDATES,
    RESERVED_MATCH_TOLERANCE_MHZ,
};
pub use engine::{ClearanceEngine, Verdict, VerdictStatus};
pub use error::{IngestError, Result};
pub use geometry::{great_circle_distance, offset_north};
pub use ingest::{read_records, read_records_from_path};
pub use interference::{required_distance, InterferenceClass};
pub use normalize::{
    normalize_province, normalize_record, parse_coordinate, parse_emission,
    parse_frequency_list, NormalizedRecord, RawRecord,
};
pub use ranking::{rank_candidates, reuse_licenses, suggest, RankedCandidate};
pub use registry::StationRegistry;
pub use scenario::classify;
pub use station::{Location, Request, ScanRange, Scenario, Station};

pub use regplan::{
    embedded_tables, Band, Bandwidth, NetworkMode, OffsetBucket, RegulatoryTables, ScenarioKey,
    TableError, FORBIDDEN_GUARD_MHZ, SHARED_MATCH_TOLERANCE_MHZ,
};
