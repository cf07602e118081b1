use regplan::RegulatoryTables;
use serde::Serialize;

use crate::constants::*;
use crate::geometry::great_circle_distance;
use crate::interference::{required_distance, InterferenceClass};
use crate::registry::StationRegistry;
use crate::station::{Request, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Stop at the first conflict; only the verdict matters.
    FirstFailure,
    /// Collect every conflict for reporting.
    Diagnostic,
}

/// One existing station that a candidate would interfere with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub candidate_frequency: f64,
    pub license_id: String,
    pub customer_name: String,
    pub station_frequency: f64,
    #[serde(rename = "type")]
    pub class: InterferenceClass,
    pub distance_km: f64, // rounded to 2 decimals
    pub required_km: f64,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub usable: bool,
    pub conflicts: Vec<Conflict>,
}

/// Checks `candidate` against every registered station within the guard
/// window. A station conflicts when it is strictly closer than the required
/// separation; holding stations, stations without coordinates and stations
/// co-located with the requester are ignored.
pub fn evaluate(
    tables: &RegulatoryTables,
    registry: &StationRegistry,
    request: &Request,
    scenario: Scenario,
    candidate: f64,
    mode: EvaluationMode,
) -> Evaluation {
    let mut conflicts = Vec::new();

    for station in registry.near(candidate, GUARD_WINDOW_MHZ) {
        if station.is_holding {
            continue;
        }
        let Some(location) = station.location else {
            continue;
        };
        let distance = great_circle_distance(request.location, location);
        if distance < COLOCATED_KM {
            continue;
        }

        let offset_khz = (candidate - station.frequency).abs() * 1000.0;
        let required = required_distance(
            tables,
            request.band,
            scenario,
            station.network_type,
            request.bandwidth,
            offset_khz,
            station.bandwidth,
        );
        if distance >= required {
            continue;
        }

        if mode == EvaluationMode::FirstFailure {
            return Evaluation {
                usable: false,
                conflicts: Vec::new(),
            };
        }
        conflicts.push(Conflict {
            candidate_frequency: candidate,
            license_id: station.license_id.clone(),
            customer_name: station.customer_name.clone(),
            station_frequency: station.frequency,
            class: InterferenceClass::from_offset_khz(offset_khz),
            distance_km: (distance * 100.0).round() / 100.0,
            required_km: required,
            location: station.location_label(),
        });
    }

    Evaluation {
        usable: conflicts.is_empty(),
        conflicts,
    }
}
