use std::fmt;
use std::sync::Arc;

use regplan::RegulatoryTables;
use serde::Serialize;
use tracing::{debug, info};

use crate::candidates::generate;
use crate::conflict::{evaluate, Conflict, EvaluationMode};
use crate::constants::round_freq;
use crate::ranking::{rank_candidates, suggest, RankedCandidate};
use crate::registry::StationRegistry;
use crate::scenario::classify;
use crate::station::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Ok,
    Fail,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Ok => write!(f, "OK"),
            VerdictStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Outcome of checking one frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub message: String,
    pub conflicts: Vec<Conflict>,
}

impl Verdict {
    fn fail(message: String) -> Self {
        Verdict {
            status: VerdictStatus::Fail,
            message,
            conflicts: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == VerdictStatus::Ok
    }
}

/// Answers assignment queries against one register and one set of tables.
///
/// Both are immutable for the engine's lifetime; load new tables or a new
/// register by building a new engine.
#[derive(Debug, Clone)]
pub struct ClearanceEngine {
    tables: Arc<RegulatoryTables>,
    registry: StationRegistry,
}

impl ClearanceEngine {
    pub fn new(tables: Arc<RegulatoryTables>, registry: StationRegistry) -> Self {
        ClearanceEngine { tables, registry }
    }

    pub fn tables(&self) -> &RegulatoryTables {
        &self.tables
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    /// Every usable frequency for the request, best first.
    pub fn rank(&self, request: &Request) -> Vec<RankedCandidate> {
        if !self.registry.is_usable() {
            debug!("ranking skipped: no station data");
            return Vec::new();
        }
        let scenario = classify(request);
        let candidates = generate(&self.tables, &self.registry, request);
        let ranked = rank_candidates(&self.tables, &self.registry, request, scenario, &candidates);
        info!(
            band = %request.band,
            mode = %request.mode,
            scenario = %scenario.key,
            candidates = candidates.len(),
            usable = ranked.len(),
            "ranked frequencies"
        );
        ranked
    }

    /// The `request.quantity` frequencies to offer the applicant.
    pub fn suggest(&self, request: &Request) -> Vec<f64> {
        suggest(&self.rank(request), request.quantity)
    }

    /// Full check of one frequency: plan membership and mode, forbidden,
    /// shared and reserved channels, then every interference conflict.
    pub fn check_frequency(&self, request: &Request, frequency: f64) -> Verdict {
        let freq = round_freq(frequency);
        let tables = &self.tables;

        if !self.registry.is_usable() {
            return Verdict::fail("no station data".to_string());
        }

        let Some(entry) = tables.allocation_at(request.band, freq) else {
            return Verdict::fail(format!(
                "{freq} MHz is outside the {} allocation plan",
                request.band
            ));
        };
        if !entry.allows(request.mode) {
            let modes: Vec<String> = entry.modes.iter().map(|m| m.to_string()).collect();
            return Verdict::fail(format!(
                "{freq} MHz is allocated to {}, not {}",
                modes.join("/"),
                request.mode
            ));
        }
        if tables.is_forbidden(freq) {
            return Verdict::fail(format!(
                "{freq} MHz lies in a forbidden band (including the 25 kHz guard)"
            ));
        }
        if tables.is_shared(freq) {
            return Verdict::fail(format!("{freq} MHz is a shared channel"));
        }
        if let Some(held) = self.registry.reserved_match(freq) {
            return Verdict::fail(format!(
                "{freq} MHz is held by a nationwide roaming license ({held} MHz)"
            ));
        }

        let scenario = classify(request);
        let evaluation = evaluate(
            tables,
            &self.registry,
            request,
            scenario,
            freq,
            EvaluationMode::Diagnostic,
        );
        debug!(freq, conflicts = evaluation.conflicts.len(), "frequency checked");

        if evaluation.usable {
            Verdict {
                status: VerdictStatus::Ok,
                message: format!("{freq} MHz is available"),
                conflicts: Vec::new(),
            }
        } else {
            Verdict {
                status: VerdictStatus::Fail,
                message: format!("{freq} MHz would interfere with existing stations"),
                conflicts: evaluation.conflicts,
            }
        }
    }

    /// Every conflict of every candidate in the request's scan window.
    pub fn scan_bad_frequencies(&self, request: &Request) -> Vec<Conflict> {
        if !self.registry.is_usable() {
            return Vec::new();
        }
        let scenario = classify(request);
        let candidates = generate(&self.tables, &self.registry, request);
        let conflicts: Vec<Conflict> = candidates
            .iter()
            .flat_map(|&freq| {
                evaluate(
                    &self.tables,
                    &self.registry,
                    request,
                    scenario,
                    freq,
                    EvaluationMode::Diagnostic,
                )
                .conflicts
            })
            .collect();
        info!(
            candidates = candidates.len(),
            conflicts = conflicts.len(),
            "bad-frequency scan complete"
        );
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::offset_north;
    use crate::station::{Location, Station};
    use regplan::{Band, Bandwidth, NetworkMode};

    const HERE: Location = Location {
        lat: 16.0,
        lng: 108.0,
    };

    fn engine(stations: Vec<Station>, reserved: Vec<f64>) -> ClearanceEngine {
        ClearanceEngine::new(
            regplan::embedded_tables().unwrap(),
            StationRegistry::from_stations(stations, reserved),
        )
    }

    fn lan_station(freq: f64, km: f64, license: &str) -> Station {
        Station {
            frequency: freq,
            bandwidth: Bandwidth::Khz12_5,
            location: Some(offset_north(HERE, km)),
            province_key: "QUANGNAM".into(),
            network_type: NetworkMode::Lan,
            is_holding: false,
            license_id: license.into(),
            customer_name: String::new(),
        }
    }

    fn request() -> Request {
        Request::new(HERE, Band::Vhf, Bandwidth::Khz12_5, NetworkMode::Lan)
            .with_province("Quảng Nam")
    }

    #[test]
    fn empty_registry() {
        let tables = regplan::embedded_tables().unwrap();
        let e = ClearanceEngine::new(tables, StationRegistry::empty());
        assert!(e.rank(&request().with_scan(142.0, 142.1)).is_empty());
        assert!(e.scan_bad_frequencies(&request()).is_empty());
        let v = e.check_frequency(&request(), 142.0);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.message, "no station data");
    }

    #[test]
    fn check_order_of_rejections() {
        let e = engine(vec![lan_station(150.5, 100.0, "GP-1")], vec![143.5]);
        let req = request();

        let v = e.check_frequency(&req, 145.0);
        assert!(v.message.contains("outside the VHF allocation plan"), "{}", v.message);

        let v = e.check_frequency(&req, 148.5);
        assert!(v.message.contains("allocated to WAN_SIMPLEX, not LAN"), "{}", v.message);

        let v = e.check_frequency(&req, 155.98);
        assert!(v.message.contains("forbidden"), "{}", v.message);

        let v = e.check_frequency(&req, 141.0);
        assert!(v.message.contains("shared channel"), "{}", v.message);

        let v = e.check_frequency(&req, 143.5005);
        assert!(v.message.contains("nationwide roaming"), "{}", v.message);

        let v = e.check_frequency(&req, 142.0);
        assert!(v.is_ok());
        assert!(v.conflicts.is_empty());
    }

    #[test]
    fn check_reports_every_conflict() {
        let e = engine(
            vec![lan_station(142.0, 10.0, "GP-1"), lan_station(142.0125, 2.0, "GP-2")],
            vec![],
        );
        let v = e.check_frequency(&request(), 142.0);
        assert_eq!(v.status, VerdictStatus::Fail);
        assert_eq!(v.conflicts.len(), 2);
        assert_eq!(v.conflicts[0].license_id, "GP-1");
        assert_eq!(v.conflicts[1].license_id, "GP-2");
    }

    #[test]
    fn scan_includes_candidate_frequency() {
        let e = engine(vec![lan_station(142.0, 3.0, "GP-1")], vec![]);
        let bad = e.scan_bad_frequencies(&request().with_scan(141.95, 142.05));
        let freqs: Vec<f64> = bad.iter().map(|c| c.candidate_frequency).collect();
        // co-channel needs 30 km, 12.5 kHz adjacent 4.5 km, 25 kHz adjacent 0.9 km
        assert_eq!(freqs, vec![141.9875, 142.0, 142.0125]);
        assert!(bad.iter().all(|c| c.station_frequency == 142.0));
    }

    #[test]
    fn priority_band_ranks_last_despite_reuse() {
        // 155.5-156.0 is a priority band in the embedded plan
        let e = engine(
            vec![
                lan_station(155.45, 300.0, "GP-1"),
                lan_station(155.55, 300.0, "GP-2"),
                lan_station(155.55, 320.0, "GP-3"),
            ],
            vec![],
        );
        let ranked = e.rank(&request().with_scan(155.4, 155.6));
        assert_eq!(ranked.len(), 17);

        let split = ranked.iter().position(|r| r.is_priority).unwrap();
        assert!(split > 0);
        assert!(ranked[split..].iter().all(|r| r.is_priority));
        assert!(ranked[..split].iter().all(|r| !r.is_priority));

        assert_eq!(ranked[0].frequency, 155.45);
        assert_eq!(ranked[0].reuse_factor, 1);
        assert_eq!(ranked[split].frequency, 155.55);
        assert_eq!(ranked[split].reuse_factor, 2);
        assert!(ranked[split].reuse_factor > ranked[0].reuse_factor);

        let sequences: Vec<usize> = ranked.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, (1..=ranked.len()).collect::<Vec<_>>());
    }

    #[test]
    fn suggest_uses_request_quantity() {
        let e = engine(vec![lan_station(142.0, 100.0, "GP-1")], vec![]);
        let picked = e.suggest(&request().with_scan(141.9, 142.1).with_quantity(2));
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], 142.0);
    }

    #[test]
    fn verdict_serializes_for_reports() {
        let e = engine(vec![lan_station(142.0, 10.0, "GP-1")], vec![]);
        let v = e.check_frequency(&request(), 142.0);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["status"], "FAIL");
        assert_eq!(json["conflicts"][0]["type"], "co-channel");
        assert_eq!(json["conflicts"][0]["required_km"], 30.0);
    }
}
