use regplan::RegulatoryTables;
use serde::Serialize;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::conflict::{evaluate, EvaluationMode};
use crate::geometry::great_circle_distance;
use crate::registry::StationRegistry;
use crate::station::{Request, Scenario};

/// A clear frequency, ready for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// 1-based position after sorting.
    pub sequence: usize,
    pub frequency: f64,
    /// Distinct licenses already on this exact carrier.
    pub reuse_factor: usize,
    /// `LICENSE(km)` pairs, nearest first.
    pub license_list: String,
    pub is_priority: bool,
}

/// Licenses already transmitting on `freq`, each with its nearest distance
/// (km) to the requester, nearest first. Stations without coordinates
/// count as 0 km.
pub fn reuse_licenses(
    registry: &StationRegistry,
    request: &Request,
    freq: f64,
) -> Vec<(String, f64)> {
    let mut by_license: Vec<(String, f64)> = Vec::new();
    for station in registry.exact(freq) {
        let Some(label) = license_label(&station.license_id) else {
            continue;
        };
        let km = station
            .location
            .map(|l| great_circle_distance(request.location, l))
            .unwrap_or(0.0);
        match by_license.iter_mut().find(|(lic, _)| lic == label) {
            Some(entry) => entry.1 = entry.1.min(km),
            None => by_license.push((label.to_string(), km)),
        }
    }
    // stable: equal distances keep first-seen order
    by_license.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_license
}

/// Short form of a license id for reuse lists; `None` for placeholders.
fn license_label(license_id: &str) -> Option<&str> {
    let id = license_id.trim();
    let placeholder = ["", "nan", "none", "nan/gp"]
        .iter()
        .any(|p| id.eq_ignore_ascii_case(p));
    if placeholder {
        return None;
    }
    id.split('/').next()
}

pub fn format_license_list(licenses: &[(String, f64)]) -> String {
    licenses
        .iter()
        .map(|(lic, km)| format!("{lic}({})", km.trunc() as i64))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keeps the usable candidates and orders them: outside priority bands
/// first, then by descending reuse. Ties keep frequency order.
pub fn rank_candidates(
    tables: &RegulatoryTables,
    registry: &StationRegistry,
    request: &Request,
    scenario: Scenario,
    candidates: &[f64],
) -> Vec<RankedCandidate> {
    let assess = |&freq: &f64| -> Option<RankedCandidate> {
        let mode = EvaluationMode::FirstFailure;
        if !evaluate(tables, registry, request, scenario, freq, mode).usable {
            return None;
        }
        let licenses = reuse_licenses(registry, request, freq);
        Some(RankedCandidate {
            sequence: 0,
            frequency: freq,
            reuse_factor: licenses.len(),
            license_list: format_license_list(&licenses),
            is_priority: tables.is_priority(freq),
        })
    };

    #[cfg(feature = "parallel")]
    let assessed: Vec<Option<RankedCandidate>> = candidates.par_iter().map(assess).collect();
    #[cfg(not(feature = "parallel"))]
    let assessed: Vec<Option<RankedCandidate>> = candidates.iter().map(assess).collect();

    let mut ranked: Vec<RankedCandidate> = assessed.into_iter().flatten().collect();
    ranked.sort_by(|a, b| {
        a.is_priority
            .cmp(&b.is_priority)
            .then(b.reuse_factor.cmp(&a.reuse_factor))
    });
    for (i, r) in ranked.iter_mut().enumerate() {
        r.sequence = i + 1;
    }

    debug!(
        candidates = candidates.len(),
        usable = ranked.len(),
        "ranking complete"
    );
    ranked
}

/// The first `quantity` frequencies to offer: non-priority ones in rank
/// order, topped up from priority bands when there are too few.
pub fn suggest(ranked: &[RankedCandidate], quantity: usize) -> Vec<f64> {
    let mut picked: Vec<f64> = ranked
        .iter()
        .filter(|r| !r.is_priority)
        .take(quantity)
        .map(|r| r.frequency)
        .collect();
    if picked.len() < quantity {
        let missing = quantity - picked.len();
        picked.extend(
            ranked
                .iter()
                .filter(|r| r.is_priority)
                .take(missing)
                .map(|r| r.frequency),
        );
    }
    picked
}
