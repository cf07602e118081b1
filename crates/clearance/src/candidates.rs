use regplan::{AllocationEntry, NetworkMode, RegulatoryTables};
use tracing::{debug, warn};

use crate::constants::*;
use crate::normalize::{normalize_province, sort_dedup};
use crate::registry::StationRegistry;
use crate::station::{Request, ScanRange};

// Slack for float drift when stepping to range edges.
const EDGE_EPSILON: f64 = 1e-9;

/// Enumerates assignable frequencies for a request: every raster point of
/// each plan entry open to the requested mode, inside the scan window, that
/// is not forbidden, shared, province-gated or reserved.
///
/// The raster of an entry is anchored at the entry's own start, so a wider
/// scan window only ever adds points. A scan start that falls between raster
/// points is snapped up to the next one.
pub fn generate(
    tables: &RegulatoryTables,
    registry: &StationRegistry,
    request: &Request,
) -> Vec<f64> {
    let step = request.bandwidth.step_mhz();
    let province_key = normalize_province(&request.province);
    let scan = request.scan;

    let mut out = Vec::new();
    let mut capped = false;

    'entries: for entry in tables.plan(request.band) {
        if !entry.allows(request.mode) {
            continue;
        }
        let Some((lo, hi)) = window(entry, scan) else {
            continue;
        };

        let first = ((lo - entry.range.start) / step - EDGE_EPSILON).ceil().max(0.0) as u64;
        for k in first.. {
            let freq = round_freq(entry.range.start + k as f64 * step);
            if freq > hi + EDGE_EPSILON {
                break;
            }
            if freq < lo - EDGE_EPSILON {
                continue;
            }
            if rejected(tables, registry, request.mode, &province_key, freq) {
                continue;
            }
            out.push(freq);
            if out.len() >= MAX_CANDIDATES {
                capped = true;
                break 'entries;
            }
        }
    }

    sort_dedup(&mut out);
    out.truncate(MAX_CANDIDATES);
    if capped {
        warn!(cap = MAX_CANDIDATES, "candidate list truncated");
    }
    debug!(
        band = %request.band,
        mode = %request.mode,
        count = out.len(),
        "candidates generated"
    );
    out
}

/// Intersection of a plan entry with the scan window.
fn window(entry: &AllocationEntry, scan: Option<ScanRange>) -> Option<(f64, f64)> {
    let (lo, hi) = match scan {
        Some(s) => (entry.range.start.max(s.start), entry.range.end.min(s.end)),
        None => (entry.range.start, entry.range.end),
    };
    (lo <= hi).then_some((lo, hi))
}

fn rejected(
    tables: &RegulatoryTables,
    registry: &StationRegistry,
    mode: NetworkMode,
    province_key: &str,
    freq: f64,
) -> bool {
    tables.is_forbidden(freq)
        || tables.is_shared(freq)
        || (mode == NetworkMode::Lan && tables.gate_blocks(freq, province_key))
        || registry.is_reserved(freq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Location;
    use regplan::{Band, Bandwidth};

    fn tables() -> std::sync::Arc<RegulatoryTables> {
        regplan::embedded_tables().unwrap()
    }

    fn request(band: Band, bw: Bandwidth, mode: NetworkMode) -> Request {
        Request::new(Location::new(16.0, 108.0), band, bw, mode)
    }

    #[test]
    fn steps_on_bandwidth_raster() {
        let t = tables();
        let req =
            request(Band::Vhf, Bandwidth::Khz12_5, NetworkMode::Lan).with_scan(142.0, 142.05);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert_eq!(c, vec![142.0, 142.0125, 142.025, 142.0375, 142.05]);
    }

    #[test]
    fn raster_anchored_at_entry_start() {
        let t = tables();
        let req =
            request(Band::Vhf, Bandwidth::Khz25, NetworkMode::Lan).with_scan(138.01, 138.06);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert_eq!(c, vec![138.025, 138.05]);
    }

    #[test]
    fn excludes_shared_forbidden_and_reserved() {
        let t = tables();
        let registry = StationRegistry::from_stations(vec![], vec![141.0125]);
        let req =
            request(Band::Vhf, Bandwidth::Khz12_5, NetworkMode::Lan).with_scan(140.975, 141.025);
        let c = generate(&t, &registry, &req);
        assert_eq!(c, vec![140.975, 140.9875, 141.025]);

        let req =
            request(Band::Vhf, Bandwidth::Khz12_5, NetworkMode::Lan).with_scan(155.9, 156.1);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert!(c.iter().all(|f| *f < 155.975));
    }

    #[test]
    fn mode_must_be_allowed() {
        let t = tables();
        let req = request(Band::Uhf, Bandwidth::Khz12_5, NetworkMode::WanDuplex)
            .with_scan(405.0, 412.0);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert!(!c.is_empty());
        assert!(c.iter().all(|f| *f >= 410.0));
    }

    #[test]
    fn province_gate_admits_listed_cities() {
        let t = tables();
        let base =
            request(Band::Uhf, Bandwidth::Khz12_5, NetworkMode::Lan).with_scan(418.9, 419.1);
        let hanoi = generate(
            &t,
            &StationRegistry::empty(),
            &base.clone().with_province("Hà Nội"),
        );
        assert!(hanoi.is_empty());
        let hcm = generate(&t, &StationRegistry::empty(), &base.with_province("TP.HCM"));
        assert!(!hcm.is_empty());
    }

    #[test]
    fn stops_at_candidate_cap() {
        let mut t = RegulatoryTables::default();
        t.vhf_plan.push(AllocationEntry {
            range: regplan::FrequencyRange::new(100.0, 300.0),
            modes: vec![NetworkMode::Lan],
            label: "wide".to_string(),
        });
        // 32,001 raster points at 6.25 kHz
        let req = request(Band::Vhf, Bandwidth::Khz6_25, NetworkMode::Lan);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert_eq!(c.len(), MAX_CANDIDATES);
        assert!(c.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(c[0], 100.0);
        assert_eq!(c[MAX_CANDIDATES - 1], 224.99375);
    }

    #[test]
    fn whole_plan_when_no_scan() {
        let t = tables();
        let req = request(Band::Vhf, Bandwidth::Khz25, NetworkMode::WanSimplex);
        let c = generate(&t, &StationRegistry::empty(), &req);
        assert_eq!(c.first(), Some(&148.0));
        assert_eq!(c.last(), Some(&149.9));
        assert!(c.len() <= MAX_CANDIDATES);
        assert!(c.windows(2).all(|w| w[0] < w[1]));
    }
}
