/// Constants for clearance calculations

pub const PI: f64 = std::f64::consts::PI;
pub const R0: f64 = 6371.009; // km International Union of Geodesy and Geophysics mean Earth radius
pub const D2R: f64 = PI / 180.0;

// Frequencies are carried in MHz rounded to 5 decimals (10 Hz resolution)
pub const FREQ_DECIMALS: i32 = 5;

// Stations closer than this to a candidate are inspected at all.
// Covers every offset bucket up to the 25 kHz class plus margin (35 kHz).
pub const GUARD_WINDOW_MHZ: f64 = 0.035;

// Same carrier for reuse counting (0.01 kHz)
pub const EXACT_MATCH_TOLERANCE_MHZ: f64 = 0.00001;

// Nationwide holding reservations block candidates within 1 kHz
pub const RESERVED_MATCH_TOLERANCE_MHZ: f64 = 0.001;

// Stations nearer than 50 m are the requester's own site
pub const COLOCATED_KM: f64 = 0.05;

// Hard bound on enumerated candidates per request
pub const MAX_CANDIDATES: usize = 20_000;

// Raster used to expand "a-b" frequency ranges in license text (12.5 kHz)
pub const RANGE_EXPANSION_STEP_MHZ: f64 = 0.0125;

// Anything below this in a frequency list is a stray number, not a carrier
pub const MIN_PLAUSIBLE_FREQ_MHZ: f64 = 10.0;

// Antenna height above which a big-city LAN is treated as high-site (m)
pub const BIG_CITY_HIGH_SITE_M: f64 = 15.0;

/// Normalized province tokens that count as big cities.
pub const BIG_CITY_TOKENS: [&str; 5] = ["HANOI", "HCM", "DANANG", "HOCHIMINH", "THANHPHOHOCHIMINH"];

/// Normalized province token marking a nationwide roaming (holding) license.
pub const HOLDING_MARKER: &str = "LUUDONGTOANQUOC";

pub fn round_freq(freq: f64) -> f64 {
    let scale = 10f64.powi(FREQ_DECIMALS);
    (freq * scale).round() / scale
}
