use regplan::{Band, Bandwidth, NetworkMode, ScenarioKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64, // decimal degrees, north positive
    pub lng: f64, // decimal degrees, east positive
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Location { lat, lng }
    }
}

/// One licensed carrier extracted from a license record.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub frequency: f64, // MHz, rounded to 5 decimals
    pub bandwidth: Bandwidth,
    pub location: Option<Location>, // None only for holding records
    pub province_key: String,
    pub network_type: NetworkMode,
    pub is_holding: bool,
    pub license_id: String,
    pub customer_name: String,
}

impl Station {
    /// Label used in conflict reports: province token plus coordinates.
    pub fn location_label(&self) -> String {
        match self.location {
            Some(l) => format!("{} ({:.4}, {:.4})", self.province_key, l.lat, l.lng),
            None => self.province_key.clone(),
        }
    }
}

/// Inclusive scan window in MHz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    pub start: f64,
    pub end: f64,
}

impl ScanRange {
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end {
            ScanRange { start, end }
        } else {
            ScanRange {
                start: end,
                end: start,
            }
        }
    }
}

/// A user's assignment query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub location: Location,
    pub antenna_height_m: f64,
    pub band: Band,
    pub bandwidth: Bandwidth,
    pub mode: NetworkMode,
    /// Free text, normalized before use.
    pub province: String,
    /// How many frequencies the applicant wants assigned.
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    #[serde(default)]
    pub scan: Option<ScanRange>,
}

fn default_quantity() -> usize {
    1
}

impl Request {
    pub fn new(location: Location, band: Band, bandwidth: Bandwidth, mode: NetworkMode) -> Self {
        Request {
            location,
            antenna_height_m: 0.0,
            band,
            bandwidth,
            mode,
            province: String::new(),
            quantity: default_quantity(),
            scan: None,
        }
    }

    pub fn with_province(mut self, province: &str) -> Self {
        self.province = province.to_string();
        self
    }

    pub fn with_antenna_height(mut self, metres: f64) -> Self {
        self.antenna_height_m = metres;
        self
    }

    pub fn with_scan(mut self, start: f64, end: f64) -> Self {
        self.scan = Some(ScanRange::new(start, end));
        self
    }

    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity;
        self
    }
}

/// Derived once per request: the main mode and the grid-selecting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub main_mode: NetworkMode,
    pub key: ScenarioKey,
}
