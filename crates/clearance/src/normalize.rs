//! Turns loosely formatted license-register text into typed [`Station`]s.
//!
//! Every parser here fails soft: unreadable input yields `None` or an empty
//! list and the caller moves on. Dirty registers are the normal case.

use regplan::{Bandwidth, NetworkMode, RegulatoryTables};
use serde::Deserialize;
use tracing::debug;

use crate::constants::*;
use crate::station::{Location, Station};

// Larger "a-b" spans in a frequency cell are treated as typos (4096 x 12.5 kHz = 51.2 MHz).
const MAX_RANGE_EXPANSION: usize = 4096;

/// One row of a license register, as text. Field resolution from
/// spreadsheet headers happens in [`crate::columns`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub license_id: Option<String>,
    pub customer: Option<String>,
    pub tx_frequency: Option<String>,
    pub rx_frequency: Option<String>,
    pub emission: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub province: Option<String>,
    pub address: Option<String>,
    pub conditions: Option<String>,
}

/// Stations produced from one record, plus the frequencies it reserves nationwide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    pub stations: Vec<Station>,
    pub reserved: Vec<f64>,
}

/// Blank cells and spreadsheet placeholders ("nan", "none") read as absent.
pub fn clean_cell(cell: Option<&str>) -> Option<&str> {
    let cell = cell?.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(cell)
    }
}

pub fn normalize_record(record: &RawRecord, tables: &RegulatoryTables) -> NormalizedRecord {
    let province_raw = province_text(record.province.as_deref(), record.address.as_deref());
    let province_key = normalize_province(province_raw);
    let is_holding = province_key.contains(HOLDING_MARKER);

    let mut freqs = parse_frequency_list(record.tx_frequency.as_deref().unwrap_or(""));
    freqs.extend(parse_frequency_list(record.rx_frequency.as_deref().unwrap_or("")));
    sort_dedup(&mut freqs);

    let reserved = if is_holding { freqs.clone() } else { Vec::new() };

    let lat = clean_cell(record.latitude.as_deref()).and_then(parse_coordinate);
    let lng = clean_cell(record.longitude.as_deref()).and_then(parse_coordinate);
    let location = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Location::new(lat, lng)),
        _ => None,
    };

    if location.is_none() && !is_holding {
        debug!(
            license = record.license_id.as_deref().unwrap_or(""),
            "dropping record without usable coordinates"
        );
        return NormalizedRecord {
            stations: Vec::new(),
            reserved,
        };
    }

    let bandwidth = parse_emission(clean_cell(record.emission.as_deref()));
    let license_id = clean_cell(record.license_id.as_deref())
        .map(str::to_uppercase)
        .unwrap_or_default();
    let customer_name = clean_cell(record.customer.as_deref())
        .map(str::to_string)
        .unwrap_or_default();
    let marker = network_marker(record.conditions.as_deref());

    let stations = freqs
        .into_iter()
        .map(|frequency| Station {
            frequency,
            bandwidth,
            location,
            province_key: province_key.clone(),
            network_type: marker.unwrap_or_else(|| tables.infer_network_type(frequency)),
            is_holding,
            license_id: license_id.clone(),
            customer_name: customer_name.clone(),
        })
        .collect();

    NormalizedRecord { stations, reserved }
}

/// The province column when filled, otherwise the last comma-separated part of the address.
pub fn province_text<'a>(province: Option<&'a str>, address: Option<&'a str>) -> &'a str {
    if let Some(p) = clean_cell(province) {
        return p;
    }
    clean_cell(address)
        .and_then(|a| a.rsplit(',').next())
        .map(str::trim)
        .unwrap_or("")
}

/// Comparison token for a province: diacritics folded, administrative
/// prefixes dropped, only ASCII letters and digits kept, upper-cased.
pub fn normalize_province(text: &str) -> String {
    let folded: String = text.trim().to_lowercase().chars().map(fold_vietnamese).collect();

    let mut rest = folded.trim_start();
    loop {
        let stripped = ["thanh pho ", "tinh ", "tp.", "tp "]
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix));
        match stripped {
            Some(s) => rest = s.trim_start(),
            None => break,
        }
    }

    rest.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ấ' | 'ầ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'đ' => 'd',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ế' | 'ề' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ố' | 'ồ' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ớ' | 'ờ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ứ' | 'ừ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        other => other,
    }
}

/// Explicit network type written into a license's conditions, if any.
fn network_marker(conditions: Option<&str>) -> Option<NetworkMode> {
    let token = normalize_province(clean_cell(conditions)?);
    if token.contains("WANSIMPLEX") {
        Some(NetworkMode::WanSimplex)
    } else if token.contains("WANDUPLEX") {
        Some(NetworkMode::WanDuplex)
    } else {
        None
    }
}

/// Parses decimal degrees or degrees-minutes-seconds with mixed punctuation,
/// e.g. `21.0285`, `21,0285`, `21°01'42.6"N`, `105 51 15 E`, `105.51.15`.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let upper = text.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let southern_or_western = upper.contains('S') || upper.contains('W');

    let mut cleaned: String = upper
        .chars()
        .map(|c| match c {
            'N' | 'S' | 'E' | 'W' | '°' | '\'' | '"' | '’' | '″' | '′' | ';' | ':' | '_' => ' ',
            other => other,
        })
        .collect();
    cleaned = if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', " ")
    } else {
        cleaned.replace(',', ".")
    };

    let numbers = extract_numbers(&cleaned);
    match numbers.as_slice() {
        [] => None,
        [value] => {
            let negative = southern_or_western || cleaned.trim_start().starts_with('-');
            let value = if negative { -value } else { *value };
            (value.abs() > 0.0 && value.abs() < 180.0).then_some(value)
        }
        [d, m, rest @ ..] => {
            let s = rest.first().copied().unwrap_or(0.0);
            let mut value = d + m / 60.0 + s / 3600.0;
            if southern_or_western {
                value = -value;
            }
            (value.abs() <= 180.0).then_some(value)
        }
    }
}

/// Frequencies (MHz) in a license cell: single values separated by spaces or
/// semicolons, and inclusive `a-b` ranges expanded on a 12.5 kHz raster.
pub fn parse_frequency_list(text: &str) -> Vec<f64> {
    let clean = text
        .to_uppercase()
        .replace(',', ".")
        .replace("MHZ", "")
        .replace(';', " ");

    let mut freqs = Vec::new();

    let spans = number_spans(&clean);
    let mut i = 0;
    while i + 1 < spans.len() {
        let (a, a_end) = (spans[i].0, spans[i].2);
        let (b, b_start) = (spans[i + 1].0, spans[i + 1].1);
        if clean[a_end..b_start].trim() == "-" {
            expand_range(a, b, &mut freqs);
            i += 2;
        } else {
            i += 1;
        }
    }

    for token in clean.split_whitespace() {
        if token == "-" {
            continue;
        }
        if let Ok(f) = token.parse::<f64>() {
            freqs.push(f);
        }
    }

    freqs.retain(|f| *f >= MIN_PLAUSIBLE_FREQ_MHZ);
    for f in freqs.iter_mut() {
        *f = round_freq(*f);
    }
    sort_dedup(&mut freqs);
    freqs
}

fn expand_range(a: f64, b: f64, out: &mut Vec<f64>) {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let steps = ((end - start + 0.0001) / RANGE_EXPANSION_STEP_MHZ).floor() as usize;
    if steps >= MAX_RANGE_EXPANSION {
        debug!(start, end, "ignoring implausibly wide frequency range");
        return;
    }
    out.extend((0..=steps).map(|k| round_freq(start + k as f64 * RANGE_EXPANSION_STEP_MHZ)));
}

/// Emission designator to channel bandwidth; 12.5 kHz when unrecognized.
pub fn parse_emission(code: Option<&str>) -> Bandwidth {
    let code = match code {
        Some(c) => c.to_uppercase(),
        None => return Bandwidth::Khz12_5,
    };
    if code.contains("16K") {
        Bandwidth::Khz25
    } else if code.contains("11K") || code.contains("8K5") {
        Bandwidth::Khz12_5
    } else if code.contains("4K0") {
        Bandwidth::Khz6_25
    } else {
        Bandwidth::Khz12_5
    }
}

fn extract_numbers(s: &str) -> Vec<f64> {
    number_spans(s).into_iter().map(|(v, _, _)| v).collect()
}

/// Unsigned decimal numbers in `s` with their byte spans.
fn number_spans(s: &str) -> Vec<(f64, usize, usize)> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if let Ok(v) = s[start..i].parse::<f64>() {
            out.push((v, start, i));
        }
    }
    out
}

pub(crate) fn sort_dedup(freqs: &mut Vec<f64>) {
    freqs.sort_by(|a, b| a.total_cmp(b));
    freqs.dedup_by(|a, b| (*a - *b).abs() < EXACT_MATCH_TOLERANCE_MHZ);
}
