use regplan::{NetworkMode, ScenarioKey};

use crate::constants::*;
use crate::normalize::normalize_province;
use crate::station::{Request, Scenario};

/// Picks the interference grid family for a request.
///
/// WAN requests map straight to their own grid. LAN requests are split by
/// site class: big cities with antennas above 15 m, big cities at or below
/// 15 m, and everywhere else.
pub fn classify(request: &Request) -> Scenario {
    let key = match request.mode {
        NetworkMode::WanSimplex => ScenarioKey::WanSimplex,
        NetworkMode::WanDuplex => ScenarioKey::WanDuplex,
        NetworkMode::Lan => {
            if is_big_city(&normalize_province(&request.province)) {
                if request.antenna_height_m > BIG_CITY_HIGH_SITE_M {
                    ScenarioKey::LanBigCityHigh
                } else {
                    ScenarioKey::LanBigCityLow
                }
            } else {
                ScenarioKey::LanProvince
            }
        }
    };
    Scenario {
        main_mode: request.mode,
        key,
    }
}

pub fn is_big_city(province_key: &str) -> bool {
    BIG_CITY_TOKENS.iter().any(|c| *c == province_key)
}
