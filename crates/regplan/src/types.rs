use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    Vhf,
    Uhf,
}

impl Band {
    /// Frequency window (MHz) used to decide which plan a licensed frequency belongs to.
    pub fn span(self) -> (f64, f64) {
        match self {
            Band::Vhf => (130.0, 180.0),
            Band::Uhf => (380.0, 500.0),
        }
    }

    pub fn of_frequency(freq: f64) -> Option<Band> {
        [Band::Vhf, Band::Uhf].into_iter().find(|band| {
            let (lo, hi) = band.span();
            lo <= freq && freq <= hi
        })
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Vhf => write!(f, "VHF"),
            Band::Uhf => write!(f, "UHF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkMode {
    Lan,
    WanSimplex,
    WanDuplex,
}

impl NetworkMode {
    pub fn is_wan(self) -> bool {
        !matches!(self, NetworkMode::Lan)
    }

    /// Same general family: LAN with LAN, or WAN (either flavour) with WAN.
    pub fn same_family(self, other: NetworkMode) -> bool {
        self.is_wan() == other.is_wan()
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Lan => write!(f, "LAN"),
            NetworkMode::WanSimplex => write!(f, "WAN_SIMPLEX"),
            NetworkMode::WanDuplex => write!(f, "WAN_DUPLEX"),
        }
    }
}

impl FromStr for NetworkMode {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LAN" => Ok(NetworkMode::Lan),
            "WAN_SIMPLEX" => Ok(NetworkMode::WanSimplex),
            "WAN_DUPLEX" => Ok(NetworkMode::WanDuplex),
            other => Err(TableError::UnknownMode(other.to_string())),
        }
    }
}

/// Channel bandwidth classes used by the plan and the interference grids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bandwidth {
    Khz6_25,
    #[default]
    Khz12_5,
    Khz25,
}

impl Bandwidth {
    pub const ALL: [Bandwidth; 3] = [Bandwidth::Khz6_25, Bandwidth::Khz12_5, Bandwidth::Khz25];

    pub fn khz(self) -> f64 {
        match self {
            Bandwidth::Khz6_25 => 6.25,
            Bandwidth::Khz12_5 => 12.5,
            Bandwidth::Khz25 => 25.0,
        }
    }

    /// Channel raster step in MHz.
    pub fn step_mhz(self) -> f64 {
        self.khz() / 1000.0
    }

    /// Snap an arbitrary bandwidth (kHz) to the nearest class.
    pub fn bucket(khz: f64) -> Bandwidth {
        if khz <= 9.0 {
            Bandwidth::Khz6_25
        } else if khz <= 18.0 {
            Bandwidth::Khz12_5
        } else {
            Bandwidth::Khz25
        }
    }

    pub(crate) fn column(self) -> usize {
        match self {
            Bandwidth::Khz6_25 => 0,
            Bandwidth::Khz12_5 => 1,
            Bandwidth::Khz25 => 2,
        }
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.khz())
    }
}

impl FromStr for Bandwidth {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(v) if v == 6.25 => Ok(Bandwidth::Khz6_25),
            Ok(v) if v == 12.5 => Ok(Bandwidth::Khz12_5),
            Ok(v) if v == 25.0 => Ok(Bandwidth::Khz25),
            _ => Err(TableError::UnknownBandwidth(s.to_string())),
        }
    }
}

impl Serialize for Bandwidth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.khz())
    }
}

impl<'de> Deserialize<'de> for Bandwidth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let khz = f64::deserialize(deserializer)?;
        Ok(Bandwidth::bucket(khz))
    }
}

/// Regulatory channel-spacing class of the separation between two carriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OffsetBucket {
    CoChannel,
    Adjacent6_25,
    Adjacent12_5,
    Adjacent18_75,
    Adjacent25,
}

impl OffsetBucket {
    pub const ALL: [OffsetBucket; 5] = [
        OffsetBucket::CoChannel,
        OffsetBucket::Adjacent6_25,
        OffsetBucket::Adjacent12_5,
        OffsetBucket::Adjacent18_75,
        OffsetBucket::Adjacent25,
    ];

    /// Bucket an absolute separation in kHz. `None` means 30 kHz or more,
    /// which carries no separation requirement at all.
    pub fn from_offset_khz(offset_khz: f64) -> Option<OffsetBucket> {
        let d = offset_khz.abs();
        if d < 3.0 {
            Some(OffsetBucket::CoChannel)
        } else if d < 9.0 {
            Some(OffsetBucket::Adjacent6_25)
        } else if d < 15.0 {
            Some(OffsetBucket::Adjacent12_5)
        } else if d < 21.0 {
            Some(OffsetBucket::Adjacent18_75)
        } else if d < 30.0 {
            Some(OffsetBucket::Adjacent25)
        } else {
            None
        }
    }

    pub fn nominal_khz(self) -> f64 {
        match self {
            OffsetBucket::CoChannel => 0.0,
            OffsetBucket::Adjacent6_25 => 6.25,
            OffsetBucket::Adjacent12_5 => 12.5,
            OffsetBucket::Adjacent18_75 => 18.75,
            OffsetBucket::Adjacent25 => 25.0,
        }
    }

    pub(crate) fn row(self) -> usize {
        match self {
            OffsetBucket::CoChannel => 0,
            OffsetBucket::Adjacent6_25 => 1,
            OffsetBucket::Adjacent12_5 => 2,
            OffsetBucket::Adjacent18_75 => 3,
            OffsetBucket::Adjacent25 => 4,
        }
    }
}

impl fmt::Display for OffsetBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetBucket::CoChannel => write!(f, "co-channel"),
            other => write!(f, "adjacent {} kHz", other.nominal_khz()),
        }
    }
}

/// Refined request classification selecting the intra-family grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioKey {
    LanBigCityHigh,
    LanBigCityLow,
    LanProvince,
    WanSimplex,
    WanDuplex,
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&TableKey::from(*self), f)
    }
}

/// Key of one interference grid inside a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKey {
    LanBigCityHigh,
    LanBigCityLow,
    LanProvince,
    WanSimplex,
    WanDuplex,
    LanVsWanSimplex,
    LanVsWanDuplex,
    WanSimplexVsLan,
    WanDuplexVsLan,
}

impl TableKey {
    /// Cross-family grid for a requesting mode against an existing station's mode.
    /// `None` when both sides are in the same family.
    pub fn cross(user: NetworkMode, existing: NetworkMode) -> Option<TableKey> {
        match (user, existing) {
            (NetworkMode::Lan, NetworkMode::WanSimplex) => Some(TableKey::LanVsWanSimplex),
            (NetworkMode::Lan, NetworkMode::WanDuplex) => Some(TableKey::LanVsWanDuplex),
            (NetworkMode::WanSimplex, NetworkMode::Lan) => Some(TableKey::WanSimplexVsLan),
            (NetworkMode::WanDuplex, NetworkMode::Lan) => Some(TableKey::WanDuplexVsLan),
            _ => None,
        }
    }
}

impl From<ScenarioKey> for TableKey {
    fn from(key: ScenarioKey) -> Self {
        match key {
            ScenarioKey::LanBigCityHigh => TableKey::LanBigCityHigh,
            ScenarioKey::LanBigCityLow => TableKey::LanBigCityLow,
            ScenarioKey::LanProvince => TableKey::LanProvince,
            ScenarioKey::WanSimplex => TableKey::WanSimplex,
            ScenarioKey::WanDuplex => TableKey::WanDuplex,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableKey::LanBigCityHigh => "LAN_BIG_CITY_HIGH",
            TableKey::LanBigCityLow => "LAN_BIG_CITY_LOW",
            TableKey::LanProvince => "LAN_PROVINCE",
            TableKey::WanSimplex => "WAN_SIMPLEX",
            TableKey::WanDuplex => "WAN_DUPLEX",
            TableKey::LanVsWanSimplex => "LAN_VS_WAN_SIMPLEX",
            TableKey::LanVsWanDuplex => "LAN_VS_WAN_DUPLEX",
            TableKey::WanSimplexVsLan => "WAN_SIMPLEX_VS_LAN",
            TableKey::WanDuplexVsLan => "WAN_DUPLEX_VS_LAN",
        };
        f.write_str(s)
    }
}

impl FromStr for TableKey {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LAN_BIG_CITY_HIGH" => Ok(TableKey::LanBigCityHigh),
            "LAN_BIG_CITY_LOW" => Ok(TableKey::LanBigCityLow),
            "LAN_PROVINCE" => Ok(TableKey::LanProvince),
            "WAN_SIMPLEX" => Ok(TableKey::WanSimplex),
            "WAN_DUPLEX" => Ok(TableKey::WanDuplex),
            "LAN_VS_WAN_SIMPLEX" => Ok(TableKey::LanVsWanSimplex),
            "LAN_VS_WAN_DUPLEX" => Ok(TableKey::LanVsWanDuplex),
            "WAN_SIMPLEX_VS_LAN" => Ok(TableKey::WanSimplexVsLan),
            "WAN_DUPLEX_VS_LAN" => Ok(TableKey::WanDuplexVsLan),
            other => Err(TableError::UnknownTableKey(other.to_string())),
        }
    }
}
