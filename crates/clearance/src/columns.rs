//! Maps spreadsheet headers (Vietnamese or English, inconsistently named)
//! onto the register fields the normalizer needs.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LicenseId,
    Customer,
    TxFrequency,
    RxFrequency,
    Emission,
    Latitude,
    Longitude,
    Address,
    Province,
    Conditions,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::LicenseId,
        Field::Customer,
        Field::TxFrequency,
        Field::RxFrequency,
        Field::Emission,
        Field::Latitude,
        Field::Longitude,
        Field::Address,
        Field::Province,
        Field::Conditions,
    ];

    /// Header spellings seen in license registers, most specific first.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::LicenseId => &["Số giấy phép", "Số GP", "License", "Lic"],
            Field::Customer => &["Tên khách hàng", "Khách hàng", "Customer", "User"],
            Field::TxFrequency => &["Tần số phát", "Frequency", "Freq", "Tx Freq", "Tần số"],
            Field::RxFrequency => &["Tần số thu", "Rx Freq", "Freq Rx"],
            Field::Emission => &["Phương thức phát", "Emission", "Bandwidth", "BW", "Dải thông"],
            Field::Latitude => &["Vị trí anten: Vĩ độ", "Vĩ độ", "Lat", "Latitude"],
            Field::Longitude => &["Vị trí anten: Kinh độ", "Kinh độ", "Lon", "Long", "Longitude"],
            Field::Address => &["Địa điểm đặt thiết bị", "Địa chỉ", "Address", "Location"],
            Field::Province => &["Tỉnh thành", "Province", "Tỉnh"],
            Field::Conditions => &["Các điều kiện khác", "Ghi chú", "Condition"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::LicenseId => "license number",
            Field::Customer => "customer",
            Field::TxFrequency => "transmit frequency",
            Field::RxFrequency => "receive frequency",
            Field::Emission => "emission",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Address => "address",
            Field::Province => "province",
            Field::Conditions => "conditions",
        };
        f.write_str(name)
    }
}

/// Header index resolved for each field, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [Option<usize>; 10],
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.slots[field.index()]
    }

    pub fn set(&mut self, field: Field, column: usize) {
        self.slots[field.index()] = Some(column);
    }

    /// Cell of `row` for `field`, when the column exists and the row is long enough.
    pub fn cell<'r>(&self, field: Field, row: &'r csv::StringRecord) -> Option<&'r str> {
        self.get(field).and_then(|i| row.get(i))
    }
}

/// Resolves each field to a header: an exact (trimmed, case-insensitive)
/// match against any synonym first, then the first header containing a
/// synonym. A header is claimed by at most one field.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMap {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    let mut claimed = vec![false; lowered.len()];
    let mut map = ColumnMap::default();

    for field in Field::ALL {
        let synonyms: Vec<String> = field.synonyms().iter().map(|s| s.to_lowercase()).collect();

        let exact = (0..lowered.len())
            .find(|&i| !claimed[i] && synonyms.iter().any(|s| *s == lowered[i]));
        let found = exact.or_else(|| {
            (0..lowered.len())
                .find(|&i| !claimed[i] && synonyms.iter().any(|s| lowered[i].contains(s.as_str())))
        });

        if let Some(i) = found {
            claimed[i] = true;
            map.set(field, i);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vietnamese_register_headers() {
        let headers = [
            "STT",
            "Số giấy phép",
            "Tên khách hàng",
            "Tần số phát",
            "Tần số thu",
            "Phương thức phát",
            "Vị trí anten: Vĩ độ",
            "Vị trí anten: Kinh độ",
            "Địa điểm đặt thiết bị",
            "Ghi chú",
        ];
        let map = resolve_columns(&headers);
        assert_eq!(map.get(Field::LicenseId), Some(1));
        assert_eq!(map.get(Field::Customer), Some(2));
        assert_eq!(map.get(Field::TxFrequency), Some(3));
        assert_eq!(map.get(Field::RxFrequency), Some(4));
        assert_eq!(map.get(Field::Emission), Some(5));
        assert_eq!(map.get(Field::Latitude), Some(6));
        assert_eq!(map.get(Field::Longitude), Some(7));
        assert_eq!(map.get(Field::Address), Some(8));
        assert_eq!(map.get(Field::Province), None);
        assert_eq!(map.get(Field::Conditions), Some(9));
    }

    #[test]
    fn english_headers_case_insensitive() {
        let headers = [" LICENSE ", "freq", "Rx Freq", "lat", "LON", "Province"];
        let map = resolve_columns(&headers);
        assert_eq!(map.get(Field::LicenseId), Some(0));
        assert_eq!(map.get(Field::TxFrequency), Some(1));
        assert_eq!(map.get(Field::RxFrequency), Some(2));
        assert_eq!(map.get(Field::Latitude), Some(3));
        assert_eq!(map.get(Field::Longitude), Some(4));
        assert_eq!(map.get(Field::Province), Some(5));
    }

    #[test]
    fn substring_match_does_not_steal_claimed_header() {
        // "Tần số" is a substring of both; the transmit field takes the first.
        let headers = ["Tần số (MHz)", "Tần số thu (MHz)"];
        let map = resolve_columns(&headers);
        assert_eq!(map.get(Field::TxFrequency), Some(0));
        assert_eq!(map.get(Field::RxFrequency), Some(1));
    }
}
