use crate::constants::*;
use crate::station::Location;

/// Determines the distance in km between here and there on the great circle.
/// Both locations are in decimal degrees.
pub fn great_circle_distance(here: Location, there: Location) -> f64 {
    let (here_lat, here_lng) = (here.lat * D2R, here.lng * D2R);
    let (there_lat, there_lng) = (there.lat * D2R, there.lng * D2R);

    2.0 * R0
        * f64::asin(f64::sqrt(
            f64::powi(f64::sin((here_lat - there_lat) / 2.0), 2)
                + f64::cos(here_lat)
                    * f64::cos(there_lat)
                    * f64::powi(f64::sin((here_lng - there_lng) / 2.0), 2),
        ))
}

/// Location `km` due north of `here` (negative goes south).
pub fn offset_north(here: Location, km: f64) -> Location {
    Location {
        lat: here.lat + km / R0 / D2R,
        lng: here.lng,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_distance_to_self() {
        let hanoi = Location::new(21.0285, 105.8542);
        assert_eq!(great_circle_distance(hanoi, hanoi), 0.0);
    }

    #[test]
    fn symmetric() {
        let hanoi = Location::new(21.0285, 105.8542);
        let hcm = Location::new(10.8231, 106.6297);
        assert_relative_eq!(
            great_circle_distance(hanoi, hcm),
            great_circle_distance(hcm, hanoi),
            epsilon = 1e-9
        );
    }

    #[test]
    fn hanoi_to_ho_chi_minh_city() {
        let hanoi = Location::new(21.0285, 105.8542);
        let hcm = Location::new(10.8231, 106.6297);
        // ~1137 km on the sphere
        assert_relative_eq!(great_circle_distance(hanoi, hcm), 1137.0, max_relative = 0.01);
    }

    #[test]
    fn meridian_offset_matches_requested_distance() {
        let here = Location::new(16.0, 108.0);
        for km in [0.5, 5.0, 40.0, -12.0] {
            let there = offset_north(here, km);
            assert_relative_eq!(great_circle_distance(here, there), km.abs(), max_relative = 1e-9);
        }
    }
}
