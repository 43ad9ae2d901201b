use crate::models::Location;

/// Earth's radius in miles
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Calculate the Haversine distance between two points in miles
///
/// # Arguments
/// * `from` - First point, degrees
/// * `to` - Second point, degrees
///
/// # Returns
/// Great-circle distance in miles
#[inline]
pub fn haversine_miles(from: &Location, to: &Location) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Straight-line travel estimate in whole minutes (truncated)
///
/// Only for callers filling in a travel-time map; the ranker never calls
/// this and treats a missing travel time as an exclusion.
pub fn estimate_travel_minutes(from: &Location, to: &Location, speed_mph: f64) -> Option<u32> {
    if !from.is_valid() || !to.is_valid() || !speed_mph.is_finite() || speed_mph <= 0.0 {
        return None;
    }

    let minutes = haversine_miles(from, to) / speed_mph * 60.0;
    Some(minutes.clamp(0.0, f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_miles() {
        // London to Paris is roughly 214 miles
        let london = Location { lat: 51.5074, lng: -0.1278 };
        let paris = Location { lat: 48.8566, lng: 2.3522 };

        let distance = haversine_miles(&london, &paris);
        assert!((distance - 214.0).abs() < 6.0, "Distance should be ~214mi, got {}", distance);
    }

    #[test]
    fn test_same_point_is_zero() {
        let here = Location { lat: 37.7749, lng: -122.4194 };
        assert_eq!(haversine_miles(&here, &here), 0.0);
        assert_eq!(estimate_travel_minutes(&here, &here, 25.0), Some(0));
    }

    #[test]
    fn test_estimate_travel_minutes() {
        // ~5 miles apart, 25 mph => ~12 min
        let a = Location { lat: 37.7749, lng: -122.4194 };
        let b = Location { lat: 37.8472, lng: -122.4194 };

        let minutes = estimate_travel_minutes(&a, &b, 25.0).unwrap();
        assert!((11..=12).contains(&minutes), "got {}", minutes);
    }

    #[test]
    fn test_estimate_rejects_bad_input() {
        let a = Location { lat: 37.7749, lng: -122.4194 };
        let bad = Location { lat: 120.0, lng: 0.0 };

        assert_eq!(estimate_travel_minutes(&a, &bad, 25.0), None);
        assert_eq!(estimate_travel_minutes(&a, &a, 0.0), None);
    }
}
