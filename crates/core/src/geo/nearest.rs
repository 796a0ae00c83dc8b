//! Nearest-location matching over a candidate set.

use crate::geo::distance::distance_km;
use crate::types::{BusinessLocation, Coordinate};

/// The winning candidate and its distance from the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch<'a> {
    pub location: &'a BusinessLocation,
    pub distance_km: f64,
}

/// Find the candidate closest to `point`.
///
/// Linear scan tracking the minimum; ties break to the first-seen
/// candidate so results are deterministic for a fixed input order.
/// Returns `None` when `candidates` is empty.
#[must_use]
pub fn find_nearest<'a>(
    point: Coordinate,
    candidates: &'a [BusinessLocation],
) -> Option<NearestMatch<'a>> {
    let mut best: Option<NearestMatch<'a>> = None;

    for candidate in candidates {
        let d = distance_km(point, candidate.coordinate);
        let closer = best.is_none_or(|current| d < current.distance_km);
        if closer {
            best = Some(NearestMatch {
                location: candidate,
                distance_km: d,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BusinessId;

    fn location(id: &str, latitude: f64, longitude: f64) -> BusinessLocation {
        BusinessLocation {
            id: BusinessId::new(id),
            name: format!("SipClub {id}"),
            coordinate: Coordinate::new(latitude, longitude),
            city: "Seattle".to_owned(),
            state: "WA".to_owned(),
            address: "123 Pike St".to_owned(),
        }
    }

    #[test]
    fn empty_candidates_return_none() {
        let point = Coordinate::new(47.6062, -122.3321);
        assert!(find_nearest(point, &[]).is_none());
    }

    #[test]
    fn picks_the_minimum_distance_candidate() {
        let point = Coordinate::new(47.6062, -122.3321);
        // One degree of latitude is ~111 km; offsets of ~5, ~2, and ~8 km.
        let candidates = vec![
            location("five-km", 47.6512, -122.3321),
            location("two-km", 47.6242, -122.3321),
            location("eight-km", 47.6782, -122.3321),
        ];

        let nearest = find_nearest(point, &candidates).unwrap();
        assert_eq!(nearest.location.id, BusinessId::new("two-km"));
        assert!((nearest.distance_km - 2.0).abs() < 0.1);
    }

    #[test]
    fn ties_break_to_first_seen() {
        let point = Coordinate::new(47.6062, -122.3321);
        let candidates = vec![
            location("first", 47.6242, -122.3321),
            location("duplicate", 47.6242, -122.3321),
        ];

        let nearest = find_nearest(point, &candidates).unwrap();
        assert_eq!(nearest.location.id, BusinessId::new("first"));
    }

    #[test]
    fn single_candidate_wins_regardless_of_distance() {
        let point = Coordinate::new(47.6062, -122.3321);
        let candidates = vec![location("only", 34.0522, -118.2437)];

        let nearest = find_nearest(point, &candidates).unwrap();
        assert_eq!(nearest.location.id, BusinessId::new("only"));
        assert!(nearest.distance_km > 1000.0);
    }
}
