//! Exact great-circle check against each candidate's radius.

use drange_core::geo::haversine_km;
use drange_core::Candidate;

/// Ids of the candidates whose delivery radius reaches `(lat, long)`, in
/// input order.
#[must_use]
pub fn within_delivery_radius(candidates: Vec<Candidate>, lat: f64, long: f64) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|c| haversine_km(lat, long, c.lat, c.long) <= c.radius)
        .map(|c| c.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, lat: f64, long: f64, radius: f64) -> Candidate {
        Candidate {
            id: id.to_owned(),
            lat,
            long,
            radius,
        }
    }

    #[test]
    fn keeps_candidates_within_their_own_radius() {
        // (50.05, 8.67) -> (50.06, 8.68) is roughly 1.33 km.
        let ids = within_delivery_radius(
            vec![
                candidate("wide", 50.05, 8.67, 6.0),
                candidate("tight", 50.05, 8.67, 1.0),
                candidate("edge", 50.06, 8.68, 0.0),
            ],
            50.06,
            8.68,
        );
        assert_eq!(ids, ["wide", "edge"]);
    }

    #[test]
    fn preserves_input_order() {
        let ids = within_delivery_radius(
            vec![
                candidate("b", 10.0, 10.0, 1.0),
                candidate("a", 10.0, 10.0, 1.0),
            ],
            10.0,
            10.0,
        );
        assert_eq!(ids, ["b", "a"]);
    }
}
