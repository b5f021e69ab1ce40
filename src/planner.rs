//! Course sequencing (greedy nearest-neighbour with category alternation).
//!
//! The planner starts near the middle of the selection, then alternates
//! between dining and cafe stops, always walking to the closest remaining
//! stop of the wanted class. Whatever cannot be alternated is chained on
//! afterwards by proximity, so the output is always a permutation of the
//! input.

use tracing::debug;

use crate::classify::KeywordClassifier;
use crate::geo::{centroid, squared_distance, Coordinate};
use crate::traits::{CategoryClass, CategoryClassifier, Place};

#[derive(Debug, Clone)]
pub struct SequencePlanner<C = KeywordClassifier> {
    classifier: C,
}

impl SequencePlanner<KeywordClassifier> {
    /// Planner using the default keyword classifier.
    pub fn new() -> Self {
        Self::with_classifier(KeywordClassifier::default())
    }
}

impl Default for SequencePlanner<KeywordClassifier> {
    fn default() -> Self {
        Self::new()
    }
}

struct Stop<'a, P> {
    place: &'a P,
    location: Coordinate,
}

impl<C: CategoryClassifier> SequencePlanner<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Orders `places` into a visiting sequence.
    ///
    /// Never fails. Places without a finite location are kept and appended
    /// at the very end in input order.
    pub fn arrange<'a, P: Place>(&self, places: &'a [P]) -> Vec<&'a P> {
        let mut cafes: Vec<Stop<'a, P>> = Vec::new();
        let mut dining: Vec<Stop<'a, P>> = Vec::new();
        let mut other: Vec<Stop<'a, P>> = Vec::new();
        let mut unlocated: Vec<&'a P> = Vec::new();
        let mut located: Vec<Coordinate> = Vec::with_capacity(places.len());

        for place in places {
            let Some(location) = place.location().filter(Coordinate::is_finite) else {
                unlocated.push(place);
                continue;
            };
            located.push(location);
            let stop = Stop { place, location };
            match self.classifier.classify(place.category(), place.name()) {
                CategoryClass::Cafe => cafes.push(stop),
                CategoryClass::Dining => dining.push(stop),
                CategoryClass::Other => other.push(stop),
            }
        }

        let Some(center) = centroid(&located) else {
            return unlocated;
        };

        let start_class = if !dining.is_empty() {
            CategoryClass::Dining
        } else if !cafes.is_empty() {
            CategoryClass::Cafe
        } else {
            CategoryClass::Other
        };
        let start_pool = match start_class {
            CategoryClass::Dining => &mut dining,
            CategoryClass::Cafe => &mut cafes,
            CategoryClass::Other => &mut other,
        };
        let Some(start_index) = nearest(start_pool, center) else {
            return unlocated;
        };
        let start = start_pool.remove(start_index);

        let mut ordered = Vec::with_capacity(places.len());
        let mut last = start.location;
        ordered.push(start.place);

        // Alternation phase
        let mut want_cafe = start_class == CategoryClass::Dining;
        loop {
            let pool = if want_cafe { &mut cafes } else { &mut dining };
            let Some(index) = nearest(pool, last) else {
                break;
            };
            let stop = pool.remove(index);
            last = stop.location;
            ordered.push(stop.place);
            want_cafe = !want_cafe;
        }
        let alternated = ordered.len();

        // Leftovers: the class we could not alternate into first, then the
        // wanted class, then everything unclassified.
        let (first, second) = if want_cafe {
            (dining, cafes)
        } else {
            (cafes, dining)
        };
        for pool in [first, second, other] {
            chain(pool, &mut last, &mut ordered);
        }
        ordered.extend(unlocated);

        debug!(
            places = places.len(),
            alternated,
            start_class = ?start_class,
            "arranged course"
        );
        ordered
    }
}

/// Index of the stop closest to `anchor`; ties go to the earliest stop.
fn nearest<P>(pool: &[Stop<'_, P>], anchor: Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, stop) in pool.iter().enumerate() {
        let distance = squared_distance(anchor, stop.location);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Drains `pool` by repeated nearest-neighbour hops from `last`.
fn chain<'a, P>(mut pool: Vec<Stop<'a, P>>, last: &mut Coordinate, ordered: &mut Vec<&'a P>) {
    while let Some(index) = nearest(&pool, *last) {
        let stop = pool.remove(index);
        *last = stop.location;
        ordered.push(stop.place);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::PlaceRecord;

    fn ids(ordered: &[&PlaceRecord]) -> Vec<i64> {
        ordered.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_empty_input() {
        let places: Vec<PlaceRecord> = Vec::new();
        assert!(SequencePlanner::new().arrange(&places).is_empty());
    }

    #[test]
    fn test_single_place() {
        let places = vec![PlaceRecord::new(7, "어니언", Some("카페"), 37.54, 127.05)];
        assert_eq!(ids(&SequencePlanner::new().arrange(&places)), vec![7]);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let a = PlaceRecord::new(1, "a", None, 37.5, 127.0);
        let b = PlaceRecord::new(2, "b", None, 37.5, 127.0);
        let pool = vec![
            Stop {
                place: &a,
                location: Coordinate::new(37.5, 127.0),
            },
            Stop {
                place: &b,
                location: Coordinate::new(37.5, 127.0),
            },
        ];
        assert_eq!(nearest(&pool, Coordinate::new(37.6, 127.1)), Some(0));
    }

    #[test]
    fn test_custom_classifier_drives_alternation() {
        let classifier = KeywordClassifier::new(&["tea"], &["ramen"]);
        let planner = SequencePlanner::with_classifier(classifier);
        assert_eq!(planner.classifier().classify(Some("Tea House"), "x"), CategoryClass::Cafe);

        let places = vec![
            PlaceRecord::new(1, "a", Some("tea"), 37.500, 127.000),
            PlaceRecord::new(2, "b", Some("ramen"), 37.501, 127.001),
            PlaceRecord::new(3, "c", Some("카페"), 37.502, 127.002),
        ];
        // "카페" is not a cafe keyword here, so it falls to the end.
        assert_eq!(ids(&planner.arrange(&places)), vec![2, 1, 3]);
    }

    #[test]
    fn test_all_unlocated_keep_input_order() {
        let places = vec![
            PlaceRecord::unlocated(3, "x", Some("카페")),
            PlaceRecord::unlocated(1, "y", Some("한식")),
        ];
        assert_eq!(ids(&SequencePlanner::new().arrange(&places)), vec![3, 1]);
    }

    #[test]
    fn test_leftover_dining_chained_by_proximity() {
        // One cafe, three restaurants in a row heading east.
        let places = vec![
            PlaceRecord::new(1, "far", Some("한식"), 37.500, 127.030),
            PlaceRecord::new(2, "start", Some("한식"), 37.500, 127.010),
            PlaceRecord::new(3, "cafe", Some("카페"), 37.500, 127.012),
            PlaceRecord::new(4, "mid", Some("한식"), 37.500, 127.020),
        ];
        // centroid lng = 127.018 -> nearest dining is 4 (127.020)
        let ordered = SequencePlanner::new().arrange(&places);
        assert_eq!(ids(&ordered), vec![4, 3, 2, 1]);
    }
}
