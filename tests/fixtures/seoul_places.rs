//! Seoul places for realistic test fixtures.
//!
//! Coordinates are approximate street-level positions taken from
//! OpenStreetMap; good enough for proximity ordering and for routing
//! against a South Korea OSRM extract.

use course_planner::course::PlaceRecord;
use course_planner::geo::Coordinate;

/// A named place with coordinates and a free-text category.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub category: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, category: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            category,
            lat,
            lng,
        }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn record(&self, id: i64) -> PlaceRecord {
        PlaceRecord::new(id, self.name, Some(self.category), self.lat, self.lng)
    }
}

// ============================================================================
// Seongsu-dong
// ============================================================================

pub const SEONGSU_CAFES: &[Location] = &[
    Location::new("대림창고", "카페", 37.5418, 127.0565),
    Location::new("어니언 성수", "카페", 37.5447, 127.0583),
    Location::new("블루보틀 성수", "카페", 37.5482, 127.0455),
    Location::new("자그마치", "카페", 37.5427, 127.0546),
];

pub const SEONGSU_DINING: &[Location] = &[
    Location::new("소문난 성수 감자탕", "한식", 37.5445, 127.0560),
    Location::new("성수 족발", "한식", 37.5439, 127.0561),
    Location::new("뚝섬 파스타", "양식", 37.5472, 127.0470),
    Location::new("성수 이자카야", "주점", 37.5428, 127.0585),
];

pub const SEONGSU_OTHER: &[Location] = &[
    Location::new("서울숲", "공원", 37.5444, 127.0374),
    Location::new("성수 갤러리", "전시", 37.5435, 127.0529),
];

// ============================================================================
// Yeonnam-dong (a few km west, useful for driving-mode segments)
// ============================================================================

pub const YEONNAM: &[Location] = &[
    Location::new("연남 커피", "카페", 37.5623, 126.9254),
    Location::new("연남 분식", "분식", 37.5610, 126.9241),
];

/// Seongsu cafes, dining and other places as records with ids from 1.
pub fn seongsu_records() -> Vec<PlaceRecord> {
    SEONGSU_CAFES
        .iter()
        .chain(SEONGSU_DINING)
        .chain(SEONGSU_OTHER)
        .enumerate()
        .map(|(i, location)| location.record(i as i64 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_seoul() {
        for loc in SEONGSU_CAFES.iter().chain(SEONGSU_DINING).chain(SEONGSU_OTHER).chain(YEONNAM) {
            assert!(loc.lat > 37.4 && loc.lat < 37.7, "{} lat: {}", loc.name, loc.lat);
            assert!(loc.lng > 126.8 && loc.lng < 127.2, "{} lng: {}", loc.name, loc.lng);
        }
    }
}
