//! Session-scoped cache of resolved segment paths.
//!
//! Keys are derived from the mode and both endpoints, so a changed
//! waypoint set only misses on the segments that actually changed. Entries
//! are never evicted; concurrent inserts of the same key carry the same
//! value, so last write wins.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::geo::Coordinate;
use crate::polyline::Polyline;
use crate::traits::TravelMode;

/// `"{mode}:{lng1},{lat1};{lng2},{lat2}"`
pub fn cache_key(mode: TravelMode, from: Coordinate, to: Coordinate) -> String {
    format!("{}:{}", mode, coordinate_pair(from, to))
}

/// `"{lng1},{lat1};{lng2},{lat2}"`, the coordinate string sent to the
/// directions service.
pub fn coordinate_pair(from: Coordinate, to: Coordinate) -> String {
    format!(
        "{:.6},{:.6};{:.6},{:.6}",
        from.longitude, from.latitude, to.longitude, to.latitude
    )
}

#[derive(Debug, Default)]
pub struct RouteCache {
    entries: Mutex<HashMap<String, Polyline>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Polyline> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, path: Polyline) {
        self.lock().insert(key, path);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Values are pure functions of their key, so a poisoned map is still valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Polyline>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let key = cache_key(
            TravelMode::Walking,
            Coordinate::new(37.5, 127.0),
            Coordinate::new(37.501, 127.001),
        );
        assert_eq!(key, "walking:127.000000,37.500000;127.001000,37.501000");
    }

    #[test]
    fn test_cache_key_depends_on_mode_and_direction() {
        let a = Coordinate::new(37.5, 127.0);
        let b = Coordinate::new(37.6, 127.1);
        assert_ne!(cache_key(TravelMode::Walking, a, b), cache_key(TravelMode::Driving, a, b));
        assert_ne!(cache_key(TravelMode::Walking, a, b), cache_key(TravelMode::Walking, b, a));
    }

    #[test]
    fn test_insert_and_get() {
        let cache = RouteCache::new();
        assert!(cache.is_empty());
        let path = Polyline::straight(Coordinate::new(37.5, 127.0), Coordinate::new(37.6, 127.1));
        cache.insert("k".to_string(), path.clone());
        cache.insert("k".to_string(), path.clone());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), Some(path));
        assert_eq!(cache.get("missing"), None);
    }
}
