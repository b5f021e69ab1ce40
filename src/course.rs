//! End-to-end course planning: places in, ordered stops and a drawable
//! route out.

use serde::{Deserialize, Serialize};

use crate::classify::KeywordClassifier;
use crate::geo::{Bounds, Coordinate};
use crate::planner::SequencePlanner;
use crate::resolver::{RoutePath, RouteResolver};
use crate::traits::{CategoryClassifier, DirectionsProvider, Place, TravelMode};

/// A place as served by the place API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl PlaceRecord {
    pub fn new(id: i64, name: &str, category: Option<&str>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: category.map(str::to_string),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn unlocated(id: i64, name: &str, category: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: category.map(str::to_string),
            latitude: None,
            longitude: None,
        }
    }
}

impl Place for PlaceRecord {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }
}

/// Output for the map layer.
#[derive(Debug, Clone)]
pub struct CoursePlan<'a, P> {
    /// Stops with a usable location, in visiting order.
    pub stops: Vec<&'a P>,
    /// Places passed through without a location, in input order.
    pub unlocated: Vec<&'a P>,
    pub route: RoutePath,
    /// Area covering every stop and the route, for `fitBounds`.
    pub bounds: Option<Bounds>,
}

impl<P> CoursePlan<'_, P> {
    pub fn length_m(&self) -> f64 {
        self.route.path.length_m()
    }
}

#[derive(Debug)]
pub struct CoursePlanner<D, C = KeywordClassifier> {
    planner: SequencePlanner<C>,
    resolver: RouteResolver<D>,
}

impl<D: DirectionsProvider + Sync> CoursePlanner<D, KeywordClassifier> {
    pub fn new(provider: D) -> Self {
        Self::with_parts(SequencePlanner::new(), RouteResolver::new(provider))
    }
}

impl<D: DirectionsProvider + Sync, C: CategoryClassifier> CoursePlanner<D, C> {
    pub fn with_parts(planner: SequencePlanner<C>, resolver: RouteResolver<D>) -> Self {
        Self { planner, resolver }
    }

    pub fn resolver(&self) -> &RouteResolver<D> {
        &self.resolver
    }

    /// Orders `places` and routes through them.
    ///
    /// `None` means a newer plan superseded this one before it finished.
    pub fn plan<'a, P: Place>(
        &self,
        places: &'a [P],
        mode: Option<TravelMode>,
    ) -> Option<CoursePlan<'a, P>> {
        let (stops, unlocated): (Vec<&'a P>, Vec<&'a P>) = self
            .planner
            .arrange(places)
            .into_iter()
            .partition(|place| place.location().is_some_and(|c| c.is_finite()));

        let waypoints: Vec<Coordinate> =
            stops.iter().filter_map(|place| place.location()).collect();
        let route = self.resolver.build_path(&waypoints, mode)?;
        let bounds = Bounds::from_points(waypoints.iter().chain(route.path.points()));

        Some(CoursePlan {
            stops,
            unlocated,
            route,
            bounds,
        })
    }
}
