//! Core domain traits for the course planner.
//!
//! These are intentionally minimal. Concrete apps should implement them for
//! their own place models and routing backends.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::DirectionsError;
use crate::geo::Coordinate;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A place that can appear as a stop in a course.
pub trait Place {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Display name. Also consulted when classifying.
    fn name(&self) -> &str;

    /// Free-text category, e.g. "카페" or "한식".
    fn category(&self) -> Option<&str>;

    /// Location, if the place has one. Non-finite coordinates are treated
    /// the same as a missing location.
    fn location(&self) -> Option<Coordinate>;
}

/// Coarse category used to alternate stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryClass {
    Cafe,
    Dining,
    Other,
}

/// Maps a place's category and name to a [`CategoryClass`].
///
/// Implementations must be pure: the same input always yields the same class.
pub trait CategoryClassifier {
    fn classify(&self, category: Option<&str>, name: &str) -> CategoryClass;
}

/// Routing mode for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Driving,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
        }
    }

    /// The mode tried when this one fails.
    pub fn other(self) -> Self {
        match self {
            TravelMode::Walking => TravelMode::Driving,
            TravelMode::Driving => TravelMode::Walking,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful answer from a directions backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsResponse {
    /// Routed geometry, in travel order.
    Route(Vec<Coordinate>),
    /// The backend declined to route. `reason` is backend-specific; a reason
    /// containing `TOO_CLOSE` means the endpoints are too close together.
    Fallback { reason: String },
}

/// External directions service.
///
/// One call per segment and mode. Transport failures, timeouts and
/// malformed bodies are reported as errors; an explicit refusal is a
/// [`DirectionsResponse::Fallback`].
pub trait DirectionsProvider {
    fn directions(
        &self,
        from: Coordinate,
        to: Coordinate,
        mode: TravelMode,
    ) -> Result<DirectionsResponse, DirectionsError>;
}

/// Persistence boundary for the near-fallback notice.
///
/// Lets a caller keep the notice from reappearing across reloads of the
/// same session.
pub trait NoticeStore {
    fn is_shown(&self, session_key: &str) -> bool;

    fn mark_shown(&self, session_key: &str);
}
