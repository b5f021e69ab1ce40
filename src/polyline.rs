//! Polyline representation for route geometries.
//!
//! Paths are kept as decoded coordinate sequences; wire formats
//! (`[lng, lat]` pairs, encoded polylines) are handled at the boundary.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_m, Coordinate};

/// A route geometry as an ordered list of coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Two-point path used when no route could be resolved.
    pub fn straight(from: Coordinate, to: Coordinate) -> Self {
        Self::new(vec![from, to])
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points as `[lng, lat]` pairs, the order map SDKs expect.
    pub fn to_lng_lat(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lng_lat()).collect()
    }

    /// Great-circle length of the path in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| haversine_m(pair[0], pair[1]))
            .sum()
    }

    /// Reduces the path to at most `max_points` by uniform stride sampling.
    ///
    /// The first and last points are always kept exactly, so a limit below
    /// two is raised to two.
    pub fn downsample(self, max_points: usize) -> Self {
        let max_points = max_points.max(2);
        let len = self.points.len();
        if len <= max_points {
            return self;
        }

        let stride = (len - 1) as f64 / (max_points - 1) as f64;
        let points = (0..max_points)
            .map(|i| {
                let index = ((i as f64) * stride).round() as usize;
                self.points[index.min(len - 1)]
            })
            .collect();
        Self { points }
    }

    /// Concatenates per-segment paths into one continuous path.
    ///
    /// The first point of every segment after the first is dropped, since
    /// it repeats the previous segment's last point.
    pub fn stitch<'a>(segments: impl IntoIterator<Item = &'a Polyline>) -> Self {
        let mut points: Vec<Coordinate> = Vec::new();
        for (i, segment) in segments.into_iter().enumerate() {
            let skip = if i == 0 { 0 } else { 1 };
            points.extend(segment.points.iter().skip(skip).copied());
        }
        Self { points }
    }
}
