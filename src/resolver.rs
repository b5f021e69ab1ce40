//! Route resolution between consecutive waypoints.
//!
//! Each segment is tried in its primary mode, then the other mode, and
//! finally drawn as a straight line. Successful lookups are cached per
//! `(mode, endpoints)`. Segments of one path are resolved in parallel and
//! stitched back together in waypoint order.

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cache::{cache_key, RouteCache};
use crate::geo::{haversine_m, Coordinate};
use crate::notice::NearFallbackNotice;
use crate::polyline::Polyline;
use crate::traits::{DirectionsProvider, DirectionsResponse, TravelMode};

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Routed paths longer than this are downsampled before caching. Values
    /// below two act as two.
    pub max_path_points: usize,
    /// Above this straight-line distance, auto mode routes by car first.
    pub driving_threshold_m: f64,
    /// Substring of a fallback reason meaning "endpoints too close".
    pub too_close_marker: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_path_points: 200,
            driving_threshold_m: 1500.0,
            too_close_marker: "TOO_CLOSE".to_string(),
        }
    }
}

/// Where a segment's path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSource {
    Routed,
    Cached,
    StraightLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Mode that produced the path. For straight lines, the primary mode.
    pub mode: TravelMode,
    pub path: Polyline,
    pub source: SegmentSource,
}

impl RouteSegment {
    pub fn used_fallback(&self) -> bool {
        self.source == SegmentSource::StraightLine
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    /// All segments stitched into one continuous path.
    pub path: Polyline,
    pub segments: Vec<RouteSegment>,
    /// True if any segment is a straight-line fallback.
    pub used_fallback: bool,
    /// True if this build moved the near-fallback notice to `Shown`; the
    /// caller should display it now.
    pub notice_triggered: bool,
}

struct Resolution {
    segment: RouteSegment,
    /// The near-fallback notice should fire for this segment.
    wants_notice: bool,
}

pub struct RouteResolver<D> {
    provider: D,
    options: ResolverOptions,
    cache: RouteCache,
    notice: NearFallbackNotice,
    generation: AtomicU64,
}

impl<D: std::fmt::Debug> std::fmt::Debug for RouteResolver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteResolver")
            .field("provider", &self.provider)
            .field("options", &self.options)
            .field("cached_segments", &self.cache.len())
            .field("notice", &self.notice)
            .finish()
    }
}

impl<D: DirectionsProvider + Sync> RouteResolver<D> {
    pub fn new(provider: D) -> Self {
        Self::with_options(provider, ResolverOptions::default())
    }

    pub fn with_options(provider: D, options: ResolverOptions) -> Self {
        Self {
            provider,
            options,
            cache: RouteCache::new(),
            notice: NearFallbackNotice::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces the session notice, e.g. with one backed by a `NoticeStore`.
    pub fn with_notice(mut self, notice: NearFallbackNotice) -> Self {
        self.notice = notice;
        self
    }

    pub fn provider(&self) -> &D {
        &self.provider
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub fn notice(&self) -> &NearFallbackNotice {
        &self.notice
    }

    /// Primary mode for a segment when the caller does not force one.
    pub fn select_mode(&self, from: Coordinate, to: Coordinate) -> TravelMode {
        if haversine_m(from, to) > self.options.driving_threshold_m {
            TravelMode::Driving
        } else {
            TravelMode::Walking
        }
    }

    /// Resolves a single segment. Always yields a path of at least two points.
    pub fn resolve_segment(
        &self,
        from: Coordinate,
        to: Coordinate,
        primary: TravelMode,
    ) -> RouteSegment {
        let resolution = self.resolve(from, to, primary, None);
        if resolution.wants_notice {
            self.notice.trigger();
        }
        resolution.segment
    }

    /// Supersedes any build still in flight; its result will be discarded.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Resolves and stitches the route through `waypoints` in order.
    ///
    /// `mode` forces the primary mode for every segment; `None` picks it per
    /// segment by distance. Non-finite waypoints are skipped. Returns `None`
    /// only if a newer build (or [`invalidate`](Self::invalidate)) started
    /// before this one finished.
    pub fn build_path(
        &self,
        waypoints: &[Coordinate],
        mode: Option<TravelMode>,
    ) -> Option<RoutePath> {
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let waypoints: Vec<Coordinate> = waypoints
            .iter()
            .copied()
            .filter(Coordinate::is_finite)
            .collect();

        if waypoints.len() < 2 {
            return Some(RoutePath {
                path: Polyline::new(waypoints),
                segments: Vec::new(),
                used_fallback: false,
                notice_triggered: false,
            });
        }

        // Indexed collect keeps waypoint order whatever order requests finish in.
        let resolutions: Vec<Resolution> = waypoints
            .par_windows(2)
            .map(|pair| {
                let (from, to) = (pair[0], pair[1]);
                let primary = mode.unwrap_or_else(|| self.select_mode(from, to));
                self.resolve(from, to, primary, Some(ticket))
            })
            .collect();

        if self.is_superseded(ticket) {
            debug!(ticket, "discarding superseded route build");
            return None;
        }

        // Only a build the caller will see may spend the one-shot notice.
        let notice_triggered =
            resolutions.iter().any(|r| r.wants_notice) && self.notice.trigger();
        let segments: Vec<RouteSegment> = resolutions.into_iter().map(|r| r.segment).collect();
        let used_fallback = segments.iter().any(RouteSegment::used_fallback);
        let path = Polyline::stitch(segments.iter().map(|s| &s.path));

        debug!(
            segments = segments.len(),
            points = path.len(),
            used_fallback,
            "built route path"
        );
        Some(RoutePath {
            path,
            segments,
            used_fallback,
            notice_triggered,
        })
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::Acquire) != ticket
    }

    fn resolve(
        &self,
        from: Coordinate,
        to: Coordinate,
        primary: TravelMode,
        ticket: Option<u64>,
    ) -> Resolution {
        let mut wants_notice = false;

        for mode in [primary, primary.other()] {
            let key = cache_key(mode, from, to);
            if let Some(path) = self.cache.get(&key) {
                debug!(key = %key, "route cache hit");
                return Resolution {
                    segment: RouteSegment {
                        from,
                        to,
                        mode,
                        path,
                        source: SegmentSource::Cached,
                    },
                    wants_notice,
                };
            }

            if ticket.is_some_and(|t| self.is_superseded(t)) {
                // Result is discarded anyway; skip the network and the notice.
                return Resolution {
                    segment: straight_segment(from, to, primary),
                    wants_notice: false,
                };
            }

            match self.provider.directions(from, to, mode) {
                Ok(DirectionsResponse::Route(points)) if points.len() >= 2 => {
                    let path = Polyline::new(points).downsample(self.options.max_path_points);
                    debug!(key = %key, points = path.len(), "route resolved");
                    self.cache.insert(key, path.clone());
                    return Resolution {
                        segment: RouteSegment {
                            from,
                            to,
                            mode,
                            path,
                            source: SegmentSource::Routed,
                        },
                        wants_notice,
                    };
                }
                Ok(DirectionsResponse::Route(points)) => {
                    warn!(
                        mode = %mode,
                        points = points.len(),
                        "directions returned no usable path"
                    );
                }
                Ok(DirectionsResponse::Fallback { reason }) => {
                    debug!(mode = %mode, reason = %reason, "directions declined to route");
                    if reason.contains(self.options.too_close_marker.as_str()) {
                        wants_notice = true;
                    }
                }
                Err(err) => {
                    warn!(mode = %mode, error = %err, "directions request failed");
                }
            }
        }

        warn!(
            from = ?from,
            to = ?to,
            "no route in either mode, drawing straight line"
        );
        Resolution {
            segment: straight_segment(from, to, primary),
            wants_notice: true,
        }
    }
}

fn straight_segment(from: Coordinate, to: Coordinate, mode: TravelMode) -> RouteSegment {
    RouteSegment {
        from,
        to,
        mode,
        path: Polyline::straight(from, to),
        source: SegmentSource::StraightLine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectionsError;

    struct Unreachable;

    impl DirectionsProvider for Unreachable {
        fn directions(
            &self,
            _from: Coordinate,
            _to: Coordinate,
            _mode: TravelMode,
        ) -> Result<DirectionsResponse, DirectionsError> {
            Err(DirectionsError::Timeout)
        }
    }

    struct LongRoute;

    impl DirectionsProvider for LongRoute {
        fn directions(
            &self,
            from: Coordinate,
            to: Coordinate,
            _mode: TravelMode,
        ) -> Result<DirectionsResponse, DirectionsError> {
            let n = 1000;
            let points = (0..=n)
                .map(|i| {
                    if i == n {
                        return to;
                    }
                    let t = i as f64 / n as f64;
                    Coordinate::new(
                        from.latitude + (to.latitude - from.latitude) * t,
                        from.longitude + (to.longitude - from.longitude) * t,
                    )
                })
                .collect();
            Ok(DirectionsResponse::Route(points))
        }
    }

    #[test]
    fn test_select_mode_threshold() {
        let resolver = RouteResolver::new(Unreachable);
        let origin = Coordinate::new(37.5, 127.0);
        // ~1.1 km north
        let near = Coordinate::new(37.51, 127.0);
        assert_eq!(resolver.select_mode(origin, near), TravelMode::Walking);
        // ~2.2 km north
        let far = Coordinate::new(37.52, 127.0);
        assert_eq!(resolver.select_mode(origin, far), TravelMode::Driving);
    }

    #[test]
    fn test_unreachable_falls_back_to_straight_line() {
        let resolver = RouteResolver::new(Unreachable);
        let a = Coordinate::new(37.5, 127.0);
        let b = Coordinate::new(37.51, 127.01);
        let segment = resolver.resolve_segment(a, b, TravelMode::Walking);
        assert_eq!(segment.source, SegmentSource::StraightLine);
        assert_eq!(segment.path.points(), &[a, b]);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_long_route_downsampled_before_caching() {
        let resolver = RouteResolver::new(LongRoute);
        let a = Coordinate::new(37.5, 127.0);
        let b = Coordinate::new(37.51, 127.01);
        let segment = resolver.resolve_segment(a, b, TravelMode::Walking);
        assert_eq!(segment.path.len(), 200);
        assert_eq!(segment.path.points()[0], a);
        assert_eq!(segment.path.points()[199], b);
        let cached = resolver
            .cache()
            .get(&cache_key(TravelMode::Walking, a, b))
            .expect("cached");
        assert_eq!(cached.len(), 200);
    }

    #[test]
    fn test_short_input_has_no_segments() {
        let resolver = RouteResolver::new(Unreachable);
        let single = resolver
            .build_path(&[Coordinate::new(37.5, 127.0)], None)
            .expect("current build");
        assert_eq!(single.path.len(), 1);
        assert!(single.segments.is_empty());
        assert!(!single.used_fallback);

        let empty = resolver.build_path(&[], None).expect("current build");
        assert!(empty.path.is_empty());
    }
}
