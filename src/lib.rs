//! course-planner core
//!
//! Orders a set of places into a walkable course and resolves the route
//! between consecutive stops, degrading to straight lines when no route
//! is available.

pub mod traits;
pub mod geo;
pub mod classify;
pub mod planner;
pub mod polyline;
pub mod cache;
pub mod notice;
pub mod resolver;
pub mod course;
pub mod error;
pub mod directions;
pub mod osrm;
pub mod osrm_data;
