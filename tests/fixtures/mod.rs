//! Test fixtures for course-planner.
//!
//! Provides realistic test data:
//! - Places around Seongsu-dong and Yeonnam-dong, Seoul
//! - Builders for place records

#![allow(dead_code)]

pub mod seoul_places;

pub use seoul_places::*;
