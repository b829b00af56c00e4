// src/types.rs

use crate::error::{Result, SteeringError};
use serde::{Deserialize, Serialize};

/// Number of landmarks a pose tracker reports per frame.
pub const POSE_LANDMARKS: usize = 5;

/// Index of the leading heading marker ("g").
pub const MARKER_G: usize = 1;
/// Index of the trailing heading marker ("b").
pub const MARKER_B: usize = 2;
/// Index of the geometric center used for target bearing.
pub const CENTER: usize = 4;

/// Point in image coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`
    pub fn delta(&self, other: &Point2D) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

impl std::str::FromStr for Point2D {
    type Err = SteeringError;

    /// Parses `"x,y"`.
    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| SteeringError::InvalidInput(format!("expected 'x,y', got '{}'", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| SteeringError::InvalidInput(format!("bad coordinate '{}': {}", v, e)))
        };
        Ok(Point2D::new(parse(x)?, parse(y)?))
    }
}

/// Landmarks reported by the pose tracker for one frame.
///
/// Slots 0 and 3 are reserved and never read here. A pose always holds at
/// least [`POSE_LANDMARKS`] points, so the accessors cannot go out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    points: Vec<Point2D>,
}

impl Pose {
    pub fn from_points(points: &[Point2D]) -> Result<Self> {
        if points.len() < POSE_LANDMARKS {
            return Err(SteeringError::InvalidInput(format!(
                "pose requires {} landmarks, got {}",
                POSE_LANDMARKS,
                points.len()
            )));
        }
        Ok(Self {
            points: points.to_vec(),
        })
    }

    pub fn marker_g(&self) -> Point2D {
        self.points[MARKER_G]
    }

    pub fn marker_b(&self) -> Point2D {
        self.points[MARKER_B]
    }

    pub fn center(&self) -> Point2D {
        self.points[CENTER]
    }
}

/// Output of one heading computation. Both angles are signed degrees in (-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadingResult {
    /// Steering error: positive means turn clockwise in image coordinates
    pub shortest_angle: f64,
    /// Corrected heading of the robot (opposite of `raw_heading`)
    pub heading: f64,
    /// Heading as resolved from the marker pair, before correction
    pub raw_heading: f64,
    /// Bearing from the pose center to the target
    pub target_bearing: f64,
}

/// Line segment in frame pixel coordinates, as produced by the line detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f64 {
        let dx = (self.x2 - self.x1) as f64;
        let dy = (self.y2 - self.y1) as f64;
        dx.hypot(dy)
    }

    /// Undirected angle of the segment in degrees, in [0, 180).
    /// 0 is horizontal, 90 is vertical.
    pub fn angle_degrees(&self) -> f64 {
        let dx = (self.x2 - self.x1) as f64;
        let dy = (self.y2 - self.y1) as f64;
        dy.atan2(dx).to_degrees().rem_euclid(180.0)
    }
}

/// Four-vertex region of interest, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiPolygon {
    pub vertices: [(i32, i32); 4],
}
