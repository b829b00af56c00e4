//! Steering cues for a camera-driven wheeled robot.
//!
//! Two independent, stateless components:
//! - [`heading`]: robot heading and signed steering error from tracked
//!   marker positions and a target point.
//! - [`lane_pipeline`]: ROI-masked Canny + probabilistic Hough lane
//!   extraction, composited back onto the camera frame.
//!
//! The remaining modules run and decode the frame classifiers, prepare
//! classifier inputs, draw annotations, and move frames in and out of video sources.

pub mod classification;
pub mod config;
pub mod error;
pub mod heading;
pub mod inference;
pub mod lane_pipeline;
pub mod overlay;
pub mod preprocessing;
pub mod types;
pub mod video_processor;

pub use error::{Result, SteeringError};
pub use heading::{compute_heading, compute_heading_from_points};
pub use lane_pipeline::{LaneDetection, LanePipeline};
pub use types::{HeadingResult, LineSegment, Point2D, Pose};
