// src/lane_pipeline.rs
//
// Classical lane extraction: ROI mask -> Canny -> probabilistic Hough ->
// translucent segment overlay on the original frame.

use crate::config::{LaneConfig, RoiExtent};
use crate::error::{Result, SteeringError};
use crate::types::{LineSegment, RoiPolygon};
use opencv::{
    core::{self, Mat, Point, Scalar, Vec4i, Vector},
    imgproc,
    prelude::*,
};
use tracing::debug;

/// Pixels kept clear between the ROI and the bottom (and right) frame edge.
pub const ROI_BOTTOM_MARGIN: i32 = 10;

/// Segments found in one frame plus the composited output.
pub struct LaneDetection {
    pub segments: Vec<LineSegment>,
    pub composite: Mat,
}

/// Build the lower-half trapezoid ROI for a frame of the given size.
///
/// With [`RoiExtent::Height`] the right edge sits at `height - margin`
/// regardless of width, so on wide frames the ROI stops short of the
/// right border.
pub fn roi_polygon(width: i32, height: i32, extent: RoiExtent) -> RoiPolygon {
    let right = match extent {
        RoiExtent::Height => height - ROI_BOTTOM_MARGIN,
        RoiExtent::Width => width - ROI_BOTTOM_MARGIN,
    };
    let bottom = height - ROI_BOTTOM_MARGIN;
    let middle = height / 2;

    RoiPolygon {
        vertices: [(0, bottom), (0, middle), (right, middle), (right, bottom)],
    }
}

pub struct LanePipeline {
    config: LaneConfig,
}

impl Default for LanePipeline {
    fn default() -> Self {
        Self::new(LaneConfig::default())
    }
}

impl LanePipeline {
    pub fn new(config: LaneConfig) -> Self {
        Self { config }
    }

    /// Overlay detected lane segments on `frame`; output has the same size and type.
    pub fn extract_lanes(&self, frame: &Mat) -> Result<Mat> {
        Ok(self.detect(frame)?.composite)
    }

    pub fn detect(&self, frame: &Mat) -> Result<LaneDetection> {
        validate_frame(frame)?;

        let roi = roi_polygon(frame.cols(), frame.rows(), self.config.roi_extent);

        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let mut edges = Mat::default();
        imgproc::canny(
            &gray,
            &mut edges,
            self.config.canny_low,
            self.config.canny_high,
            3,
            false,
        )?;

        let masked = mask_to_roi(&edges, &roi)?;
        let segments = self.find_segments(&masked)?;

        debug!(
            "Lane pipeline: {}x{} frame, {} segment(s)",
            frame.cols(),
            frame.rows(),
            segments.len()
        );

        let canvas = self.render_segments(frame, &segments)?;

        let mut composite = Mat::default();
        core::add_weighted(
            frame,
            self.config.frame_weight,
            &canvas,
            self.config.overlay_weight,
            self.config.gamma,
            &mut composite,
            -1,
        )?;

        Ok(LaneDetection {
            segments,
            composite,
        })
    }

    fn find_segments(&self, edges: &Mat) -> Result<Vec<LineSegment>> {
        let mut lines = Vector::<Vec4i>::new();
        imgproc::hough_lines_p(
            edges,
            &mut lines,
            self.config.hough_rho,
            self.config.hough_theta_deg.to_radians(),
            self.config.hough_threshold,
            self.config.min_line_length,
            self.config.max_line_gap,
        )?;

        Ok(lines
            .iter()
            .map(|l| LineSegment::new(l[0], l[1], l[2], l[3]))
            .collect())
    }

    /// Draw segments on a black canvas the size of `frame`.
    fn render_segments(&self, frame: &Mat, segments: &[LineSegment]) -> Result<Mat> {
        let mut canvas =
            Mat::new_rows_cols_with_default(frame.rows(), frame.cols(), core::CV_8UC3, Scalar::all(0.0))?;

        if segments.is_empty() {
            return Ok(canvas);
        }

        let [b, g, r] = self.config.line_color;
        let color = Scalar::new(b, g, r, 0.0);

        for segment in segments {
            imgproc::line(
                &mut canvas,
                Point::new(segment.x1, segment.y1),
                Point::new(segment.x2, segment.y2),
                color,
                self.config.line_thickness,
                imgproc::LINE_8,
                0,
            )?;
        }

        Ok(canvas)
    }
}

fn validate_frame(frame: &Mat) -> Result<()> {
    if frame.empty() {
        return Err(SteeringError::InvalidFrame("frame is empty".to_string()));
    }
    if frame.typ() != core::CV_8UC3 {
        return Err(SteeringError::InvalidFrame(format!(
            "expected 8-bit 3-channel frame, got type {} with {} channel(s)",
            frame.typ(),
            frame.channels()
        )));
    }
    Ok(())
}

/// Zero every pixel of `image` outside the ROI polygon.
fn mask_to_roi(image: &Mat, roi: &RoiPolygon) -> Result<Mat> {
    let mut mask = Mat::new_rows_cols_with_default(image.rows(), image.cols(), image.typ(), Scalar::all(0.0))?;

    let polygon: Vector<Point> = roi.vertices.iter().map(|&(x, y)| Point::new(x, y)).collect();
    let polygons: Vector<Vector<Point>> = std::iter::once(polygon).collect();
    imgproc::fill_poly(
        &mut mask,
        &polygons,
        Scalar::all(255.0),
        imgproc::LINE_8,
        0,
        Point::default(),
    )?;

    let mut masked = Mat::default();
    core::bitwise_and(image, &mask, &mut masked, &core::no_array())?;
    Ok(masked)
}
