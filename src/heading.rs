// src/heading.rs
//
// Heading and target bearing from tracked marker positions.
//
// Angles are compass-style in image coordinates (y grows downward):
// 0 = up, +90 = right, 180 = down, -90 = left.

use crate::error::Result;
use crate::types::{HeadingResult, Point2D, Pose};
use tracing::debug;

/// Sign quadrant of a difference vector `(dx, dy)`.
///
/// Axis-aligned vectors match more than one quadrant; classification takes
/// the first match in the order the variants are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// dx = 0 and dy = 0
    Degenerate,
    /// dx >= 0, dy <= 0
    UpRight,
    /// dx >= 0, dy >= 0
    DownRight,
    /// dx <= 0, dy >= 0
    DownLeft,
    /// dx <= 0, dy <= 0 (also absorbs NaN components)
    UpLeft,
}

impl Quadrant {
    pub fn classify(dx: f64, dy: f64) -> Self {
        if dx == 0.0 && dy == 0.0 {
            Quadrant::Degenerate
        } else if dx >= 0.0 && dy <= 0.0 {
            Quadrant::UpRight
        } else if dx >= 0.0 && dy >= 0.0 {
            Quadrant::DownRight
        } else if dx <= 0.0 && dy >= 0.0 {
            Quadrant::DownLeft
        } else {
            Quadrant::UpLeft
        }
    }

    /// Angle in degrees for a vector already known to lie in this quadrant.
    fn degrees(self, dx: f64, dy: f64) -> f64 {
        match self {
            Quadrant::Degenerate => 0.0,
            Quadrant::UpRight => dy.atan2(dx).to_degrees() - 90.0,
            Quadrant::DownRight => -dx.atan2(dy).to_degrees(),
            Quadrant::DownLeft | Quadrant::UpLeft => dx.atan2(-dy).to_degrees() + 180.0,
        }
    }
}

/// Resolve a difference vector to a signed angle in degrees.
///
/// The result is the compass direction of `(-dx, -dy)`, i.e. the direction
/// pointing from the first operand of the difference back to the second.
/// A zero vector resolves to 0.
pub fn resolve_quadrant(dx: f64, dy: f64) -> f64 {
    let degs = Quadrant::classify(dx, dy).degrees(dx, dy);
    if degs > 180.0 {
        degs - 360.0
    } else {
        degs
    }
}

/// Wrap an angle difference into (-180, 180].
pub fn wrap_signed(angle: f64) -> f64 {
    if angle > 180.0 {
        angle - 360.0
    } else if angle <= -180.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Opposite direction of `heading`, kept in (-180, 180].
fn opposite(heading: f64) -> f64 {
    if heading > 0.0 {
        heading - 180.0
    } else {
        heading + 180.0
    }
}

/// Compute the robot heading and the signed steering error towards `target`.
pub fn compute_heading(pose: &Pose, target: Point2D) -> HeadingResult {
    let (gx, gy) = pose.marker_g().delta(&pose.marker_b());
    let raw_heading = resolve_quadrant(gx, gy);
    let heading = opposite(raw_heading);

    let center = pose.center();
    let (cx, cy) = center.delta(&target);
    let target_bearing = resolve_quadrant(cx, cy);

    let shortest_angle = wrap_signed(target_bearing - heading);

    debug!(
        "heading={:.1}° bearing={:.1}° steer={:+.1}°",
        heading, target_bearing, shortest_angle
    );

    HeadingResult {
        shortest_angle,
        heading,
        raw_heading,
        target_bearing,
    }
}

/// Same as [`compute_heading`], validating a raw landmark list first.
pub fn compute_heading_from_points(points: &[Point2D], target: Point2D) -> Result<HeadingResult> {
    let pose = Pose::from_points(points)?;
    Ok(compute_heading(&pose, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SteeringError;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};

    fn pose(g: (f64, f64), b: (f64, f64), center: (f64, f64)) -> Pose {
        let points = [
            Point2D::default(),
            Point2D::new(g.0, g.1),
            Point2D::new(b.0, b.1),
            Point2D::default(),
            Point2D::new(center.0, center.1),
        ];
        Pose::from_points(&points).unwrap()
    }

    fn angular_distance(a: f64, b: f64) -> f64 {
        wrap_signed((a - b).rem_euclid(360.0)).abs()
    }

    #[test]
    fn test_robot_facing_up_target_right() {
        let p = pose((100.0, 50.0), (100.0, 150.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(200.0, 100.0));

        assert_abs_diff_eq!(result.raw_heading, -180.0);
        assert_abs_diff_eq!(result.heading, 0.0);
        assert_abs_diff_eq!(result.target_bearing, 90.0);
        assert_abs_diff_eq!(result.shortest_angle, 90.0);
    }

    #[test]
    fn test_robot_facing_up_target_left() {
        let p = pose((100.0, 50.0), (100.0, 150.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(0.0, 100.0));
        assert_abs_diff_eq!(result.target_bearing, -90.0);
        assert_abs_diff_eq!(result.shortest_angle, -90.0);
    }

    #[test]
    fn test_robot_facing_right_target_ahead() {
        let p = pose((150.0, 100.0), (50.0, 100.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(300.0, 100.0));
        assert_abs_diff_eq!(result.heading, 90.0);
        assert_abs_diff_eq!(result.shortest_angle, 0.0);
    }

    #[test]
    fn test_target_behind_wraps_to_positive_half_turn() {
        // Facing up, target straight down
        let p = pose((100.0, 50.0), (100.0, 150.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(100.0, 300.0));
        assert_abs_diff_eq!(result.shortest_angle, 180.0);
    }

    #[test]
    fn test_resolve_quadrant_compass_directions() {
        // Vector (dx, dy) resolves to the compass direction of (-dx, -dy)
        assert_abs_diff_eq!(resolve_quadrant(0.0, 10.0), 0.0);
        assert_abs_diff_eq!(resolve_quadrant(-10.0, 0.0), 90.0);
        assert_abs_diff_eq!(resolve_quadrant(0.0, -10.0), -180.0);
        assert_abs_diff_eq!(resolve_quadrant(10.0, 0.0), -90.0);
        assert_abs_diff_eq!(resolve_quadrant(-10.0, 10.0), 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(resolve_quadrant(-10.0, -10.0), 135.0, epsilon = 1e-9);
        assert_abs_diff_eq!(resolve_quadrant(10.0, -10.0), -135.0, epsilon = 1e-9);
        assert_abs_diff_eq!(resolve_quadrant(10.0, 10.0), -45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_axis_tie_break_order() {
        assert_eq!(Quadrant::classify(0.0, -1.0), Quadrant::UpRight);
        assert_eq!(Quadrant::classify(1.0, 0.0), Quadrant::UpRight);
        assert_eq!(Quadrant::classify(0.0, 1.0), Quadrant::DownRight);
        assert_eq!(Quadrant::classify(-1.0, 0.0), Quadrant::DownLeft);
        assert_eq!(Quadrant::classify(-1.0, -1.0), Quadrant::UpLeft);
        assert_eq!(Quadrant::classify(0.0, 0.0), Quadrant::Degenerate);
    }

    #[test]
    fn test_coincident_markers_give_zero_heading() {
        let p = pose((80.0, 80.0), (80.0, 80.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(100.0, 0.0));
        assert_eq!(result.raw_heading, 0.0);
        assert_abs_diff_eq!(result.heading, 180.0);
        assert!(result.shortest_angle.is_finite());
    }

    #[test]
    fn test_target_on_center_gives_zero_bearing() {
        let p = pose((100.0, 50.0), (100.0, 150.0), (100.0, 100.0));
        let result = compute_heading(&p, Point2D::new(100.0, 100.0));
        assert_eq!(result.target_bearing, 0.0);
    }

    #[test]
    fn test_short_pose_is_rejected() {
        let points = vec![Point2D::new(1.0, 1.0); 3];
        let err = compute_heading_from_points(&points, Point2D::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, SteeringError::InvalidInput(_)));
    }

    #[test]
    fn test_angle_ranges_hold_for_random_inputs() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..5000 {
            let mut coord = || (rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0));
            let p = pose(coord(), coord(), coord());
            let (tx, ty) = coord();
            let result = compute_heading(&p, Point2D::new(tx, ty));

            assert!(result.shortest_angle > -180.0 && result.shortest_angle <= 180.0);
            assert!(result.heading > -180.0 && result.heading <= 180.0);
            assert!(result.target_bearing >= -180.0 && result.target_bearing <= 180.0);
            assert_abs_diff_eq!((result.heading - result.raw_heading).abs(), 180.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_axis_aligned_inputs_stay_in_range() {
        let values = [-2.0, -0.0, 0.0, 2.0];
        for &gx in &values {
            for &gy in &values {
                for &tx in &values {
                    for &ty in &values {
                        let p = pose((gx, gy), (0.0, 0.0), (0.0, 0.0));
                        let result = compute_heading(&p, Point2D::new(tx, ty));
                        assert!(result.shortest_angle > -180.0 && result.shortest_angle <= 180.0);
                        assert!(result.heading > -180.0 && result.heading <= 180.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_translating_target_and_center_keeps_steering() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let mut coord = || (rng.gen_range(-300.0..300.0), rng.gen_range(-300.0..300.0));
            let (g, b, c, t, o) = (coord(), coord(), coord(), coord(), coord());
            let before = compute_heading(&pose(g, b, c), Point2D::new(t.0, t.1));
            let shifted = pose(g, b, (c.0 + o.0, c.1 + o.1));
            let after = compute_heading(&shifted, Point2D::new(t.0 + o.0, t.1 + o.1));

            assert!(angular_distance(before.shortest_angle, after.shortest_angle) < 1e-6);
        }
    }

    #[test]
    fn test_rotating_target_and_center_shifts_steering_by_rotation() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(23);
        for _ in 0..1000 {
            let mut coord = || (rng.gen_range(-300.0..300.0), rng.gen_range(-300.0..300.0));
            let (g, b, c, t, origin) = (coord(), coord(), coord(), coord(), coord());
            let theta: f64 = rng.gen_range(-170.0..170.0);

            let rotate = |p: (f64, f64)| {
                let (s, cs) = theta.to_radians().sin_cos();
                let (x, y) = (p.0 - origin.0, p.1 - origin.1);
                (origin.0 + x * cs - y * s, origin.1 + x * s + y * cs)
            };

            // Skip near-coincident target/center where the bearing is unstable
            if (c.0 - t.0).hypot(c.1 - t.1) < 1.0 {
                continue;
            }

            let before = compute_heading(&pose(g, b, c), Point2D::new(t.0, t.1));
            let (rt, rc) = (rotate(t), rotate(c));
            let after = compute_heading(&pose(g, b, rc), Point2D::new(rt.0, rt.1));

            let delta = after.shortest_angle - before.shortest_angle;
            assert!(angular_distance(delta, theta) < 1e-6);
            assert!(before.shortest_angle > -180.0 && after.shortest_angle <= 180.0);
        }
    }
}
