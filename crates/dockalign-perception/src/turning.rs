//! Turning-Angle Solver.
//!
//! Given a docking target expressed in the wheelchair frame (forward = +Y,
//! origin = wheelchair centre, z = height), compute the "turn, drive, turn"
//! manoeuvre that brings the wheelchair onto the POI squared up against the
//! docking surface:
//!
//! ```text
//! alpha       = ∠(forward, poi_xy)
//! beta        = ∠(forward, −normal_xy)
//! first_turn  = alpha
//! second_turn = beta − alpha
//! ```
//!
//! Angles are in degrees, counter-clockwise positive, and are left
//! unwrapped (`alpha` lies in `(-270, 90]`).  Use [`TurningAngles::wrapped`]
//! for the shortest equivalent turns.
//!
//! Signed zeros are folded to `+0.0` before `atan2`, so a vector pointing
//! straight along −X always reads as +180° rather than −180°.
//!
//! # Example
//!
//! ```rust
//! use dockalign_perception::turning::compute_turning_angles;
//! use nalgebra::{Point3, Vector3};
//!
//! // Target 1 m to the right, surface facing back toward the chair.
//! let angles = compute_turning_angles(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
//! assert!((angles.first_turn + 90.0).abs() < 1e-9);
//! assert!((angles.distance - 1.0).abs() < 1e-9);
//! assert!((angles.second_turn - 90.0).abs() < 1e-9);
//! ```

use dockalign_types::{DockingError, ManeuverStep};
use nalgebra::{Point2, Point3, Rotation2, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default threshold below which a horizontal projection counts as zero.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// The wheelchair's forward axis in its own frame.
pub fn forward_axis() -> Vector2<f64> {
    Vector2::new(0.0, 1.0)
}

/// Signed angle in degrees from `from` to `to`, counter-clockwise positive.
///
/// Computed as a difference of two `atan2` values, so the result is not
/// wrapped and lies in `(-360, 360)`.
pub fn angle_between_2d(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    (to.y.atan2(to.x) - from.y.atan2(from.x)).to_degrees()
}

/// Replace `-0.0` components with `+0.0`.  Negating a normal such as
/// `(1, 0)` yields `(-1, -0.0)`, for which `atan2` returns −180°.
fn canonical_zeros(v: Vector2<f64>) -> Vector2<f64> {
    v + Vector2::zeros()
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Result of the turning-angle solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningAngles {
    /// Angle from forward to the POI direction (degrees).
    pub alpha: f64,
    /// Angle from forward to the inverted surface normal (degrees).
    pub beta: f64,
    /// Horizontal distance from the wheelchair to the POI (metres).
    pub distance: f64,
    /// First in-place turn (degrees, CCW positive).
    pub first_turn: f64,
    /// Second in-place turn, after driving `distance` (degrees).
    pub second_turn: f64,
    /// Unit vector from the wheelchair toward the POI, horizontal plane.
    pub poi_direction_unit: Vector2<f64>,
    /// Horizontal projection of the inverted surface normal.  Unit length
    /// only if the supplied normal was unit length and horizontal.
    pub inverted_normal: Vector2<f64>,
}

/// Planar pose reached after executing a manoeuvre from the wheelchair
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPose {
    pub position: Point2<f64>,
    /// Unit heading vector.
    pub heading: Vector2<f64>,
}

impl PlanarPose {
    /// Wheelchair origin facing forward.
    pub fn origin() -> Self {
        Self {
            position: Point2::origin(),
            heading: forward_axis(),
        }
    }

    /// Apply one manoeuvre step.
    pub fn apply(self, step: &ManeuverStep) -> Self {
        match *step {
            ManeuverStep::Turn { degrees } => Self {
                position: self.position,
                heading: Rotation2::new(degrees.to_radians()) * self.heading,
            },
            ManeuverStep::Drive { distance } => Self {
                position: self.position + self.heading * distance,
                heading: self.heading,
            },
        }
    }
}

impl TurningAngles {
    /// The same manoeuvre with every angle wrapped into `(-180, 180]`.
    pub fn wrapped(&self) -> Self {
        Self {
            alpha: wrap_degrees(self.alpha),
            beta: wrap_degrees(self.beta),
            first_turn: wrap_degrees(self.first_turn),
            second_turn: wrap_degrees(self.second_turn),
            ..*self
        }
    }

    /// Expand into the discrete steps: turn, drive, turn.
    pub fn plan(&self) -> Vec<ManeuverStep> {
        vec![
            ManeuverStep::Turn {
                degrees: self.first_turn,
            },
            ManeuverStep::Drive {
                distance: self.distance,
            },
            ManeuverStep::Turn {
                degrees: self.second_turn,
            },
        ]
    }

    /// Dead-reckon the plan from the wheelchair origin.
    pub fn simulate(&self) -> PlanarPose {
        self.plan()
            .iter()
            .fold(PlanarPose::origin(), |pose, step| pose.apply(step))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TurningSolver
// ────────────────────────────────────────────────────────────────────────────

/// Turning-angle solver with a configurable degeneracy threshold.
#[derive(Debug, Clone, Copy)]
pub struct TurningSolver {
    epsilon: f64,
}

impl Default for TurningSolver {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl TurningSolver {
    /// `epsilon` is the minimum horizontal length accepted for the POI
    /// offset and for the surface normal.  Negative values are treated as 0.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.max(0.0),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Solve for the manoeuvre.
    ///
    /// `poi_position` and `surface_normal` are in the wheelchair frame.  The
    /// normal points away from the docking surface toward the wheelchair and
    /// is assumed to be unit length; its height component is dropped.
    pub fn solve(
        &self,
        poi_position: Point3<f64>,
        surface_normal: Vector3<f64>,
    ) -> Result<TurningAngles, DockingError> {
        if poi_position.iter().chain(surface_normal.iter()).any(|v| !v.is_finite()) {
            return Err(DockingError::DegenerateGeometry(
                "inputs contain non-finite components".to_string(),
            ));
        }

        let poi_2d = canonical_zeros(poi_position.coords.xy());
        let distance = poi_2d.x.hypot(poi_2d.y);
        if !distance.is_finite() {
            return Err(DockingError::DegenerateGeometry(
                "POI horizontal distance overflows".to_string(),
            ));
        }
        if distance <= self.epsilon {
            return Err(DockingError::DegenerateGeometry(format!(
                "POI horizontal distance {distance:.3e} is below {:.3e}",
                self.epsilon
            )));
        }
        let poi_direction_unit = poi_2d / distance;

        let inverted_normal = canonical_zeros(-surface_normal.xy());
        if inverted_normal.x.hypot(inverted_normal.y) <= self.epsilon {
            return Err(DockingError::DegenerateGeometry(
                "surface normal has no horizontal component".to_string(),
            ));
        }

        let forward = forward_axis();
        let alpha = angle_between_2d(&forward, &poi_direction_unit);
        let beta = angle_between_2d(&forward, &inverted_normal);
        let first_turn = alpha;
        let second_turn = -alpha + beta;

        debug!(alpha, beta, "turning angles solved");
        debug!(first_turn, distance, second_turn, "turn procedure");

        Ok(TurningAngles {
            alpha,
            beta,
            distance,
            first_turn,
            second_turn,
            poi_direction_unit,
            inverted_normal,
        })
    }
}

/// Solve with [`DEFAULT_EPSILON`].
pub fn compute_turning_angles(
    poi_position: Point3<f64>,
    surface_normal: Vector3<f64>,
) -> Result<TurningAngles, DockingError> {
    TurningSolver::default().solve(poi_position, surface_normal)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(poi: [f64; 3], normal: [f64; 3]) -> TurningAngles {
        compute_turning_angles(Point3::from(poi), Vector3::from(normal)).unwrap()
    }

    /// Executing the plan must end on the POI projection facing along the
    /// inverted normal.
    fn assert_plan_docks(angles: &TurningAngles, poi: [f64; 3]) {
        let pose = angles.simulate();
        assert!(
            (pose.position - Point2::new(poi[0], poi[1])).norm() < 1e-9,
            "ended at {:?}",
            pose.position
        );
        let target = angles.inverted_normal.normalize();
        assert!(pose.heading.perp(&target).abs() < 1e-9, "heading {:?}", pose.heading);
        assert!(pose.heading.dot(&target) > 0.0);
    }

    #[test]
    fn target_straight_ahead_needs_no_turns() {
        let a = solve([0.0, 1.0, 0.0], [0.0, -1.0, 0.0]);
        assert!(a.alpha.abs() < 1e-12);
        assert!(a.beta.abs() < 1e-12);
        assert!(a.first_turn.abs() < 1e-12);
        assert!(a.second_turn.abs() < 1e-12);
        assert!((a.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn target_to_the_right_turns_clockwise() {
        let a = solve([1.0, 0.0, 0.0], [0.0, -1.0, 0.0]);
        assert!((a.alpha + 90.0).abs() < 1e-9, "alpha={}", a.alpha);
        assert!((a.distance - 1.0).abs() < 1e-12);
        assert!((a.second_turn - 90.0).abs() < 1e-9);
        assert_plan_docks(&a, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn target_to_the_left_turns_counter_clockwise() {
        let a = solve([-2.0, 0.0, 0.3], [1.0, 0.0, 0.0]);
        assert!((a.alpha - 90.0).abs() < 1e-9);
        assert!((a.beta - 90.0).abs() < 1e-9);
        assert!(a.second_turn.abs() < 1e-9);
        assert!((a.distance - 2.0).abs() < 1e-12);
        assert_eq!(a.inverted_normal.y.to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn negative_zero_components_read_as_positive() {
        let a = solve([-1.0, -0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!((a.alpha - 90.0).abs() < 1e-9, "alpha={}", a.alpha);
        let b = solve([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!((b.beta - 90.0).abs() < 1e-9, "beta={}", b.beta);
        assert!(b.second_turn.abs() < 1e-9);
        assert_plan_docks(&b, [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn far_target_keeps_direction() {
        let a = solve([0.0, 1e200, 0.0], [0.0, -1.0, 0.0]);
        assert!(a.alpha.abs() < 1e-12, "alpha={}", a.alpha);
        assert!((a.distance - 1e200).abs() <= 1e185);
        assert!((a.poi_direction_unit - Vector2::new(0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn overflowing_distance_is_degenerate() {
        let err = compute_turning_angles(Point3::new(f64::MAX, f64::MAX, 0.0), Vector3::new(0.0, -1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, DockingError::DegenerateGeometry(_)));
    }

    #[test]
    fn height_is_ignored_for_distance() {
        let a = solve([3.0, 4.0, 12.0], [0.0, -1.0, 0.0]);
        assert!((a.distance - 5.0).abs() < 1e-12);
        assert!((a.poi_direction_unit.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn plan_docks_for_assorted_targets() {
        let cases = [
            ([0.5, 2.0, 0.1], [0.2, -0.98, 0.0]),
            ([-1.2, 0.7, 0.0], [0.6, -0.8, 0.0]),
            ([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0]),
            ([2.0, -0.5, 0.4], [-1.0, 0.0, 0.0]),
        ];
        for (poi, normal) in cases {
            let a = solve(poi, normal);
            assert_plan_docks(&a, poi);
            assert_plan_docks(&a.wrapped(), poi);
        }
    }

    #[test]
    fn alpha_is_left_unwrapped() {
        // Behind and to the right: atan2 difference gives -225 rather than 135.
        let a = solve([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((a.alpha + 225.0).abs() < 1e-9, "alpha={}", a.alpha);
        let w = a.wrapped();
        assert!((w.first_turn - 135.0).abs() < 1e-9);
        assert!(w.second_turn > -180.0 && w.second_turn <= 180.0);
    }

    #[test]
    fn sloped_normal_uses_horizontal_projection() {
        let level = solve([0.5, 1.0, 0.0], [0.6, -0.8, 0.0]);
        let tilt = 0.3f64;
        let sloped = solve(
            [0.5, 1.0, 0.0],
            [0.6 * tilt.cos(), -0.8 * tilt.cos(), tilt.sin()],
        );
        assert!((level.beta - sloped.beta).abs() < 1e-9);
        assert!(sloped.inverted_normal.norm() < 1.0);
    }

    #[test]
    fn plan_has_turn_drive_turn_shape() {
        let a = solve([1.0, 1.0, 0.0], [0.0, -1.0, 0.0]);
        let plan = a.plan();
        assert_eq!(plan.len(), 3);
        assert!(matches!(plan[0], ManeuverStep::Turn { .. }));
        assert!(matches!(plan[1], ManeuverStep::Drive { distance } if (distance - 2f64.sqrt()).abs() < 1e-12));
        assert!(matches!(plan[2], ManeuverStep::Turn { .. }));
    }

    #[test]
    fn poi_at_origin_is_degenerate() {
        let err = compute_turning_angles(Point3::new(0.0, 0.0, 1.5), Vector3::new(0.0, -1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, DockingError::DegenerateGeometry(_)));
    }

    #[test]
    fn vertical_normal_is_degenerate() {
        let err = compute_turning_angles(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, DockingError::DegenerateGeometry(_)));
    }

    #[test]
    fn non_finite_input_is_degenerate() {
        let err = compute_turning_angles(Point3::new(f64::NAN, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, DockingError::DegenerateGeometry(_)));
    }

    #[test]
    fn custom_epsilon_rejects_near_targets() {
        let solver = TurningSolver::new(0.05);
        assert!(solver.solve(Point3::new(0.01, 0.01, 0.0), Vector3::new(0.0, -1.0, 0.0)).is_err());
        assert!(solver.solve(Point3::new(0.1, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).is_ok());
        assert_eq!(TurningSolver::new(-1.0).epsilon(), 0.0);
    }

    #[test]
    fn wrap_degrees_range() {
        assert!((wrap_degrees(180.0) - 180.0).abs() < 1e-12);
        assert!((wrap_degrees(-180.0) - 180.0).abs() < 1e-12);
        assert!((wrap_degrees(270.0) + 90.0).abs() < 1e-12);
        assert!((wrap_degrees(-225.0) - 135.0).abs() < 1e-12);
        assert!(wrap_degrees(0.0).abs() < 1e-12);
    }

    #[test]
    fn angles_serialize_to_json() {
        let a = solve([1.0, 0.0, 0.0], [0.0, -1.0, 0.0]);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"first_turn\""));
        let back: TurningAngles = serde_json::from_str(&json).unwrap();
        assert!((back.alpha - a.alpha).abs() < 1e-12);
        assert!((back.inverted_normal - a.inverted_normal).norm() < 1e-12);
    }
}
