//! Homogeneous frame transforms.
//!
//! A [`Transform3D`] is a 4×4 homogeneous matrix that maps coordinates
//! expressed in a child frame into its parent frame.  Points receive the full
//! affine map (rotation + translation); directions such as surface normals
//! receive the rotation only.
//!
//! Rotations given as [`RollPitchYaw`] use the extrinsic X-Y-Z convention,
//! `R = Rz(yaw) · Ry(pitch) · Rx(roll)`, with angles in degrees.
//!
//! # Example
//!
//! ```rust
//! use dockalign_perception::transform::{transform_point, Transform3D};
//! use dockalign_types::RollPitchYaw;
//! use nalgebra::{Point3, Vector3};
//!
//! // wheel_chair sits 1 m along world +X, turned 90° to the left.
//! let world_from_chair = Transform3D::from_rpy(Vector3::new(1.0, 0.0, 0.0), RollPitchYaw::yaw(90.0));
//!
//! // A point 1 m ahead of the chair along its local +X ...
//! let p = transform_point(Point3::new(1.0, 0.0, 0.0), &world_from_chair);
//!
//! // ... is at (1, 1, 0) in the world.
//! assert!((p.x - 1.0).abs() < 1e-9);
//! assert!((p.y - 1.0).abs() < 1e-9);
//! ```

use dockalign_types::{DockingError, RollPitchYaw};
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};

// ────────────────────────────────────────────────────────────────────────────
// Rotation helpers
// ────────────────────────────────────────────────────────────────────────────

/// Convert roll/pitch/yaw (degrees) into a rotation.
pub fn rpy_to_rotation(rpy: RollPitchYaw) -> Rotation3<f64> {
    Rotation3::from_euler_angles(
        rpy.roll.to_radians(),
        rpy.pitch.to_radians(),
        rpy.yaw.to_radians(),
    )
}

/// Recover roll/pitch/yaw (degrees) from a rotation.
///
/// Pitch is returned in `[-90, 90]`; at gimbal lock roll and yaw are not
/// unique and only their combination is meaningful.
pub fn rpy_from_rotation(rotation: &Rotation3<f64>) -> RollPitchYaw {
    let (roll, pitch, yaw) = rotation.euler_angles();
    RollPitchYaw::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

/// Build a rotation from a row-major 3×3 array, checking that it is a proper
/// rotation (orthonormal, determinant +1) within `tolerance`.
pub fn rotation_from_rows(rows: [[f64; 3]; 3], tolerance: f64) -> Result<Rotation3<f64>, DockingError> {
    #[rustfmt::skip]
    let m = Matrix3::new(
        rows[0][0], rows[0][1], rows[0][2],
        rows[1][0], rows[1][1], rows[1][2],
        rows[2][0], rows[2][1], rows[2][2],
    );
    if m.iter().any(|v| !v.is_finite()) {
        return Err(DockingError::InvalidRotation("matrix has non-finite entries".to_string()));
    }
    let orthogonality = (m * m.transpose() - Matrix3::identity()).amax();
    if orthogonality > tolerance {
        return Err(DockingError::InvalidRotation(format!(
            "matrix is not orthonormal (max deviation {orthogonality:.3e})"
        )));
    }
    let det = m.determinant();
    if (det - 1.0).abs() > tolerance {
        return Err(DockingError::InvalidRotation(format!(
            "determinant is {det:.6}, expected 1"
        )));
    }
    Ok(Rotation3::from_matrix_unchecked(m))
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3D
// ────────────────────────────────────────────────────────────────────────────

/// A homogeneous 4×4 transform.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by the upper-left 3×3 block
/// then add the translation column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    matrix: Matrix4<f64>,
}

impl Transform3D {
    /// Wrap an arbitrary homogeneous matrix.  Nothing is validated; a matrix
    /// whose last row is not `[0, 0, 0, 1]` is treated as affine anyway.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Create a transform from a translation and rotation.
    pub fn from_parts(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Self {
        let mut matrix = rotation.to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { matrix }
    }

    /// Create a transform from a translation and roll/pitch/yaw in degrees.
    pub fn from_rpy(translation: Vector3<f64>, rpy: RollPitchYaw) -> Self {
        Self::from_parts(translation, rpy_to_rotation(rpy))
    }

    /// Pure translation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::from_parts(translation, Rotation3::identity())
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Upper-left 3×3 block.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Translation column.
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Compose two transforms: `self · other`.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// The transform mapping the parent frame back into the child frame.
    pub fn inverse(&self) -> Result<Self, DockingError> {
        self.matrix
            .try_inverse()
            .map(Self::from_matrix)
            .ok_or(DockingError::SingularTransform)
    }

    /// Apply the full affine map to a point.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation_matrix() * point.coords + self.translation())
    }

    /// Apply only the rotation block to a direction.
    pub fn rotate_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_matrix() * direction
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Map `point` from the transform's child frame into its parent frame.
pub fn transform_point(point: Point3<f64>, transform: &Transform3D) -> Point3<f64> {
    transform.transform_point(&point)
}

/// Map `direction` from the transform's child frame into its parent frame,
/// ignoring translation.
pub fn rotate_direction(direction: Vector3<f64>, transform: &Transform3D) -> Vector3<f64> {
    transform.rotate_direction(&direction)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
