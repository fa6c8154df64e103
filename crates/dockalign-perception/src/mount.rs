//! Sensor mount geometry.
//!
//! The depth sensor sits on a mount fixed to the wheelchair.  Measurements
//! arrive in the sensor frame (optical axis = +Z, image down = +Y) and are
//! carried into the wheelchair frame by two fixed transforms:
//!
//! ```text
//! T_chair_sensor = T(mount_position, mount_rotation) · T(sensor_position, sensor_rotation)
//! ```

use dockalign_types::{DockingError, RollPitchYaw};
use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::{Transform3D, rotation_from_rows};

/// Tolerance used when checking that `sensor_rotation` is a proper rotation.
const ROTATION_TOLERANCE: f64 = 1e-6;

/// Position and surface normal of a docking target, expressed in whichever
/// frame the caller is working in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockingTarget {
    pub poi: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl DockingTarget {
    pub fn new(poi: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { poi, normal }
    }

    /// Re-express this target through `transform` (POI as a point, normal as
    /// a direction).
    pub fn transformed(&self, transform: &Transform3D) -> Self {
        Self {
            poi: transform.transform_point(&self.poi),
            normal: transform.rotate_direction(&self.normal),
        }
    }
}

/// Fixed geometry of the sensor mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorMount {
    /// Mount origin, offset from the wheelchair centre (metres).
    pub mount_position: Vector3<f64>,
    /// Sensor origin, offset from the mount origin (metres).
    pub sensor_position: Vector3<f64>,
    /// Row-major rotation mapping sensor axes into the mount frame.
    pub sensor_rotation: [[f64; 3]; 3],
    /// Mount orientation relative to the wheelchair frame.
    pub mount_rotation: RollPitchYaw,
}

impl Default for SensorMount {
    fn default() -> Self {
        Self {
            mount_position: Vector3::new(0.25, 0.25, 0.7),
            sensor_position: Vector3::new(0.0, 0.025, 0.025),
            // sensor +Z (optical axis) -> mount +Y, sensor +Y -> mount -Z
            sensor_rotation: [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]],
            mount_rotation: RollPitchYaw::pitch(-15.0),
        }
    }
}

impl SensorMount {
    /// Check that `sensor_rotation` is a proper rotation matrix.
    pub fn validate(&self) -> Result<(), DockingError> {
        self.sensor_rotation().map(|_| ())
    }

    pub fn sensor_rotation(&self) -> Result<Rotation3<f64>, DockingError> {
        rotation_from_rows(self.sensor_rotation, ROTATION_TOLERANCE)
    }

    /// Transform from the mount frame into the wheelchair frame.
    pub fn chair_from_mount(&self) -> Transform3D {
        Transform3D::from_rpy(self.mount_position, self.mount_rotation)
    }

    /// Transform from the sensor frame into the mount frame.
    pub fn mount_from_sensor(&self) -> Result<Transform3D, DockingError> {
        Ok(Transform3D::from_parts(self.sensor_position, self.sensor_rotation()?))
    }

    /// Transform from the sensor frame into the wheelchair frame.
    pub fn sensor_to_platform(&self) -> Result<Transform3D, DockingError> {
        Ok(self.chair_from_mount().compose(self.mount_from_sensor()?))
    }

    /// Carry a sensor-frame measurement into the wheelchair frame.
    pub fn to_platform(&self, measurement: &DockingTarget) -> Result<DockingTarget, DockingError> {
        Ok(measurement.transformed(&self.sensor_to_platform()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform_point;

    #[test]
    fn default_mount_is_valid() {
        assert!(SensorMount::default().validate().is_ok());
    }

    #[test]
    fn invalid_sensor_rotation_is_rejected() {
        let mount = SensorMount {
            sensor_rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            ..SensorMount::default()
        };
        assert!(matches!(mount.validate(), Err(DockingError::InvalidRotation(_))));
        assert!(mount.sensor_to_platform().is_err());
    }

    #[test]
    fn optical_axis_points_forward_on_level_mount() {
        let mount = SensorMount {
            mount_rotation: RollPitchYaw::default(),
            ..SensorMount::default()
        };
        let t = mount.sensor_to_platform().unwrap();
        let forward = t.rotate_direction(&Vector3::new(0.0, 0.0, 1.0));
        assert!((forward - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        let down = t.rotate_direction(&Vector3::new(0.0, 1.0, 0.0));
        assert!((down - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn sensor_origin_lands_at_mount_offsets() {
        let mount = SensorMount {
            mount_rotation: RollPitchYaw::default(),
            ..SensorMount::default()
        };
        let t = mount.sensor_to_platform().unwrap();
        let origin = transform_point(Point3::origin(), &t);
        assert!((origin - Point3::new(0.25, 0.275, 0.725)).norm() < 1e-12);
    }

    #[test]
    fn composed_chain_matches_stepwise_chain() {
        let mount = SensorMount::default();
        let p = Point3::new(-0.4, 0.1, 2.2);

        let once = transform_point(p, &mount.sensor_to_platform().unwrap());
        let in_mount = transform_point(p, &mount.mount_from_sensor().unwrap());
        let stepwise = transform_point(in_mount, &mount.chair_from_mount());
        assert!((once - stepwise).norm() < 1e-9);
    }

    #[test]
    fn to_platform_rotates_normal_without_translation() {
        let mount = SensorMount::default();
        let measurement = DockingTarget::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let on_chair = mount.to_platform(&measurement).unwrap();
        assert!((on_chair.normal.norm() - 1.0).abs() < 1e-12);

        let rotation = mount.sensor_to_platform().unwrap().rotation_matrix();
        assert!((on_chair.normal - rotation * measurement.normal).norm() < 1e-12);
    }

    #[test]
    fn mount_deserializes_from_partial_json() {
        let mount: SensorMount =
            serde_json::from_str(r#"{"mount_position": [0.0, 0.3, 0.9]}"#).unwrap();
        assert!((mount.mount_position.z - 0.9).abs() < 1e-12);
        assert_eq!(mount.mount_rotation, RollPitchYaw::pitch(-15.0));
    }
}
