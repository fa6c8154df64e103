//! Docking scene scenario.
//!
//! Lays out a docking platform and a wheelchair in a world frame, simulates
//! what the wheelchair's depth sensor would report for the platform's POI
//! and surface normal, carries that reading back into the wheelchair frame
//! through the [`SensorMount`], and solves the turning manoeuvre.
//!
//! Frame tree:
//!
//! ```text
//! world ─┬─ platform ─┬─ platform_cp
//!        │            └─ platform_poi
//!        └─ wheel_chair ── sensor_mount ── sensor
//! ```
//!
//! The POI is derived in the wheelchair frame two ways (direct transform of
//! the POI, and centre point + normal · offset); the two must agree.

use dockalign_types::{DockingError, RollPitchYaw};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::frame_tree::FrameTree;
use crate::mount::{DockingTarget, SensorMount};
use crate::transform::Transform3D;
use crate::turning::{TurningAngles, TurningSolver};

pub const PLATFORM: &str = "platform";
pub const PLATFORM_CP: &str = "platform_cp";
pub const PLATFORM_POI: &str = "platform_poi";
pub const WHEEL_CHAIR: &str = "wheel_chair";
pub const SENSOR_MOUNT: &str = "sensor_mount";
pub const SENSOR: &str = "sensor";

/// World layout of the docking scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Distance from the platform centre point to the POI, along the
    /// platform's outward normal (metres).
    pub poi_offset: f64,
    pub platform_position: Vector3<f64>,
    /// Platform centre point, in the platform frame.
    pub platform_cp_offset: Vector3<f64>,
    pub wheel_chair_position: Vector3<f64>,
    pub platform_rotation: RollPitchYaw,
    pub wheel_chair_rotation: RollPitchYaw,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            poi_offset: 0.5,
            platform_position: Vector3::new(0.0, 2.0, 0.0),
            platform_cp_offset: Vector3::new(0.0, -0.5, 0.125),
            wheel_chair_position: Vector3::new(1.0, -1.0, 0.0),
            platform_rotation: RollPitchYaw::default(),
            wheel_chair_rotation: RollPitchYaw::yaw(10.0),
        }
    }
}

/// Everything computed for one run of the scenario.
#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub poi_world: Point3<f64>,
    pub wheel_chair_world: Point3<f64>,
    pub sensor_world: Point3<f64>,
    /// Simulated sensor reading (POI and outward normal, sensor frame).
    pub sensor_measurement: DockingTarget,
    /// The reading carried into the wheelchair frame; `poi` is the
    /// centre-point + normal · offset derivation.
    pub wheel_chair_target: DockingTarget,
    /// Distance between the two wheelchair-frame POI derivations.
    pub derivation_gap: f64,
    pub angles: TurningAngles,
}

/// A built scene: the frame tree plus the configuration it came from.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    mount: SensorMount,
    tree: FrameTree,
}

impl Scene {
    pub fn build(config: &SceneConfig, mount: &SensorMount) -> Result<Self, DockingError> {
        let mut tree = FrameTree::new();

        tree.add_frame(
            PLATFORM,
            None,
            Transform3D::from_rpy(config.platform_position, config.platform_rotation),
        )?;
        tree.add_frame(
            PLATFORM_CP,
            Some(PLATFORM),
            Transform3D::from_translation(config.platform_cp_offset),
        )?;
        tree.add_frame(
            PLATFORM_POI,
            Some(PLATFORM),
            Transform3D::from_translation(
                config.platform_cp_offset + Vector3::new(0.0, -config.poi_offset, 0.0),
            ),
        )?;

        tree.add_frame(
            WHEEL_CHAIR,
            None,
            Transform3D::from_rpy(config.wheel_chair_position, config.wheel_chair_rotation),
        )?;
        tree.add_frame(SENSOR_MOUNT, Some(WHEEL_CHAIR), mount.chair_from_mount())?;
        tree.add_frame(SENSOR, Some(SENSOR_MOUNT), mount.mount_from_sensor()?)?;

        Ok(Self {
            config: config.clone(),
            mount: mount.clone(),
            tree,
        })
    }

    pub fn tree(&self) -> &FrameTree {
        &self.tree
    }

    /// World position of a frame's origin.
    pub fn world_position(&self, frame: &str) -> Result<Point3<f64>, DockingError> {
        Ok(self.tree.world_transform(frame)?.transform_point(&Point3::origin()))
    }

    /// Outward surface normal of the platform (its −Y axis) in the world.
    pub fn platform_normal_world(&self) -> Result<Vector3<f64>, DockingError> {
        Ok(self
            .tree
            .world_transform(PLATFORM)?
            .rotate_direction(&Vector3::new(0.0, -1.0, 0.0)))
    }

    /// What the depth sensor reports for the platform: the centre point and
    /// the POI (both as points) plus the outward normal, in the sensor frame.
    pub fn simulate_measurement(&self) -> Result<(Point3<f64>, DockingTarget), DockingError> {
        let sensor_from_world = self.tree.world_transform(SENSOR)?.inverse()?;
        let cp = sensor_from_world.transform_point(&self.world_position(PLATFORM_CP)?);
        let poi = sensor_from_world.transform_point(&self.world_position(PLATFORM_POI)?);
        let normal = sensor_from_world.rotate_direction(&self.platform_normal_world()?);
        Ok((cp, DockingTarget::new(poi, normal)))
    }

    /// Run the full pipeline: simulate, transform into the wheelchair
    /// frame, cross-check the POI, solve.
    pub fn analyze(&self, solver: &TurningSolver, tolerance: f64) -> Result<SceneReport, DockingError> {
        let (cp_sensor, measurement) = self.simulate_measurement()?;

        let chair_from_sensor = self.mount.sensor_to_platform()?;
        let cp_chair = chair_from_sensor.transform_point(&cp_sensor);
        let normal_chair = chair_from_sensor.rotate_direction(&measurement.normal);
        let poi_direct = chair_from_sensor.transform_point(&measurement.poi);
        let poi_derived = cp_chair + normal_chair * self.config.poi_offset;

        let derivation_gap = (poi_direct - poi_derived).norm();
        if derivation_gap.is_nan() || tolerance.is_nan() || derivation_gap > tolerance {
            return Err(DockingError::InconsistentDerivation {
                gap: derivation_gap,
                tolerance,
            });
        }

        let poi_world = self.world_position(PLATFORM_POI)?;
        info!(poi = ?poi_world, "platform POI in world frame");
        info!(poi = ?measurement.poi, "platform POI in sensor frame");
        info!(poi = ?poi_derived, "platform POI in wheel chair frame");
        info!(normal = ?normal_chair, "platform normal in wheel chair frame");

        let angles = solver.solve(poi_derived, normal_chair)?;
        info!(
            first_turn = angles.first_turn,
            distance = angles.distance,
            second_turn = angles.second_turn,
            "turn procedure computed"
        );

        Ok(SceneReport {
            poi_world,
            wheel_chair_world: self.world_position(WHEEL_CHAIR)?,
            sensor_world: self.world_position(SENSOR)?,
            sensor_measurement: measurement,
            wheel_chair_target: DockingTarget::new(poi_derived, normal_chair),
            derivation_gap,
            angles,
        })
    }
}
