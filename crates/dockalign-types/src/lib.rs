use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Orientation expressed as roll/pitch/yaw in **degrees**.
///
/// Convention: extrinsic rotations about the fixed X, then Y, then Z axes,
/// i.e. `R = Rz(yaw) · Ry(pitch) · Rx(roll)`.  Positive angles rotate
/// counter-clockwise when looking down the axis toward the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RollPitchYaw {
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
}

impl RollPitchYaw {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Pure rotation about the vertical axis.
    pub fn yaw(yaw: f64) -> Self {
        Self::new(0.0, 0.0, yaw)
    }

    /// Pure rotation about the lateral axis.
    pub fn pitch(pitch: f64) -> Self {
        Self::new(0.0, pitch, 0.0)
    }
}

/// One discrete motion of the docking manoeuvre.
///
/// A full manoeuvre is always `Turn`, `Drive`, `Turn`: face the target,
/// drive onto it, then square up with the docking surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum ManeuverStep {
    /// Rotate in place; positive is counter-clockwise (left).
    Turn { degrees: f64 },
    /// Drive straight ahead along the current heading.
    Drive { distance: f64 },
}

/// Errors raised by the frame pipeline and the turning-angle solver.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DockingError {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Transform is singular and cannot be inverted")]
    SingularTransform,

    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    #[error("Unknown frame: {0}")]
    UnknownFrame(String),

    #[error("Frame already registered: {0}")]
    DuplicateFrame(String),

    #[error("POI derivations disagree by {gap:.6} (tolerance {tolerance:.6})")]
    InconsistentDerivation { gap: f64, tolerance: f64 },
}
