//! `dockalign-perception` – docking geometry.
//!
//! Carries a docking target measured by the wheelchair's depth sensor into
//! the wheelchair's own frame and works out how to drive onto it.
//!
//! # Modules
//!
//! - [`transform`] – [`Transform3D`][transform::Transform3D]: homogeneous
//!   4×4 transforms, point/direction mapping and roll/pitch/yaw conversion.
//! - [`frame_tree`] – [`FrameTree`][frame_tree::FrameTree]: named frames
//!   with parent links; resolves world transforms root-to-leaf.
//! - [`mount`] – [`SensorMount`][mount::SensorMount]: fixed sensor → mount
//!   → wheelchair chain.
//! - [`turning`] – [`TurningSolver`][turning::TurningSolver]: the
//!   turn/drive/turn manoeuvre that squares the wheelchair up with the
//!   docking surface.
//! - [`scene`] – [`Scene`][scene::Scene]: a world layout used to simulate
//!   sensor readings and exercise the whole pipeline.

pub mod frame_tree;
pub mod mount;
pub mod scene;
pub mod transform;
pub mod turning;

pub use frame_tree::FrameTree;
pub use mount::{DockingTarget, SensorMount};
pub use scene::{Scene, SceneConfig, SceneReport};
pub use transform::{Transform3D, rotate_direction, transform_point};
pub use turning::{TurningAngles, TurningSolver, compute_turning_angles};
