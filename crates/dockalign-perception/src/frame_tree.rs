//! Frame Tree.
//!
//! Holds a tree of named reference frames.  Every frame except the roots has
//! exactly one parent and a local [`Transform3D`] that maps its coordinates
//! into the parent frame.  World transforms are resolved by walking the
//! parent links and composing root-to-leaf.
//!
//! A parent must be registered before its children, so the structure can
//! never contain a cycle.
//!
//! # Example
//!
//! ```rust
//! use dockalign_perception::frame_tree::FrameTree;
//! use dockalign_perception::transform::Transform3D;
//! use nalgebra::Vector3;
//!
//! let mut tree = FrameTree::new();
//! tree.add_frame("wheel_chair", None,
//!     Transform3D::from_translation(Vector3::new(1.0, 0.0, 0.0))).unwrap();
//! tree.add_frame("sensor_mount", Some("wheel_chair"),
//!     Transform3D::from_translation(Vector3::new(0.5, 0.0, 0.0))).unwrap();
//!
//! let t = tree.world_transform("sensor_mount").unwrap();
//! assert!((t.translation().x - 1.5).abs() < 1e-9);
//! ```

use std::collections::HashMap;

use dockalign_types::DockingError;
use tracing::trace;

use crate::transform::Transform3D;

#[derive(Debug, Clone)]
struct FrameNode {
    parent: Option<String>,
    local: Transform3D,
}

/// A tree of named frames and the [`Transform3D`]s linking each frame to
/// its parent.
///
/// Frames with no parent are expressed directly in the world frame.
#[derive(Debug, Default, Clone)]
pub struct FrameTree {
    frames: HashMap<String, FrameNode>,
}

impl FrameTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `parent` (or at the root when `None`).
    pub fn add_frame(
        &mut self,
        name: &str,
        parent: Option<&str>,
        local: Transform3D,
    ) -> Result<(), DockingError> {
        if self.frames.contains_key(name) {
            return Err(DockingError::DuplicateFrame(name.to_string()));
        }
        if let Some(p) = parent
            && !self.frames.contains_key(p)
        {
            return Err(DockingError::UnknownFrame(p.to_string()));
        }
        trace!(frame = name, parent = ?parent, "frame registered");
        self.frames.insert(
            name.to_string(),
            FrameNode {
                parent: parent.map(str::to_string),
                local,
            },
        );
        Ok(())
    }

    /// Replace the local transform of an existing frame.  The parent link is
    /// left untouched.
    pub fn set_local_transform(&mut self, name: &str, local: Transform3D) -> Result<(), DockingError> {
        let node = self
            .frames
            .get_mut(name)
            .ok_or_else(|| DockingError::UnknownFrame(name.to_string()))?;
        node.local = local;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parent of `name`; `Ok(None)` for a root frame.
    pub fn parent(&self, name: &str) -> Result<Option<&str>, DockingError> {
        self.frames
            .get(name)
            .map(|n| n.parent.as_deref())
            .ok_or_else(|| DockingError::UnknownFrame(name.to_string()))
    }

    /// Local transform of `name` relative to its parent.
    pub fn local_transform(&self, name: &str) -> Result<Transform3D, DockingError> {
        self.frames
            .get(name)
            .map(|n| n.local)
            .ok_or_else(|| DockingError::UnknownFrame(name.to_string()))
    }

    /// Transform mapping coordinates in `name` into the world frame.
    pub fn world_transform(&self, name: &str) -> Result<Transform3D, DockingError> {
        // Collect leaf-to-root, then compose root-to-leaf.
        let mut chain = Vec::new();
        let mut current = Some(name);
        while let Some(frame) = current {
            let node = self
                .frames
                .get(frame)
                .ok_or_else(|| DockingError::UnknownFrame(frame.to_string()))?;
            chain.push(node.local);
            current = node.parent.as_deref();
        }

        Ok(chain
            .into_iter()
            .rev()
            .fold(Transform3D::identity(), Transform3D::compose))
    }

    /// Compute the [`Transform3D`] that maps points in `source_frame` into
    /// `target_frame`.
    pub fn lookup(&self, source_frame: &str, target_frame: &str) -> Result<Transform3D, DockingError> {
        if source_frame == target_frame {
            if !self.contains(source_frame) {
                return Err(DockingError::UnknownFrame(source_frame.to_string()));
            }
            return Ok(Transform3D::identity());
        }
        let world_from_source = self.world_transform(source_frame)?;
        let world_from_target = self.world_transform(target_frame)?;
        Ok(world_from_target.inverse()?.compose(world_from_source))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
