//! Transform component and the scene-graph node contract.

use glam::{Quat, Vec3};

/// Scene-graph node that owns an entity's world pose.
///
/// Physics components read it once to seed a new body and write it back after
/// every simulation step.
pub trait TransformNode {
    fn world_position(&self) -> Vec3;
    fn set_world_position(&mut self, position: Vec3);
    fn world_rotation(&self) -> Quat;
    fn set_world_rotation(&mut self, rotation: Quat);
}

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }
}

// Root nodes: local and world space coincide.
impl TransformNode for Transform {
    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn set_world_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn world_rotation(&self) -> Quat {
        self.rotation
    }

    fn set_world_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }
}
