//! Per-axis position/rotation locks.
//!
//! Rapier is driven here without its native axis freezing; locks are a mask
//! plus a correction pass the rigid body runs after every step. Rotation is
//! held by swing-twist decomposition of each step's rotation, not by Euler
//! angles.

use glam::{Quat, Vec3};

/// Which world axes are held fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLock {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisLock {
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Mask form: 1.0 for locked axes, 0.0 otherwise.
    pub fn to_mask(&self) -> Vec3 {
        Vec3::new(
            f32::from(u8::from(self.x)),
            f32::from(u8::from(self.y)),
            f32::from(u8::from(self.z)),
        )
    }

    /// Components of 0.5 and above count as locked.
    pub fn from_mask(mask: Vec3) -> Self {
        Self {
            x: mask.x >= 0.5,
            y: mask.y >= 0.5,
            z: mask.z >= 0.5,
        }
    }

    /// Take locked components from `anchor`, the rest from `value`.
    pub fn hold(&self, value: Vec3, anchor: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { anchor.x } else { value.x },
            if self.y { anchor.y } else { value.y },
            if self.z { anchor.z } else { value.z },
        )
    }

    /// Zero the locked components.
    pub fn zero(&self, value: Vec3) -> Vec3 {
        self.hold(value, Vec3::ZERO)
    }

    /// Keep only the part of the rotation from `anchor` to `rotation` that
    /// turns about free world axes.
    ///
    /// With one free axis this is the twist about it, with one locked axis the
    /// swing away from it. No angle ranges are involved, so a free axis can
    /// turn arbitrarily far.
    pub fn hold_rotation(&self, rotation: Quat, anchor: Quat) -> Quat {
        let delta = rotation * anchor.inverse();
        let held = match (self.x, self.y, self.z) {
            (false, false, false) => delta,
            (true, true, true) => Quat::IDENTITY,
            (false, true, true) => twist(delta, Vec3::X),
            (true, false, true) => twist(delta, Vec3::Y),
            (true, true, false) => twist(delta, Vec3::Z),
            (true, false, false) => swing(delta, Vec3::X),
            (false, true, false) => swing(delta, Vec3::Y),
            (false, false, true) => swing(delta, Vec3::Z),
        };
        (held * anchor).normalize()
    }
}

// Rotation of `q` about `axis` (swing-twist decomposition).
fn twist(q: Quat, axis: Vec3) -> Quat {
    let projected = axis * Vec3::new(q.x, q.y, q.z).dot(axis);
    let twist = Quat::from_xyzw(projected.x, projected.y, projected.z, q.w);
    if twist.length_squared() < 1e-12 {
        // Half-turn perpendicular to the axis
        Quat::IDENTITY
    } else {
        twist.normalize()
    }
}

// Rotation of `q` with its twist about `axis` removed.
fn swing(q: Quat, axis: Vec3) -> Quat {
    q * twist(q, axis).inverse()
}

impl From<bool> for AxisLock {
    fn from(locked: bool) -> Self {
        if locked {
            Self::ALL
        } else {
            Self::NONE
        }
    }
}

impl From<Vec3> for AxisLock {
    fn from(mask: Vec3) -> Self {
        Self::from_mask(mask)
    }
}

/// Pose values locked axes snap back to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockAnchors {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LockAnchors {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}
