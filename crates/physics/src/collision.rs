//! Collision shapes, the collider that owns them, and the handles linking a
//! component to its native body.

use glam::Vec3;
use rapier3d::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Geometry of a collision shape, in the collider's unscaled local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Capsule aligned with the local Y axis.
    Capsule { half_height: f32, radius: f32 },
    /// Cylinder aligned with the local Y axis.
    Cylinder { half_height: f32, radius: f32 },
}

impl CollisionShape {
    /// Bake a local scale into the geometry. Round shapes take the largest
    /// scale of the axes they span.
    pub fn scaled(&self, scale: Vec3) -> Self {
        let scale = scale.abs();
        match *self {
            Self::Cuboid { half_extents } => Self::Cuboid {
                half_extents: half_extents * scale,
            },
            Self::Sphere { radius } => Self::Sphere {
                radius: radius * scale.max_element(),
            },
            Self::Capsule {
                half_height,
                radius,
            } => Self::Capsule {
                half_height: half_height * scale.y,
                radius: radius * scale.x.max(scale.z),
            },
            Self::Cylinder {
                half_height,
                radius,
            } => Self::Cylinder {
                half_height: half_height * scale.y,
                radius: radius * scale.x.max(scale.z),
            },
        }
    }

    /// Whether Rapier can build a collider from this geometry.
    pub fn is_valid(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Self::Cuboid { half_extents } => half_extents.to_array().into_iter().all(positive),
            Self::Sphere { radius } => positive(radius),
            // A capsule with zero half height degenerates to a sphere, which is fine.
            Self::Capsule {
                half_height,
                radius,
            } => half_height.is_finite() && half_height >= 0.0 && positive(radius),
            Self::Cylinder {
                half_height,
                radius,
            } => positive(half_height) && positive(radius),
        }
    }

    /// Native shape, or `None` for degenerate geometry.
    pub fn to_shared_shape(&self) -> Option<SharedShape> {
        if !self.is_valid() {
            return None;
        }
        Some(match *self {
            Self::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Self::Sphere { radius } => SharedShape::ball(radius),
            Self::Capsule {
                half_height,
                radius,
            } => SharedShape::capsule_y(half_height, radius),
            Self::Cylinder {
                half_height,
                radius,
            } => SharedShape::cylinder(half_height, radius),
        })
    }
}

/// Stable identity of a collider's shape, used to reattach it after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl ShapeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Source of the shape a rigid body is built from. Implemented by the
/// sibling collider component; queried again on every rebuild.
pub trait CollisionShapeProvider: Send + Sync {
    fn shape_id(&self) -> ShapeId;
    fn shape(&self) -> CollisionShape;
    fn local_scale(&self) -> Vec3;
    fn center_offset(&self) -> Vec3;
}

/// Collider component owning a shape description.
///
/// Shared as `Arc<ColliderComponent>`; rigid bodies only keep a [`ShapeRef`] to it.
#[derive(Debug)]
pub struct ColliderComponent {
    id: ShapeId,
    settings: Mutex<ColliderSettings>,
}

#[derive(Debug, Clone, Copy)]
struct ColliderSettings {
    shape: CollisionShape,
    scale: Vec3,
    center: Vec3,
}

impl ColliderComponent {
    pub fn new(shape: CollisionShape) -> Self {
        Self::with_id(ShapeId::next(), shape)
    }

    /// Recreate a collider under a previously serialized identity.
    pub fn with_id(id: ShapeId, shape: CollisionShape) -> Self {
        Self {
            id,
            settings: Mutex::new(ColliderSettings {
                shape,
                scale: Vec3::ONE,
                center: Vec3::ZERO,
            }),
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(CollisionShape::Cuboid { half_extents })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(CollisionShape::Sphere { radius })
    }

    /// Bodies pick up the change on their next rebuild.
    pub fn set_shape(&self, shape: CollisionShape) {
        self.settings().shape = shape;
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.settings().scale = scale;
    }

    pub fn set_center(&self, center: Vec3) {
        self.settings().center = center;
    }

    // Settings are plain data, a poisoned lock still holds a usable value.
    fn settings(&self) -> MutexGuard<'_, ColliderSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CollisionShapeProvider for ColliderComponent {
    fn shape_id(&self) -> ShapeId {
        self.id
    }

    fn shape(&self) -> CollisionShape {
        self.settings().shape
    }

    fn local_scale(&self) -> Vec3 {
        self.settings().scale
    }

    fn center_offset(&self) -> Vec3 {
        self.settings().center
    }
}

/// Non-owning link from a rigid body to its collider's shape.
#[derive(Debug, Clone)]
pub struct ShapeRef {
    id: ShapeId,
    provider: Weak<dyn CollisionShapeProvider>,
}

impl ShapeRef {
    pub fn new<P: CollisionShapeProvider + 'static>(provider: &Arc<P>) -> Self {
        let weak: Weak<P> = Arc::downgrade(provider);
        Self {
            id: provider.shape_id(),
            provider: weak,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// The provider, unless the collider has been dropped.
    pub fn upgrade(&self) -> Option<Arc<dyn CollisionShapeProvider>> {
        self.provider.upgrade()
    }
}

/// Native handles of a body registered with the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider,
        }
    }
}
