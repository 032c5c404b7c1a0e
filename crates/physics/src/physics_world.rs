//! Physics world management with Rapier3D.

use crate::collision::PhysicsBody;
use crate::config::PhysicsConfig;
use crate::convert::{from_vector, to_vector};
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Main physics world containing all simulation state.
///
/// Structural changes (`add_body`, `remove_body`) need `&mut self`, so they
/// can never interleave with a running [`PhysicsWorld::step`].
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self::with_gravity(PhysicsConfig::default().gravity())
    }

    /// Create a world using the configured gravity and tick rate.
    pub fn from_config(config: &PhysicsConfig) -> Self {
        let mut world = Self::with_gravity(config.gravity());
        world.integration_parameters.dt = (1.0 / config.tick_rate_hz) as Real;
        world
    }

    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Global gravity applied to bodies that do not ignore it.
    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    /// Register a body together with the collider built from its shape.
    ///
    /// Mass properties are computed immediately so impulses applied before
    /// the first step see the real mass.
    pub fn add_body(&mut self, body: RigidBody, collider: Collider) -> PhysicsBody {
        let rigid_body = self.rigid_body_set.insert(body);
        let collider =
            self.collider_set
                .insert_with_parent(collider, rigid_body, &mut self.rigid_body_set);
        if let Some(body) = self.rigid_body_set.get_mut(rigid_body) {
            body.recompute_mass_properties_from_colliders(&self.collider_set);
        }
        log::debug!("Registered rigid body {:?}", rigid_body);
        PhysicsBody::new(rigid_body, collider)
    }

    /// Remove a rigid body and its colliders. Returns false if it was not registered.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        let removed = self
            .rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();
        if removed {
            log::debug!("Removed rigid body {:?}", handle);
        }
        removed
    }

    /// Whether the handle is part of the registration set.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.collider_set.get_mut(handle)
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis()).build();
        self.collider_set.insert(collider)
    }
}
