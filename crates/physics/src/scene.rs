//! Scene driver: entities with a transform and a rigid body, stepped at a
//! fixed rate.

use crate::collision::ShapeRef;
use crate::config::PhysicsConfig;
use crate::physics_world::PhysicsWorld;
use crate::rigid_body::RigidBodyComponent;
use engine_core::{Time, Transform};
use hecs::{Entity, World};
use std::time::Duration;

/// ECS world plus the physics world it drives.
///
/// Each tick runs every body's pre-step update, one physics step, then every
/// body's transform sync, so bodies never see the world mid-step.
pub struct PhysicsScene {
    pub physics: PhysicsWorld,
    pub entities: World,
    pub time: Time,
}

impl Default for PhysicsScene {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl PhysicsScene {
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut time = Time::new();
        time.set_fixed_rate(config.tick_rate_hz);
        time.set_max_steps_per_frame(config.max_steps_per_frame);
        Self {
            physics: PhysicsWorld::from_config(config),
            entities: World::new(),
            time,
        }
    }

    /// Spawn an entity and start its body from `transform`.
    pub fn spawn(&mut self, transform: Transform, mut body: RigidBodyComponent) -> Entity {
        body.start(&mut self.physics, &transform);
        self.entities.spawn((transform, body))
    }

    /// Spawn an entity whose body is built from `shape`.
    pub fn spawn_with_shape(&mut self, transform: Transform, shape: ShapeRef) -> Entity {
        let mut body = RigidBodyComponent::new();
        body.set_collision_shape(&mut self.physics, shape);
        self.spawn(transform, body)
    }

    /// Remove the body from the simulation and despawn the entity.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if let Ok(mut body) = self.entities.get::<&mut RigidBodyComponent>(entity) {
            body.remove(&mut self.physics);
        }
        self.entities.despawn(entity).is_ok()
    }

    /// One fixed tick of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for (_, (transform, body)) in self
            .entities
            .query_mut::<(&Transform, &mut RigidBodyComponent)>()
        {
            body.update(&mut self.physics, transform);
        }

        self.physics.step(dt);

        for (_, (transform, body)) in self
            .entities
            .query_mut::<(&mut Transform, &mut RigidBodyComponent)>()
        {
            body.sync_transform(&mut self.physics, transform);
        }
    }

    /// Advance the clock by a frame and run the fixed ticks it covers.
    /// Returns the number of ticks run.
    pub fn run_frame(&mut self, frame: Duration) -> u32 {
        self.time.advance(frame);
        let steps = self.time.consume_fixed_steps();
        let dt = self.time.fixed_timestep_seconds();
        for _ in 0..steps {
            self.tick(dt);
        }
        steps
    }

    /// Run `f` with mutable access to an entity's body and the physics world.
    pub fn with_body<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut RigidBodyComponent, &mut PhysicsWorld) -> R,
    ) -> Option<R> {
        let mut body = self.entities.get::<&mut RigidBodyComponent>(entity).ok()?;
        Some(f(&mut *body, &mut self.physics))
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.entities
            .get::<&Transform>(entity)
            .ok()
            .map(|t| *t)
    }

    pub fn body_count(&self) -> usize {
        self.physics.body_count()
    }
}
