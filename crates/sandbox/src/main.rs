//! Headless physics sandbox: drops a few crates on a ground plane and logs
//! where they come to rest.

use anyhow::{bail, Result};
use engine_core::{EngineHost, Transform, WindowHandles};
use glam::{Quat, Vec3};
use hecs::Entity;
use physics::{
    ColliderComponent, ForceMode, PhysicsConfig, PhysicsScene, RigidBodyComponent, ShapeRef,
};
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);
const FRAMES: u32 = 300;

/// Runs a [`PhysicsScene`] without a window.
struct HeadlessHost {
    config: PhysicsConfig,
    scene: Option<PhysicsScene>,
    crates: Vec<(Entity, Arc<ColliderComponent>)>,
    frames: u32,
}

impl HeadlessHost {
    fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            scene: None,
            crates: Vec::new(),
            frames: 0,
        }
    }

    fn populate(&mut self) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else {
            bail!("host not initialized");
        };
        scene.physics.add_ground_plane();

        for i in 0..3 {
            let collider = Arc::new(ColliderComponent::cuboid(Vec3::splat(0.5)));
            let transform = Transform::from_position_rotation(
                Vec3::new(i as f32 * 2.0 - 2.0, 4.0 + i as f32 * 2.0, 0.0),
                Quat::from_rotation_y(0.3 * i as f32),
            );
            let mut body = RigidBodyComponent::new();
            body.set_collision_shape(&mut scene.physics, ShapeRef::new(&collider));
            let entity = scene.spawn(transform, body);

            scene.with_body(entity, |body, world| {
                body.set_mass(world, 1.0 + i as f32);
                body.set_restitution(world, 0.3);
                if i == 2 {
                    // Keep the last crate in the XY plane.
                    body.set_position_lock(Vec3::new(0.0, 0.0, 1.0));
                    body.set_rotation_lock(Vec3::new(1.0, 1.0, 0.0));
                }
                if let Err(err) =
                    body.apply_force(world, Vec3::new(1.0, 0.0, 0.0), ForceMode::Impulse)
                {
                    log::warn!("Crate {} launched without a push: {}", i, err);
                }
            });
            self.crates.push((entity, collider));
        }

        log::info!("Spawned {} crates", self.crates.len());
        Ok(())
    }

    fn finished(&self) -> bool {
        self.frames >= FRAMES
    }
}

impl EngineHost for HeadlessHost {
    fn initialize(&mut self, handles: WindowHandles) -> Result<()> {
        log::info!("Initializing headless host ({:?})", handles);
        self.scene = Some(PhysicsScene::new(&self.config));
        self.populate()
    }

    fn shutdown(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            for (entity, _) in self.crates.drain(..) {
                scene.despawn(entity);
            }
            log::info!("Shut down with {} bodies left", scene.body_count());
        }
    }

    fn render(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        scene.run_frame(FRAME);
        self.frames += 1;

        if self.frames % 60 == 0 {
            for (i, (entity, _)) in self.crates.iter().enumerate() {
                if let Some(t) = scene.transform(*entity) {
                    log::info!(
                        "frame {:>3} ({:.2}s) crate {} at ({:.2}, {:.2}, {:.2})",
                        scene.time.frame_count(),
                        scene.time.elapsed_seconds(),
                        i,
                        t.position.x,
                        t.position.y,
                        t.position.z
                    );
                }
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Ignoring resize to {}x{} (headless)", width, height);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting physics sandbox");

    let config = PhysicsConfig::load();
    log::info!(
        "Gravity {:?}, {} Hz, max {} steps per frame",
        config.gravity,
        config.tick_rate_hz,
        config.max_steps_per_frame
    );

    let mut host = HeadlessHost::new(config);
    host.initialize(WindowHandles::default())?;
    while !host.finished() {
        host.render();
    }
    host.shutdown();
    Ok(())
}
