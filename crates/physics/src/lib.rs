//! Rigid-body physics for scene entities, backed by Rapier3D.
//!
//! [`RigidBodyComponent`] owns one simulated body, [`PhysicsWorld`] owns the
//! simulation, and [`PhysicsScene`] drives both once per fixed tick.

pub mod axis_lock;
pub mod collision;
pub mod config;
mod convert;
pub mod error;
pub mod physics_world;
pub mod record;
pub mod rigid_body;
pub mod scene;

pub use axis_lock::*;
pub use collision::*;
pub use config::*;
pub use error::*;
pub use physics_world::*;
pub use record::*;
pub use rigid_body::*;
pub use scene::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
