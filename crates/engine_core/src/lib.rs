//! Core engine types shared by the physics crate and its hosts.
//!
//! This crate provides:
//! - Transform and the scene-graph node contract
//! - Fixed-step time management
//! - The platform embedding boundary

pub mod host;
pub mod time;
pub mod transform;

pub use host::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};
