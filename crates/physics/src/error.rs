//! Error types for rigid-body operations and record I/O.

use thiserror::Error;

/// Recoverable conditions raised by [`crate::RigidBodyComponent`].
///
/// None of these are fatal; the component logs them and stays in a valid state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigidBodyError {
    #[error("no collision shape assigned, world insertion deferred")]
    ShapeNotAssigned,
    #[error("could not insert body into the physics world: {reason}")]
    WorldInsertionFailed { reason: String },
    #[error("mass {requested} is invalid for a dynamic body, clamped to {clamped}")]
    InvalidMassValue { requested: f32, clamped: f32 },
    #[error("{operation} ignored: {reason}")]
    StaleHandleAccess {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("serialized field `{0}` missing, using default")]
    MissingSerializedField(&'static str),
}

/// Failure reading or writing a [`crate::RigidBodyRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to parse rigid body record: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to write rigid body record: {0}")]
    Write(#[from] ron::Error),
}
