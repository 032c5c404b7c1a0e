//! Serialized form of a rigid body's designer-facing properties.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// Ordered set of named fields, each independently optional so older and
/// newer files load into whatever schema the reader has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_drag: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restitution: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_gravity: Option<bool>,
    /// Custom gravity override; absent means world gravity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinematic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_lock: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_lock: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_identity: Option<u64>,
}

impl RigidBodyRecord {
    pub fn to_ron(&self) -> Result<String, RecordError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn from_ron(data: &str) -> Result<Self, RecordError> {
        Ok(ron::from_str(data)?)
    }
}
