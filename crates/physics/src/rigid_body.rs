//! Rigid-body component: owns one simulated body and keeps it in step with the
//! entity's transform and designer-facing properties.
//!
//! Lifecycle, driven by the scheduler:
//! - [`RigidBodyComponent::initialize`] resets properties to their defaults
//! - [`RigidBodyComponent::start`] builds the native body once a shape is known
//! - [`RigidBodyComponent::update`] runs before each world step
//! - [`RigidBodyComponent::sync_transform`] runs after each world step
//! - [`RigidBodyComponent::remove`] releases the native body
//!
//! Mass, shape and kinematic changes rebuild the native body; velocity and pose
//! carry over.

use crate::axis_lock::{AxisLock, LockAnchors};
use crate::collision::{PhysicsBody, ShapeId, ShapeRef};
use crate::convert::{from_rotation, from_vector, to_isometry, to_point, to_rotation, to_vector};
use crate::error::RigidBodyError;
use crate::physics_world::PhysicsWorld;
use crate::record::RigidBodyRecord;
use engine_core::{Quat, TransformNode, Vec3};
use rapier3d::prelude::{ColliderBuilder, RigidBody, RigidBodyBuilder};

/// Smallest mass a dynamic body may have.
pub const MASS_EPSILON: f32 = 1e-3;

/// Designer-facing body settings. Survive every rebuild unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyProperties {
    /// User-set mass, kept verbatim even while kinematic.
    pub mass: f32,
    /// Linear damping.
    pub drag: f32,
    /// Angular damping.
    pub angular_drag: f32,
    /// Bounce coefficient in `[0, 1]`.
    pub restitution: f32,
    pub use_gravity: bool,
    /// Custom gravity; `None` follows the world.
    pub gravity: Option<Vec3>,
    pub kinematic: bool,
    pub position_lock: AxisLock,
    pub rotation_lock: AxisLock,
}

impl Default for RigidBodyProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            drag: 0.0,
            angular_drag: 0.05,
            restitution: 0.0,
            use_gravity: true,
            gravity: None,
            kinematic: false,
            position_lock: AxisLock::NONE,
            rotation_lock: AxisLock::NONE,
        }
    }
}

/// Where the component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Defaults only, not started (or removed).
    Uninitialized,
    /// Started, but no native body (missing shape or failed insertion).
    OutOfWorld,
    /// Native body registered with the physics world.
    InWorld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Accumulated and integrated over the next step.
    Force,
    /// Instantaneous velocity change.
    Impulse,
}

/// A single force or impulse, optionally applied at a world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceRequest {
    pub vector: Vec3,
    pub mode: ForceMode,
    pub position: Option<Vec3>,
}

/// Linear and angular velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

// The native handle only exists inside `InWorld`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Uninitialized,
    OutOfWorld,
    InWorld(PhysicsBody),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    position: Vec3,
    rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Component bridging an entity's transform to a Rapier rigid body.
#[derive(Debug)]
pub struct RigidBodyComponent {
    properties: RigidBodyProperties,
    slot: Slot,
    shape: Option<ShapeRef>,
    shape_identity: Option<ShapeId>,
    /// Last known pose; seeds the next native body.
    pose: Pose,
    /// Last known dynamic velocity; seeds the next native body.
    velocity: Velocity,
    anchors: LockAnchors,
    /// Enter the world at the next tick boundary.
    insert_pending: bool,
    /// Rebuild at the next tick boundary.
    rebuild_pending: bool,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBodyComponent {
    pub fn new() -> Self {
        Self {
            properties: RigidBodyProperties::default(),
            slot: Slot::Uninitialized,
            shape: None,
            shape_identity: None,
            pose: Pose::default(),
            velocity: Velocity::default(),
            anchors: LockAnchors::default(),
            insert_pending: false,
            rebuild_pending: false,
        }
    }

    // ---- lifecycle ----

    /// Reset to default properties in the `Uninitialized` state.
    pub fn initialize(&mut self) {
        if let Slot::InWorld(body) = self.slot {
            log::warn!(
                "initialize ignored: body {:?} is still in the world",
                body.rigid_body
            );
            return;
        }
        *self = Self::new();
    }

    /// Seed from the transform and enter the world if a shape is available.
    /// Without one the component waits `OutOfWorld` for a shape assignment.
    pub fn start(&mut self, world: &mut PhysicsWorld, node: &dyn TransformNode) {
        if self.slot != Slot::Uninitialized {
            log::debug!("start ignored: body already started ({:?})", self.state());
            return;
        }
        self.slot = Slot::OutOfWorld;
        self.seed_from(node);
        if let Err(err) = self.enter_world(world) {
            report(&err);
        }
    }

    /// Pre-step work: insertion retry or deferred rebuild, then custom gravity.
    pub fn update(&mut self, world: &mut PhysicsWorld, node: &dyn TransformNode) {
        match self.slot {
            Slot::Uninitialized => {}
            Slot::OutOfWorld => {
                if !self.insert_pending && self.shape.is_none() {
                    return;
                }
                let requested = self.insert_pending;
                self.seed_from(node);
                match self.enter_world(world) {
                    Err(err) if requested => report(&err),
                    Err(err) => log::trace!("insertion retry failed: {}", err),
                    Ok(()) => {}
                }
            }
            Slot::InWorld(_) => {
                if self.rebuild_pending {
                    self.rebuild_pending = false;
                    self.rebuild(world);
                }
                self.apply_custom_gravity(world);
            }
        }
    }

    /// Post-step work: correct locked axes, drop this step's accumulated
    /// forces and write the resulting pose into `node`.
    pub fn sync_transform(&mut self, world: &mut PhysicsWorld, node: &mut dyn TransformNode) {
        let Slot::InWorld(body) = self.slot else {
            return;
        };
        let Some(rb) = world.body_mut(body.rigid_body) else {
            log::warn!(
                "Rigid body {:?} vanished from the world, marking out of world",
                body.rigid_body
            );
            self.slot = Slot::OutOfWorld;
            return;
        };

        if !self.properties.kinematic {
            self.correct_locked_axes(rb);
            self.velocity = Velocity {
                linear: from_vector(rb.linvel()),
                angular: from_vector(rb.angvel()),
            };
        }
        rb.reset_forces(false);
        rb.reset_torques(false);

        self.pose = Pose {
            position: from_vector(rb.translation()),
            rotation: from_rotation(rb.rotation()),
        };
        node.set_world_position(self.pose.position);
        node.set_world_rotation(self.pose.rotation);
    }

    /// Release the native body and forget the shape. Terminal.
    pub fn remove(&mut self, world: &mut PhysicsWorld) {
        if let Slot::InWorld(body) = self.slot {
            world.remove_body(body.rigid_body);
        }
        self.slot = Slot::Uninitialized;
        self.shape = None;
        self.insert_pending = false;
        self.rebuild_pending = false;
    }

    pub fn state(&self) -> BodyState {
        match self.slot {
            Slot::Uninitialized => BodyState::Uninitialized,
            Slot::OutOfWorld => BodyState::OutOfWorld,
            Slot::InWorld(_) => BodyState::InWorld,
        }
    }

    /// Native handles, present only while `InWorld`.
    pub fn body_handle(&self) -> Option<PhysicsBody> {
        match self.slot {
            Slot::InWorld(body) => Some(body),
            _ => None,
        }
    }

    pub fn properties(&self) -> &RigidBodyProperties {
        &self.properties
    }

    // ---- mass ----

    pub fn mass(&self) -> f32 {
        self.properties.mass
    }

    /// Mass the engine simulates with: zero while kinematic.
    pub fn effective_mass(&self) -> f32 {
        if self.properties.kinematic {
            0.0
        } else {
            self.properties.mass.max(MASS_EPSILON)
        }
    }

    /// Non-positive masses are clamped to [`MASS_EPSILON`] unless kinematic.
    /// Rebuilds the native body when the value changes.
    pub fn set_mass(&mut self, world: &mut PhysicsWorld, mass: f32) {
        let mass = validated_mass(mass, self.properties.kinematic);
        if mass == self.properties.mass {
            return;
        }
        self.properties.mass = mass;
        self.rebuild(world);
    }

    // ---- damping / restitution ----

    pub fn drag(&self) -> f32 {
        self.properties.drag
    }

    pub fn set_drag(&mut self, world: &mut PhysicsWorld, drag: f32) {
        let drag = non_negative("drag", drag);
        self.properties.drag = drag;
        if let Some(rb) = self.native_body_mut(world) {
            rb.set_linear_damping(drag);
        }
    }

    pub fn angular_drag(&self) -> f32 {
        self.properties.angular_drag
    }

    pub fn set_angular_drag(&mut self, world: &mut PhysicsWorld, angular_drag: f32) {
        let angular_drag = non_negative("angular drag", angular_drag);
        self.properties.angular_drag = angular_drag;
        if let Some(rb) = self.native_body_mut(world) {
            rb.set_angular_damping(angular_drag);
        }
    }

    pub fn restitution(&self) -> f32 {
        self.properties.restitution
    }

    /// Clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, world: &mut PhysicsWorld, restitution: f32) {
        let clamped = clamp_restitution(restitution);
        self.properties.restitution = clamped;
        if let Slot::InWorld(body) = self.slot {
            if let Some(collider) = world.collider_mut(body.collider) {
                collider.set_restitution(clamped);
            }
        }
    }

    // ---- gravity ----

    pub fn use_gravity(&self) -> bool {
        self.properties.use_gravity
    }

    /// With gravity off, no gravity of any kind acts on the body.
    pub fn set_use_gravity(&mut self, world: &mut PhysicsWorld, use_gravity: bool) {
        self.properties.use_gravity = use_gravity;
        self.push_gravity(world);
    }

    /// The custom override, if any.
    pub fn gravity(&self) -> Option<Vec3> {
        self.properties.gravity
    }

    pub fn set_gravity(&mut self, world: &mut PhysicsWorld, gravity: Vec3) {
        self.properties.gravity = Some(gravity);
        self.push_gravity(world);
    }

    /// Follow world gravity again.
    pub fn clear_gravity_override(&mut self, world: &mut PhysicsWorld) {
        self.properties.gravity = None;
        self.push_gravity(world);
    }

    /// Gravity actually acting on the body.
    pub fn effective_gravity(&self, world: &PhysicsWorld) -> Vec3 {
        if !self.properties.use_gravity || self.properties.kinematic {
            Vec3::ZERO
        } else {
            self.properties.gravity.unwrap_or_else(|| world.gravity())
        }
    }

    // Rapier has no per-body gravity vector: world gravity runs through the
    // gravity scale, an override is scale 0 plus a force added in `update`.
    fn gravity_scale(&self) -> f32 {
        if self.properties.use_gravity && self.properties.gravity.is_none() {
            1.0
        } else {
            0.0
        }
    }

    fn push_gravity(&self, world: &mut PhysicsWorld) {
        let scale = self.gravity_scale();
        if let Some(rb) = self.native_body_mut(world) {
            rb.set_gravity_scale(scale, true);
        }
    }

    fn apply_custom_gravity(&self, world: &mut PhysicsWorld) {
        let props = &self.properties;
        if !props.use_gravity || props.kinematic {
            return;
        }
        let Some(gravity) = props.gravity else {
            return;
        };
        if let Some(rb) = self.native_body_mut(world) {
            let force = gravity * rb.mass();
            rb.add_force(to_vector(force), false);
        }
    }

    // ---- kinematic ----

    pub fn is_kinematic(&self) -> bool {
        self.properties.kinematic
    }

    /// Kinematic bodies ignore forces and gravity and move only through
    /// [`Self::set_position`]/[`Self::set_rotation`]. The stored mass is untouched,
    /// unless it is not positive when the body turns dynamic again.
    pub fn set_kinematic(&mut self, world: &mut PhysicsWorld, kinematic: bool) {
        if kinematic == self.properties.kinematic {
            return;
        }
        self.properties.kinematic = kinematic;
        if !kinematic {
            // A kinematic body may have stored any mass.
            self.properties.mass = validated_mass(self.properties.mass, false);
        }
        self.rebuild(world);
    }

    // ---- velocity / forces ----

    pub fn linear_velocity(&self, world: &PhysicsWorld) -> Vec3 {
        self.native_body(world)
            .map(|rb| from_vector(rb.linvel()))
            .unwrap_or(self.velocity.linear)
    }

    pub fn angular_velocity(&self, world: &PhysicsWorld) -> Vec3 {
        self.native_body(world)
            .map(|rb| from_vector(rb.angvel()))
            .unwrap_or(self.velocity.angular)
    }

    pub fn set_linear_velocity(
        &mut self,
        world: &mut PhysicsWorld,
        velocity: Vec3,
    ) -> Result<(), RigidBodyError> {
        let rb = self.dynamic_body_mut(world, "set_linear_velocity")?;
        rb.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    pub fn set_angular_velocity(
        &mut self,
        world: &mut PhysicsWorld,
        velocity: Vec3,
    ) -> Result<(), RigidBodyError> {
        let rb = self.dynamic_body_mut(world, "set_angular_velocity")?;
        rb.set_angvel(to_vector(velocity), true);
        Ok(())
    }

    pub fn apply_force(
        &mut self,
        world: &mut PhysicsWorld,
        force: Vec3,
        mode: ForceMode,
    ) -> Result<(), RigidBodyError> {
        self.apply(
            world,
            ForceRequest {
                vector: force,
                mode,
                position: None,
            },
        )
    }

    /// `position` is in world space; the offset from the center of mass adds torque.
    pub fn apply_force_at_position(
        &mut self,
        world: &mut PhysicsWorld,
        force: Vec3,
        position: Vec3,
        mode: ForceMode,
    ) -> Result<(), RigidBodyError> {
        self.apply(
            world,
            ForceRequest {
                vector: force,
                mode,
                position: Some(position),
            },
        )
    }

    pub fn apply(
        &mut self,
        world: &mut PhysicsWorld,
        request: ForceRequest,
    ) -> Result<(), RigidBodyError> {
        let operation = if request.position.is_some() {
            "apply_force_at_position"
        } else {
            "apply_force"
        };
        let rb = self.dynamic_body_mut(world, operation)?;
        let vector = to_vector(request.vector);
        match (request.mode, request.position) {
            (ForceMode::Force, None) => rb.add_force(vector, true),
            (ForceMode::Impulse, None) => rb.apply_impulse(vector, true),
            (ForceMode::Force, Some(point)) => rb.add_force_at_point(vector, to_point(point), true),
            (ForceMode::Impulse, Some(point)) => {
                rb.apply_impulse_at_point(vector, to_point(point), true)
            }
        }
        Ok(())
    }

    pub fn apply_torque(
        &mut self,
        world: &mut PhysicsWorld,
        torque: Vec3,
        mode: ForceMode,
    ) -> Result<(), RigidBodyError> {
        let rb = self.dynamic_body_mut(world, "apply_torque")?;
        match mode {
            ForceMode::Force => rb.add_torque(to_vector(torque), true),
            ForceMode::Impulse => rb.apply_torque_impulse(to_vector(torque), true),
        }
        Ok(())
    }

    /// Drop forces and torques accumulated for the next step. Velocity is kept.
    pub fn clear_forces(&mut self, world: &mut PhysicsWorld) -> Result<(), RigidBodyError> {
        let Some(rb) = self.native_body_mut(world) else {
            return Err(stale("clear_forces", "body is not in the physics world"));
        };
        rb.reset_forces(false);
        rb.reset_torques(false);
        Ok(())
    }

    // ---- locks ----

    pub fn position_lock(&self) -> Vec3 {
        self.properties.position_lock.to_mask()
    }

    /// Accepts a `Vec3` mask or a `bool` for all three axes.
    pub fn set_position_lock(&mut self, lock: impl Into<AxisLock>) {
        self.properties.position_lock = lock.into();
    }

    pub fn rotation_lock(&self) -> Vec3 {
        self.properties.rotation_lock.to_mask()
    }

    pub fn set_rotation_lock(&mut self, lock: impl Into<AxisLock>) {
        self.properties.rotation_lock = lock.into();
    }

    // Anchors always hold the latest corrected pose, so a newly locked axis
    // stays at its last unlocked value.
    fn correct_locked_axes(&mut self, rb: &mut RigidBody) {
        let position_lock = self.properties.position_lock;
        let rotation_lock = self.properties.rotation_lock;

        let position = position_lock.hold(from_vector(rb.translation()), self.anchors.position);
        let rotation =
            rotation_lock.hold_rotation(from_rotation(rb.rotation()), self.anchors.rotation);

        if position_lock.any() {
            rb.set_translation(to_vector(position), false);
            let linvel = position_lock.zero(from_vector(rb.linvel()));
            rb.set_linvel(to_vector(linvel), false);
        }
        if rotation_lock.any() {
            rb.set_rotation(to_rotation(rotation), false);
            let angvel = rotation_lock.zero(from_vector(rb.angvel()));
            rb.set_angvel(to_vector(angvel), false);
        }

        self.anchors = LockAnchors { position, rotation };
    }

    // ---- pose ----

    pub fn position(&self, world: &PhysicsWorld) -> Vec3 {
        self.native_body(world)
            .map(|rb| from_vector(rb.translation()))
            .unwrap_or(self.pose.position)
    }

    /// Teleport. Velocity is left alone; locked axes adopt the new value.
    pub fn set_position(&mut self, world: &mut PhysicsWorld, position: Vec3) {
        self.pose.position = position;
        self.anchors.position = position;
        if let Some(rb) = self.native_body_mut(world) {
            rb.set_translation(to_vector(position), true);
        }
    }

    pub fn rotation(&self, world: &PhysicsWorld) -> Quat {
        self.native_body(world)
            .map(|rb| from_rotation(rb.rotation()))
            .unwrap_or(self.pose.rotation)
    }

    pub fn set_rotation(&mut self, world: &mut PhysicsWorld, rotation: Quat) {
        let rotation = rotation.normalize();
        self.pose.rotation = rotation;
        self.anchors.rotation = rotation;
        if let Some(rb) = self.native_body_mut(world) {
            rb.set_rotation(to_rotation(rotation), true);
        }
    }

    // ---- shape ----

    pub fn collision_shape(&self) -> Option<&ShapeRef> {
        self.shape.as_ref()
    }

    /// Identity of the assigned shape, or of the one named by the last loaded record.
    pub fn shape_identity(&self) -> Option<ShapeId> {
        self.shape_identity
    }

    /// Shape is baked into the native body, so this always rebuilds (or, when
    /// out of world, retries insertion at the next update).
    pub fn set_collision_shape(&mut self, world: &mut PhysicsWorld, shape: ShapeRef) {
        self.shape_identity = Some(shape.id());
        self.shape = Some(shape);
        self.rebuild(world);
    }

    // ---- serialization ----

    pub fn serialize(&self) -> RigidBodyRecord {
        let p = &self.properties;
        RigidBodyRecord {
            mass: Some(p.mass),
            drag: Some(p.drag),
            angular_drag: Some(p.angular_drag),
            restitution: Some(p.restitution),
            use_gravity: Some(p.use_gravity),
            gravity: p.gravity.map(|g| g.to_array()),
            kinematic: Some(p.kinematic),
            position_lock: Some(p.position_lock.to_mask().to_array()),
            rotation_lock: Some(p.rotation_lock.to_mask().to_array()),
            shape_identity: self.shape_identity.map(|id| id.0),
        }
    }

    /// Apply present fields, default the rest. Construction is left to the
    /// normal start/shape path; a body already in the world rebuilds at the
    /// next update.
    pub fn deserialize(&mut self, record: &RigidBodyRecord) {
        let defaults = RigidBodyProperties::default();
        let kinematic = field("kinematic", record.kinematic, defaults.kinematic);
        let mass = field("mass", record.mass, defaults.mass);
        let lock = |mask: [f32; 3]| AxisLock::from_mask(Vec3::from_array(mask));

        self.properties = RigidBodyProperties {
            mass: validated_mass(mass, kinematic),
            drag: non_negative("drag", field("drag", record.drag, defaults.drag)),
            angular_drag: non_negative(
                "angular drag",
                field("angular_drag", record.angular_drag, defaults.angular_drag),
            ),
            restitution: clamp_restitution(field(
                "restitution",
                record.restitution,
                defaults.restitution,
            )),
            use_gravity: field("use_gravity", record.use_gravity, defaults.use_gravity),
            gravity: record.gravity.map(Vec3::from_array),
            kinematic,
            position_lock: field(
                "position_lock",
                record.position_lock.map(lock),
                defaults.position_lock,
            ),
            rotation_lock: field(
                "rotation_lock",
                record.rotation_lock.map(lock),
                defaults.rotation_lock,
            ),
        };
        self.shape_identity = record.shape_identity.map(ShapeId);

        if matches!(self.slot, Slot::InWorld(_)) {
            self.rebuild_pending = true;
        }
    }

    // ---- native body ----

    fn seed_from(&mut self, node: &dyn TransformNode) {
        self.pose = Pose {
            position: node.world_position(),
            rotation: node.world_rotation(),
        };
        self.anchors = LockAnchors {
            position: self.pose.position,
            rotation: self.pose.rotation,
        };
    }

    fn native_body<'w>(&self, world: &'w PhysicsWorld) -> Option<&'w RigidBody> {
        match self.slot {
            Slot::InWorld(body) => world.body(body.rigid_body),
            _ => None,
        }
    }

    fn native_body_mut<'w>(&self, world: &'w mut PhysicsWorld) -> Option<&'w mut RigidBody> {
        match self.slot {
            Slot::InWorld(body) => world.body_mut(body.rigid_body),
            _ => None,
        }
    }

    fn dynamic_body_mut<'w>(
        &self,
        world: &'w mut PhysicsWorld,
        operation: &'static str,
    ) -> Result<&'w mut RigidBody, RigidBodyError> {
        let reason = match self.slot {
            Slot::InWorld(_) if self.properties.kinematic => "body is kinematic",
            Slot::InWorld(body) => match world.body_mut(body.rigid_body) {
                Some(rb) => return Ok(rb),
                None => "native body is no longer registered",
            },
            _ => "body is not in the physics world",
        };
        Err(stale(operation, reason))
    }

    /// Destroy and recreate the native body from the current properties and
    /// shape, carrying pose and velocity over. Out of world this only schedules
    /// an insertion attempt.
    fn rebuild(&mut self, world: &mut PhysicsWorld) {
        match self.slot {
            Slot::Uninitialized => {}
            Slot::OutOfWorld => self.insert_pending = true,
            Slot::InWorld(body) => {
                self.capture(world, body);
                world.remove_body(body.rigid_body);
                self.slot = Slot::OutOfWorld;
                if let Err(err) = self.enter_world(world) {
                    report(&err);
                }
            }
        }
    }

    fn capture(&mut self, world: &PhysicsWorld, body: PhysicsBody) {
        let Some(rb) = world.body(body.rigid_body) else {
            return;
        };
        self.pose = Pose {
            position: from_vector(rb.translation()),
            rotation: from_rotation(rb.rotation()),
        };
        if !rb.is_kinematic() {
            self.velocity = Velocity {
                linear: from_vector(rb.linvel()),
                angular: from_vector(rb.angvel()),
            };
        }
    }

    fn enter_world(&mut self, world: &mut PhysicsWorld) -> Result<(), RigidBodyError> {
        self.insert_pending = false;
        let body = self.build(world)?;
        log::debug!("Rigid body {:?} entered the world", body.rigid_body);
        self.slot = Slot::InWorld(body);
        Ok(())
    }

    fn build(&mut self, world: &mut PhysicsWorld) -> Result<PhysicsBody, RigidBodyError> {
        let shape = self.shape.as_ref().ok_or(RigidBodyError::ShapeNotAssigned)?;
        let (shape_id, provider) = (shape.id(), shape.upgrade());
        let Some(provider) = provider else {
            log::warn!("Collider for shape {:?} was dropped", shape_id);
            self.shape = None;
            return Err(RigidBodyError::ShapeNotAssigned);
        };

        let geometry = provider.shape().scaled(provider.local_scale());
        let shape = geometry
            .to_shared_shape()
            .ok_or_else(|| RigidBodyError::WorldInsertionFailed {
                reason: format!("degenerate shape {:?}", geometry),
            })?;
        let center = provider.center_offset();
        if !(self.pose.position.is_finite() && self.pose.rotation.is_finite() && center.is_finite())
        {
            return Err(RigidBodyError::WorldInsertionFailed {
                reason: "non-finite pose".to_string(),
            });
        }

        let props = &self.properties;
        let builder = if props.kinematic {
            RigidBodyBuilder::kinematic_position_based()
        } else {
            RigidBodyBuilder::dynamic()
                .linvel(to_vector(self.velocity.linear))
                .angvel(to_vector(self.velocity.angular))
        };
        let body = builder
            .position(to_isometry(self.pose.position, self.pose.rotation))
            .linear_damping(props.drag)
            .angular_damping(props.angular_drag)
            .gravity_scale(self.gravity_scale())
            .build();

        let collider = ColliderBuilder::new(shape)
            .translation(to_vector(center))
            .restitution(props.restitution);
        let collider = if props.kinematic {
            collider.density(0.0)
        } else {
            collider.mass(props.mass.max(MASS_EPSILON))
        };

        Ok(world.add_body(body, collider.build()))
    }
}

// Dynamic bodies need a positive mass; kinematic ones keep what they are given.
fn validated_mass(mass: f32, kinematic: bool) -> f32 {
    if mass.is_finite() && (mass > 0.0 || kinematic) {
        return mass;
    }
    log::warn!(
        "{}",
        RigidBodyError::InvalidMassValue {
            requested: mass,
            clamped: MASS_EPSILON,
        }
    );
    MASS_EPSILON
}

// A missing shape is an expected wait, not a fault.
fn report(err: &RigidBodyError) {
    match err {
        RigidBodyError::ShapeNotAssigned => log::debug!("{}", err),
        _ => log::warn!("{}", err),
    }
}

fn stale(operation: &'static str, reason: &'static str) -> RigidBodyError {
    let err = RigidBodyError::StaleHandleAccess { operation, reason };
    log::warn!("{}", err);
    err
}

fn field<T>(name: &'static str, value: Option<T>, default: T) -> T {
    value.unwrap_or_else(|| {
        log::trace!("{}", RigidBodyError::MissingSerializedField(name));
        default
    })
}

fn non_negative(name: &str, value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("{} {} out of range, clamped to 0", name, value);
        0.0
    }
}

fn clamp_restitution(restitution: f32) -> f32 {
    if (0.0..=1.0).contains(&restitution) {
        return restitution;
    }
    let clamped = if restitution.is_nan() {
        0.0
    } else {
        restitution.clamp(0.0, 1.0)
    };
    log::warn!("restitution {} clamped to {}", restitution, clamped);
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderComponent, CollisionShape, CollisionShapeProvider};
    use engine_core::Transform;
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        world: PhysicsWorld,
        collider: Arc<ColliderComponent>,
        node: Transform,
        body: RigidBodyComponent,
    }

    impl Fixture {
        fn new() -> Self {
            Self::at(Vec3::new(0.0, 10.0, 0.0))
        }

        fn at(position: Vec3) -> Self {
            let mut world = PhysicsWorld::new();
            let collider = Arc::new(ColliderComponent::cuboid(Vec3::splat(0.5)));
            let node = Transform::from_position(position);
            let mut body = RigidBodyComponent::new();
            body.initialize();
            body.set_collision_shape(&mut world, ShapeRef::new(&collider));
            body.start(&mut world, &node);
            Self {
                world,
                collider,
                node,
                body,
            }
        }

        fn tick(&mut self, dt: f32) {
            self.body.update(&mut self.world, &self.node);
            self.world.step(dt);
            self.body.sync_transform(&mut self.world, &mut self.node);
        }

        fn native(&self) -> &RigidBody {
            let handle = self.body.body_handle().expect("body in world");
            self.world.body(handle.rigid_body).expect("registered")
        }
    }

    #[test]
    fn start_with_shape_enters_world() {
        let f = Fixture::new();
        assert_eq!(f.body.state(), BodyState::InWorld);
        assert_eq!(f.world.body_count(), 1);
        assert!((f.body.position(&f.world).y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn start_without_shape_waits_for_assignment() {
        let mut world = PhysicsWorld::new();
        let mut node = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let mut body = RigidBodyComponent::new();
        body.start(&mut world, &node);
        assert_eq!(body.state(), BodyState::OutOfWorld);
        assert!(body.body_handle().is_none());

        let collider = Arc::new(ColliderComponent::sphere(0.5));
        body.set_collision_shape(&mut world, ShapeRef::new(&collider));
        body.update(&mut world, &node);
        assert_eq!(body.state(), BodyState::InWorld);
        assert_eq!(body.position(&world), Vec3::new(1.0, 2.0, 3.0));

        world.step(DT);
        body.sync_transform(&mut world, &mut node);
        assert!(node.position.y < 2.0);
    }

    #[test]
    fn dropped_collider_defers_insertion() {
        let mut world = PhysicsWorld::new();
        let node = Transform::default();
        let collider = Arc::new(ColliderComponent::sphere(0.5));
        let mut body = RigidBodyComponent::new();
        body.set_collision_shape(&mut world, ShapeRef::new(&collider));
        drop(collider);
        body.start(&mut world, &node);
        assert_eq!(body.state(), BodyState::OutOfWorld);
        assert!(body.collision_shape().is_none());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn degenerate_shape_fails_insertion_and_retries_on_next_shape() {
        let mut world = PhysicsWorld::new();
        let node = Transform::default();
        let flat = Arc::new(ColliderComponent::cuboid(Vec3::new(1.0, 0.0, 1.0)));
        let mut body = RigidBodyComponent::new();
        body.set_collision_shape(&mut world, ShapeRef::new(&flat));
        body.start(&mut world, &node);
        assert_eq!(body.state(), BodyState::OutOfWorld);

        flat.set_shape(CollisionShape::Cuboid {
            half_extents: Vec3::ONE,
        });
        body.set_collision_shape(&mut world, ShapeRef::new(&flat));
        body.update(&mut world, &node);
        assert_eq!(body.state(), BodyState::InWorld);
    }

    #[test]
    fn set_mass_roundtrips_and_preserves_velocity() {
        let mut f = Fixture::new();
        f.body
            .set_linear_velocity(&mut f.world, Vec3::new(3.0, 1.0, -2.0))
            .unwrap();
        f.body
            .set_angular_velocity(&mut f.world, Vec3::new(0.0, 0.5, 0.0))
            .unwrap();
        let before = f.body.linear_velocity(&f.world);

        f.body.set_mass(&mut f.world, 5.0);

        assert_eq!(f.body.mass(), 5.0);
        assert!((f.native().mass() - 5.0).abs() < 1e-4);
        assert!((f.body.linear_velocity(&f.world) - before).length() < 1e-5);
        assert!((f.body.angular_velocity(&f.world) - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        assert_eq!(f.world.body_count(), 1);
    }

    #[test]
    fn non_positive_mass_is_clamped() {
        let mut f = Fixture::new();
        f.body.set_mass(&mut f.world, -3.0);
        assert_eq!(f.body.mass(), MASS_EPSILON);
        f.body.set_mass(&mut f.world, f32::NAN);
        assert_eq!(f.body.mass(), MASS_EPSILON);
        assert_eq!(f.body.state(), BodyState::InWorld);
    }

    #[test]
    fn kinematic_toggle_keeps_user_mass() {
        let mut f = Fixture::new();
        f.body.set_mass(&mut f.world, 7.0);

        f.body.set_kinematic(&mut f.world, true);
        assert!(f.body.is_kinematic());
        assert_eq!(f.body.mass(), 7.0);
        assert_eq!(f.body.effective_mass(), 0.0);
        assert_eq!(f.native().mass(), 0.0);
        assert!(f.native().is_kinematic());

        f.body.set_kinematic(&mut f.world, false);
        assert_eq!(f.body.mass(), 7.0);
        assert!((f.native().mass() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn non_positive_mass_is_clamped_when_turning_dynamic() {
        let mut f = Fixture::new();
        f.body.set_kinematic(&mut f.world, true);
        f.body.set_mass(&mut f.world, -4.0);
        assert_eq!(f.body.mass(), -4.0);

        f.body.set_kinematic(&mut f.world, false);
        assert_eq!(f.body.mass(), MASS_EPSILON);
        assert!((f.native().mass() - MASS_EPSILON).abs() < 1e-6);

        let mut loaded = RigidBodyComponent::new();
        loaded.deserialize(&RigidBodyRecord {
            mass: Some(0.0),
            kinematic: Some(false),
            ..Default::default()
        });
        assert_eq!(loaded.mass(), MASS_EPSILON);
    }

    #[test]
    fn kinematic_body_rejects_velocity_and_forces() {
        let mut f = Fixture::new();
        f.body.set_kinematic(&mut f.world, true);
        assert!(matches!(
            f.body.set_linear_velocity(&mut f.world, Vec3::X),
            Err(RigidBodyError::StaleHandleAccess { .. })
        ));
        assert!(matches!(
            f.body
                .apply_force_at_position(&mut f.world, Vec3::X, Vec3::ZERO, ForceMode::Impulse),
            Err(RigidBodyError::StaleHandleAccess { .. })
        ));
    }

    #[test]
    fn kinematic_body_moves_by_pose_and_ignores_gravity() {
        let mut f = Fixture::new();
        f.body.set_kinematic(&mut f.world, true);
        for _ in 0..10 {
            f.tick(DT);
        }
        assert!((f.node.position.y - 10.0).abs() < 1e-5);

        f.body.set_position(&mut f.world, Vec3::new(4.0, 5.0, 6.0));
        f.tick(DT);
        assert!((f.node.position - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-5);
        assert_eq!(f.body.effective_gravity(&f.world), Vec3::ZERO);
    }

    #[test]
    fn force_accumulates_for_one_step_only() {
        let mut f = Fixture::new();
        f.body.set_use_gravity(&mut f.world, false);
        f.body.set_mass(&mut f.world, 2.0);
        f.body
            .apply_force(&mut f.world, Vec3::new(4.0, 0.0, 0.0), ForceMode::Force)
            .unwrap();
        assert!(f.body.linear_velocity(&f.world).length() < 1e-6);

        f.tick(0.1);
        // v = F / m * dt
        assert!((f.body.linear_velocity(&f.world).x - 0.2).abs() < 1e-3);

        f.tick(0.1);
        assert!((f.body.linear_velocity(&f.world).x - 0.2).abs() < 1e-3);
    }

    #[test]
    fn impulse_changes_velocity_immediately() {
        let mut f = Fixture::new();
        f.body.set_mass(&mut f.world, 2.0);
        f.body
            .apply_force(&mut f.world, Vec3::new(4.0, 0.0, 0.0), ForceMode::Impulse)
            .unwrap();
        assert!((f.body.linear_velocity(&f.world) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn force_at_position_adds_torque() {
        let mut f = Fixture::new();
        let above_center = f.body.position(&f.world) + Vec3::Y;
        f.body
            .apply_force_at_position(&mut f.world, Vec3::X, above_center, ForceMode::Impulse)
            .unwrap();
        // r = +Y, F = +X  =>  torque along -Z
        assert!(f.body.angular_velocity(&f.world).z < 0.0);
        assert!(f.body.linear_velocity(&f.world).x > 0.0);
    }

    #[test]
    fn force_at_position_torque_scales_with_step() {
        let spin = |dt: f32| {
            let mut f = Fixture::new();
            f.body.set_use_gravity(&mut f.world, false);
            let above_center = f.body.position(&f.world) + Vec3::Y;
            f.body
                .apply_force_at_position(&mut f.world, Vec3::X, above_center, ForceMode::Force)
                .unwrap();
            assert!(f.body.angular_velocity(&f.world).length() < 1e-6);
            f.tick(dt);
            f.body.angular_velocity(&f.world).z
        };

        let short = spin(0.05);
        let long = spin(0.1);
        // Unit cube of mass 1: I = 1/6, torque -1 about Z.
        assert!((short + 0.05 * 6.0).abs() < 0.01, "short step {}", short);
        assert!((long / short - 2.0).abs() < 0.02);
    }

    #[test]
    fn torque_impulse_spins_body() {
        let mut f = Fixture::new();
        f.body
            .apply_torque(&mut f.world, Vec3::Y, ForceMode::Impulse)
            .unwrap();
        assert!(f.body.angular_velocity(&f.world).y > 0.0);
    }

    #[test]
    fn clear_forces_discards_pending_force() {
        let mut f = Fixture::new();
        f.body.set_use_gravity(&mut f.world, false);
        f.body
            .apply_force(&mut f.world, Vec3::new(100.0, 0.0, 0.0), ForceMode::Force)
            .unwrap();
        f.body.clear_forces(&mut f.world).unwrap();
        f.tick(DT);
        assert!(f.body.linear_velocity(&f.world).length() < 1e-6);
    }

    #[test]
    fn gravity_disabled_means_no_fall() {
        let mut f = Fixture::new();
        f.body.set_gravity(&mut f.world, Vec3::new(0.0, -20.0, 0.0));
        f.body.set_use_gravity(&mut f.world, false);
        for _ in 0..30 {
            f.tick(DT);
        }
        assert!((f.node.position.y - 10.0).abs() < 1e-6);
        assert_eq!(f.body.effective_gravity(&f.world), Vec3::ZERO);
    }

    #[test]
    fn custom_gravity_overrides_world() {
        let mut f = Fixture::new();
        f.body.set_gravity(&mut f.world, Vec3::new(0.0, -1.0, 0.0));
        for _ in 0..60 {
            f.tick(DT);
        }
        assert!((f.body.linear_velocity(&f.world).y + 1.0).abs() < 0.02);

        f.body.clear_gravity_override(&mut f.world);
        assert!((f.body.effective_gravity(&f.world).y + 9.81).abs() < 1e-6);
    }

    #[test]
    fn position_lock_holds_axis_while_others_fall_freely() {
        let gravity = Vec3::new(2.0, -9.81, -1.0);
        let mut locked = Fixture::at(Vec3::new(0.0, 10.0, 0.0));
        let mut free = Fixture::at(Vec3::new(0.0, 10.0, 0.0));
        locked.body.set_gravity(&mut locked.world, gravity);
        free.body.set_gravity(&mut free.world, gravity);
        locked.body.set_position_lock(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(locked.body.position_lock(), Vec3::new(0.0, 1.0, 0.0));

        for _ in 0..60 {
            locked.tick(DT);
            free.tick(DT);
        }

        assert!((locked.node.position.y - 10.0).abs() < 1e-4);
        assert!(free.node.position.y < 6.0);
        assert!((locked.node.position.x - free.node.position.x).abs() < 1e-3);
        assert!((locked.node.position.z - free.node.position.z).abs() < 1e-3);
        assert!(locked.node.position.x > 0.5);
        assert!(locked.body.linear_velocity(&locked.world).y.abs() < 1e-6);
    }

    #[test]
    fn position_lock_engaged_mid_flight_holds_current_value() {
        let mut f = Fixture::new();
        for _ in 0..30 {
            f.tick(DT);
        }
        let y = f.node.position.y;
        assert!(y < 10.0);
        f.body.set_position_lock(true);
        for _ in 0..30 {
            f.tick(DT);
        }
        assert!((f.node.position.y - y).abs() < 1e-4);

        f.body.set_position_lock(false);
        f.tick(DT);
        assert!(f.node.position.y < y);
    }

    #[test]
    fn rotation_lock_holds_orientation() {
        let mut f = Fixture::new();
        f.body.set_use_gravity(&mut f.world, false);
        f.body.set_rotation_lock(true);
        assert_eq!(f.body.rotation_lock(), Vec3::ONE);
        f.body
            .apply_torque(&mut f.world, Vec3::new(1.0, 2.0, 3.0), ForceMode::Impulse)
            .unwrap();
        for _ in 0..10 {
            f.tick(DT);
        }
        assert!(f.node.rotation.angle_between(Quat::IDENTITY) < 1e-4);
        assert!(f.body.angular_velocity(&f.world).length() < 1e-6);
    }

    #[test]
    fn single_rotation_axis_lock_allows_other_axes() {
        let mut f = Fixture::new();
        f.body.set_use_gravity(&mut f.world, false);
        f.body.set_rotation_lock(Vec3::new(1.0, 0.0, 1.0));
        f.body
            .apply_torque(&mut f.world, Vec3::new(0.2, 0.2, 0.2), ForceMode::Impulse)
            .unwrap();
        for _ in 0..5 {
            f.tick(DT);
        }
        let angvel = f.body.angular_velocity(&f.world);
        assert_eq!(angvel.x, 0.0);
        assert_eq!(angvel.z, 0.0);
        assert!(angvel.y > 0.0);
    }

    #[test]
    fn upright_lock_lets_yaw_pass_quarter_and_half_turn() {
        let mut f = Fixture::new();
        f.body.set_use_gravity(&mut f.world, false);
        f.body.set_rotation_lock(Vec3::new(1.0, 0.0, 1.0));
        f.body
            .set_angular_velocity(&mut f.world, Vec3::new(0.0, 2.0, 0.0))
            .unwrap();

        // rot_y(a) * X = (cos a, 0, -sin a)
        for _ in 0..60 {
            f.tick(DT);
        }
        let forward = f.node.rotation * Vec3::X;
        assert!(forward.x < -0.2, "yaw stuck below a quarter turn: {:?}", forward);
        assert!((f.node.rotation * Vec3::Y - Vec3::Y).length() < 1e-4);

        for _ in 0..60 {
            f.tick(DT);
        }
        let forward = f.node.rotation * Vec3::X;
        assert!(forward.z > 0.3, "yaw stuck below a half turn: {:?}", forward);
        assert!((f.node.rotation * Vec3::Y - Vec3::Y).length() < 1e-4);
        assert!(f.body.angular_velocity(&f.world).y > 1.5);
    }

    #[test]
    fn set_collision_shape_preserves_pose_and_velocity() {
        let mut f = Fixture::new();
        f.body
            .set_rotation(&mut f.world, Quat::from_rotation_y(0.7));
        f.body
            .set_linear_velocity(&mut f.world, Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        for _ in 0..5 {
            f.tick(DT);
        }
        let old_handle = f.body.body_handle().unwrap();
        let position = f.body.position(&f.world);
        let rotation = f.body.rotation(&f.world);
        let velocity = f.body.linear_velocity(&f.world);

        let sphere = Arc::new(ColliderComponent::sphere(0.75));
        f.body.set_collision_shape(&mut f.world, ShapeRef::new(&sphere));

        assert_eq!(f.body.state(), BodyState::InWorld);
        assert!(!f.world.contains(old_handle.rigid_body));
        assert_eq!(f.world.body_count(), 1);
        assert_eq!(f.body.shape_identity(), Some(sphere.shape_id()));
        assert!((f.body.position(&f.world) - position).length() < 1e-5);
        assert!(f.body.rotation(&f.world).angle_between(rotation) < 1e-4);
        assert!((f.body.linear_velocity(&f.world) - velocity).length() < 1e-5);
    }

    #[test]
    fn collider_scale_is_baked_into_native_shape() {
        let mut f = Fixture::new();
        f.collider.set_scale(Vec3::splat(2.0));
        f.body
            .set_collision_shape(&mut f.world, ShapeRef::new(&f.collider));
        let handle = f.body.body_handle().unwrap();
        let cuboid = f.world.collider_set[handle.collider]
            .shape()
            .as_cuboid()
            .unwrap();
        assert!((cuboid.half_extents.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn drag_and_restitution_apply_in_place() {
        let mut f = Fixture::new();
        let handle = f.body.body_handle().unwrap();
        f.body.set_drag(&mut f.world, 0.5);
        f.body.set_angular_drag(&mut f.world, -1.0);
        f.body.set_restitution(&mut f.world, 1.5);

        assert_eq!(f.body.body_handle(), Some(handle));
        assert_eq!(f.native().linear_damping(), 0.5);
        assert_eq!(f.body.angular_drag(), 0.0);
        assert_eq!(f.body.restitution(), 1.0);
        assert_eq!(f.world.collider_set[handle.collider].restitution(), 1.0);
    }

    #[test]
    fn set_position_teleports_without_touching_velocity() {
        let mut f = Fixture::new();
        f.body
            .set_linear_velocity(&mut f.world, Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        f.body.set_position(&mut f.world, Vec3::new(-5.0, 1.0, 0.0));
        assert_eq!(f.body.position(&f.world), Vec3::new(-5.0, 1.0, 0.0));
        assert!((f.body.linear_velocity(&f.world) - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn sync_writes_pose_into_node() {
        let mut f = Fixture::new();
        for _ in 0..20 {
            f.tick(DT);
        }
        assert!(f.node.position.y < 10.0);
        assert_eq!(f.node.position, f.body.position(&f.world));
    }

    #[test]
    fn remove_unregisters_and_turns_calls_into_noops() {
        let mut f = Fixture::new();
        let handle = f.body.body_handle().unwrap();
        f.body.remove(&mut f.world);

        assert_eq!(f.body.state(), BodyState::Uninitialized);
        assert!(!f.world.contains(handle.rigid_body));
        assert_eq!(f.world.body_count(), 0);
        assert!(f.body.collision_shape().is_none());
        // The collider is not owned by the body.
        assert_eq!(Arc::strong_count(&f.collider), 1);

        assert!(matches!(
            f.body.apply_force(&mut f.world, Vec3::X, ForceMode::Force),
            Err(RigidBodyError::StaleHandleAccess { .. })
        ));
        assert!(f.body.set_linear_velocity(&mut f.world, Vec3::X).is_err());
        assert!(f.body.apply_torque(&mut f.world, Vec3::X, ForceMode::Impulse).is_err());
        assert!(f.body.clear_forces(&mut f.world).is_err());
    }

    #[test]
    fn serialize_roundtrip_restores_properties() {
        let mut f = Fixture::new();
        f.body.set_mass(&mut f.world, 12.5);
        f.body.set_drag(&mut f.world, 0.3);
        f.body.set_angular_drag(&mut f.world, 0.9);
        f.body.set_restitution(&mut f.world, 0.4);
        f.body.set_gravity(&mut f.world, Vec3::new(0.0, -3.0, 0.0));
        f.body.set_use_gravity(&mut f.world, false);
        f.body.set_kinematic(&mut f.world, true);
        f.body.set_position_lock(Vec3::new(1.0, 0.0, 1.0));
        f.body.set_rotation_lock(true);

        let text = f.body.serialize().to_ron().unwrap();
        let record = RigidBodyRecord::from_ron(&text).unwrap();

        let mut loaded = RigidBodyComponent::new();
        loaded.deserialize(&record);
        assert_eq!(loaded.properties(), f.body.properties());
        assert_eq!(loaded.shape_identity(), Some(f.collider.shape_id()));
        assert_eq!(loaded.effective_gravity(&f.world), Vec3::ZERO);
        assert_eq!(loaded.state(), BodyState::Uninitialized);
        assert_eq!(loaded.serialize(), record);
    }

    #[test]
    fn deserialize_defaults_missing_fields() {
        let mut body = RigidBodyComponent::new();
        body.set_position_lock(true);
        body.deserialize(&RigidBodyRecord {
            drag: Some(0.25),
            restitution: Some(-2.0),
            ..Default::default()
        });
        let expected = RigidBodyProperties {
            drag: 0.25,
            ..Default::default()
        };
        assert_eq!(body.properties(), &expected);
        assert_eq!(body.shape_identity(), None);
    }

    #[test]
    fn deserialize_in_world_rebuilds_at_next_update() {
        let mut f = Fixture::new();
        f.body.deserialize(&RigidBodyRecord {
            mass: Some(4.0),
            ..Default::default()
        });
        assert!((f.native().mass() - 1.0).abs() < 1e-4);
        f.body.update(&mut f.world, &f.node);
        assert!((f.native().mass() - 4.0).abs() < 1e-4);
        assert_eq!(f.world.body_count(), 1);
    }
}
