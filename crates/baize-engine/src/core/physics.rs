use glam::Vec3;
use rapier3d::prelude::*;
use std::sync::Mutex;

use crate::core::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private), glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn vec3_to_na_point(v: Vec3) -> nalgebra::Point3<f32> {
    nalgebra::Point3::new(v.x, v.y, v.z)
}

fn na_to_vec3(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_x: f32, half_y: f32, half_z: f32 },
    /// Y-axis aligned cylinder (used for pocket trigger volumes).
    CylinderY { half_height: f32, radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_x, half_y, half_z } => {
                ColliderBuilder::cuboid(half_x, half_y, half_z)
            }
            ColliderDesc::CylinderY { half_height, radius } => {
                ColliderBuilder::cylinder(half_height, radius)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ccd: bool,
    /// Sensor colliders report intersections without colliding.
    pub sensor: bool,
    /// Create the body asleep; it stays at rest until woken or hit.
    pub asleep: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            ccd: false,
            sensor: false,
            asleep: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            ccd: false,
            sensor: false,
            asleep: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Mark the collider as a pure intersection sensor (no collision response).
    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    /// Create the body in the sleeping state.
    pub fn with_asleep(mut self, asleep: bool) -> Self {
        self.asleep = asleep;
        self
    }

    /// Set the linear damping (velocity decay). Higher values slow the body
    /// faster. This is what makes balls slow down on the felt.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set the angular damping (rotation decay). Rolling balls keep angular
    /// motion longer than linear motion, so this is tuned separately.
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

/// Handle pair stored per game object, referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A "two bodies began (or stopped) touching" event.
///
/// Sensor intersections are delivered through the same channel as solid
/// contacts; the caller decides which pairs it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyContact {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the contact just started, `false` when it ended.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.collisions.lock().unwrap())
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().unwrap().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // We don't use contact force events but the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier3D boilerplate into a single, easy-to-use struct.
///
/// This is the entire simulation boundary: the game layer only ever creates
/// and removes bodies, applies impulses, teleports, and reads velocities and
/// positions back out.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector
    /// (e.g. `Vec3::new(0.0, -9.82, 0.0)` for a table in the XZ plane).
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: vec3_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for contact lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec3_to_na(desc.position))
            .linvel(vec3_to_na(desc.velocity))
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .sleeping(desc.asleep)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect contact events into the provided Vec.
    pub fn step_into(&mut self, contact_events: &mut Vec<BodyContact>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Drain collision events and resolve entity IDs from user_data
        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                contact_events.push(BodyContact {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    /// Apply an instantaneous impulse at a world-space point. The body is
    /// woken if it was asleep. Hitting off-center imparts angular motion.
    pub fn apply_impulse_at_point(&mut self, body: &PhysicsBody, impulse: Vec3, point: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse_at_point(vec3_to_na(impulse), vec3_to_na_point(point), true);
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec3_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.linvel()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Get the current angular velocity of a body.
    pub fn angular_velocity(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.angvel()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Move a body to a new position with zeroed velocities, waking it so the
    /// solver notices the change.
    pub fn teleport(&mut self, body: &PhysicsBody, pos: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec3_to_na(pos), true);
            rb.set_linvel(nalgebra::Vector3::zeros(), true);
            rb.set_angvel(nalgebra::Vector3::zeros(), true);
        }
    }

    /// Get the current position of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(&rb.position().translation.vector))
            .unwrap_or(Vec3::ZERO)
    }

    /// Put a body to sleep (zero velocities, excluded from integration).
    pub fn sleep(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.sleep();
        }
    }

    /// Wake a sleeping body.
    pub fn wake(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.wake_up(true);
        }
    }

    /// Whether the body is currently asleep.
    pub fn is_sleeping(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.is_sleeping())
            .unwrap_or(false)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
