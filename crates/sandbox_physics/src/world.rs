//! The physics world: a named-body registry over a raw rapier pipeline.
//!
//! ## Usage
//!
//! ```ignore
//! use sandbox_physics::{BodyOverrides, PhysicsWorld};
//!
//! let mut world = PhysicsWorld::default();
//! world.add_body("platform-1", BodyOverrides::default());
//! let player = world.add_body("player", BodyOverrides::default());
//!
//! // Once per tick
//! world.update_with(&mut |contact: &ContactRecord| {
//!     if contact.body == player { /* ... */ }
//! });
//! ```
//!
//! Bodies are created from [`BodyPreset`]s keyed by name. Asking for a name
//! twice returns the same body. Forces applied between steps act for one
//! step only, then are cleared.

use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::*;
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::prelude as rapier;
use rapier::nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::contact::{ContactListener, ContactRecord};
use crate::convert::{to_vec3, to_vector};

pub type BodyHandle = rapier::RigidBodyHandle;

/// World-wide simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration (default: -9.82 on Y).
    pub gravity: [f32; 3],
    /// Seconds advanced by one `update()` (default: 1/60).
    pub timestep: f32,
    /// Friction of every collider.
    pub friction: f32,
    /// Restitution of every collider.
    pub restitution: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            timestep: 1.0 / 60.0,
            friction: 0.1,
            restitution: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Never moves; platforms and walls.
    Fixed,
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

/// Everything needed to build a named body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPreset {
    pub kind: BodyKind,
    pub shape: BodyShape,
    /// Ignored for fixed bodies.
    pub mass: f32,
    pub position: Vec3,
}

impl BodyPreset {
    pub fn fixed_cuboid(half_extents: Vec3, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Fixed,
            shape: BodyShape::Cuboid { half_extents },
            mass: 0.0,
            position,
        }
    }

    pub fn dynamic_cuboid(half_extents: Vec3, mass: f32, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: BodyShape::Cuboid { half_extents },
            mass,
            position,
        }
    }

    pub fn dynamic_ball(radius: f32, mass: f32, position: Vec3) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: BodyShape::Ball { radius },
            mass,
            position,
        }
    }

    /// Presets for the sandbox scene.
    pub fn defaults() -> HashMap<String, BodyPreset> {
        HashMap::from([
            (
                "platform-1".to_owned(),
                Self::fixed_cuboid(Vec3::new(50.0, 0.5, 50.0), Vec3::new(0.0, -0.5, 0.0)),
            ),
            (
                "dynamic-box-1".to_owned(),
                Self::dynamic_cuboid(Vec3::ONE, 5.0, Vec3::new(1.0, 10.0, 0.0)),
            ),
            (
                "sphere-1".to_owned(),
                Self::dynamic_ball(1.0, 5.0, Vec3::new(0.0, 7.0, 0.0)),
            ),
            (
                "player".to_owned(),
                Self::dynamic_cuboid(Vec3::ONE, 5.0, Vec3::new(0.0, 5.0, 0.0)),
            ),
        ])
    }

    /// Used for names without a preset.
    pub fn fallback() -> Self {
        Self::dynamic_cuboid(Vec3::ONE, 5.0, Vec3::ZERO)
    }

    pub fn with_overrides(mut self, overrides: &BodyOverrides) -> Self {
        if let Some(size) = overrides.size {
            self.shape = match self.shape {
                BodyShape::Cuboid { .. } => BodyShape::Cuboid { half_extents: size },
                BodyShape::Ball { .. } => BodyShape::Ball { radius: size.x },
            };
        }
        if let Some(position) = overrides.position {
            self.position = position;
        }
        self
    }
}

/// Per-call tweaks to a preset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyOverrides {
    /// Cuboid half extents, or the radius (`x`) of a ball.
    pub size: Option<Vec3>,
    pub position: Option<Vec3>,
}

impl BodyOverrides {
    pub fn at(position: Vec3) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }
}

#[derive(Resource)]
pub struct PhysicsWorld {
    pub gravity: Vector3<f32>,
    pub integration_parameters: rapier::IntegrationParameters,
    pub physics_pipeline: rapier::PhysicsPipeline,
    pub island_manager: rapier::IslandManager,
    pub broad_phase: rapier::DefaultBroadPhase,
    pub narrow_phase: rapier::NarrowPhase,
    pub rigid_body_set: rapier::RigidBodySet,
    pub collider_set: rapier::ColliderSet,
    pub impulse_joint_set: rapier::ImpulseJointSet,
    pub multibody_joint_set: rapier::MultibodyJointSet,
    pub ccd_solver: rapier::CCDSolver,
    friction: f32,
    restitution: f32,
    presets: HashMap<String, BodyPreset>,
    names: HashMap<String, BodyHandle>,
    event_collector: rapier::ChannelEventCollector,
    collision_recv: Receiver<rapier::CollisionEvent>,
    elapsed: Duration,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let (collision_send, collision_recv) = unbounded();
        // Contact force events are never enabled on our colliders.
        let (contact_force_send, _) = unbounded();

        let integration_parameters = rapier::IntegrationParameters {
            dt: config.timestep,
            ..Default::default()
        };
        let [gx, gy, gz] = config.gravity;

        Self {
            gravity: to_vector(Vec3::new(gx, gy, gz)),
            integration_parameters,
            physics_pipeline: rapier::PhysicsPipeline::new(),
            island_manager: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            rigid_body_set: rapier::RigidBodySet::new(),
            collider_set: rapier::ColliderSet::new(),
            impulse_joint_set: rapier::ImpulseJointSet::new(),
            multibody_joint_set: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            friction: config.friction,
            restitution: config.restitution,
            presets: BodyPreset::defaults(),
            names: HashMap::new(),
            event_collector: rapier::ChannelEventCollector::new(collision_send, contact_force_send),
            collision_recv,
            elapsed: Duration::ZERO,
        }
    }

    /// Registers (or replaces) the preset used for `name`.
    /// Bodies already created under that name are unaffected.
    pub fn register_preset(&mut self, name: impl Into<String>, preset: BodyPreset) {
        self.presets.insert(name.into(), preset);
    }

    /// Creates the body called `name`, or returns it if it already exists.
    pub fn add_body(&mut self, name: &str, overrides: BodyOverrides) -> BodyHandle {
        if let Some(&handle) = self.names.get(name) {
            return handle;
        }

        let preset = match self.presets.get(name) {
            Some(preset) => preset.clone(),
            None => {
                debug!("No preset for body '{}', using a dynamic box", name);
                BodyPreset::fallback()
            }
        }
        .with_overrides(&overrides);

        let builder = match preset.kind {
            BodyKind::Fixed => rapier::RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => rapier::RigidBodyBuilder::dynamic(),
        };
        let handle = self
            .rigid_body_set
            .insert(builder.translation(to_vector(preset.position)));

        let mut collider = match preset.shape {
            BodyShape::Cuboid { half_extents: h } => rapier::ColliderBuilder::cuboid(h.x, h.y, h.z),
            BodyShape::Ball { radius } => rapier::ColliderBuilder::ball(radius),
        }
        .friction(self.friction)
        .restitution(self.restitution)
        .active_events(rapier::ActiveEvents::COLLISION_EVENTS);
        if preset.kind == BodyKind::Dynamic {
            collider = collider.mass(preset.mass);
        }
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.names.insert(name.to_owned(), handle);
        debug!(
            "Added body '{}' ({:?} {:?}) at {}",
            name, preset.kind, preset.shape, preset.position
        );
        handle
    }

    pub fn handle(&self, name: &str) -> Option<BodyHandle> {
        self.names.get(name).copied()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&rapier::RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut rapier::RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Simulated time: steps taken times the timestep.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Advances one step, discarding contacts.
    pub fn update(&mut self) {
        self.update_with(&mut |_: &ContactRecord| {});
    }

    /// Advances one step, then reports every contact that started during it.
    pub fn update_with<L: ContactListener + ?Sized>(&mut self, listener: &mut L) {
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
            &self.event_collector,
        );

        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
        self.elapsed += Duration::from_secs_f32(self.integration_parameters.dt);

        while let Ok(event) = self.collision_recv.try_recv() {
            if let rapier::CollisionEvent::Started(c1, c2, _) = event {
                self.dispatch_started(c1, c2, listener);
            }
        }
    }

    fn parent_of(&self, collider: rapier::ColliderHandle) -> Option<BodyHandle> {
        self.collider_set.get(collider)?.parent()
    }

    fn dispatch_started<L: ContactListener + ?Sized>(
        &self,
        c1: rapier::ColliderHandle,
        c2: rapier::ColliderHandle,
        listener: &mut L,
    ) {
        let (Some(b1), Some(b2)) = (self.parent_of(c1), self.parent_of(c2)) else {
            return;
        };

        // Oriented from c1 toward c2.
        let normal = self.narrow_phase.contact_pair(c1, c2).and_then(|pair| {
            let manifold = pair.manifolds.iter().find(|m| !m.points.is_empty())?;
            let n = to_vec3(&manifold.data.normal);
            Some(if pair.collider1 == c1 { n } else { -n })
        });

        listener.on_contact(&ContactRecord {
            body: b2,
            other: b1,
            normal,
            at: self.elapsed,
        });
        listener.on_contact(&ContactRecord {
            body: b1,
            other: b2,
            normal: normal.map(|n| -n),
            at: self.elapsed,
        });
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ControlledBody;

    #[test]
    fn test_add_body_reuses_existing_name() {
        let mut world = PhysicsWorld::default();
        let a = world.add_body("sphere-1", BodyOverrides::default());
        let b = world.add_body("sphere-1", BodyOverrides::at(Vec3::new(9.0, 9.0, 9.0)));

        assert_eq!(a, b);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.handle("sphere-1"), Some(a));
    }

    #[test]
    fn test_add_body_applies_preset_and_overrides() {
        let mut world = PhysicsWorld::default();
        let box_handle = world.add_body("dynamic-box-1", BodyOverrides::default());
        let moved = world.add_body("player", BodyOverrides::at(Vec3::new(2.0, 3.0, 4.0)));

        let box_body = world.body(box_handle).unwrap();
        assert_eq!(box_body.world_position(), Vec3::new(1.0, 10.0, 0.0));
        assert!(box_body.is_dynamic());
        assert_eq!(
            world.body(moved).unwrap().world_position(),
            Vec3::new(2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn test_size_override_sets_ball_radius() {
        let preset = BodyPreset::dynamic_ball(1.0, 5.0, Vec3::ZERO).with_overrides(&BodyOverrides {
            size: Some(Vec3::splat(2.5)),
            position: None,
        });
        assert_eq!(preset.shape, BodyShape::Ball { radius: 2.5 });
    }

    #[test]
    fn test_unknown_name_falls_back_to_dynamic_box() {
        let mut world = PhysicsWorld::default();
        let handle = world.add_body("crate-7", BodyOverrides::default());
        assert!(world.body(handle).unwrap().is_dynamic());
    }

    #[test]
    fn test_platform_is_fixed() {
        let mut world = PhysicsWorld::default();
        let handle = world.add_body("platform-1", BodyOverrides::default());
        assert!(world.body(handle).unwrap().is_fixed());
    }

    #[test]
    fn test_update_advances_clock() {
        let mut world = PhysicsWorld::default();
        for _ in 0..60 {
            world.update();
        }
        let elapsed = world.elapsed().as_secs_f32();
        assert!((elapsed - 1.0).abs() < 1e-3, "elapsed = {}", elapsed);
    }

    #[test]
    fn test_forces_last_one_step() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: [0.0, 0.0, 0.0],
            ..Default::default()
        });
        let handle = world.add_body("player", BodyOverrides::default());
        world
            .body_mut(handle)
            .unwrap()
            .apply_central_force(Vec3::new(30.0, 0.0, 0.0));

        world.update();
        let after_push = world.body(handle).unwrap().velocity().x;
        world.update();
        let after_coast = world.body(handle).unwrap().velocity().x;

        assert!(after_push > 0.0);
        assert!((after_coast - after_push).abs() < 1e-5);
    }

    #[test]
    fn test_landing_reports_upward_normal_to_faller() {
        let mut world = PhysicsWorld::default();
        let platform = world.add_body("platform-1", BodyOverrides::default());
        let player = world.add_body("player", BodyOverrides::at(Vec3::new(0.0, 2.0, 0.0)));

        let mut records = Vec::new();
        for _ in 0..240 {
            world.update_with(&mut |contact: &ContactRecord| records.push(*contact));
            if !records.is_empty() {
                break;
            }
        }

        let landed = records
            .iter()
            .find(|r| r.body == player)
            .expect("player should touch the platform");
        assert_eq!(landed.other, platform);
        assert!(landed.normal.unwrap().y > 0.5);

        let floor_side = records.iter().find(|r| r.body == platform).unwrap();
        assert!(floor_side.normal.unwrap().y < -0.5);
    }
}
