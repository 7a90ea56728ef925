//! Rigid-body physics for the sandbox.
//!
//! Wraps a raw `rapier3d` pipeline behind [`PhysicsWorld`]:
//! - Named body registry with shape/placement presets
//! - Fixed-step simulation with a monotonic clock
//! - Explicit contact callbacks ([`ContactListener`]) carrying oriented normals
//! - An engine-independent body contract ([`ControlledBody`]) for controllers
//!
//! The bevy side is thin: [`PhysicsPlugin`] steps the world on the fixed
//! schedule and copies body transforms onto linked entities every frame.

use bevy::prelude::*;

pub mod body;
pub mod contact;
pub mod convert;
pub mod debug_render;
pub mod world;

pub use body::ControlledBody;
pub use contact::{ContactListener, ContactMessage, ContactRecord};
pub use debug_render::{PhysicsDebugPlugin, PhysicsDebugRender};
pub use world::{
    BodyHandle, BodyKind, BodyOverrides, BodyPreset, BodyShape, PhysicsConfig, PhysicsWorld,
};

pub use rapier3d;

/// Ordering labels for the physics systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSystems {
    /// Advances the world one fixed step and publishes contacts.
    Step,
    /// Copies body transforms onto rendered entities.
    Sync,
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsWorld>()
            .add_message::<ContactMessage>()
            .add_systems(FixedUpdate, step_physics.in_set(PhysicsSystems::Step))
            .add_systems(Update, sync_transforms.in_set(PhysicsSystems::Sync));
    }
}

/// Links a Bevy entity to a Rapier rigid body
#[derive(Component, Debug, Clone, Copy)]
pub struct RigidBodyLink(pub BodyHandle);

fn step_physics(mut physics: ResMut<PhysicsWorld>, mut contacts: MessageWriter<ContactMessage>) {
    physics.update_with(&mut |contact: &ContactRecord| {
        contacts.write(ContactMessage(*contact));
    });
}

fn sync_transforms(physics: Res<PhysicsWorld>, mut query: Query<(&RigidBodyLink, &mut Transform)>) {
    for (link, mut transform) in query.iter_mut() {
        if let Some(body) = physics.body(link.0) {
            transform.translation = convert::to_vec3(body.translation());
            transform.rotation = convert::to_quat(body.rotation());
        }
    }
}
