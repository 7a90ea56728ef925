//! Core gameplay for the physics sandbox.
//!
//! This crate provides:
//! - The player character controller (ground/air movement, jumping, landing friction)
//! - Keyboard intent mapping
//! - Sandbox configuration loading
//! - Scene visuals and a follow camera
//!
//! [`SandboxPlugin`] wires the controller into the fixed-step loop:
//! input → physics step (contacts delivered) → controller update.

use bevy::prelude::*;
use sandbox_physics::{
    BodyOverrides, ContactMessage, PhysicsPlugin, PhysicsSystems, PhysicsWorld, RigidBodyLink,
};

pub mod character_controller;
pub mod config;
pub mod input;
pub mod scene;

pub use character_controller::{
    limit_horizontal_speed, CharacterController, ControllerState, MoveDirection, MovementParams,
    PLAYER_BODY,
};
pub use config::{load_config, save_config, ConfigError, ConfigResult, SandboxConfig};
pub use input::{apply_intent, held_intents, ControlIntent, KeyBindings};
pub use scene::{FollowCamera, SceneVisualsPlugin};

/// Player, props and the per-tick controller loop.
#[derive(Default)]
pub struct SandboxPlugin {
    pub config: SandboxConfig,
}

impl SandboxPlugin {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        // One FixedUpdate tick is one physics step.
        app.insert_resource(Time::<Fixed>::from_seconds(
            self.config.physics.timestep as f64,
        ))
        .insert_resource(PhysicsWorld::new(self.config.physics.clone()))
        .insert_resource(self.config.clone())
        .init_resource::<KeyBindings>()
        .add_plugins(PhysicsPlugin)
        .add_systems(Startup, setup_world)
        .add_systems(
            FixedUpdate,
            (
                player_input_system.before(PhysicsSystems::Step),
                (dispatch_contacts, update_controllers)
                    .chain()
                    .after(PhysicsSystems::Step),
            ),
        );
    }
}

/// Registers the configured props and the player, each with a linked entity.
pub fn setup_world(
    mut commands: Commands,
    config: Res<SandboxConfig>,
    mut physics: ResMut<PhysicsWorld>,
) {
    for name in &config.props {
        let handle = physics.add_body(name, BodyOverrides::default());
        commands.spawn((
            Name::new(name.clone()),
            Transform::default(),
            RigidBodyLink(handle),
        ));
    }

    let controller = CharacterController::spawn(&mut physics, config.movement.clone());
    commands.spawn((
        Name::new(PLAYER_BODY),
        Transform::default(),
        RigidBodyLink(controller.body()),
        controller,
    ));
    info!(
        "Sandbox ready: {} bodies, props {:?}",
        physics.body_count(),
        config.props
    );
}

fn player_input_system(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<KeyBindings>,
    mut physics: ResMut<PhysicsWorld>,
    mut controllers: Query<&mut CharacterController>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    let intents = held_intents(&keyboard, &bindings);
    if intents.is_empty() {
        return;
    }

    for mut controller in controllers.iter_mut() {
        let Some(body) = physics.body_mut(controller.body()) else {
            continue;
        };
        for intent in &intents {
            apply_intent(&mut controller, body, *intent);
        }
    }
}

fn dispatch_contacts(
    mut contacts: MessageReader<ContactMessage>,
    mut controllers: Query<&mut CharacterController>,
) {
    for ContactMessage(contact) in contacts.read() {
        for mut controller in controllers.iter_mut() {
            controller.handle_contact(contact);
        }
    }
}

fn update_controllers(
    mut physics: ResMut<PhysicsWorld>,
    mut controllers: Query<&mut CharacterController>,
) {
    let now = physics.elapsed();
    for mut controller in controllers.iter_mut() {
        let Some(body) = physics.body_mut(controller.body()) else {
            continue;
        };
        controller.update(body, now);
    }
}
