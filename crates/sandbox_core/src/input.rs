//! Keyboard to controller intents.
//!
//! Input is sampled, not buffered: each fixed tick looks at which keys are
//! held and issues the matching controller calls once.

use bevy::prelude::*;
use sandbox_physics::ControlledBody;

use crate::character_controller::{CharacterController, MoveDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlIntent {
    RotateLeft,
    RotateRight,
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
}

impl ControlIntent {
    /// All intents, in the order they are applied within a tick.
    pub const ALL: [ControlIntent; 7] = [
        ControlIntent::RotateLeft,
        ControlIntent::RotateRight,
        ControlIntent::MoveForward,
        ControlIntent::MoveBackward,
        ControlIntent::MoveLeft,
        ControlIntent::MoveRight,
        ControlIntent::Jump,
    ];
}

/// Keys bound to each intent. Any listed key triggers it.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub rotate_left: Vec<KeyCode>,
    pub rotate_right: Vec<KeyCode>,
    pub move_forward: Vec<KeyCode>,
    pub move_backward: Vec<KeyCode>,
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            rotate_left: vec![KeyCode::ArrowLeft],
            rotate_right: vec![KeyCode::ArrowRight],
            move_forward: vec![KeyCode::KeyW],
            move_backward: vec![KeyCode::KeyS],
            move_left: vec![KeyCode::KeyA],
            move_right: vec![KeyCode::KeyD],
            jump: vec![KeyCode::Space],
        }
    }
}

impl KeyBindings {
    pub fn keys(&self, intent: ControlIntent) -> &[KeyCode] {
        match intent {
            ControlIntent::RotateLeft => &self.rotate_left,
            ControlIntent::RotateRight => &self.rotate_right,
            ControlIntent::MoveForward => &self.move_forward,
            ControlIntent::MoveBackward => &self.move_backward,
            ControlIntent::MoveLeft => &self.move_left,
            ControlIntent::MoveRight => &self.move_right,
            ControlIntent::Jump => &self.jump,
        }
    }
}

/// Intents whose keys are currently held, in application order.
pub fn held_intents(keyboard: &ButtonInput<KeyCode>, bindings: &KeyBindings) -> Vec<ControlIntent> {
    ControlIntent::ALL
        .into_iter()
        .filter(|intent| keyboard.any_pressed(bindings.keys(*intent).iter().copied()))
        .collect()
}

pub fn apply_intent<B: ControlledBody + ?Sized>(
    controller: &mut CharacterController,
    body: &mut B,
    intent: ControlIntent,
) {
    match intent {
        ControlIntent::RotateLeft => controller.rotate(body, -1.0),
        ControlIntent::RotateRight => controller.rotate(body, 1.0),
        ControlIntent::MoveForward => controller.move_in(body, MoveDirection::Forward),
        ControlIntent::MoveBackward => controller.move_in(body, MoveDirection::Backward),
        ControlIntent::MoveLeft => controller.move_in(body, MoveDirection::Left),
        ControlIntent::MoveRight => controller.move_in(body, MoveDirection::Right),
        ControlIntent::Jump => {
            controller.jump(body);
        }
    }
}
