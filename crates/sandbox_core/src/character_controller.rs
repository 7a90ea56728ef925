//! Force-driven character controller for a rigid-body player.
//!
//! Translates discrete movement intents into forces and velocity edits on
//! one physics body:
//! - Grounded: acceleration as a force, horizontal speed capped
//! - Airborne: small strafe increments plus direction-only steering
//! - Jump gated by ground contact and a short frame cooldown
//! - Linear damping ramps up after landing to give a brief skid window
//!
//! Ground state changes only on upward-facing contacts (landing) and on a
//! successful jump (takeoff). All per-call increments are per tick; the
//! controller is meant to run on the fixed schedule.

use std::f32::consts::PI;
use std::time::Duration;

use bevy::prelude::*;
use sandbox_physics::{
    BodyHandle, BodyOverrides, ContactListener, ContactRecord, ControlledBody, PhysicsWorld,
};
use serde::{Deserialize, Serialize};

/// Name of the body the controller drives.
pub const PLAYER_BODY: &str = "player";
/// Half extents of the player box.
pub const PLAYER_SIZE: Vec3 = Vec3::ONE;
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 5.0, 0.0);

/// Speed added per airborne move call.
pub const AIR_STRAFE_INCREMENT: f32 = 0.03;
/// Steering blend used by airborne movement.
pub const MOVE_STEER_FACTOR: f32 = 0.1;
pub const DEFAULT_STEER_FACTOR: f32 = 0.05;
/// Below this horizontal speed there is no direction to steer.
pub const MIN_STEER_SPEED: f32 = 0.01;
pub const JUMP_COOLDOWN_FRAMES: u32 = 5;
/// Contacts whose normal has a larger Y than this count as ground.
pub const GROUND_NORMAL_THRESHOLD: f32 = 0.5;
/// Steady-state linear damping on the ground.
pub const GROUND_DAMPING: f32 = 0.1;
pub const AIR_DAMPING: f32 = 0.01;

/// Tuning for one controller. Fixed after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    /// Force scale while grounded.
    pub ground_acceleration: f32,
    /// Force scale while airborne. Air strafing adds `AIR_STRAFE_INCREMENT`
    /// per call instead of using it.
    pub air_acceleration: f32,
    /// Horizontal speed cap while grounded.
    pub ground_max_speed: f32,
    /// Cap on speed along the strafe direction while airborne.
    pub air_max_speed: f32,
    /// Vertical velocity set by a jump.
    pub jump_strength: f32,
    /// Yaw per `rotate` call (radians).
    pub rotation_speed: f32,
    /// Length of the post-landing damping ramp (milliseconds).
    pub post_land_friction_delay_ms: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            ground_acceleration: 30.0,
            air_acceleration: 20.0,
            ground_max_speed: 15.0,
            air_max_speed: 50.0,
            jump_strength: 8.0,
            rotation_speed: PI / 60.0,
            post_land_friction_delay_ms: 200.0,
        }
    }
}

impl MovementParams {
    /// Every parameter with its name, for validation and display.
    pub fn named_values(&self) -> [(&'static str, f32); 7] {
        [
            ("ground_acceleration", self.ground_acceleration),
            ("air_acceleration", self.air_acceleration),
            ("ground_max_speed", self.ground_max_speed),
            ("air_max_speed", self.air_max_speed),
            ("jump_strength", self.jump_strength),
            ("rotation_speed", self.rotation_speed),
            ("post_land_friction_delay_ms", self.post_land_friction_delay_ms),
        ]
    }
}

/// Local-space movement directions. Forward is -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    pub fn local_vector(self) -> Vec3 {
        match self {
            MoveDirection::Forward => Vec3::new(0.0, 0.0, -1.0),
            MoveDirection::Backward => Vec3::new(0.0, 0.0, 1.0),
            MoveDirection::Left => Vec3::new(-1.0, 0.0, 0.0),
            MoveDirection::Right => Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub on_ground: bool,
    /// World clock at the most recent ground contact.
    pub landed_at: Duration,
    /// Ticks left before another jump is allowed.
    pub jump_cooldown_frames: u32,
}

/// Drives one physics body from movement intents.
#[derive(Component, Debug, Clone)]
pub struct CharacterController {
    params: MovementParams,
    body: BodyHandle,
    state: ControllerState,
}

impl CharacterController {
    /// Wraps an existing body without touching its settings.
    pub fn new(body: BodyHandle, params: MovementParams) -> Self {
        Self {
            params,
            body,
            state: ControllerState::default(),
        }
    }

    /// Creates the player body and a controller for it.
    ///
    /// The body cannot rotate from collisions: its angular factor is zero on
    /// every axis and angular damping is 1. Yaw changes only through `rotate`.
    pub fn spawn(world: &mut PhysicsWorld, params: MovementParams) -> Self {
        let body = world.add_body(
            PLAYER_BODY,
            BodyOverrides {
                size: Some(PLAYER_SIZE),
                position: Some(SPAWN_POSITION),
            },
        );
        if let Some(rigid_body) = world.body_mut(body) {
            rigid_body.lock_rotation();
            rigid_body.set_rotational_damping(1.0);
        }
        info!("Spawned player controller at {}", SPAWN_POSITION);
        Self::new(body, params)
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn params(&self) -> &MovementParams {
        &self.params
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Direct state access for scripted setups (spawning already grounded, etc).
    pub fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    pub fn is_grounded(&self) -> bool {
        self.state.on_ground
    }

    /// Marks the controller grounded when `contact` is an upward-facing
    /// contact on its own body. Anything else is ignored.
    pub fn handle_contact(&mut self, contact: &ContactRecord) {
        if contact.body != self.body {
            return;
        }
        let Some(normal) = contact.normal else {
            return;
        };
        if normal.y <= GROUND_NORMAL_THRESHOLD {
            return;
        }

        if !self.state.on_ground {
            debug!("Player landed at {:?} (normal {})", contact.at, normal);
        }
        self.state.on_ground = true;
        self.state.landed_at = contact.at;
        self.state.jump_cooldown_frames = 0;
    }

    /// Yaws the body by `rotation_speed * -direction`. Positive turns right.
    pub fn rotate<B: ControlledBody + ?Sized>(&self, body: &mut B, direction: f32) {
        let angle = self.params.rotation_speed * -direction;
        body.set_orientation(body.orientation() * Quat::from_rotation_y(angle));
    }

    pub fn move_forward<B: ControlledBody + ?Sized>(&self, body: &mut B) {
        self.move_in(body, MoveDirection::Forward);
    }

    pub fn move_backward<B: ControlledBody + ?Sized>(&self, body: &mut B) {
        self.move_in(body, MoveDirection::Backward);
    }

    pub fn move_left<B: ControlledBody + ?Sized>(&self, body: &mut B) {
        self.move_in(body, MoveDirection::Left);
    }

    pub fn move_right<B: ControlledBody + ?Sized>(&self, body: &mut B) {
        self.move_in(body, MoveDirection::Right);
    }

    pub fn move_in<B: ControlledBody + ?Sized>(&self, body: &mut B, direction: MoveDirection) {
        self.apply_directional_acceleration(body, direction.local_vector());
    }

    /// Pushes the body along a local direction.
    ///
    /// On the ground this is a force followed by the ground speed cap. In the
    /// air it is a strafe increment followed by steering toward the direction.
    pub fn apply_directional_acceleration<B: ControlledBody + ?Sized>(
        &self,
        body: &mut B,
        local_dir: Vec3,
    ) {
        if self.state.on_ground {
            let force = body.orientation() * local_dir * self.params.ground_acceleration;
            body.apply_central_force(force);
            limit_horizontal_speed(body, self.params.ground_max_speed);
        } else {
            self.air_strafe(body, local_dir);
            self.steer_velocity(body, local_dir, MOVE_STEER_FACTOR);
        }
    }

    /// Adds up to `AIR_STRAFE_INCREMENT` of speed along the horizontal
    /// projection of `local_dir`, never pushing the speed along it past
    /// `air_max_speed`. Vertical velocity is untouched.
    pub fn air_strafe<B: ControlledBody + ?Sized>(&self, body: &mut B, local_dir: Vec3) {
        let Some(wish_dir) = horizontal_world_direction(body, local_dir) else {
            return;
        };

        let velocity = body.velocity();
        let current_speed = Vec3::new(velocity.x, 0.0, velocity.z).dot(wish_dir);
        let add_speed = self.params.air_max_speed - current_speed;
        if add_speed <= 0.0 {
            return;
        }

        let accel_speed = AIR_STRAFE_INCREMENT.min(add_speed);
        body.set_velocity(Vec3::new(
            velocity.x + wish_dir.x * accel_speed,
            velocity.y,
            velocity.z + wish_dir.z * accel_speed,
        ));
    }

    /// Turns horizontal velocity toward `local_dir` without changing its
    /// magnitude. `steer_factor` is the lerp weight between the current
    /// heading and the requested one.
    pub fn steer_velocity<B: ControlledBody + ?Sized>(
        &self,
        body: &mut B,
        local_dir: Vec3,
        steer_factor: f32,
    ) {
        let Some(wish_dir) = horizontal_world_direction(body, local_dir) else {
            return;
        };

        let velocity = body.velocity();
        let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
        let speed = horizontal.length();
        if speed < MIN_STEER_SPEED {
            return;
        }

        let heading = horizontal / speed;
        let Some(new_heading) = heading.lerp(wish_dir, steer_factor).try_normalize() else {
            return;
        };

        let steered = new_heading * speed;
        body.set_velocity(Vec3::new(steered.x, velocity.y, steered.z));
    }

    /// Launches the body upward if grounded and off cooldown.
    /// Returns whether the jump happened.
    pub fn jump<B: ControlledBody + ?Sized>(&mut self, body: &mut B) -> bool {
        if !self.state.on_ground || self.state.jump_cooldown_frames > 0 {
            return false;
        }

        let mut velocity = body.velocity();
        velocity.y = self.params.jump_strength;
        body.set_velocity(velocity);

        self.state.on_ground = false;
        self.state.jump_cooldown_frames = JUMP_COOLDOWN_FRAMES;
        debug!("Player jumped with vertical speed {}", velocity.y);
        true
    }

    /// Per-tick bookkeeping: damping for the current ground state and the
    /// jump cooldown countdown. `now` must come from the same clock as the
    /// contact timestamps.
    pub fn update<B: ControlledBody + ?Sized>(&mut self, body: &mut B, now: Duration) {
        body.set_damping(self.damping_at(now));
        self.state.jump_cooldown_frames = self.state.jump_cooldown_frames.saturating_sub(1);
    }

    /// Linear damping the body should have at `now`.
    pub fn damping_at(&self, now: Duration) -> f32 {
        if !self.state.on_ground {
            return AIR_DAMPING;
        }

        let since_landing_ms = now.saturating_sub(self.state.landed_at).as_secs_f32() * 1000.0;
        let delay_ms = self.params.post_land_friction_delay_ms;
        if since_landing_ms < delay_ms {
            GROUND_DAMPING * (since_landing_ms / delay_ms)
        } else {
            GROUND_DAMPING
        }
    }
}

impl ContactListener for CharacterController {
    fn on_contact(&mut self, contact: &ContactRecord) {
        self.handle_contact(contact);
    }
}

/// Rescales X/Z velocity down to `max_speed` when it exceeds it.
pub fn limit_horizontal_speed<B: ControlledBody + ?Sized>(body: &mut B, max_speed: f32) {
    let velocity = body.velocity();
    let horizontal = Vec2::new(velocity.x, velocity.z);
    let speed = horizontal.length();
    if speed > max_speed {
        let capped = horizontal * (max_speed / speed);
        body.set_velocity(Vec3::new(capped.x, velocity.y, capped.y));
    }
}

/// World-space, flattened, normalized version of a local direction.
fn horizontal_world_direction<B: ControlledBody + ?Sized>(body: &B, local_dir: Vec3) -> Option<Vec3> {
    let mut dir = body.orientation() * local_dir;
    dir.y = 0.0;
    if dir.length_squared() == 0.0 {
        return None;
    }
    Some(dir.normalize())
}
