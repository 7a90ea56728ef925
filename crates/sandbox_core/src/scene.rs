//! Visible side of the sandbox: meshes for every physics body, a light and
//! a third-person camera that trails the player.
//!
//! Meshes are derived from each body's collider, so props registered with
//! custom presets get a matching shape without extra setup.

use bevy::prelude::*;
use sandbox_physics::{PhysicsSystems, PhysicsWorld, RigidBodyLink};

use crate::character_controller::CharacterController;
use crate::setup_world;

pub struct SceneVisualsPlugin;

impl Plugin for SceneVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (attach_body_visuals, spawn_light_and_camera).after(setup_world),
        )
        .add_systems(Update, follow_camera_system.after(PhysicsSystems::Sync));
    }
}

/// Camera that stays behind the player, looking over its shoulder.
#[derive(Component)]
pub struct FollowCamera {
    /// Vertical tilt (radians, positive = look down)
    pub pitch: f32,
    /// Distance from the player
    pub distance: f32,
    /// Height offset from the player origin
    pub height_offset: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            pitch: 0.35,
            distance: 12.0,
            height_offset: 1.5,
        }
    }
}

fn attach_body_visuals(
    mut commands: Commands,
    physics: Res<PhysicsWorld>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    bodies: Query<(Entity, &RigidBodyLink, Has<CharacterController>)>,
) {
    for (entity, link, is_player) in bodies.iter() {
        let Some(body) = physics.body(link.0) else {
            continue;
        };
        let Some(collider) = body
            .colliders()
            .first()
            .and_then(|handle| physics.collider_set.get(*handle))
        else {
            continue;
        };

        let shape = collider.shape();
        let mesh = if let Some(cuboid) = shape.as_cuboid() {
            let h = cuboid.half_extents;
            meshes.add(Cuboid::new(h.x * 2.0, h.y * 2.0, h.z * 2.0))
        } else if let Some(ball) = shape.as_ball() {
            meshes.add(Sphere::new(ball.radius))
        } else {
            warn!("No mesh for collider shape {:?}", shape.shape_type());
            continue;
        };

        let color = if is_player {
            Color::srgb(0.2, 0.4, 0.9)
        } else if body.is_fixed() {
            Color::srgb(0.3, 0.5, 0.3)
        } else {
            Color::srgb(0.8, 0.2, 0.2)
        };

        commands
            .entity(entity)
            .insert((Mesh3d(mesh), MeshMaterial3d(materials.add(color))));
    }
}

fn spawn_light_and_camera(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.5, 0.5, 0.0)),
    ));

    commands.spawn((
        Camera3d::default(),
        FollowCamera::default(),
        Transform::from_xyz(0.0, 10.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Places the camera behind the player using the player's current facing.
fn follow_camera_system(
    player_query: Query<&Transform, With<CharacterController>>,
    mut camera_query: Query<(&mut Transform, &FollowCamera), Without<CharacterController>>,
) {
    let Ok(player_transform) = player_query.single() else {
        return;
    };
    let Ok((mut camera_transform, camera)) = camera_query.single_mut() else {
        return;
    };

    // +Z is back
    let player_back = player_transform.rotation * Vec3::Z;

    let horizontal_dist = camera.distance * camera.pitch.cos();
    let vertical_dist = camera.distance * camera.pitch.sin();
    let offset = player_back * horizontal_dist + Vec3::Y * vertical_dist;

    let target_pos = player_transform.translation + Vec3::Y * camera.height_offset;
    camera_transform.translation = target_pos + offset;
    camera_transform.look_at(target_pos, Vec3::Y);
}
