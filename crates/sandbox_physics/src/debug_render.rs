//! Wireframe view of the physics world drawn with bevy gizmos.
//!
//! Press F1 to toggle. Collider outlines and contacts come from rapier's
//! own `DebugRenderPipeline`; an axes helper marks the world origin.

use bevy::prelude::*;
use rapier3d::prelude as rapier;
use rapier::{DebugColor, DebugRenderBackend, DebugRenderObject, DebugRenderPipeline, Point, Real};

use crate::world::PhysicsWorld;

pub struct PhysicsDebugPlugin;

impl Plugin for PhysicsDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsDebugRender>()
            .add_systems(Update, (toggle_debug_render, draw_debug_render).chain());
    }
}

#[derive(Resource)]
pub struct PhysicsDebugRender {
    pub enabled: bool,
    /// Length of the origin axes helper.
    pub axes_length: f32,
    pipeline: DebugRenderPipeline,
}

impl Default for PhysicsDebugRender {
    fn default() -> Self {
        Self {
            enabled: true,
            axes_length: 8.0,
            pipeline: DebugRenderPipeline::default(),
        }
    }
}

struct GizmoBackend<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
}

impl DebugRenderBackend for GizmoBackend<'_, '_, '_> {
    fn draw_line(
        &mut self,
        _object: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: DebugColor,
    ) {
        // rapier colors are HSLA
        self.gizmos.line(
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, b.y, b.z),
            Color::hsla(color[0], color[1], color[2], color[3]),
        );
    }
}

fn toggle_debug_render(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_render: ResMut<PhysicsDebugRender>,
) {
    if keyboard.just_pressed(KeyCode::F1) {
        debug_render.enabled = !debug_render.enabled;
        let state = if debug_render.enabled { "on" } else { "off" };
        info!("Physics debug render {}", state);
    }
}

fn draw_debug_render(
    physics: Res<PhysicsWorld>,
    mut debug_render: ResMut<PhysicsDebugRender>,
    mut gizmos: Gizmos,
) {
    if !debug_render.enabled {
        return;
    }

    gizmos.axes(Transform::IDENTITY, debug_render.axes_length);

    let mut backend = GizmoBackend {
        gizmos: &mut gizmos,
    };
    debug_render.pipeline.render(
        &mut backend,
        &physics.rigid_body_set,
        &physics.collider_set,
        &physics.impulse_joint_set,
        &physics.multibody_joint_set,
        &physics.narrow_phase,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f1_toggles_debug_render() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<PhysicsDebugRender>()
            .add_systems(Update, toggle_debug_render);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::F1);
        app.update();
        assert!(!app.world().resource::<PhysicsDebugRender>().enabled);

        // Held, not pressed again: stays off.
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear();
        app.update();
        assert!(!app.world().resource::<PhysicsDebugRender>().enabled);

        let mut keyboard = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keyboard.release(KeyCode::F1);
        keyboard.clear();
        keyboard.press(KeyCode::F1);
        app.update();
        assert!(app.world().resource::<PhysicsDebugRender>().enabled);
    }
}
