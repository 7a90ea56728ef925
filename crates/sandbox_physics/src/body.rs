//! The body contract controllers program against.
//!
//! Controllers only need a handful of operations on the body they drive.
//! Keeping them behind [`ControlledBody`] means controller logic never names
//! a physics engine type; rapier's [`RigidBody`] is the one implementation.

use bevy::math::{Quat, Vec3};
use rapier3d::prelude::RigidBody;
use rapier3d::prelude::nalgebra::Vector3;

use crate::convert::{to_quat, to_rotation, to_vec3, to_vector};

pub trait ControlledBody {
    /// World-space position of the body's origin.
    fn world_position(&self) -> Vec3;

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn orientation(&self) -> Quat;
    fn set_orientation(&mut self, orientation: Quat);

    /// Applies a force through the centre of mass for the next step only.
    fn apply_central_force(&mut self, force: Vec3);

    fn damping(&self) -> f32;
    fn set_damping(&mut self, damping: f32);

    fn set_rotational_damping(&mut self, damping: f32);

    /// Zeroes the angular factor on every axis and stops any spin.
    fn lock_rotation(&mut self);
}

impl ControlledBody for RigidBody {
    fn world_position(&self) -> Vec3 {
        to_vec3(self.translation())
    }

    fn velocity(&self) -> Vec3 {
        to_vec3(self.linvel())
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.set_linvel(to_vector(velocity), true);
    }

    fn orientation(&self) -> Quat {
        to_quat(self.rotation())
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.set_rotation(to_rotation(orientation), true);
    }

    fn apply_central_force(&mut self, force: Vec3) {
        self.add_force(to_vector(force), true);
    }

    fn damping(&self) -> f32 {
        self.linear_damping()
    }

    fn set_damping(&mut self, damping: f32) {
        self.set_linear_damping(damping);
    }

    fn set_rotational_damping(&mut self, damping: f32) {
        self.set_angular_damping(damping);
    }

    fn lock_rotation(&mut self) {
        self.lock_rotations(true, true);
        self.set_angvel(Vector3::zeros(), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::prelude::{LockedAxes, RigidBodyBuilder};

    #[test]
    fn test_velocity_round_trip_through_contract() {
        let mut body = RigidBodyBuilder::dynamic().build();
        body.set_velocity(Vec3::new(3.0, -1.0, 2.0));
        assert_eq!(body.velocity(), Vec3::new(3.0, -1.0, 2.0));
    }

    #[test]
    fn test_lock_rotation_stops_spin() {
        let mut body = RigidBodyBuilder::dynamic()
            .angvel(Vector3::new(1.0, 2.0, 3.0))
            .build();
        body.lock_rotation();

        assert!(body.locked_axes().contains(LockedAxes::ROTATION_LOCKED));
        assert_eq!(body.angvel().norm(), 0.0);
    }

    #[test]
    fn test_damping_setters() {
        let mut body = RigidBodyBuilder::dynamic().build();
        body.set_damping(0.25);
        body.set_rotational_damping(1.0);
        assert_eq!(body.damping(), 0.25);
        assert_eq!(body.angular_damping(), 1.0);
    }
}
