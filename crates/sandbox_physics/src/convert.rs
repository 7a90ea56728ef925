//! Conversions between bevy's glam math types and rapier's nalgebra types.

use bevy::math::{Quat, Vec3};
use rapier3d::prelude as rapier;
use rapier::nalgebra::{Quaternion, UnitQuaternion, Vector3};

pub fn to_vec3(v: &Vector3<rapier::Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_vector(v: Vec3) -> Vector3<rapier::Real> {
    Vector3::new(v.x, v.y, v.z)
}

pub fn to_quat(rot: &UnitQuaternion<rapier::Real>) -> Quat {
    Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
}

/// Renormalizes on the way in; rapier rejects drifting quaternions.
pub fn to_rotation(q: Quat) -> UnitQuaternion<rapier::Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quat_conversion_preserves_rotation() {
        let q = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.2);
        let back = to_quat(&to_rotation(q));
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!((q * v - back * v).length() < 1e-5);
    }

    #[test]
    fn test_vector_conversion_axes() {
        let v = Vec3::new(1.5, -2.0, 0.25);
        let n = to_vector(v);
        assert_eq!((n.x, n.y, n.z), (1.5, -2.0, 0.25));
        assert_eq!(to_vec3(&n), v);
    }
}
