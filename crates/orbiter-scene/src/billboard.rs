//! Billboard orientation: turning objects so their local +Z axis points at a
//! target, with +Y kept as close to world up as the geometry allows.

use glam::{Mat3, Quat, Vec3};

const EPSILON: f32 = 1e-6;

/// Rotation whose local +Z axis points along `z_axis`, with `up` as the
/// preferred local +Y.
///
/// A zero-length `z_axis` falls back to world +Z. When `z_axis` is parallel
/// to `up` it is nudged off-axis so the basis stays well defined.
pub fn rotation_from_z_axis(z_axis: Vec3, up: Vec3) -> Quat {
    let mut z = z_axis;
    if z.length_squared() < EPSILON * EPSILON {
        z = Vec3::Z;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() < EPSILON * EPSILON {
        if (up.z.abs() - 1.0).abs() < EPSILON {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// World rotation that turns an object at `from` to face `target`.
pub fn face_towards(from: Vec3, target: Vec3) -> Quat {
    rotation_from_z_axis(target - from, Vec3::Y)
}

/// Facing rotation of a child of a rotated parent, expressed in the parent's
/// space so that `parent * local` faces `target` in the world.
///
/// `local_position` is the child's position in the parent's space.
pub fn local_facing(parent: Quat, local_position: Vec3, target: Vec3) -> Quat {
    let world_position = parent * local_position;
    parent.inverse() * face_towards(world_position, target)
}
