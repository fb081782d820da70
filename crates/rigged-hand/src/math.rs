pub use glam::{Affine3A, Mat3, Quat, Vec3};

/// Creates a rotation whose local forward axis (+Z) points along `forward`
/// and whose local up axis (+Y) lies in the plane spanned by `forward` and `up`.
///
/// A zero `forward` yields the identity rotation. If `up` is parallel to `forward`
/// the up constraint is dropped and the shortest arc from +Z to `forward` is used.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };

    let Some(x) = up.cross(z).try_normalize() else {
        return Quat::from_rotation_arc(Vec3::Z, z);
    };

    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Rotation that maps a model bone's axes onto the axes of a tracked joint.
///
/// Tracked joints point along +Z with the palm facing -Y. Model bones may use any
/// other convention, described by the direction the finger points in and the direction
/// the palm faces, both in the bone's local space.
pub fn reorientation(model_finger_pointing: Vec3, model_palm_facing: Vec3) -> Quat {
    look_rotation(model_finger_pointing, -model_palm_facing).inverse()
}

/// Snaps a vector to the signed unit axis of its largest component.
///
/// On ties the later axis wins. The zero vector stays zero.
pub fn zeroed_axis(v: Vec3) -> Vec3 {
    let abs = v.abs();
    let max = abs.max_element();
    let mut zeroed = Vec3::ZERO;

    if max == 0.0 {
        return zeroed;
    }

    for (axis, unit) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
        if abs[axis] == max {
            zeroed = if v[axis] > 0.0 { unit } else { -unit };
        }
    }

    zeroed
}

/// Index of the component with the largest magnitude. The first one wins on ties.
pub fn largest_component_index(v: Vec3) -> usize {
    let mut largest_value = 0.0;
    let mut largest_index = 0;

    for axis in 0..3 {
        let value = v[axis].abs();
        if value > largest_value {
            largest_index = axis;
            largest_value = value;
        }
    }

    largest_index
}
