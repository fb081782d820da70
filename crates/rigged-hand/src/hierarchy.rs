use std::fmt::Debug;
use std::hash::Hash;

use glam::{Affine3A, Quat, Vec3};

use crate::Transform;

/// The host scene graph that owns the bones of a rig.
///
/// Only local transforms are stored. World space values are derived by walking
/// up the parents, so writes made earlier in a pass are seen by later ones.
pub trait BoneHierarchy {
    /// Handle of a bone (a node in the scene graph).
    type Bone: Copy + Eq + Hash + Debug;

    fn parent(&self, bone: Self::Bone) -> Option<Self::Bone>;

    fn first_child(&self, bone: Self::Bone) -> Option<Self::Bone>;

    /// Local transform of the bone, relative to its parent.
    /// [`None`] if the bone does not exist.
    fn local_transform(&self, bone: Self::Bone) -> Option<Transform>;

    fn set_local_transform(&mut self, bone: Self::Bone, transform: Transform);

    /// Transform from the bone's local space to world space.
    fn world_matrix(&self, bone: Self::Bone) -> Affine3A {
        let local = self
            .local_transform(bone)
            .map_or(Affine3A::IDENTITY, Affine3A::from);

        match self.parent(bone) {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Position of the bone's origin in world space.
    fn world_position(&self, bone: Self::Bone) -> Vec3 {
        self.world_matrix(bone).translation.into()
    }

    /// Rotation of the bone in world space.
    fn world_rotation(&self, bone: Self::Bone) -> Quat {
        let (_, rotation, _) = self.world_matrix(bone).to_scale_rotation_translation();
        rotation
    }

    /// Moves the bone so that its origin lands on `position`, keeping its local rotation.
    fn set_world_position(&mut self, bone: Self::Bone, position: Vec3) {
        let parent_inverse = self
            .parent(bone)
            .map_or(Affine3A::IDENTITY, |parent| self.world_matrix(parent).inverse());

        self.update_local(bone, |transform| {
            transform.translation = parent_inverse.transform_point3(position).into();
        });
    }

    /// Rotates the bone so that its world rotation becomes `rotation`.
    fn set_world_rotation(&mut self, bone: Self::Bone, rotation: Quat) {
        let parent_rotation = self
            .parent(bone)
            .map_or(Quat::IDENTITY, |parent| self.world_rotation(parent));

        self.update_local(bone, |transform| {
            transform.rotation = (parent_rotation.inverse() * rotation).normalize().into();
        });
    }

    /// Sets a single component of the bone's local scale.
    fn set_local_scale_axis(&mut self, bone: Self::Bone, axis: usize, value: f32) {
        self.update_local(bone, |transform| {
            let mut scale = Vec3::from(transform.scale);
            scale[axis] = value;
            transform.scale = scale.into();
        });
    }

    /// Applies `f` to the local transform of the bone. Does nothing if the bone does not exist.
    fn update_local(&mut self, bone: Self::Bone, f: impl FnOnce(&mut Transform)) {
        if let Some(mut transform) = self.local_transform(bone) {
            f(&mut transform);
            self.set_local_transform(bone, transform);
        }
    }

    /// Walks `depth` first children down from `root`, returning every bone visited,
    /// `root` included.
    fn first_child_chain(&self, root: Self::Bone, depth: usize) -> Vec<Option<Self::Bone>> {
        std::iter::successors(Some(root), |&bone| self.first_child(bone))
            .map(Some)
            .chain(std::iter::repeat(None))
            .take(depth + 1)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small in-memory scene graph.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct TestRig {
        pub(crate) nodes: Vec<(Option<usize>, Transform)>,
    }

    impl TestRig {
        pub(crate) fn add(&mut self, parent: Option<usize>, transform: Transform) -> usize {
            self.nodes.push((parent, transform));
            self.nodes.len() - 1
        }

        pub(crate) fn local(&self, bone: usize) -> Transform {
            self.nodes[bone].1
        }
    }

    impl BoneHierarchy for TestRig {
        type Bone = usize;

        fn parent(&self, bone: usize) -> Option<usize> {
            self.nodes.get(bone).and_then(|(parent, _)| *parent)
        }

        fn first_child(&self, bone: usize) -> Option<usize> {
            self.nodes
                .iter()
                .position(|(parent, _)| *parent == Some(bone))
        }

        fn local_transform(&self, bone: usize) -> Option<Transform> {
            self.nodes.get(bone).map(|(_, transform)| *transform)
        }

        fn set_local_transform(&mut self, bone: usize, transform: Transform) {
            if let Some(node) = self.nodes.get_mut(bone) {
                node.1 = transform;
            }
        }
    }

    const EPSILON: f32 = 1e-5;

    fn translated(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_scale_rotation_translation(Vec3::ONE, Quat::IDENTITY, Vec3::new(x, y, z))
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut rig = TestRig::default();
        let root = rig.add(
            None,
            Transform::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                Vec3::new(1.0, 0.0, 0.0),
            ),
        );
        let child = rig.add(Some(root), translated(0.0, 0.0, 1.0));

        // +Z rotated 90 degrees about Y is +X, scaled by 2, then offset by the root.
        assert!(rig.world_position(child).abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn world_writes_respect_parent() {
        let mut rig = TestRig::default();
        let root = rig.add(
            None,
            Transform::from_scale_rotation_translation(
                Vec3::ONE,
                Quat::from_rotation_z(0.7),
                Vec3::new(0.5, -1.0, 2.0),
            ),
        );
        let child = rig.add(Some(root), translated(0.0, 1.0, 0.0));

        let target_rotation = Quat::from_rotation_x(0.3);
        let target_position = Vec3::new(-1.0, 4.0, 0.25);

        rig.set_world_position(child, target_position);
        rig.set_world_rotation(child, target_rotation);

        assert!(rig.world_position(child).abs_diff_eq(target_position, EPSILON));
        assert!(rig.world_rotation(child).abs_diff_eq(target_rotation, EPSILON));
    }

    #[test]
    fn parent_writes_move_children() {
        let mut rig = TestRig::default();
        let root = rig.add(None, Transform::default());
        let child = rig.add(Some(root), translated(1.0, 0.0, 0.0));

        rig.set_world_position(root, Vec3::new(0.0, 2.0, 0.0));

        assert!(rig.world_position(child).abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), EPSILON));
        assert_eq!(Vec3::from(rig.local(child).translation), Vec3::X);
    }

    #[test]
    fn scale_axis_only_touches_one_component() {
        let mut rig = TestRig::default();
        let bone = rig.add(None, Transform::default());

        rig.set_local_scale_axis(bone, 1, 0.5);

        assert_eq!(Vec3::from(rig.local(bone).scale), Vec3::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn first_child_chain_pads_missing_children() {
        let mut rig = TestRig::default();
        let root = rig.add(None, Transform::default());
        let child = rig.add(Some(root), Transform::default());

        assert_eq!(
            rig.first_child_chain(root, 3),
            vec![Some(root), Some(child), None, None]
        );
    }
}
