use bevy_ecs::prelude::*;
use rigged_hand::BoneHierarchy;

use crate::BoneData;

/// Bone hierarchy backed by the entity `Transform` tree.
///
/// Entities without a `Transform` end the walk up the tree.
pub(crate) struct TransformHierarchy<'a, 'w, 's> {
    query: &'a mut Query<'w, 's, BoneData>,
}

impl<'a, 'w, 's> TransformHierarchy<'a, 'w, 's> {
    pub(crate) fn new(query: &'a mut Query<'w, 's, BoneData>) -> Self {
        Self { query }
    }
}

impl BoneHierarchy for TransformHierarchy<'_, '_, '_> {
    type Bone = Entity;

    fn parent(&self, bone: Entity) -> Option<Entity> {
        let (_, child_of, _) = self.query.get(bone).ok()?;
        child_of.map(ChildOf::parent)
    }

    fn first_child(&self, bone: Entity) -> Option<Entity> {
        let (_, _, children) = self.query.get(bone).ok()?;
        children.and_then(|children| children.first().copied())
    }

    fn local_transform(&self, bone: Entity) -> Option<rigged_hand::Transform> {
        let (transform, _, _) = self.query.get(bone).ok()?;

        Some(rigged_hand::Transform::from_scale_rotation_translation(
            transform.scale,
            transform.rotation,
            transform.translation,
        ))
    }

    fn set_local_transform(&mut self, bone: Entity, local: rigged_hand::Transform) {
        let Ok((mut transform, _, _)) = self.query.get_mut(bone) else {
            return;
        };

        transform.scale = local.scale.into();
        transform.rotation = local.rotation.into();
        transform.translation = local.translation.into();
    }
}
