use ahash::HashMap;
use enumset::EnumSet;

use crate::hierarchy::BoneHierarchy;
use crate::joints::{JointPoses, TrackedHandJoint};

/// Drives one transform per tracked joint, copying joint poses verbatim
/// into the local position and rotation of the bound bones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointVisualizer<B> {
    bones: HashMap<TrackedHandJoint, B>,
}

impl<B> Default for JointVisualizer<B> {
    fn default() -> Self {
        Self {
            bones: HashMap::default(),
        }
    }
}

impl<B: Copy> JointVisualizer<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a joint to a bone, returning the previously bound bone.
    pub fn bind(&mut self, joint: TrackedHandJoint, bone: B) -> Option<B> {
        self.bones.insert(joint, bone)
    }

    pub fn unbind(&mut self, joint: TrackedHandJoint) -> Option<B> {
        self.bones.remove(&joint)
    }

    /// The bone driven by the given joint, if any.
    pub fn joint_bone(&self, joint: TrackedHandJoint) -> Option<B> {
        self.bones.get(&joint).copied()
    }

    pub fn bound(&self) -> EnumSet<TrackedHandJoint> {
        self.bones.keys().copied().collect()
    }

    /// Copies every tracked joint with a bound bone into that bone's local transform.
    ///
    /// Returns the joints that were written.
    pub fn apply<H>(&self, joints: &JointPoses, hierarchy: &mut H) -> EnumSet<TrackedHandJoint>
    where
        H: BoneHierarchy<Bone = B>,
    {
        let written = joints.tracked() & self.bound();

        for joint in written {
            let (Some(pose), Some(bone)) = (joints.get(joint), self.joint_bone(joint)) else {
                continue;
            };

            hierarchy.update_local(bone, |transform| {
                transform.translation = pose.position.into();
                transform.rotation = pose.rotation.into();
            });
        }

        written
    }
}
