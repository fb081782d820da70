use std::ops::Range;

use glam::{Quat, Vec3};

use crate::config::{DEFAULT_FINGER_POINTING, DEFAULT_PALM_FACING, ReferenceHand};
use crate::error::RigError;
use crate::hierarchy::BoneHierarchy;
use crate::joints::{FingerType, JointPoses, Pose};
use crate::math::{largest_component_index, reorientation, zeroed_axis};

/// Bones of a finger, indexed from the metacarpal (0) to the distal bone (3).
pub type FingerBones<B> = [Option<B>; RiggedFinger::NUM_BONES];

/// Positions and orientations the bones of a model rigged for skeletal animation
/// along the tracked joints of one finger.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RiggedFinger {
    pub finger_type: FingerType,
    /// Direction the finger points in, in the local space of its bones.
    pub model_finger_pointing: Vec3,
    /// Direction the palm faces, in the local space of the finger's bones.
    pub model_palm_facing: Vec3,
    /// Move the bones to the tracked joint positions, stretching the mesh.
    pub deform_position: bool,
    /// Scale the distal bone to the tracked fingertip length.
    /// Only has an effect together with `deform_position`.
    pub scale_last_finger_bone: bool,
}

impl Default for RiggedFinger {
    fn default() -> Self {
        Self::new(FingerType::default())
    }
}

impl RiggedFinger {
    /// Number of bones in a finger.
    pub const NUM_BONES: usize = 4;

    /// Index of the distal bone, the last one of the finger.
    const DISTAL: usize = Self::NUM_BONES - 1;

    pub fn new(finger_type: FingerType) -> Self {
        Self {
            finger_type,
            model_finger_pointing: DEFAULT_FINGER_POINTING,
            model_palm_facing: DEFAULT_PALM_FACING,
            deform_position: false,
            scale_last_finger_bone: false,
        }
    }

    /// Rotation from the model bone axes to the tracked joint axes.
    pub fn reorientation(&self) -> Quat {
        reorientation(self.model_finger_pointing, self.model_palm_facing)
    }

    /// Tracked pose of the joint at the root of the given bone.
    pub fn joint_pose(&self, bone_index: usize, joints: &JointPoses) -> Option<Pose> {
        self.finger_type
            .joint(bone_index)
            .and_then(|joint| joints.get(joint))
    }

    /// Bone slots filled by the finger's bone chain.
    ///
    /// The thumb never has a metacarpal bone in the chain.
    pub fn bone_slots(&self, use_metacarpals: bool) -> Range<usize> {
        if !use_metacarpals || self.finger_type == FingerType::Thumb {
            1..Self::NUM_BONES
        } else {
            0..Self::NUM_BONES
        }
    }

    /// Binds the finger to a chain of bones starting at `root`, following first children.
    ///
    /// Also derives `model_finger_pointing` from the offset of the root's first child: the
    /// finger points from its root towards the next bone.
    pub fn bind<H: BoneHierarchy>(
        &mut self,
        hierarchy: &H,
        root: H::Bone,
        use_metacarpals: bool,
    ) -> Result<FingerBones<H::Bone>, RigError> {
        let slots = self.bone_slots(use_metacarpals);
        let chain = hierarchy.first_child_chain(root, slots.len() - 1);

        let found = chain.iter().flatten().count();
        if found != slots.len() {
            return Err(RigError::MissingChild {
                finger: self.finger_type,
                expected: slots.len() - 1,
                found: found - 1,
            });
        }

        let mut bones = [None; Self::NUM_BONES];
        for (slot, bone) in slots.zip(chain) {
            bones[slot] = bone;
        }

        let child = hierarchy
            .first_child(root)
            .ok_or(RigError::MissingChild {
                finger: self.finger_type,
                expected: 1,
                found: 0,
            })?;
        let child_position = hierarchy
            .local_transform(child)
            .ok_or_else(|| RigError::MissingTransform(format!("{child:?}")))?
            .translation;

        self.model_finger_pointing = zeroed_axis(Vec3::from(child_position));

        Ok(bones)
    }

    /// Computes the bone poses for one frame of tracking data.
    ///
    /// `parent_hand_scale` is the world scale of the hand the finger belongs to;
    /// tracked lengths are divided by it before comparing against `reference`.
    pub fn solve(
        &self,
        joints: &JointPoses,
        parent_hand_scale: f32,
        reference: &ReferenceHand,
    ) -> FingerPose {
        let reorientation = self.reorientation();
        let mut pose = FingerPose::default();

        for (bone_index, bone) in pose.bones.iter_mut().enumerate() {
            let Some(joint) = self.joint_pose(bone_index, joints) else {
                continue;
            };

            let mut update = BoneUpdate {
                rotation: joint.rotation * reorientation,
                position: None,
                scale: None,
            };

            if self.deform_position {
                update.position = Some(joint.position);

                if bone_index == Self::DISTAL && self.scale_last_finger_bone {
                    update.scale =
                        self.fingertip_scale(joint.position, joints, parent_hand_scale, reference);
                }
            }

            *bone = Some(update);
        }

        pose
    }

    /// Scale of the distal bone along its length axis that matches the tracked fingertip length.
    fn fingertip_scale(
        &self,
        bone_root: Vec3,
        joints: &JointPoses,
        parent_hand_scale: f32,
        reference: &ReferenceHand,
    ) -> Option<AxisScale> {
        let tip = self.joint_pose(Self::NUM_BONES, joints)?;
        let standard_length = reference.fingertip_length(self.finger_type)?;

        let mut bone = tip.position - bone_root;
        if parent_hand_scale != 0.0 && parent_hand_scale != 1.0 {
            bone /= parent_hand_scale;
        }

        Some(AxisScale {
            axis: largest_component_index(self.model_finger_pointing),
            value: bone.length() / standard_length,
        })
    }
}

/// New value for one component of a bone's local scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisScale {
    pub axis: usize,
    pub value: f32,
}

/// Result of solving a single bone. Rotation and position are in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoneUpdate {
    pub rotation: Quat,
    pub position: Option<Vec3>,
    pub scale: Option<AxisScale>,
}

/// Result of solving a finger. Bones whose joint was not tracked are [`None`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FingerPose {
    pub bones: [Option<BoneUpdate>; RiggedFinger::NUM_BONES],
}

impl FingerPose {
    /// Writes the solved bones into the hierarchy. Unbound bones are skipped.
    pub fn apply<H: BoneHierarchy>(&self, hierarchy: &mut H, bones: &FingerBones<H::Bone>) {
        for (update, bone) in self.bones.iter().zip(bones) {
            let (Some(update), Some(bone)) = (update, *bone) else {
                continue;
            };

            hierarchy.set_world_rotation(bone, update.rotation);

            if let Some(position) = update.position {
                hierarchy.set_world_position(bone, position);
            }

            if let Some(scale) = update.scale {
                hierarchy.set_local_scale_axis(bone, scale.axis, scale.value);
            }
        }
    }
}
