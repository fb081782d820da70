use glam::{Quat, Vec3};
use log::debug;

use crate::config::{HandRigConfig, ReferenceHand};
use crate::error::RigError;
use crate::finger::{FingerBones, FingerPose, RiggedFinger};
use crate::hierarchy::BoneHierarchy;
use crate::joints::{FingerType, JointPoses, TrackedHandJoint};
use crate::math::reorientation;

/// A skinned and jointed 3D hand model.
///
/// Maps the wrist and palm joints to the root transforms of the rig and
/// fans out to the fingers, ordered from thumb to pinky.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RiggedHand {
    pub config: HandRigConfig,
    /// Proportions the model was built against, used to scale fingertips.
    pub reference: ReferenceHand,
    pub fingers: [Option<RiggedFinger>; RiggedHand::NUM_FINGERS],
}

impl Default for RiggedHand {
    fn default() -> Self {
        Self::new(HandRigConfig::default())
    }
}

impl RiggedHand {
    /// The number of fingers on a hand.
    pub const NUM_FINGERS: usize = 5;

    /// Creates a hand with all five fingers.
    pub fn new(config: HandRigConfig) -> Self {
        let mut hand = Self {
            config,
            reference: ReferenceHand::default(),
            fingers: FingerType::ALL.map(|finger| Some(RiggedFinger::new(finger))),
        };
        hand.update_finger_settings();
        hand
    }

    /// Rotation derived from `model_finger_pointing` and `model_palm_facing`.
    /// Identity while either of them is zero.
    pub fn user_bone_rotation(&self) -> Quat {
        let HandRigConfig {
            model_finger_pointing,
            model_palm_facing,
            ..
        } = self.config;

        if model_finger_pointing == Vec3::ZERO || model_palm_facing == Vec3::ZERO {
            return Quat::IDENTITY;
        }

        reorientation(model_finger_pointing, model_palm_facing)
    }

    pub fn finger(&self, finger: FingerType) -> Option<&RiggedFinger> {
        self.fingers[finger.index()].as_ref()
    }

    pub fn finger_mut(&mut self, finger: FingerType) -> Option<&mut RiggedFinger> {
        self.fingers[finger.index()].as_mut()
    }

    /// Pushes the hand's deformation settings down to every finger.
    pub fn update_finger_settings(&mut self) {
        for finger in self.fingers.iter_mut().flatten() {
            finger.deform_position = self.config.deform_positions_in_fingers;
            finger.scale_last_finger_bone = self.config.scale_last_finger_bones;
        }
    }

    /// Updates the finger settings and binds every finger to the bone chain below its root.
    ///
    /// Fingers that fail to bind are left without bones, the first error is returned
    /// after all fingers have been tried.
    pub fn bind<H: BoneHierarchy>(
        &mut self,
        hierarchy: &H,
        bones: &mut HandBones<H::Bone>,
    ) -> Result<(), RigError> {
        self.update_finger_settings();

        let use_metacarpals = self.config.use_metacarpals;
        let mut result = Ok(());

        for ((finger, root), finger_bones) in self
            .fingers
            .iter_mut()
            .zip(bones.finger_roots)
            .zip(&mut bones.fingers)
        {
            *finger_bones = [None; RiggedFinger::NUM_BONES];

            let (Some(finger), Some(root)) = (finger.as_mut(), root) else {
                continue;
            };

            match finger.bind(hierarchy, root, use_metacarpals) {
                Ok(bound) => {
                    debug!(
                        "bound {:?} finger to {bound:?}, pointing along {}",
                        finger.finger_type, finger.model_finger_pointing
                    );
                    *finger_bones = bound;
                }
                Err(err) => {
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }

        result
    }

    /// Computes the pose of the rig for one frame of tracking data.
    ///
    /// `hand_scale` is the world scale of the hand model along its x axis.
    pub fn solve(&self, joints: &JointPoses, hand_scale: f32) -> HandPose {
        let wrist = joints.get(TrackedHandJoint::Wrist);
        let palm = joints.get(TrackedHandJoint::Palm);
        let palm_rotation = palm.map(|pose| pose.rotation * self.user_bone_rotation());

        let (palm_position, wrist_position) = if self.config.model_palm_at_wrist {
            (wrist.map(|pose| pose.position), None)
        } else {
            (
                palm.map(|pose| pose.position),
                wrist.map(|pose| pose.position),
            )
        };

        HandPose {
            palm_position,
            palm_rotation,
            wrist_position,
            fingers: self.fingers.map(|finger| {
                finger.map(|finger| finger.solve(joints, hand_scale, &self.reference))
            }),
        }
    }
}

/// Bones of the scene graph a [`RiggedHand`] is bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HandBones<B> {
    /// The palm of the model, the root the fingers hang off.
    pub palm: Option<B>,
    /// The wrist joint, only driven when the palm is not placed at the wrist.
    pub wrist_joint: Option<B>,
    /// First bone of each finger chain, thumb first.
    pub finger_roots: [Option<B>; RiggedHand::NUM_FINGERS],
    /// Bound finger chains, filled in by [`RiggedHand::bind`].
    pub fingers: [FingerBones<B>; RiggedHand::NUM_FINGERS],
}

impl<B> Default for HandBones<B> {
    fn default() -> Self {
        Self {
            palm: None,
            wrist_joint: None,
            finger_roots: [const { None }; RiggedHand::NUM_FINGERS],
            fingers: [const { [None, None, None, None] }; RiggedHand::NUM_FINGERS],
        }
    }
}

/// Result of solving a hand. Positions and rotations are in world space.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct HandPose {
    pub palm_position: Option<Vec3>,
    pub palm_rotation: Option<Quat>,
    pub wrist_position: Option<Vec3>,
    pub fingers: [Option<FingerPose>; RiggedHand::NUM_FINGERS],
}

impl HandPose {
    /// Writes the solved pose into the hierarchy, palm first so that the
    /// fingers are placed relative to the moved palm.
    pub fn apply<H: BoneHierarchy>(&self, hierarchy: &mut H, bones: &HandBones<H::Bone>) {
        if let Some(palm) = bones.palm {
            if let Some(position) = self.palm_position {
                hierarchy.set_world_position(palm, position);
            }

            if let Some(rotation) = self.palm_rotation {
                hierarchy.set_world_rotation(palm, rotation);
            }

            if let (Some(wrist), Some(position)) = (bones.wrist_joint, self.wrist_position) {
                hierarchy.set_world_position(wrist, position);
            }
        }

        for (finger, finger_bones) in self.fingers.iter().zip(&bones.fingers) {
            if let Some(finger) = finger {
                finger.apply(hierarchy, finger_bones);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform;
    use crate::hierarchy::tests::TestRig;
    use crate::joints::Pose;

    const EPSILON: f32 = 1e-5;

    fn wrist_and_palm() -> JointPoses {
        [
            (
                TrackedHandJoint::Wrist,
                Pose {
                    position: Vec3::new(0.0, 1.0, 0.3),
                    rotation: Quat::from_rotation_z(0.2),
                },
            ),
            (
                TrackedHandJoint::Palm,
                Pose {
                    position: Vec3::new(0.0, 1.05, 0.35),
                    rotation: Quat::from_rotation_x(0.5),
                },
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Palm at the root, a wrist joint and a three bone index finger below it.
    fn rig() -> (TestRig, HandBones<usize>) {
        let mut rig = TestRig::default();
        let offset = |z: f32| {
            Transform::from_scale_rotation_translation(
                Vec3::ONE,
                Quat::IDENTITY,
                Vec3::new(0.0, 0.0, z),
            )
        };

        let palm = rig.add(None, Transform::default());
        let index = rig.add(Some(palm), offset(0.08));
        let middle = rig.add(Some(index), offset(0.04));
        rig.add(Some(middle), offset(0.025));
        let wrist = rig.add(Some(palm), offset(-0.05));

        let mut bones = HandBones::default();
        bones.palm = Some(palm);
        bones.wrist_joint = Some(wrist);
        bones.finger_roots[FingerType::Index.index()] = Some(index);
        (rig, bones)
    }

    #[test]
    fn user_bone_rotation_needs_both_vectors() {
        let mut hand = RiggedHand::default();
        assert_eq!(hand.user_bone_rotation(), Quat::IDENTITY);

        hand.config.model_finger_pointing = Vec3::X;
        assert_eq!(hand.user_bone_rotation(), Quat::IDENTITY);

        hand.config.model_palm_facing = Vec3::NEG_Z;
        assert!((hand.user_bone_rotation() * Vec3::X).abs_diff_eq(Vec3::Z, EPSILON));
    }

    #[test]
    fn palm_at_wrist_uses_wrist_position() {
        let hand = RiggedHand::default();
        let pose = hand.solve(&wrist_and_palm(), 1.0);

        assert_eq!(pose.palm_position, Some(Vec3::new(0.0, 1.0, 0.3)));
        assert_eq!(pose.palm_rotation, Some(Quat::from_rotation_x(0.5)));
        assert_eq!(pose.wrist_position, None);
    }

    #[test]
    fn palm_at_center_moves_wrist_separately() {
        let hand = RiggedHand::new(HandRigConfig {
            model_palm_at_wrist: false,
            ..Default::default()
        });
        let pose = hand.solve(&wrist_and_palm(), 1.0);

        assert_eq!(pose.palm_position, Some(Vec3::new(0.0, 1.05, 0.35)));
        assert_eq!(pose.wrist_position, Some(Vec3::new(0.0, 1.0, 0.3)));
    }

    #[test]
    fn missing_palm_joint_keeps_rotation() {
        let mut joints = wrist_and_palm();
        joints = joints
            .iter()
            .filter(|(joint, _)| *joint == TrackedHandJoint::Wrist)
            .collect();

        let pose = RiggedHand::default().solve(&joints, 1.0);
        assert!(pose.palm_position.is_some());
        assert_eq!(pose.palm_rotation, None);
    }

    #[test]
    fn settings_reach_fingers() {
        let mut hand = RiggedHand::new(HandRigConfig {
            deform_positions_in_fingers: false,
            ..Default::default()
        });
        assert!(hand.fingers.iter().flatten().all(|finger| !finger.deform_position));

        hand.config.deform_positions_in_fingers = true;
        hand.config.scale_last_finger_bones = false;
        hand.update_finger_settings();

        assert!(hand.fingers.iter().flatten().all(|finger| finger.deform_position));
        assert!(hand.fingers.iter().flatten().all(|finger| !finger.scale_last_finger_bone));
    }

    #[test]
    fn bind_and_apply() {
        let (mut rig, mut bones) = rig();
        let mut hand = RiggedHand::new(HandRigConfig {
            model_palm_at_wrist: false,
            ..Default::default()
        });

        hand.bind(&rig, &mut bones).unwrap();
        assert_eq!(
            bones.fingers[FingerType::Index.index()],
            [None, Some(1), Some(2), Some(3)]
        );
        assert_eq!(bones.fingers[FingerType::Thumb.index()], [None; 4]);

        let index = hand.finger(FingerType::Index).unwrap();
        assert_eq!(index.model_finger_pointing, Vec3::Z);
        assert!(index.deform_position);

        let mut joints = wrist_and_palm();
        let knuckle = Vec3::new(0.01, 1.1, 0.4);
        joints.insert(
            TrackedHandJoint::IndexKnuckle,
            Pose {
                position: knuckle,
                rotation: Quat::IDENTITY,
            },
        );

        hand.solve(&joints, 1.0).apply(&mut rig, &bones);

        let palm = bones.palm.unwrap();
        assert!(rig.world_position(palm).abs_diff_eq(Vec3::new(0.0, 1.05, 0.35), EPSILON));
        assert!(rig.world_rotation(palm).abs_diff_eq(Quat::from_rotation_x(0.5), EPSILON));
        assert!(
            rig.world_position(bones.wrist_joint.unwrap())
                .abs_diff_eq(Vec3::new(0.0, 1.0, 0.3), EPSILON)
        );
        assert!(rig.world_position(1).abs_diff_eq(knuckle, EPSILON));

        // The knuckle bone's +Z points along the tracked forward axis.
        assert!((rig.world_rotation(1) * Vec3::Z).abs_diff_eq(Vec3::Z, EPSILON));
    }

    #[test]
    fn fingers_follow_tracked_forward() {
        let (mut rig, mut bones) = rig();
        let mut hand = RiggedHand::new(HandRigConfig {
            deform_positions_in_fingers: false,
            ..Default::default()
        });
        hand.bind(&rig, &mut bones).unwrap();

        let mut joints = wrist_and_palm();
        for joint in [
            TrackedHandJoint::IndexKnuckle,
            TrackedHandJoint::IndexMiddleJoint,
            TrackedHandJoint::IndexDistalJoint,
        ] {
            joints.insert(joint, Pose::default());
        }
        hand.solve(&joints, 1.0).apply(&mut rig, &bones);

        // A model rigged along +Z keeps its bones in front of each other.
        let index = bones.fingers[FingerType::Index.index()];
        let [_, Some(knuckle), Some(middle), Some(distal)] = index else {
            panic!("index finger is bound");
        };
        let knuckle_to_middle = rig.world_position(middle) - rig.world_position(knuckle);
        let middle_to_distal = rig.world_position(distal) - rig.world_position(middle);
        assert!(knuckle_to_middle.abs_diff_eq(Vec3::new(0.0, 0.0, 0.04), EPSILON));
        assert!(middle_to_distal.abs_diff_eq(Vec3::new(0.0, 0.0, 0.025), EPSILON));
    }

    #[test]
    fn bind_reports_broken_chains() {
        let (rig, mut bones) = rig();
        let mut hand = RiggedHand::new(HandRigConfig {
            use_metacarpals: true,
            ..Default::default()
        });
        bones.finger_roots[FingerType::Thumb.index()] =
            bones.finger_roots[FingerType::Index.index()];

        let err = hand.bind(&rig, &mut bones).unwrap_err();

        assert_eq!(
            err,
            RigError::MissingChild {
                finger: FingerType::Index,
                expected: 3,
                found: 2,
            }
        );
        // The thumb chain has no metacarpal slot and still binds.
        assert_eq!(
            bones.fingers[FingerType::Thumb.index()],
            [None, Some(1), Some(2), Some(3)]
        );
        assert_eq!(bones.fingers[FingerType::Index.index()], [None; 4]);
    }

    #[test]
    fn unbound_palm_skips_wrist() {
        let (mut rig, mut bones) = rig();
        bones.palm = None;
        let before = rig.local(bones.wrist_joint.unwrap());

        let hand = RiggedHand::new(HandRigConfig {
            model_palm_at_wrist: false,
            ..Default::default()
        });
        hand.solve(&wrist_and_palm(), 1.0).apply(&mut rig, &bones);

        assert_eq!(rig.local(bones.wrist_joint.unwrap()), before);
    }
}
