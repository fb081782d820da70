use ahash::HashMap;
use enumset::{EnumSet, EnumSetType};
use glam::{Quat, Vec3};

/// A joint reported by the hand tracking source.
#[derive(Debug, EnumSetType, Hash)]
pub enum TrackedHandJoint {
    /// The wrist, at the base of the hand.
    Wrist,
    /// The center of the palm.
    Palm,
    ThumbMetacarpalJoint,
    ThumbProximalJoint,
    ThumbDistalJoint,
    ThumbTip,
    IndexMetacarpal,
    IndexKnuckle,
    IndexMiddleJoint,
    IndexDistalJoint,
    IndexTip,
    MiddleMetacarpal,
    MiddleKnuckle,
    MiddleMiddleJoint,
    MiddleDistalJoint,
    MiddleTip,
    RingMetacarpal,
    RingKnuckle,
    RingMiddleJoint,
    RingDistalJoint,
    RingTip,
    PinkyMetacarpal,
    PinkyKnuckle,
    PinkyMiddleJoint,
    PinkyDistalJoint,
    PinkyTip,
}

impl TrackedHandJoint {
    /// The finger this joint belongs to, and the bone index of the joint within that finger.
    ///
    /// Returns [`None`] for [`TrackedHandJoint::Wrist`] and [`TrackedHandJoint::Palm`].
    pub fn finger(self) -> Option<(FingerType, usize)> {
        FingerType::ALL.into_iter().find_map(|finger| {
            (0..FingerType::BONE_SLOTS)
                .find(|&bone| finger.joint(bone) == Some(self))
                .map(|bone| (finger, bone))
        })
    }
}

/// Which hand a tracking source or a rig belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// The fingers of a hand, ordered from thumb to pinky.
#[derive(Debug, EnumSetType, Hash, Default)]
pub enum FingerType {
    Thumb,
    #[default]
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerType {
    /// All fingers, thumb first.
    pub const ALL: [Self; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Number of joint slots per finger: metacarpal, knuckle, middle, distal and tip.
    pub const BONE_SLOTS: usize = 5;

    /// Position of this finger in [`FingerType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The tracked joint that drives the given bone of this finger.
    ///
    /// Bone 0 is the metacarpal and bone 4 the fingertip. The thumb has no
    /// bone 0, its bones 1 to 4 are the metacarpal, proximal, distal and tip joints.
    pub fn joint(self, bone_index: usize) -> Option<TrackedHandJoint> {
        use TrackedHandJoint as J;

        let joints: [Option<J>; Self::BONE_SLOTS] = match self {
            Self::Thumb => [
                None,
                Some(J::ThumbMetacarpalJoint),
                Some(J::ThumbProximalJoint),
                Some(J::ThumbDistalJoint),
                Some(J::ThumbTip),
            ],
            Self::Index => [
                Some(J::IndexMetacarpal),
                Some(J::IndexKnuckle),
                Some(J::IndexMiddleJoint),
                Some(J::IndexDistalJoint),
                Some(J::IndexTip),
            ],
            Self::Middle => [
                Some(J::MiddleMetacarpal),
                Some(J::MiddleKnuckle),
                Some(J::MiddleMiddleJoint),
                Some(J::MiddleDistalJoint),
                Some(J::MiddleTip),
            ],
            Self::Ring => [
                Some(J::RingMetacarpal),
                Some(J::RingKnuckle),
                Some(J::RingMiddleJoint),
                Some(J::RingDistalJoint),
                Some(J::RingTip),
            ],
            Self::Pinky => [
                Some(J::PinkyMetacarpal),
                Some(J::PinkyKnuckle),
                Some(J::PinkyMiddleJoint),
                Some(J::PinkyDistalJoint),
                Some(J::PinkyTip),
            ],
        };

        joints.get(bone_index).copied().flatten()
    }
}

/// Position and orientation of a single tracked joint.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(
        position: impl Into<mint::Vector3<f32>>,
        rotation: impl Into<mint::Quaternion<f32>>,
    ) -> Self {
        Self {
            position: Vec3::from(position.into()),
            rotation: Quat::from(rotation.into()),
        }
    }
}

/// One frame of tracking data: the pose of every joint the source reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointPoses {
    poses: HashMap<TrackedHandJoint, Pose>,
}

impl JointPoses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pose of a joint, returning the previous one.
    pub fn insert(&mut self, joint: TrackedHandJoint, pose: Pose) -> Option<Pose> {
        self.poses.insert(joint, pose)
    }

    pub fn get(&self, joint: TrackedHandJoint) -> Option<Pose> {
        self.poses.get(&joint).copied()
    }

    pub fn contains(&self, joint: TrackedHandJoint) -> bool {
        self.poses.contains_key(&joint)
    }

    /// Joints present in this frame.
    pub fn tracked(&self) -> EnumSet<TrackedHandJoint> {
        self.poses.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedHandJoint, Pose)> + '_ {
        self.poses.iter().map(|(joint, pose)| (*joint, *pose))
    }
}

impl FromIterator<(TrackedHandJoint, Pose)> for JointPoses {
    fn from_iter<T: IntoIterator<Item = (TrackedHandJoint, Pose)>>(iter: T) -> Self {
        Self {
            poses: iter.into_iter().collect(),
        }
    }
}

impl Extend<(TrackedHandJoint, Pose)> for JointPoses {
    fn extend<T: IntoIterator<Item = (TrackedHandJoint, Pose)>>(&mut self, iter: T) {
        self.poses.extend(iter);
    }
}
