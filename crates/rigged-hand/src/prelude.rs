pub use crate::config::{HandRigConfig, ReferenceHand};
pub use crate::error::RigError;
pub use crate::finger::{AxisScale, BoneUpdate, FingerBones, FingerPose, RiggedFinger};
pub use crate::hand::{HandBones, HandPose, RiggedHand};
pub use crate::hierarchy::BoneHierarchy;
pub use crate::joints::{FingerType, Handedness, JointPoses, Pose, TrackedHandJoint};
pub use crate::visualizer::JointVisualizer;

pub use enumset::{EnumSet, enum_set};

pub use mint;
