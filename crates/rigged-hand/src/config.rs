use glam::Vec3;
use log::warn;

use crate::joints::FingerType;

/// Distal bone lengths of the standard edit-time hand, in meters, thumb first.
pub const DEFAULT_FINGERTIP_LENGTHS: [f32; 5] = [0.02167, 0.01582, 0.01740, 0.01730, 0.01596];

/// Default direction fingers point in, in a finger bone's local space.
pub const DEFAULT_FINGER_POINTING: Vec3 = Vec3::Z;

/// Default direction the palm faces, in a finger bone's local space.
pub const DEFAULT_PALM_FACING: Vec3 = Vec3::NEG_Y;

/// Configuration of a rigged hand.
///
/// Defines how tracked joints are mapped onto the bones of the rig.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HandRigConfig {
    /// Move finger bones to the tracked joint positions, stretching the mesh.
    /// Only enable this when the mesh is not visible or tolerates stretching.
    pub deform_positions_in_fingers: bool,
    /// Bones only exist at their roots in model rigs, so the length of the last
    /// fingertip bone is lost when bones are placed at tracked positions.
    /// When set, the last bone is scaled along its length axis to match the tracked length.
    /// Only has an effect together with `deform_positions_in_fingers`.
    pub scale_last_finger_bones: bool,
    /// Hands are typically rigged with the palm transform near the wrist. Disable this
    /// if the model's palm transform sits at the center of the palm.
    pub model_palm_at_wrist: bool,
    /// Whether each finger has an extra transform between the palm and the base of the finger.
    pub use_metacarpals: bool,
    /// Together with `model_palm_facing`, re-orients the palm to compensate for axis
    /// differences between tracked joints and model bones. Ignored while zero.
    pub model_finger_pointing: Vec3,
    /// See `model_finger_pointing`.
    pub model_palm_facing: Vec3,
}

impl Default for HandRigConfig {
    fn default() -> Self {
        Self {
            deform_positions_in_fingers: true,
            scale_last_finger_bones: true,
            model_palm_at_wrist: true,
            use_metacarpals: false,
            model_finger_pointing: Vec3::ZERO,
            model_palm_facing: Vec3::ZERO,
        }
    }
}

/// Proportions of the hand a model was built against.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReferenceHand {
    /// Length of each finger's distal bone, thumb first.
    pub fingertip_lengths: [f32; 5],
}

impl Default for ReferenceHand {
    fn default() -> Self {
        Self {
            fingertip_lengths: DEFAULT_FINGERTIP_LENGTHS,
        }
    }
}

impl ReferenceHand {
    /// Length of the distal bone of the given finger.
    ///
    /// Returns [`None`] for non-positive lengths, which cannot be scaled against.
    pub fn fingertip_length(&self, finger: FingerType) -> Option<f32> {
        let length = self.fingertip_lengths[finger.index()];

        if length > 0.0 {
            Some(length)
        } else {
            warn!("Reference fingertip length for {finger:?} is {length}, skipping bone scaling");
            None
        }
    }
}
