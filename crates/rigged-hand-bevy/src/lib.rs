//! Bevy integration for `rigged-hand`.
//!
//! Add [`RiggedHandPlugin`] to your app, spawn a [`HandRig`] together with a
//! [`HandController`] on the root of a rigged hand model, and feed tracking data in as
//! [`HandJointsUpdated`] messages. The plugin binds the rig to the model's bone hierarchy
//! whenever it is added or a [`HandSourceDetected`] message arrives, moves the bones on every
//! joint update, and despawns the model once its source sends [`HandSourceLost`].

use bevy_app::prelude::*;
use bevy_ecs::entity::EntityHashSet;
use bevy_ecs::prelude::*;
use bevy_ecs::reflect::ReflectResource;
use bevy_log::{debug, warn};
use bevy_math::Vec3;
use bevy_reflect::prelude::*;
use bevy_transform::components::Transform;

use hierarchy::TransformHierarchy;

pub use rigged_hand::{HandRigConfig, *};

pub mod prelude;

mod hierarchy;

pub struct RiggedHandPlugin;

impl Plugin for RiggedHandPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HandRigOptions>()
            .register_type::<HandRigOptions>()
            .add_message::<HandSourceDetected>()
            .add_message::<HandSourceLost>()
            .add_message::<HandJointsUpdated>()
            .add_systems(
                Update,
                (bind_hand_rigs, apply_hand_joints, despawn_lost_hands)
                    .chain()
                    .in_set(RiggedHandSystems),
            );
    }
}

/// Systems that bind, move and despawn rigged hands.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RiggedHandSystems;

/// Settings used for newly created hand rigs.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource, Default)]
pub struct HandRigOptions {
    pub deform_positions_in_fingers: bool,
    pub scale_last_finger_bones: bool,
    pub model_palm_at_wrist: bool,
    pub use_metacarpals: bool,
    pub model_finger_pointing: Vec3,
    pub model_palm_facing: Vec3,
}

impl Default for HandRigOptions {
    fn default() -> Self {
        HandRigConfig::default().into()
    }
}

impl From<HandRigConfig> for HandRigOptions {
    fn from(config: HandRigConfig) -> Self {
        Self {
            deform_positions_in_fingers: config.deform_positions_in_fingers,
            scale_last_finger_bones: config.scale_last_finger_bones,
            model_palm_at_wrist: config.model_palm_at_wrist,
            use_metacarpals: config.use_metacarpals,
            model_finger_pointing: config.model_finger_pointing,
            model_palm_facing: config.model_palm_facing,
        }
    }
}

impl From<&HandRigOptions> for HandRigConfig {
    fn from(options: &HandRigOptions) -> Self {
        Self {
            deform_positions_in_fingers: options.deform_positions_in_fingers,
            scale_last_finger_bones: options.scale_last_finger_bones,
            model_palm_at_wrist: options.model_palm_at_wrist,
            use_metacarpals: options.use_metacarpals,
            model_finger_pointing: options.model_finger_pointing,
            model_palm_facing: options.model_palm_facing,
        }
    }
}

/// Identifier of a hand tracking input source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// The input source a hand model visualizes.
#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
pub struct HandController {
    pub source_id: SourceId,
    pub handedness: Handedness,
}

/// A skinned and jointed hand model, placed on the root entity of the model.
#[derive(Component, Debug, Clone)]
pub struct HandRig {
    pub hand: RiggedHand,
    /// Bone entities of the model. Finger chains are filled in when the rig is bound.
    pub bones: HandBones<Entity>,
}

impl HandRig {
    pub fn new(hand: RiggedHand, bones: HandBones<Entity>) -> Self {
        Self { hand, bones }
    }

    /// Creates a rig with all five fingers, configured from `options`.
    pub fn from_options(options: &HandRigOptions, bones: HandBones<Entity>) -> Self {
        Self::new(RiggedHand::new(options.into()), bones)
    }
}

/// Drives one entity per tracked joint directly from the joint poses.
#[derive(Component, Debug, Clone, Default)]
pub struct HandJointVisualizer(pub JointVisualizer<Entity>);

/// A hand tracking source started reporting.
#[derive(Message, Debug, Copy, Clone)]
pub struct HandSourceDetected {
    pub source_id: SourceId,
    pub handedness: Handedness,
}

/// A hand tracking source stopped reporting.
#[derive(Message, Debug, Copy, Clone)]
pub struct HandSourceLost {
    pub source_id: SourceId,
}

/// New joint poses from a hand tracking source.
#[derive(Message, Debug, Clone)]
pub struct HandJointsUpdated {
    pub source_id: SourceId,
    pub handedness: Handedness,
    pub joints: JointPoses,
}

pub(crate) type BoneData = (
    &'static mut Transform,
    Option<&'static ChildOf>,
    Option<&'static Children>,
);

fn bind_hand_rigs(
    mut detected: MessageReader<HandSourceDetected>,
    mut rigs: Query<(Entity, &mut HandRig)>,
    mut bones: Query<BoneData>,
) {
    let source_detected = detected.read().count() > 0;

    for (entity, mut rig) in &mut rigs {
        if !source_detected && !rig.is_added() {
            continue;
        }

        let HandRig {
            hand,
            bones: hand_bones,
        } = &mut *rig;

        let hierarchy = TransformHierarchy::new(&mut bones);
        match hand.bind(&hierarchy, hand_bones) {
            Ok(()) => debug!("Bound hand rig {entity:?}"),
            Err(err) => warn!("Failed to bind hand rig {entity:?}: {err}"),
        }
    }
}

fn apply_hand_joints(
    mut updates: MessageReader<HandJointsUpdated>,
    mut warnings: Local<MismatchWarnings>,
    rigs: Query<(Entity, &HandRig, &HandController)>,
    visualizers: Query<(Entity, &HandJointVisualizer, &HandController)>,
    mut bones: Query<BoneData>,
) {
    for update in updates.read() {
        let mut hierarchy = TransformHierarchy::new(&mut bones);

        for (entity, rig, controller) in &rigs {
            if !warnings.accepts(entity, controller, update) {
                continue;
            }

            let (hand_scale, _, _) = hierarchy.world_matrix(entity).to_scale_rotation_translation();

            rig.hand
                .solve(&update.joints, hand_scale.x)
                .apply(&mut hierarchy, &rig.bones);
        }

        for (entity, visualizer, controller) in &visualizers {
            if warnings.accepts(entity, controller, update) {
                visualizer.0.apply(&update.joints, &mut hierarchy);
            }
        }
    }
}

/// Models already reported for receiving joints of the other hand.
#[derive(Debug, Default)]
pub(crate) struct MismatchWarnings(EntityHashSet);

impl MismatchWarnings {
    /// Whether joints from `update` should drive `model`, which belongs to `controller`.
    ///
    /// A handedness mismatch is warned about once per model and logged at debug level after.
    pub(crate) fn accepts(
        &mut self,
        model: Entity,
        controller: &HandController,
        update: &HandJointsUpdated,
    ) -> bool {
        if controller.source_id != update.source_id {
            return false;
        }

        if controller.handedness != update.handedness {
            if self.0.insert(model) {
                warn!(
                    "Source {:?} reported {:?} joints for {:?} hand model {model:?}, ignoring them",
                    update.source_id, update.handedness, controller.handedness
                );
            } else {
                debug!(
                    "Ignoring {:?} joints from source {:?} for {model:?}",
                    update.handedness, update.source_id
                );
            }
            return false;
        }

        true
    }
}

fn despawn_lost_hands(
    mut lost: MessageReader<HandSourceLost>,
    controllers: Query<(Entity, &HandController)>,
    mut commands: Commands,
) {
    for message in lost.read() {
        for (entity, controller) in &controllers {
            if controller.source_id == message.source_id {
                debug!(
                    "Source {:?} lost, despawning hand model {entity:?}",
                    message.source_id
                );
                commands.entity(entity).despawn();
            }
        }
    }
}
