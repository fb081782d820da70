//! Drives a procedurally built hand rig with a synthetic, slowly curling hand.
//! Runs headless and logs the solved index finger every few frames.

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use bevy_app::{AppExit, ScheduleRunnerPlugin, prelude::*};
use bevy_ecs::prelude::*;
use bevy_log::{LogPlugin, info};
use bevy_math::{Quat, Vec3};
use bevy_transform::components::Transform;
use rigged_hand_bevy::prelude::*;

const SOURCE: HandController = HandController {
    source_id: SourceId(1),
    handedness: Handedness::Right,
};

const FRAMES: u32 = 120;

/// Bone lengths of the model, metacarpal to distal.
const BONE_LENGTHS: [f32; 4] = [0.06, 0.04, 0.025, 0.018];

fn main() {
    App::new()
        .add_plugins((
            ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0)),
            LogPlugin::default(),
            RiggedHandPlugin,
        ))
        .add_systems(Startup, spawn_hand)
        .add_systems(
            Update,
            (track_hand.before(RiggedHandSystems), log_index_finger.after(RiggedHandSystems)),
        )
        .run();
}

fn spawn_hand(
    mut commands: Commands,
    options: Res<HandRigOptions>,
    mut detected: MessageWriter<HandSourceDetected>,
) {
    let root = commands.spawn(Transform::default()).id();
    let palm = commands.spawn((Transform::default(), ChildOf(root))).id();

    let mut bones = HandBones::default();
    bones.palm = Some(palm);

    for finger in FingerType::ALL {
        let spread = (finger.index() as f32 - 2.0) * 0.02;
        let mut parent = palm;
        let mut offset = Vec3::new(spread, 0.0, 0.0);

        for length in BONE_LENGTHS {
            let bone = commands
                .spawn((Transform::from_translation(offset), ChildOf(parent)))
                .id();
            if parent == palm {
                bones.finger_roots[finger.index()] = Some(bone);
            }
            parent = bone;
            offset = Vec3::new(0.0, 0.0, length);
        }
    }

    let options = HandRigOptions {
        use_metacarpals: true,
        ..options.clone()
    };
    commands
        .entity(root)
        .insert((HandRig::from_options(&options, bones), SOURCE));

    detected.write(HandSourceDetected {
        source_id: SOURCE.source_id,
        handedness: SOURCE.handedness,
    });
}

/// Produces joints for a hand at the origin whose fingers curl over time.
fn track_hand(
    mut frame: Local<u32>,
    mut updates: MessageWriter<HandJointsUpdated>,
    mut exit: MessageWriter<AppExit>,
) {
    *frame += 1;
    if *frame > FRAMES {
        exit.write(AppExit::Success);
        return;
    }

    let curl = FRAC_PI_2 * (*frame as f32 / FRAMES as f32);
    let mut joints = JointPoses::new();
    joints.insert(TrackedHandJoint::Wrist, Pose::default());
    joints.insert(
        TrackedHandJoint::Palm,
        Pose::new(Vec3::new(0.0, 0.0, 0.04), Quat::IDENTITY),
    );

    for finger in FingerType::ALL {
        let spread = (finger.index() as f32 - 2.0) * 0.02;
        let mut position = Vec3::new(spread, 0.0, 0.0);
        let mut rotation = Quat::IDENTITY;

        for bone in 0..FingerType::BONE_SLOTS {
            if let Some(joint) = finger.joint(bone) {
                joints.insert(joint, Pose { position, rotation });
            }

            let length = BONE_LENGTHS.get(bone).copied().unwrap_or_default();
            position += rotation * Vec3::new(0.0, 0.0, length);
            rotation *= Quat::from_rotation_x(curl / 3.0);
        }
    }

    updates.write(HandJointsUpdated {
        source_id: SOURCE.source_id,
        handedness: SOURCE.handedness,
        joints,
    });
}

fn log_index_finger(mut frame: Local<u32>, rigs: Query<&HandRig>, transforms: Query<&Transform>) {
    *frame += 1;
    if *frame % 30 != 0 {
        return;
    }

    for rig in &rigs {
        let bones = rig.bones.fingers[FingerType::Index.index()];
        let [_, Some(_), _, Some(distal)] = bones else {
            continue;
        };

        if let Ok(transform) = transforms.get(distal) {
            info!(
                "frame {}: index distal bone at {}, scale {}",
                *frame, transform.translation, transform.scale
            );
        }
    }
}
