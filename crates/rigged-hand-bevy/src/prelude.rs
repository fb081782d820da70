pub use crate::{
    HandController, HandJointVisualizer, HandJointsUpdated, HandRig, HandRigOptions,
    HandSourceDetected, HandSourceLost, RiggedHandPlugin, RiggedHandSystems, SourceId,
};

pub use rigged_hand::prelude::*;
