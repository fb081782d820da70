//! Retargets tracked hand joints onto the bones of a rigged 3D hand model.
//!
//! A hand tracking source reports a sparse set of named joints, each with a position and
//! an orientation. This crate computes where the bones of a skinned hand mesh have to go so
//! that the mesh follows the tracked hand, compensating for model bones whose axes differ
//! from the tracked joint axes and for the length of the last bone of each finger, which
//! model rigs do not carry.
//!
//! # Usage
//!
//! If you are using the [Bevy](https://bevyengine.org/) game engine, you will most likely want
//! to use `rigged-hand-bevy`.
//!
//! Alternatively, this library can be used with any scene graph. Implement [`BoneHierarchy`]
//! for it, bind a [`RiggedHand`] to the bones of the model with [`RiggedHand::bind`], and for
//! every frame of tracking data call [`RiggedHand::solve`] followed by [`HandPose::apply`].

mod error;

pub mod config;
pub mod finger;
pub mod hand;
pub mod hierarchy;
pub mod joints;
pub mod math;
pub mod visualizer;

pub mod prelude;

pub use prelude::*;
pub use glam::{Affine3A, Quat, Vec3};

/// Local transform of a bone, relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Transform {
    pub scale: mint::Vector3<f32>,
    pub rotation: mint::Quaternion<f32>,
    pub translation: mint::Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE.into(),
            rotation: Quat::IDENTITY.into(),
            translation: Vec3::ZERO.into(),
        }
    }
}

impl Transform {
    pub fn from_scale_rotation_translation(
        scale: impl Into<mint::Vector3<f32>>,
        rotation: impl Into<mint::Quaternion<f32>>,
        translation: impl Into<mint::Vector3<f32>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation: rotation.into(),
            translation: translation.into(),
        }
    }
}

impl From<Transform> for Affine3A {
    fn from(transform: Transform) -> Self {
        Self::from_scale_rotation_translation(
            transform.scale.into(),
            transform.rotation.into(),
            transform.translation.into(),
        )
    }
}
