use thiserror::Error;

use crate::joints::FingerType;

/// Errors raised while binding a rig to the bones of a scene graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("{finger:?} finger needs {expected} chained bones below its root, found {found}")]
    MissingChild {
        finger: FingerType,
        expected: usize,
        found: usize,
    },
    #[error("bone {0} has no transform")]
    MissingTransform(String),
}
