//! Error types for accelerator builds and scene setup.
//!
//! Only configuration problems are errors. Numeric trouble on an individual
//! ray is handled locally during traversal and at worst costs that ray its hit.

use thiserror::Error;

/// Errors that can occur while building an acceleration structure.
///
/// A structure whose build failed is left empty and every query misses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccelError {
    #[error("primitive list is empty")]
    EmptyPrimitiveList,

    #[error("primitive list is unbounded")]
    UnboundedPrimitiveList,
}

/// Errors that can occur while assembling or building a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("instance transform is not invertible")]
    SingularTransform,

    #[error("acceleration structure build failed: {0}")]
    Accel(#[from] AccelError),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
