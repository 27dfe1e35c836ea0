//! Error types for scene construction and image output.

use thiserror::Error;

/// Errors raised while building a scene, a camera or a render configuration.
///
/// These are programmer/scene-setup mistakes. Rendering itself cannot fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("Sphere center must be finite, got {0}")]
    NonFiniteCenter(glint_math::Vec3),

    #[error("Cannot build a BVH over an empty scene")]
    EmptyScene,

    #[error("Object {index} has no bounding box")]
    Unboundable { index: usize },

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur while writing a rendered image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Result type for image output.
pub type OutputResult<T> = Result<T, OutputError>;
