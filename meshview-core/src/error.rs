//! Error types shared by the core crate
use thiserror::Error;

/// Invalid projection parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid field of view {fov}: tan(fov/2) = {tan_half} is below epsilon")]
    InvalidFieldOfView { fov: f32, tan_half: f32 },

    #[error("invalid aspect ratio {0}: must be greater than epsilon")]
    InvalidAspectRatio(f32),

    #[error("degenerate depth range: near plane {near} and far plane {far} coincide")]
    DegenerateDepthRange { near: f32, far: f32 },
}

/// Errors raised while constructing a camera.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// Position or target contains NaN or infinity.
    #[error("camera {0} must be a finite vector")]
    NonFiniteVector(&'static str),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Errors raised by the render pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("cannot build projection: {0}")]
    Projection(#[from] ProjectionError),
}

/// Errors raised while parsing STL data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),

    #[error("unexpected end of file: expected {expected} facets, data ends after {parsed}")]
    Truncated { expected: usize, parsed: usize },

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}
