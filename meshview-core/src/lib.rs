//! meshview core library - software rendering pipeline
//!
//! Camera and projection math, model transforms, orbit controls, a CPU
//! triangle rasterizer and the render pipeline tying them together, plus the
//! mesh container and STL loader the viewer feeds it with.

pub mod color;
pub mod error;
pub mod geometry;
pub mod orbit;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod stl;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use color::Color;
pub use error::{CameraError, ProjectionError, RenderError, StlError};
pub use geometry::{Mesh, MeshSource};
pub use orbit::{OrbitController, OrbitSettings};
pub use pipeline::{render, RenderSettings, RenderStats};
pub use projection::{look_at, perspective, Camera};
pub use raster::{fill_triangle, Interpolation, Rasterizer};
pub use surface::{Framebuffer, Surface};
pub use transform::{Axis, Transform};
