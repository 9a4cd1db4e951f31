//! Model transforms: translation, scale, axis rotation and saved snapshots
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Below this magnitude `w` is left undivided
pub const W_EPSILON: f32 = 1e-7;

/// Coordinate axis for rotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// An immutable affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Translation(Vector3<f32>),
    Scale(Vector3<f32>),
    /// Rotation about a coordinate axis, angle in radians
    AxisRotation { axis: Axis, angle: f32 },
    /// A captured matrix, e.g. the product of several transforms
    Snapshot(Matrix4<f32>),
}

impl Transform {
    pub fn identity() -> Self {
        Transform::Snapshot(Matrix4::identity())
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Transform::Translation(Vector3::new(x, y, z))
    }

    pub fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        Transform::Scale(Vector3::new(sx, sy, sz))
    }

    pub fn rotation(axis: Axis, angle: f32) -> Self {
        Transform::AxisRotation { axis, angle }
    }

    /// Quaternion-style rotation about a coordinate axis.
    ///
    /// Numerically the same as [`Transform::rotation`]; kept for callers
    /// that think in quaternions.
    pub fn quaternion_rotation(axis: Axis, angle: f32) -> Self {
        Transform::rotation(axis, angle)
    }

    /// Product of `transforms`, applied right to left, saved as a snapshot
    pub fn compose(transforms: &[Transform]) -> Self {
        let matrix = transforms
            .iter()
            .fold(Matrix4::identity(), |acc, t| acc * t.matrix());
        Transform::Snapshot(matrix)
    }

    /// Save this transform as a snapshot of its current matrix
    pub fn snapshot(&self) -> Self {
        Transform::Snapshot(self.matrix())
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            Transform::Translation(offset) => Matrix4::new_translation(&offset),
            Transform::Scale(factors) => Matrix4::new_nonuniform_scaling(&factors),
            Transform::AxisRotation { axis, angle } => {
                Matrix4::new_rotation(axis.unit() * angle)
            }
            Transform::Snapshot(matrix) => matrix,
        }
    }

    /// Apply to a point, dividing by `w` when it is not near zero
    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        let h = self.matrix() * point.to_homogeneous();
        from_homogeneous(&h)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Homogeneous divide with the near-zero `w` fallback
pub fn from_homogeneous(h: &Vector4<f32>) -> Point3<f32> {
    if h.w.abs() > W_EPSILON {
        Point3::new(h.x / h.w, h.y / h.w, h.z / h.w)
    } else {
        Point3::new(h.x, h.y, h.z)
    }
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}
