//! Camera, projection and view matrix builders
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{CameraError, ProjectionError};

/// Tolerance for degenerate projection and view parameters
pub const EPSILON: f32 = 1e-6;

/// A field of view above this value is read as degrees, otherwise as radians.
///
/// This is a convention at the API boundary, not a validation rule: a 5
/// degree fov passed as `5.0` is taken as five radians.
pub const FOV_DEGREES_THRESHOLD: f32 = 10.0;

/// Field of view in radians, applying the degrees heuristic
pub fn fov_radians(fov: f32) -> f32 {
    if fov > FOV_DEGREES_THRESHOLD {
        fov.to_radians()
    } else {
        fov
    }
}

/// Build a perspective projection matrix.
///
/// Entries are indexed `[row][col]` and the matrix is applied to column
/// vectors. Depth grows `w` after the divide, so points in front of the
/// camera (negative view-space z) end up with positive `w`.
pub fn perspective(
    fov: f32,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,
) -> Result<Matrix4<f32>, ProjectionError> {
    let tan_half = (fov_radians(fov) / 2.0).tan();
    if tan_half < EPSILON {
        return Err(ProjectionError::InvalidFieldOfView { fov, tan_half });
    }
    if aspect_ratio < EPSILON {
        return Err(ProjectionError::InvalidAspectRatio(aspect_ratio));
    }
    let depth = far_plane - near_plane;
    if depth.abs() < EPSILON {
        return Err(ProjectionError::DegenerateDepthRange {
            near: near_plane,
            far: far_plane,
        });
    }

    let mut m = Matrix4::zeros();
    m[(0, 0)] = 1.0 / (tan_half * aspect_ratio);
    m[(1, 1)] = 1.0 / tan_half;
    m[(2, 2)] = (far_plane + near_plane) / depth;
    m[(2, 3)] = 1.0;
    m[(3, 2)] = -2.0 * far_plane * near_plane / depth;
    Ok(m)
}

/// Build a view matrix looking from `eye` towards `target`.
///
/// The camera looks down its local -Z axis: `eye` maps to the origin and
/// `target` to a point with negative z. Degenerate inputs (eye on target, or
/// no usable up vector) yield the identity matrix.
pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
    let to_target = target - eye;
    let distance = to_target.norm();
    if distance < EPSILON {
        return Matrix4::identity();
    }
    let forward = to_target / distance;

    let Some(right) = right_axis(up, &forward) else {
        return Matrix4::identity();
    };
    let true_up = forward.cross(&right).normalize();

    #[rustfmt::skip]
    let rotation = Matrix4::new(
        right.x,    right.y,    right.z,    0.0,
        true_up.x,  true_up.y,  true_up.z,  0.0,
        -forward.x, -forward.y, -forward.z, 0.0,
        0.0,        0.0,        0.0,        1.0,
    );
    let translation = Matrix4::new_translation(&(-eye.coords));

    rotation * translation
}

/// `look_at` with the default +Y up hint
pub fn look_at_default(eye: &Point3<f32>, target: &Point3<f32>) -> Matrix4<f32> {
    look_at(eye, target, &Vector3::y())
}

fn right_axis(up: &Vector3<f32>, forward: &Vector3<f32>) -> Option<Vector3<f32>> {
    let right = up.cross(forward);
    if right.norm() >= EPSILON {
        return Some(right.normalize());
    }

    // Forward is parallel to the up hint, retry with another axis
    let alternate = if forward.y.abs() > 0.9 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    let right = alternate.cross(forward);
    if right.norm() >= EPSILON {
        Some(right.normalize())
    } else {
        None
    }
}

/// Camera configuration for 3D rendering
///
/// View and projection matrices are recomputed from the current fields on
/// every query.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    target: Point3<f32>,
    up: Vector3<f32>,
    fov: f32,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Result<Self, CameraError> {
        ensure_finite(&position, "position")?;
        ensure_finite(&target, "target")?;
        perspective(fov, aspect_ratio, near_plane, far_plane)?;

        Ok(Self {
            position,
            target,
            up: Vector3::y(),
            fov,
            aspect_ratio,
            near_plane,
            far_plane,
        })
    }

    /// Default camera for a viewport: 45 degree fov at (0, 0, 5) looking at the origin
    pub fn for_viewport(width: u32, height: u32) -> Result<Self, CameraError> {
        let aspect_ratio = width as f32 / height.max(1) as f32;
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            0.1,
            100.0,
        )
    }

    /// Replace the up hint used by the view matrix
    pub fn with_up(mut self, up: Vector3<f32>) -> Self {
        self.up = up;
        self
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        look_at(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Result<Matrix4<f32>, ProjectionError> {
        perspective(self.fov, self.aspect_ratio, self.near_plane, self.far_plane)
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn move_position(&mut self, delta: &Vector3<f32>) {
        self.position += *delta;
    }

    pub fn move_target(&mut self, delta: &Vector3<f32>) {
        self.target += *delta;
    }

    /// Update the aspect ratio, leaving the camera untouched if it is invalid
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) -> Result<(), ProjectionError> {
        perspective(self.fov, aspect_ratio, self.near_plane, self.far_plane)?;
        self.aspect_ratio = aspect_ratio;
        Ok(())
    }
}

fn ensure_finite(point: &Point3<f32>, name: &'static str) -> Result<(), CameraError> {
    if point.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(CameraError::NonFiniteVector(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector4};

    fn apply(m: &Matrix4<f32>, p: &Point3<f32>) -> Vector4<f32> {
        m * p.to_homogeneous()
    }

    fn rotation_determinant(m: &Matrix4<f32>) -> f32 {
        Matrix3::new(
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        )
        .determinant()
    }

    #[test]
    fn test_perspective_entries() {
        let m = perspective(std::f32::consts::FRAC_PI_4, 4.0 / 3.0, 0.1, 100.0).unwrap();
        assert!(m[(0, 0)] > 0.0);
        assert!(m[(1, 1)] > 0.0);
        assert_eq!(m[(2, 3)], 1.0);
        assert!(m[(3, 2)] < 0.0);
        assert_eq!(m[(3, 3)], 0.0);
        assert!((m[(1, 1)] / m[(0, 0)] - 4.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_degrees_heuristic() {
        let from_degrees = perspective(60.0, 1.0, 0.1, 100.0).unwrap();
        let from_radians = perspective(60f32.to_radians(), 1.0, 0.1, 100.0).unwrap();
        assert!((from_degrees - from_radians).norm() < 1e-5);
    }

    #[test]
    fn test_perspective_rejects_invalid_parameters() {
        assert!(matches!(
            perspective(1.0, 0.0, 0.1, 100.0),
            Err(ProjectionError::InvalidAspectRatio(_))
        ));
        assert!(matches!(
            perspective(1.0, 1.0, 5.0, 5.0),
            Err(ProjectionError::DegenerateDepthRange { .. })
        ));
        assert!(matches!(
            perspective(0.0, 1.0, 0.1, 100.0),
            Err(ProjectionError::InvalidFieldOfView { .. })
        ));
    }

    #[test]
    fn test_look_at_coincident_is_identity() {
        for eye in [Point3::origin(), Point3::new(1.0, -2.0, 3.5)] {
            assert_eq!(look_at_default(&eye, &eye), Matrix4::identity());
        }
    }

    #[test]
    fn test_look_at_maps_eye_and_target() {
        let cases = [
            (Point3::new(0.0, 0.0, 5.0), Point3::origin()),
            (Point3::new(3.0, 2.0, -1.0), Point3::new(-1.0, 0.5, 4.0)),
            (Point3::new(0.0, 10.0, 0.0), Point3::origin()),
            (Point3::new(1.0, -4.0, 1.0), Point3::new(1.0, 3.0, 1.0)),
        ];
        for (eye, target) in cases {
            let view = look_at_default(&eye, &target);
            let at_eye = apply(&view, &eye);
            assert!(at_eye.xyz().norm() < 1e-4, "eye -> {at_eye:?}");
            let at_target = apply(&view, &target);
            assert!(at_target.z < 0.0, "target -> {at_target:?}");
            assert!(at_target.x.abs() < 1e-4 && at_target.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_look_at_rotation_is_orthonormal() {
        let view = look_at_default(&Point3::new(2.0, 3.0, 4.0), &Point3::new(-1.0, 0.0, 0.5));
        assert!((rotation_determinant(&view).abs() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_parallel_up_uses_alternate_axis() {
        let view = look_at_default(&Point3::new(0.0, 5.0, 0.0), &Point3::origin());
        assert_ne!(view, Matrix4::identity());
        assert!((rotation_determinant(&view).abs() - 1.0).abs() < 1e-4);
        assert!(apply(&view, &Point3::origin()).z < 0.0);
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::for_viewport(800, 600).unwrap();
        assert!((camera.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.up(), Vector3::y());
        assert!(camera.projection_matrix().is_ok());
    }

    #[test]
    fn test_camera_rejects_bad_input() {
        let nan = Point3::new(f32::NAN, 0.0, 0.0);
        assert_eq!(
            Camera::new(nan, Point3::origin(), 1.0, 1.0, 0.1, 10.0),
            Err(CameraError::NonFiniteVector("position"))
        );
        assert!(matches!(
            Camera::new(Point3::origin(), Point3::new(0.0, 0.0, -1.0), 1.0, 1.0, 2.0, 2.0),
            Err(CameraError::Projection(_))
        ));
    }

    #[test]
    fn test_view_matrix_tracks_mutation() {
        let mut camera = Camera::for_viewport(100, 100).unwrap();
        let mut position = camera.position();
        position.x = 42.0;
        assert_eq!(camera.position().x, 0.0);

        camera.set_position(Point3::new(1.0, 1.0, 1.0));
        camera.move_position(&Vector3::new(0.0, 0.0, 4.0));
        let view = camera.view_matrix();
        assert!(apply(&view, &Point3::new(1.0, 1.0, 5.0)).xyz().norm() < 1e-4);

        camera.move_target(&Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(camera.target(), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_aspect_ratio_validates() {
        let mut camera = Camera::for_viewport(100, 100).unwrap();
        assert!(camera.set_aspect_ratio(0.0).is_err());
        assert_eq!(camera.aspect_ratio(), 1.0);
        camera.set_aspect_ratio(2.0).unwrap();
        assert_eq!(camera.aspect_ratio(), 2.0);
    }
}
