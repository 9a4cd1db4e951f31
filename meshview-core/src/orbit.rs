//! Orbit controls for moving a camera around its target.
//!
//! The camera position is kept as `target + spherical(radius, theta, phi)`.
//! Rotation and zoom work in those coordinates; the `move_*` helpers are
//! free-fly moves layered on top and do not keep the orbit radius.

use std::f32::consts::PI;

use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::projection::{Camera, EPSILON};

/// Polar angle stays this far away from the poles
pub const POLE_MARGIN: f32 = 0.01;

/// Smallest allowed distance between camera and target
pub const MIN_RADIUS: f32 = 0.1;

/// Input sensitivities for [`OrbitController`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Radians per pixel of pointer movement
    pub rotation_sensitivity: f32,
    /// Multiplier on zoom deltas
    pub zoom_sensitivity: f32,
    /// World units per free-fly move
    pub translation_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.01,
            zoom_sensitivity: 1.0,
            translation_speed: 0.1,
        }
    }
}

/// Spherical coordinates of the camera relative to its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z towards +X
    pub theta: f32,
    /// Polar angle from +Y
    pub phi: f32,
}

impl Spherical {
    /// `None` when the offset is too short to have a direction
    pub fn from_offset(offset: &Vector3<f32>) -> Option<Self> {
        let radius = offset.norm();
        if radius < EPSILON {
            return None;
        }
        Some(Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        })
    }

    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Turns pointer and key input into camera motion.
pub struct OrbitController {
    pub settings: OrbitSettings,
    initial_position: Point3<f32>,
    initial_target: Point3<f32>,
    last_pointer: Point2<f32>,
    dragging: bool,
}

impl OrbitController {
    /// Capture the camera's current position and target for [`reset`](Self::reset)
    pub fn new(camera: &Camera, settings: OrbitSettings) -> Self {
        Self {
            settings,
            initial_position: camera.position(),
            initial_target: camera.target(),
            last_pointer: Point2::origin(),
            dragging: false,
        }
    }

    pub fn set_initial_values(&mut self, position: Point3<f32>, target: Point3<f32>) {
        self.initial_position = position;
        self.initial_target = target;
    }

    /// Current spherical coordinates of `camera`
    pub fn spherical(camera: &Camera) -> Option<Spherical> {
        Spherical::from_offset(&(camera.position() - camera.target()))
    }

    /// Orbit by angle deltas in radians; phi is kept off the poles
    pub fn rotate(&self, camera: &mut Camera, delta_theta: f32, delta_phi: f32) {
        let Some(mut spherical) = Self::spherical(camera) else {
            return;
        };
        spherical.theta += delta_theta;
        spherical.phi = (spherical.phi + delta_phi).clamp(POLE_MARGIN, PI - POLE_MARGIN);
        camera.set_position(camera.target() + spherical.to_offset());
    }

    /// Orbit by a pointer delta in pixels; screen y grows downwards
    pub fn rotate_by_pixels(&self, camera: &mut Camera, delta_x: f32, delta_y: f32) {
        let s = self.settings.rotation_sensitivity;
        self.rotate(camera, delta_x * s, -delta_y * s);
    }

    /// Move towards (positive delta) or away from the target
    pub fn zoom(&self, camera: &mut Camera, delta: f32) {
        let Some(mut spherical) = Self::spherical(camera) else {
            return;
        };
        let step = delta * self.settings.zoom_sensitivity * 0.01;
        let radius = (spherical.radius - step).max(MIN_RADIUS);
        if (radius - spherical.radius).abs() < EPSILON {
            return;
        }
        spherical.radius = radius;
        camera.set_position(camera.target() + spherical.to_offset());
    }

    pub fn move_forward(&self, camera: &mut Camera) {
        if let Some(forward) = forward(camera) {
            camera.move_position(&(forward * self.settings.translation_speed));
        }
    }

    pub fn move_backward(&self, camera: &mut Camera) {
        if let Some(forward) = forward(camera) {
            camera.move_position(&(-forward * self.settings.translation_speed));
        }
    }

    pub fn move_left(&self, camera: &mut Camera) {
        if let Some(right) = right(camera) {
            self.pan(camera, -right);
        }
    }

    pub fn move_right(&self, camera: &mut Camera) {
        if let Some(right) = right(camera) {
            self.pan(camera, right);
        }
    }

    pub fn move_up(&self, camera: &mut Camera) {
        self.pan(camera, Vector3::y());
    }

    pub fn move_down(&self, camera: &mut Camera) {
        self.pan(camera, -Vector3::y());
    }

    fn pan(&self, camera: &mut Camera, direction: Vector3<f32>) {
        let delta = direction * self.settings.translation_speed;
        camera.move_position(&delta);
        camera.move_target(&delta);
    }

    /// Restore the captured position and target
    pub fn reset(&self, camera: &mut Camera) {
        camera.set_position(self.initial_position);
        camera.set_target(self.initial_target);
    }

    pub fn on_press(&mut self, x: f32, y: f32) {
        self.last_pointer = Point2::new(x, y);
        self.dragging = true;
    }

    pub fn on_drag(&mut self, camera: &mut Camera, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        let delta = Point2::new(x, y) - self.last_pointer;
        self.rotate_by_pixels(camera, delta.x, delta.y);
        self.last_pointer = Point2::new(x, y);
    }

    pub fn on_release(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

fn forward(camera: &Camera) -> Option<Vector3<f32>> {
    (camera.target() - camera.position()).try_normalize(EPSILON)
}

fn right(camera: &Camera) -> Option<Vector3<f32>> {
    forward(camera)?.cross(&Vector3::y()).try_normalize(EPSILON)
}
