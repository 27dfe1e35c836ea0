//! Camera for ray generation.

use crate::error::{SceneError, SceneResult};
use crate::sampling::random_in_unit_disk;
use glint_math::{Point3, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Placement and lens settings from which a [`Camera`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Viewport width over height
    pub aspect: f32,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraConfig {
    /// A pinhole at the origin looking down -Z with a 4x2 viewport one unit away.
    fn default() -> Self {
        Self {
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vfov: 90.0,
            aspect: 2.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraConfig {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the aspect ratio.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Focus on the look-at point.
    pub fn focused_on_target(mut self) -> Self {
        self.focus_dist = (self.look_from - self.look_at).length();
        self
    }

    /// Validate the settings and compute the camera frame.
    pub fn build(&self) -> SceneResult<Camera> {
        self.validate()?;

        let w = (self.look_from - self.look_at).normalize();
        let u = self.up.cross(w).normalize();
        let v = w.cross(u);

        let half_height = (self.vfov.to_radians() / 2.0).tan();
        let half_width = self.aspect * half_height;
        let f = self.focus_dist;

        let origin = self.look_from;
        Ok(Camera {
            origin,
            lower_left: origin - half_width * f * u - half_height * f * v - f * w,
            horizontal: 2.0 * half_width * f * u,
            vertical: 2.0 * half_height * f * v,
            u,
            v,
            w,
            lens_radius: self.aperture / 2.0,
        })
    }

    fn validate(&self) -> SceneResult<()> {
        let invalid = |msg: String| Err(SceneError::InvalidCamera(msg));

        if !(self.look_from.is_finite() && self.look_at.is_finite() && self.up.is_finite()) {
            return invalid("camera vectors must be finite".to_string());
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vfov must be in (0, 180) degrees, got {}", self.vfov));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return invalid(format!("aspect must be positive, got {}", self.aspect));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return invalid(format!(
                "focus distance must be positive, got {}",
                self.focus_dist
            ));
        }
        if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            return invalid(format!("aperture must be non-negative, got {}", self.aperture));
        }

        let view = self.look_from - self.look_at;
        if view.length_squared() < 1e-12 {
            return invalid("look_from and look_at coincide".to_string());
        }
        if self.up.cross(view.normalize()).length_squared() < 1e-12 {
            return invalid("up vector is parallel to the view direction".to_string());
        }

        Ok(())
    }
}

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Point3,
    lower_left: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Generate a ray through viewport coordinates `(s, t)`, both in [0, 1]
    /// with `(0, 0)` at the lower-left corner.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let origin = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.origin + self.u * rd.x + self.v * rd.y
        } else {
            self.origin
        };

        let target = self.lower_left + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn lower_left(&self) -> Point3 {
        self.lower_left
    }

    pub fn horizontal(&self) -> Vec3 {
        self.horizontal
    }

    pub fn vertical(&self) -> Vec3 {
        self.vertical
    }

    /// Orthonormal camera frame `(u, v, w)`; `w` points away from the scene.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}
