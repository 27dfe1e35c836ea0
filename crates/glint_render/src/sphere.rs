//! Sphere primitive for ray tracing.

use crate::{
    error::{SceneError, SceneResult},
    hittable::{HitRecord, Hittable},
    Material,
};
use glint_math::{Aabb, Interval, Point3, Ray, Vec3};
use std::f32::consts::PI;

/// A sphere primitive.
pub struct Sphere<M: Material> {
    center: Point3,
    radius: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new sphere.
    ///
    /// Fails if the center is not finite or the radius is not a finite
    /// positive number.
    pub fn new(center: Point3, radius: f32, material: M) -> SceneResult<Self> {
        if !center.is_finite() {
            return Err(SceneError::NonFiniteCenter(center));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SceneError::InvalidRadius(radius));
        }

        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Ok(Self {
            center,
            radius,
            material,
            bbox,
        })
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &M {
        &self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl<M: Material> Hittable for Sphere<M> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let normal = (p - self.center) / self.radius;
        let (u, v) = Self::get_sphere_uv(normal);

        Some(HitRecord {
            t: root,
            p,
            normal,
            u,
            v,
            material: &self.material,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
