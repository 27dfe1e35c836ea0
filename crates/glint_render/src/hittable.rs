//! Hittable trait and HitRecord for ray-object intersection.

use crate::Material;
use glint_math::{Aabb, Interval, Point3, Ray, Vec3};

/// Record of a ray-object intersection.
///
/// The normal is the primitive's outward normal, even when the ray hits the
/// surface from inside. Materials that care about the side (dielectrics)
/// compare it against the ray direction themselves.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Point3,
    /// Outward surface normal at the intersection (unit length)
    pub normal: Vec3,
    /// Surface parameterization
    pub u: f32,
    pub v: f32,
    /// Material of the primitive that was hit; borrowed, never owned
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Whether the ray arrived from the side the normal points to.
    pub fn is_front_face(&self, ray: &Ray) -> bool {
        ray.direction().dot(self.normal) < 0.0
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("normal", &self.normal)
            .field("u", &self.u)
            .field("v", &self.v)
            .finish_non_exhaustive()
    }
}

/// Trait for objects that can be hit by rays.
///
/// The scene is read-only once built and shared between render threads.
pub trait Hittable: Send + Sync {
    /// Closest intersection with the ray whose `t` lies strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Axis-aligned box enclosing the object, or `None` if it has none.
    fn bounding_box(&self) -> Option<Aabb>;
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        (**self).hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (**self).bounding_box()
    }
}

/// An unordered list of hittable objects, searched linearly.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    /// Union of all member boxes; `None` when empty or when any member is unboundable
    bbox: Option<Aabb>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: None,
        }
    }

    /// Add a boxed object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = match (self.objects.is_empty(), self.bbox, object.bounding_box()) {
            (true, _, bbox) => bbox,
            (false, Some(acc), Some(bbox)) => Some(Aabb::surrounding(&acc, &bbox)),
            _ => None,
        };
        self.objects.push(object);
    }

    /// Add an object by value.
    pub fn push<H: Hittable + 'static>(&mut self, object: H) {
        self.add(Box::new(object));
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = None;
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Give up ownership of the members, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        let mut list = Self::new();
        for object in objects {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            // Later candidates only need to beat the closest hit so far.
            let interval = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
            if let Some(rec) = object.hit(ray, interval) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use glint_math::Color;

    fn sphere_at(z: f32, radius: f32) -> Sphere<Lambertian> {
        Sphere::new(
            Vec3::new(0.0, 0.0, z),
            radius,
            Lambertian::new(Color::new(0.5, 0.5, 0.5)),
        )
        .unwrap()
    }

    /// Unboundable stand-in, e.g. an infinite plane.
    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit(&self, _ray: &Ray, _ray_t: Interval) -> Option<HitRecord<'_>> {
            None
        }

        fn bounding_box(&self) -> Option<Aabb> {
            None
        }
    }

    #[test]
    fn test_empty_list_has_no_box_and_no_hit() {
        let list = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(list.is_empty());
        assert!(list.bounding_box().is_none());
        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_closest_hit_regardless_of_order() {
        // Far sphere added first so the scan must tighten the interval.
        let mut list = HittableList::new();
        list.push(sphere_at(-10.0, 1.0));
        list.push(sphere_at(-3.0, 1.0));
        list.push(sphere_at(-6.0, 1.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = list.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!((rec.p.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_interval_excludes_hits() {
        let mut list = HittableList::new();
        list.push(sphere_at(-3.0, 1.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(list.hit(&ray, Interval::new(0.001, 1.5)).is_none());

        // Starting past the front face finds the back face.
        let rec = list.hit(&ray, Interval::new(2.5, f32::INFINITY)).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_list_bounding_box_is_union() {
        let mut list = HittableList::new();
        list.push(sphere_at(-3.0, 1.0));
        list.push(sphere_at(5.0, 2.0));

        let bbox = list.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(-2.0, -2.0, -4.0));
        assert_eq!(bbox.max(), Vec3::new(2.0, 2.0, 7.0));
    }

    #[test]
    fn test_unboundable_member_poisons_box() {
        let mut list = HittableList::new();
        list.push(sphere_at(-3.0, 1.0));
        list.push(Unbounded);
        list.push(sphere_at(5.0, 2.0));

        assert_eq!(list.len(), 3);
        assert!(list.bounding_box().is_none());

        list.clear();
        list.push(sphere_at(0.0, 1.0));
        assert!(list.bounding_box().is_some());
    }
}
