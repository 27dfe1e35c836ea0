//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitives. Each level splits along an axis
//! chosen at random, with objects sorted by the minimum of their boxes and
//! divided in half by count.

use crate::error::{SceneError, SceneResult};
use crate::{HitRecord, Hittable, HittableList};
use glint_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with one or two primitives.
    Leaf {
        objects: Vec<Box<dyn Hittable>>,
        bbox: Aabb,
    },
}

type Entry = (Box<dyn Hittable>, Aabb);

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// The split axes are drawn from `rng`. Fails on an empty input or when
    /// an object has no bounding box.
    pub fn new(objects: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> SceneResult<Self> {
        if objects.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let count = objects.len();
        let entries = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| match object.bounding_box() {
                Some(bbox) => Ok((object, bbox)),
                None => Err(SceneError::Unboundable { index }),
            })
            .collect::<SceneResult<Vec<Entry>>>()?;

        let root = Self::build(entries, rng);
        log::debug!(
            "Built BVH over {} primitives, depth {}",
            count,
            root.depth()
        );

        Ok(root)
    }

    /// Build a BVH over the members of a hittable list.
    pub fn from_list(list: HittableList, rng: &mut dyn RngCore) -> SceneResult<Self> {
        Self::new(list.into_objects(), rng)
    }

    /// Recursive construction over a non-empty set of boxed objects.
    fn build(mut entries: Vec<Entry>, rng: &mut dyn RngCore) -> Self {
        let axis = rng.gen_range(0..3usize);

        if entries.len() <= 2 {
            let bbox = entries
                .iter()
                .map(|(_, bbox)| *bbox)
                .reduce(|acc, b| Aabb::surrounding(&acc, &b))
                .unwrap_or(Aabb::EMPTY);
            let objects = entries.into_iter().map(|(object, _)| object).collect();
            return BvhNode::Leaf { objects, bbox };
        }

        entries.sort_unstable_by(|(_, a), (_, b)| {
            a.axis_interval(axis)
                .min
                .total_cmp(&b.axis_interval(axis).min)
        });

        // Split at midpoint
        let mid = entries.len() / 2;
        let right_entries = entries.split_off(mid);
        let left = Self::build(entries, rng);
        let right = Self::build(right_entries, rng);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// The box enclosing every primitive under this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of levels, counting the leaves.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of primitives stored in the leaves.
    pub fn primitive_count(&self) -> usize {
        match self {
            BvhNode::Leaf { objects, .. } => objects.len(),
            BvhNode::Branch { left, right, .. } => {
                left.primitive_count() + right.primitive_count()
            }
        }
    }
}

/// The hit with the smaller `t`, or whichever exists.
fn closer<'a>(a: Option<HitRecord<'a>>, b: Option<HitRecord<'a>>) -> Option<HitRecord<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        // Both children see the caller's interval; the nearer hit wins.
        match self {
            BvhNode::Leaf { objects, .. } => objects
                .iter()
                .map(|object| object.hit(ray, ray_t))
                .fold(None, closer),
            BvhNode::Branch { left, right, .. } => {
                closer(left.hit(ray, ray_t), right.hit(ray, ray_t))
            }
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Material, Metal, Sphere};
    use glint_math::{Color, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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

    fn grey_sphere(center: Vec3, radius: f32) -> Box<dyn Hittable> {
        Box::new(Sphere::new(center, radius, Lambertian::new(Color::splat(0.5))).unwrap())
    }

    /// A field of non-overlapping spheres on a jittered grid, each with its own material.
    fn random_scene(rng: &mut StdRng) -> HittableList {
        let mut list = HittableList::new();
        for i in -4..4 {
            for j in -4..4 {
                let center = Vec3::new(
                    i as f32 * 2.0 + rng.gen_range(-0.4..0.4),
                    rng.gen_range(-3.0..3.0),
                    j as f32 * 2.0 + rng.gen_range(-0.4..0.4),
                );
                let radius = rng.gen_range(0.2..0.5);
                let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
                let material: Box<dyn Material> = if rng.gen_bool(0.5) {
                    Box::new(Lambertian::new(albedo))
                } else {
                    Box::new(Metal::new(albedo, 0.2))
                };
                list.push(Sphere::new(center, radius, material).unwrap());
            }
        }
        list
    }

    fn random_rays(rng: &mut StdRng, n: usize) -> Vec<Ray> {
        (0..n)
            .map(|_| {
                let origin = Vec3::new(
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(-12.0..12.0),
                );
                // Aim at a point inside the scene so most rays hit something.
                let target = Vec3::new(
                    rng.gen_range(-8.0..8.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-8.0..8.0),
                );
                Ray::new(origin, target - origin)
            })
            .collect()
    }

    fn material_addr(rec: &HitRecord) -> *const () {
        rec.material as *const _ as *const ()
    }

    fn query(world: &dyn Hittable, rays: &[Ray]) -> Vec<Option<(f32, *const ())>> {
        let ray_t = Interval::new(0.001, f32::INFINITY);
        rays.iter()
            .map(|ray| world.hit(ray, ray_t).map(|rec| (rec.t, material_addr(&rec))))
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            BvhNode::new(vec![], &mut rng),
            Err(SceneError::EmptyScene)
        ));
    }

    #[test]
    fn test_bvh_unboundable_object() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects: Vec<Box<dyn Hittable>> = vec![
            grey_sphere(Vec3::ZERO, 1.0),
            grey_sphere(Vec3::X * 3.0, 1.0),
            Box::new(Unbounded),
        ];
        assert!(matches!(
            BvhNode::new(objects, &mut rng),
            Err(SceneError::Unboundable { index: 2 })
        ));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects = vec![grey_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)];
        let bvh = BvhNode::new(objects, &mut rng).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(1);
        let spheres: Vec<Box<dyn Hittable>> = (0..10)
            .map(|i| grey_sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();

        let bvh = BvhNode::new(spheres, &mut rng).unwrap();
        assert_eq!(bvh.primitive_count(), 10);
        // 10 -> 5 -> 3 -> 2: four levels
        assert_eq!(bvh.depth(), 4);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);

        let miss = Ray::new(Vec3::new(5.0, 3.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&miss, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_bvh_keeps_tangent_hit_on_box_face() {
        // The ray runs along the x = 1 face of the boxes and grazes the first sphere.
        let mut list = HittableList::new();
        list.add(grey_sphere(Vec3::ZERO, 1.0));
        list.add(grey_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0));
        let ray = Ray::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let ray_t = Interval::new(0.001, f32::INFINITY);

        let expected = list.hit(&ray, ray_t).map(|rec| rec.t);
        assert_eq!(expected, Some(5.0));

        let bvh = BvhNode::from_list(list, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(bvh.hit(&ray, ray_t).map(|rec| rec.t), expected);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(17);
        let list = random_scene(&mut rng);
        let rays = random_rays(&mut rng, 2000);

        let expected = query(&list, &rays);
        assert!(expected.iter().filter(|hit| hit.is_some()).count() > 100);

        // Boxed objects keep their heap address when moved into the tree, so
        // material pointers stay comparable.
        let bvh = BvhNode::from_list(list, &mut rng).unwrap();
        let actual = query(&bvh, &rays);

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_bvh_independent_of_build_seed() {
        let mut scene_rng = StdRng::seed_from_u64(99);
        let list = random_scene(&mut scene_rng);
        let rays = random_rays(&mut scene_rng, 1000);

        let first = BvhNode::from_list(list, &mut StdRng::seed_from_u64(1)).unwrap();
        let expected = query(&first, &rays);

        // Rebuild the same primitives with a different split sequence.
        let second = BvhNode::new(collect_objects(first), &mut StdRng::seed_from_u64(2)).unwrap();

        assert_eq!(expected, query(&second, &rays));
    }

    fn collect_objects(node: BvhNode) -> Vec<Box<dyn Hittable>> {
        match node {
            BvhNode::Leaf { objects, .. } => objects,
            BvhNode::Branch { left, right, .. } => {
                let mut objects = collect_objects(*left);
                objects.extend(collect_objects(*right));
                objects
            }
        }
    }

    #[test]
    fn test_node_boxes_enclose_children() {
        fn check(node: &BvhNode) {
            match node {
                BvhNode::Leaf { objects, bbox } => {
                    assert!(!objects.is_empty() && objects.len() <= 2);
                    for object in objects {
                        assert!(bbox.encloses(&object.bounding_box().unwrap()));
                    }
                }
                BvhNode::Branch { left, right, bbox } => {
                    assert!(bbox.encloses(&left.bbox()));
                    assert!(bbox.encloses(&right.bbox()));
                    check(left);
                    check(right);
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(5);
        let list = random_scene(&mut rng);
        let bvh = BvhNode::from_list(list, &mut rng).unwrap();
        assert_eq!(bvh.primitive_count(), 64);
        check(&bvh);
    }
}
