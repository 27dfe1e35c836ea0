//! Glint - CPU Path Tracing
//!
//! A Monte Carlo path tracer for spheres with diffuse, metal, glass and
//! emissive materials, accelerated by a bounding volume hierarchy and
//! rendered in parallel buckets.

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod material;
mod output;
mod renderer;
mod sampling;
mod sphere;
mod texture;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::{Camera, CameraConfig};
pub use error::{OutputError, OutputResult, SceneError, SceneResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, schlick, Dielectric, DiffuseLight, Lambertian, Material, Metal,
    ScatterResult, AIR_IOR,
};
pub use output::{save, write_ppm};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, sky_gradient, Background,
    ImageBuffer, RenderConfig,
};
pub use sampling::{pixel_rng, random_in_unit_disk, random_in_unit_sphere};
pub use sphere::Sphere;
pub use texture::Texture;

/// Re-export common math types from glint_math
pub use glint_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
